//! Source window shown when the program stops.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Lines kept after the current one.
const TRAILING_CONTEXT: usize = 5;
/// Maximum lines in a window.
const WINDOW_SIZE: usize = 10;

/// 0-based inclusive `(start, end)` of the window around 1-based
/// `current_line` in a file of `total` lines. `None` for an empty file.
pub fn window_bounds(current_line: usize, total: usize) -> Option<(usize, usize)> {
    if total == 0 {
        return None;
    }
    let end = (current_line + TRAILING_CONTEXT).min(total).max(1) - 1;
    let start = end.saturating_sub(WINDOW_SIZE - 1);
    Some((start, end))
}

/// Render the window for `source`, marking `current_line` with ` => `.
pub fn render_window(path: &Path, source: &str, current_line: usize) -> Option<String> {
    let lines: Vec<&str> = source.lines().collect();
    let (start, end) = window_bounds(current_line, lines.len())?;
    let width = (end + 1).to_string().len();

    let mut out = String::new();
    let _ = writeln!(out, "[{}, {}] in {}", start + 1, end + 1, path.display());
    for (offset, text) in lines[start..=end].iter().enumerate() {
        let lineno = start + offset + 1;
        let marker = if lineno == current_line { " => " } else { "    " };
        let _ = writeln!(out, "{marker}{lineno:>width$}| {text}");
    }
    Some(out)
}

/// Read `path` and render its window. Missing or unreadable files render
/// nothing.
pub fn code_window(path: &Path, current_line: usize) -> Option<String> {
    let source = fs::read_to_string(path).ok()?;
    render_window(path, &source, current_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(total: usize) -> String {
        (1..=total).map(|n| format!("line {n}\n")).collect()
    }

    #[test]
    fn window_keeps_five_trailing_lines() {
        assert_eq!(window_bounds(12, 30), Some((7, 16)));
        assert_eq!(window_bounds(1, 30), Some((0, 5)));
    }

    #[test]
    fn window_is_clamped_to_file_end() {
        assert_eq!(window_bounds(28, 30), Some((20, 29)));
        assert_eq!(window_bounds(3, 4), Some((0, 3)));
        assert_eq!(window_bounds(0, 0), None);
    }

    #[test]
    fn window_never_exceeds_ten_lines_and_ends_at_l_plus_five() {
        for total in 1..40 {
            for current in 1..=total {
                let (start, end) = window_bounds(current, total).unwrap();
                assert!(end - start < 10);
                assert_eq!(end + 1, (current + 5).min(total));
                assert!(start < current && current <= end + 1);
            }
        }
    }

    #[test]
    fn renders_header_and_marker() {
        let source = numbered(12);
        let rendered = render_window(Path::new("/srv/app.scrip"), &source, 9).unwrap();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "[3, 12] in /srv/app.scrip");
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[1], "     3| line 3");
        assert_eq!(lines[7], " =>  9| line 9");
        assert_eq!(lines[10], "    12| line 12");
    }

    #[test]
    fn missing_file_renders_nothing() {
        assert!(code_window(Path::new("/definitely/not/here.scrip"), 1).is_none());
    }
}
