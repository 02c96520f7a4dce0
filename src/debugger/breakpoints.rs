use std::path::{Path, PathBuf};

use crate::paths;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    pub path: PathBuf,
    pub line: usize,
    /// Removed from the table as soon as it fires.
    pub once: bool,
    enabled: bool,
}

impl Breakpoint {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// `file:line` as shown by `break`.
    pub fn location(&self) -> String {
        format!("{}:{}", self.path.display(), self.line)
    }

    /// Whether this breakpoint watches the line about to execute.
    pub fn matches(&self, path: &Path, line: usize) -> bool {
        self.enabled && self.line == line && self.path == path
    }
}

/// Ordered breakpoints. A breakpoint is addressed by its current index, so
/// deleting one shifts every later index down.
#[derive(Debug, Default)]
pub struct BreakpointTable {
    points: Vec<Breakpoint>,
}

impl BreakpointTable {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Append an enabled breakpoint at `file:line` and return its index.
    pub fn add(&mut self, file: &Path, line: usize, once: bool) -> usize {
        self.points.push(Breakpoint {
            path: paths::normalize(file),
            line,
            once,
            enabled: true,
        });
        self.points.len() - 1
    }

    pub fn list(&self) -> Vec<(usize, String)> {
        self.points
            .iter()
            .enumerate()
            .map(|(index, point)| (index, point.location()))
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&Breakpoint> {
        self.points.get(index)
    }

    /// Disable and remove the breakpoint at `index`, if there is one.
    pub fn delete_at(&mut self, index: usize) -> Option<Breakpoint> {
        if index >= self.points.len() {
            return None;
        }
        let mut removed = self.points.remove(index);
        removed.enabled = false;
        Some(removed)
    }

    pub fn enable(&mut self, index: usize) -> bool {
        self.set_enabled(index, true)
    }

    pub fn disable(&mut self, index: usize) -> bool {
        self.set_enabled(index, false)
    }

    fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.points.get_mut(index) {
            Some(point) => {
                point.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Index of the first enabled breakpoint watching `path:line`.
    pub fn hit(&self, path: &Path, line: usize) -> Option<usize> {
        self.points.iter().position(|point| point.matches(path, line))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_list_shows_file_and_line() {
        let mut table = BreakpointTable::new();
        let index = table.add(Path::new("/srv/app.scrip"), 12, false);
        assert_eq!(index, 0);
        assert_eq!(table.list(), vec![(0, "/srv/app.scrip:12".to_string())]);
    }

    #[test]
    fn relative_files_are_stored_absolute() {
        let mut table = BreakpointTable::new();
        table.add(Path::new("app.scrip"), 3, false);
        let expected = std::env::current_dir().unwrap().join("app.scrip");
        assert_eq!(table.get(0).unwrap().path, expected);
    }

    #[test]
    fn delete_shifts_later_indices() {
        let mut table = BreakpointTable::new();
        table.add(Path::new("/a.scrip"), 1, false);
        table.add(Path::new("/b.scrip"), 2, false);
        table.add(Path::new("/c.scrip"), 3, false);

        let removed = table.delete_at(1).unwrap();
        assert_eq!(removed.location(), "/b.scrip:2");
        assert!(!removed.is_enabled());
        assert_eq!(
            table.list(),
            vec![(0, "/a.scrip:1".to_string()), (1, "/c.scrip:3".to_string())]
        );
        assert!(table.delete_at(5).is_none());
    }

    #[test]
    fn hit_requires_exact_path_and_line() {
        let mut table = BreakpointTable::new();
        table.add(Path::new("/srv/app.scrip"), 5, false);

        assert_eq!(table.hit(Path::new("/srv/app.scrip"), 5), Some(0));
        assert_eq!(table.hit(Path::new("/srv/app.scrip"), 6), None);
        assert_eq!(table.hit(Path::new("/srv/other.scrip"), 5), None);
    }

    #[test]
    fn disabled_breakpoints_do_not_hit() {
        let mut table = BreakpointTable::new();
        table.add(Path::new("/srv/app.scrip"), 5, false);
        assert!(table.disable(0));
        assert_eq!(table.hit(Path::new("/srv/app.scrip"), 5), None);
        assert!(table.enable(0));
        assert_eq!(table.hit(Path::new("/srv/app.scrip"), 5), Some(0));
        assert!(!table.enable(3));
    }
}
