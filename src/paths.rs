use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current directory and fold `.` and `..`
/// components lexically. Symlinks are not resolved, so the result is stable
/// for files that do not exist yet. Synthetic names are returned as is.
pub fn normalize(path: &Path) -> PathBuf {
    if is_synthetic(path) {
        return path.to_path_buf();
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Synthetic frame names such as `<prelude>` or `<eval>`.
pub fn is_synthetic(path: &Path) -> bool {
    path.to_str()
        .is_some_and(|name| name.starts_with('<') && name.ends_with('>'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_dot_components() {
        assert_eq!(
            normalize(Path::new("/srv/app/./lib/../main.scrip")),
            PathBuf::from("/srv/app/main.scrip")
        );
    }

    #[test]
    fn relative_paths_become_absolute() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(normalize(Path::new("app.scrip")), cwd.join("app.scrip"));
    }

    #[test]
    fn synthetic_names_are_not_resolved() {
        assert_eq!(normalize(Path::new("<prelude>")), PathBuf::from("<prelude>"));
    }

    #[test]
    fn synthetic_names() {
        assert!(is_synthetic(Path::new("<prelude>")));
        assert!(!is_synthetic(Path::new("/tmp/<prelude>")));
        assert!(!is_synthetic(Path::new("prelude")));
    }
}
