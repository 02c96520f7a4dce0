//! Optional JSON settings for the debugger front end.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::debugger::{InternalPaths, DEFAULT_PROMPT};
use crate::executor::DEFAULT_MAX_DEPTH;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebuggerConfig {
    pub prompt: String,
    /// Searched by `import` after the importing file's directory. Files
    /// under it are skipped by `step` and `next`.
    pub lib_dir: Option<PathBuf>,
    /// Extra directories whose files are never step targets.
    pub internal_dirs: Vec<PathBuf>,
    pub max_call_depth: usize,
    pub history_size: usize,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            lib_dir: None,
            internal_dirs: Vec::new(),
            max_call_depth: DEFAULT_MAX_DEPTH,
            history_size: 100,
        }
    }
}

impl DebuggerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn internal_paths(&self) -> InternalPaths {
        self.lib_dir
            .iter()
            .chain(&self.internal_dirs)
            .fold(InternalPaths::new(), |paths, dir| paths.with_root(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = DebuggerConfig::from_json(r#"{ "prompt": "> " }"#).unwrap();
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.max_call_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.history_size, 100);
        assert!(config.lib_dir.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(DebuggerConfig::from_json(r#"{ "promt": "> " }"#).is_err());
    }

    #[test]
    fn lib_dir_and_internal_dirs_become_internal_roots() {
        let config = DebuggerConfig::from_json(
            r#"{ "lib_dir": "/opt/scrip/lib", "internal_dirs": ["/opt/vendor"] }"#,
        )
        .unwrap();
        let internal = config.internal_paths();
        assert_eq!(internal.roots().len(), 2);
        assert!(internal.is_internal(Path::new("/opt/scrip/lib/text.scrip")));
        assert!(internal.is_internal(Path::new("/opt/vendor/x.scrip")));
        assert!(!internal.is_internal(Path::new("/home/me/app.scrip")));
    }

    #[test]
    fn unreadable_file_is_a_read_error() {
        let err = DebuggerConfig::load(Path::new("/no/such/debugger.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().starts_with("cannot read config /no/such/debugger.json"));
    }
}
