use std::path::{Path, PathBuf};

use crate::paths;

/// Decides which source paths are not user code. Only automatic step
/// targets are filtered; explicit breakpoints may point anywhere.
#[derive(Debug, Clone, Default)]
pub struct InternalPaths {
    roots: Vec<PathBuf>,
}

impl InternalPaths {
    pub fn new() -> Self {
        Self { roots: Vec::new() }
    }

    /// Treat everything under `root` as internal.
    pub fn with_root(mut self, root: impl AsRef<Path>) -> Self {
        self.roots.push(paths::normalize(root.as_ref()));
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn is_internal(&self, path: &Path) -> bool {
        paths::is_synthetic(path) || self.roots.iter().any(|root| path.starts_with(root))
    }
}
