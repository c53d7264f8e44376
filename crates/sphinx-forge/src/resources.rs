//! Named resource resolution.
//!
//! Voices, noises and fonts are addressed by slash-separated names such as
//! `sounds/en/numbers/4-alex.wav` and resolved against an assets directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sphinx_common::constants::DEFAULT_ASSETS_DIR;
use sphinx_common::{SphinxError, SphinxResult};

/// Resolves resource names against a root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    root: PathBuf,
}

impl ResourceLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for a resource name (leading `/` is ignored)
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name.trim_start_matches('/'))
    }

    /// Read a resource fully into memory
    pub fn read(&self, name: &str) -> SphinxResult<Vec<u8>> {
        let path = self.resolve(name);
        match std::fs::read(&path) {
            Ok(bytes) => {
                tracing::debug!(resource = %name, bytes = bytes.len(), "Loaded resource");
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SphinxError::NotFound(format!(
                "{} (looked in {})",
                name,
                path.display()
            ))),
            Err(e) => Err(SphinxError::Io(e)),
        }
    }
}

impl Default for ResourceLocator {
    fn default() -> Self {
        Self::new(DEFAULT_ASSETS_DIR)
    }
}
