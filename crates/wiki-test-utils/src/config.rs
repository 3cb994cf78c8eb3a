//! [`ConfigFile`]: configuration files in a temporary directory

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Minimal valid TOML configuration
pub const VALID_TOML: &str = r#"
[source]
domain = "https://www.yuque.com"
user_id = "1001"
auth = "token"
sync_repos = ["Guide"]

[destination]
domain = "https://wiki.example.com"
space = "DOCS"
auth = "Basic dXNlcjpwYXNz"
"#;

/// A configuration file that lives as long as this value
pub struct ConfigFile {
    _dir: TempDir,
    path: PathBuf,
}

impl ConfigFile {
    /// Write `content` to `<tempdir>/<name>`
    pub fn new(name: &str, content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        Self { _dir: dir, path }
    }

    /// [`VALID_TOML`] as `config.toml`
    pub fn valid() -> Self {
        Self::new("config.toml", VALID_TOML)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
