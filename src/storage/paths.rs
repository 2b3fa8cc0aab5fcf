//! Where ccdu keeps its files.

use std::path::PathBuf;

use directories::{BaseDirs, ProjectDirs};

/// File name of the config file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Platform directories for ccdu.
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config: PathBuf,
}

impl AppPaths {
    /// `~/.config/ccdu` on Linux, the platform equivalent elsewhere.
    ///
    /// Without a resolvable home the current directory is used.
    #[must_use]
    pub fn new() -> Self {
        let config = ProjectDirs::from("", "", "ccdu").map_or_else(
            || {
                BaseDirs::new()
                    .map_or_else(|| PathBuf::from("."), |d| d.home_dir().to_path_buf())
                    .join(".config")
                    .join("ccdu")
            },
            |dirs| dirs.config_dir().to_path_buf(),
        );
        Self { config }
    }

    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.join(CONFIG_FILE_NAME)
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
