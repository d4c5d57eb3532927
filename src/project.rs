use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;

pub const CONFIG_FILE: &str = "afterbuild.toml";

/// Finds the directory holding `afterbuild.toml` by walking up from `start`.
/// Returns `None` if no config file is found.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;

    loop {
        if dir.join(CONFIG_FILE).is_file() {
            return Some(dir.to_path_buf());
        }

        dir = dir.parent()?;
    }
}

/// A project whose build is being observed.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Opens the project at `dir`, or the nearest ancestor of the working
    /// directory carrying a config file. Without one, the working directory is
    /// used with default settings.
    pub fn discover(dir: Option<&Path>) -> Result<Self> {
        let root = match dir {
            Some(dir) => dir.to_path_buf(),
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                find_project_root(&cwd).unwrap_or(cwd)
            }
        };
        let config = Config::load_or_default(&root.join(CONFIG_FILE))?;
        tracing::debug!(root = %root.display(), "opened project");
        Ok(Self::new(root, config))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves `path` against the project root. Absolute paths are returned as-is.
    pub fn file(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }
}
