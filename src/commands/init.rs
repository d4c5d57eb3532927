use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::project::CONFIG_FILE;

pub enum InitResult {
    Written(PathBuf),
    AlreadyExists(PathBuf),
}

/// Writes the default `afterbuild.toml` into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<InitResult> {
    let path = dir.join(CONFIG_FILE);

    if path.exists() && !force {
        return Ok(InitResult::AlreadyExists(path));
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    Config::default().write_file(&path)?;
    Ok(InitResult::Written(path))
}
