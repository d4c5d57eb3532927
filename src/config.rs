use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::flow::OutcomeMap;
use crate::plugins::PluginId;

/// Replaces `path` with `content` by writing a locked staging file next to it
/// and renaming it into place. The staging file is removed if writing fails.
pub fn replace_file(path: &Path, content: &[u8]) -> Result<()> {
    let staging = staging_path(path);
    let staged = File::create(&staging)
        .and_then(|mut file| {
            file.lock_exclusive()?;
            file.write_all(content)?;
            file.sync_all()
        })
        .with_context(|| format!("Failed to write {}", staging.display()));
    if let Err(err) = staged {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    fs::rename(&staging, path)
        .with_context(|| format!("Failed to replace {}", path.display()))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LampConfig {
    pub success: String,
    pub failure: String,
}

impl Default for LampConfig {
    fn default() -> Self {
        Self {
            success: "green".to_string(),
            failure: "red".to_string(),
        }
    }
}

impl LampConfig {
    pub fn colors(&self) -> OutcomeMap<String> {
        OutcomeMap::new(self.success.clone(), self.failure.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Played when the build succeeds. Relative paths resolve against the project root.
    pub success: PathBuf,
    pub failure: PathBuf,
    pub player: String,
    /// Arguments placed before the media file path.
    pub player_args: Vec<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            success: PathBuf::from("sounds/tada.mp3"),
            failure: PathBuf::from("sounds/sad-trombone.mp3"),
            player: "ffplay".to_string(),
            player_args: ["-nodisp", "-autoexit", "-hide_banner", "-loglevel", "quiet"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl SoundConfig {
    pub fn media_files(&self) -> OutcomeMap<PathBuf> {
        OutcomeMap::new(self.success.clone(), self.failure.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Program and arguments run by the task. Empty means the task does nothing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    /// When set, the task fails with this message without running anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub plugins: Vec<PluginId>,
    pub default_tasks: Vec<String>,
    pub lamp: LampConfig,
    pub sound: SoundConfig,
    pub tasks: BTreeMap<String, TaskDef>,
}

impl Default for Config {
    fn default() -> Self {
        let mut tasks = BTreeMap::new();
        tasks.insert(
            "ok".to_string(),
            TaskDef {
                description: Some("Does nothing".to_string()),
                ..TaskDef::default()
            },
        );
        tasks.insert(
            "fail".to_string(),
            TaskDef {
                description: Some("Always fails".to_string()),
                fail: Some("Simulated task failure.".to_string()),
                ..TaskDef::default()
            },
        );

        Self {
            plugins: vec![PluginId::Lavalamp, PluginId::Soundfeedback],
            default_tasks: vec!["ok".to_string()],
            lamp: LampConfig::default(),
            sound: SoundConfig::default(),
            tasks,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Loads `path` if it exists, falling back to the defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.is_file() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string(self).context("Failed to serialize config")?;
        replace_file(path, content.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    // -- replace_file --

    #[rstest]
    #[case::fresh(None)]
    #[case::overwrite(Some("plugins = []\n"))]
    fn replace_file_leaves_only_new_content(#[case] existing: Option<&str>) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("afterbuild.toml");
        if let Some(existing) = existing {
            std::fs::write(&path, existing).unwrap();
        }

        replace_file(&path, b"default_tasks = [\"fail\"]\n").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "default_tasks = [\"fail\"]\n"
        );
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn replace_file_into_missing_dir_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope").join("afterbuild.toml");

        let err = replace_file(&path, b"x").unwrap_err();

        assert!(format!("{err:#}").contains("afterbuild.toml.partial"));
        assert!(!path.exists());
    }

    // -- load / write --

    #[rstest]
    fn written_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("afterbuild.toml");
        Config::default().write_file(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, Config::default());
    }

    // Sections left out of the file take their default values.
    #[rstest]
    fn partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("afterbuild.toml");
        std::fs::write(
            &path,
            "plugins = [\"lavalamp\"]\n[lamp]\nfailure = \"purple\"\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.plugins, vec![PluginId::Lavalamp]);
        assert_eq!(config.lamp.success, "green");
        assert_eq!(config.lamp.failure, "purple");
        assert_eq!(config.sound, SoundConfig::default());
        assert!(config.tasks.contains_key("fail"));
    }

    #[rstest]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("afterbuild.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[rstest]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("afterbuild.toml");
        std::fs::write(&path, "plugins = [\"disco-ball\"]\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn default_signals_match_the_stock_plugins() {
        let config = Config::default();
        assert_eq!(config.lamp.colors(), OutcomeMap::new("green".to_string(), "red".to_string()));
        assert_eq!(
            config.sound.media_files().failure,
            PathBuf::from("sounds/sad-trombone.mp3")
        );
    }
}
