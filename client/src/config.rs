use std::{fs, path::PathBuf};

use anyhow::Context;
use libgame::{GridConfig, PatternLibrary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub grid: GridConfig,

    /// Milliseconds between generations while running.
    pub tick_millis: u64,

    /// Directories of bundled patterns, loaded read-only.
    pub pattern_dirs: Vec<PathBuf>,

    /// Where saved patterns go. Patterns already in here can be overwritten.
    pub save_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            tick_millis: 100,
            pattern_dirs: Vec::new(),
            save_dir: PathBuf::from("patterns"),
        }
    }
}

impl ClientConfig {
    /// Reads the config at `path`, or falls back to defaults for `None` and `-`.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let Some(path) = path.filter(|path| *path != "-") else {
            return Ok(Self::default());
        };

        let config_serialized =
            fs::read(path).with_context(|| format!("Couldn't read config {path}"))?;
        let config =
            serde_json::from_slice(&config_serialized).context("Couldn't deserialize config")?;

        Ok(config)
    }

    /// Builds the pattern library. Directories that can't be read are skipped with a warning.
    pub fn library(&self) -> PatternLibrary {
        let mut library = PatternLibrary::new().with_save_dir(&self.save_dir);

        for dir in &self.pattern_dirs {
            if let Err(e) = library.scan_dir(dir, false) {
                log::warn!("Skipping pattern directory: {e:#}");
            }
        }

        if self.save_dir.is_dir() {
            if let Err(e) = library.scan_dir(&self.save_dir, true) {
                log::warn!("Skipping save directory: {e:#}");
            }
        }

        library
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{ "tick_millis": 5, "grid": { "wrap": true } }"#).unwrap();

        assert_eq!(config.tick_millis, 5);
        assert!(config.grid.wrap);
        assert_eq!(config.grid.width, GridConfig::default().width);
        assert_eq!(config.save_dir, PathBuf::from("patterns"));
    }

    #[test]
    fn dash_means_defaults() {
        assert_eq!(ClientConfig::load(Some("-")).unwrap(), ClientConfig::default());
        assert_eq!(ClientConfig::load(None).unwrap(), ClientConfig::default());
        assert!(ClientConfig::load(Some("/definitely/not/here.json")).is_err());
    }

    #[test]
    fn library_marks_bundled_patterns_read_only() {
        let dir = tempdir().unwrap();
        let bundled = dir.path().join("bundled");
        let saved = dir.path().join("saved");
        fs::create_dir_all(&bundled).unwrap();
        fs::create_dir_all(&saved).unwrap();
        fs::write(bundled.join("glider.rle"), "x = 3, y = 3\nbo$2bo$3o!").unwrap();
        fs::write(saved.join("mine.lif"), "0 0\n").unwrap();

        let config = ClientConfig {
            pattern_dirs: vec![bundled, dir.path().join("missing")],
            save_dir: saved,
            ..ClientConfig::default()
        };
        let library = config.library();

        assert!(!library.get("glider").unwrap().writable);
        assert!(library.get("mine").unwrap().writable);
    }
}
