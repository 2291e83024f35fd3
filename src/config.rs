use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, ensure};
use serde::Deserialize;

use crate::{
    event_model::slot::MAX_TOUCH,
    screen_overlay::{
        renderer::DEFAULT_FRAME_INTERVAL,
        shape::{DEFAULT_COLORS, DEFAULT_DIAMETER},
    },
};

/// Largest accepted disc diameter.
pub const MAX_DIAMETER: u32 = 4096;

/// Tunables read from a TOML file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Disc diameter in pixels.
    pub diameter: u32,
    /// Pause after each submitted frame.
    pub frame_interval_ms: u64,
    /// RGB per slot; alpha is always forced.
    pub colors: [u32; MAX_TOUCH],
    /// DRM nodes probed in order.
    pub card_paths: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            diameter: DEFAULT_DIAMETER,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL.as_millis() as u64,
            colors: DEFAULT_COLORS,
            card_paths: (0..4)
                .map(|i| PathBuf::from(format!("/dev/dri/card{i}")))
                .collect(),
        }
    }
}

impl Config {
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(text).context("parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("load {}", path.display()))
    }

    /// `load` when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            (1..=MAX_DIAMETER).contains(&self.diameter),
            "diameter must be within 1..={MAX_DIAMETER}, got {}",
            self.diameter
        );
        ensure!(!self.card_paths.is_empty(), "card_paths is empty");
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.diameter, 200);
        assert_eq!(config.frame_interval(), Duration::from_millis(50));
        assert_eq!(config.card_paths[0], PathBuf::from("/dev/dri/card0"));
    }

    #[test]
    fn overrides_and_hex_colors() {
        let config = Config::parse(
            r#"
            diameter = 120
            frame_interval_ms = 16
            colors = [0xFF00FF, 0x00FFFF, 0xFFFF00, 0x808080]
            card_paths = ["/dev/dri/card1"]
            "#,
        )
        .unwrap();
        assert_eq!(config.diameter, 120);
        assert_eq!(config.frame_interval(), Duration::from_millis(16));
        assert_eq!(config.colors[3], 0x808080);
        assert_eq!(config.card_paths, vec![PathBuf::from("/dev/dri/card1")]);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::parse("diameter = 0").is_err());
        assert!(Config::parse("diameter = 5000").is_err());
        assert!(Config::parse("card_paths = []").is_err());
        assert!(Config::parse("colors = [1, 2]").is_err());
        assert!(Config::parse("radius = 3").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "diameter = 64").unwrap();
        let config = Config::load_or_default(Some(file.path())).unwrap();
        assert_eq!(config.diameter, 64);
        assert_eq!(config.colors, DEFAULT_COLORS);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join("absent.toml")).is_err());
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }
}
