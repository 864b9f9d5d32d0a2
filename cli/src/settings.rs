use anyhow::Context;
use geocoin_core::GameConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Contents of the optional `--config` TOML file.
///
/// ```toml
/// seed = 7
///
/// [game]
/// visibility_radius = 4
/// reset_policy = "keep-caches"
/// start = { lat = 36.9894, lng = -122.0627 }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub seed: u64,
    pub game: GameConfig,
}

impl Settings {
    pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read config {}", path.display()))?;
        let mut settings: Self = toml::from_str(&text)
            .with_context(|| format!("Could not parse config {}", path.display()))?;
        settings.game = settings.game.sanitized();
        log::debug!("settings from {}: {:?}", path.display(), settings);
        Ok(settings)
    }
}
