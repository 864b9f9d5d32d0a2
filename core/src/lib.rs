use serde::{Deserialize, Serialize};

pub use cache::*;
pub use error::*;
pub use luck::*;
pub use registry::*;
pub use session::*;
pub use snapshot::*;
pub use storage::*;
pub use store::*;
pub use types::*;
pub use window::*;

mod cache;
mod error;
mod luck;
mod registry;
mod session;
mod snapshot;
mod storage;
mod store;
mod types;
mod window;

/// Default start location and reset target.
pub const DEFAULT_START: LatLng = LatLng::new(36.9894, -122.0627);

/// Largest visibility radius a config may ask for.
pub const MAX_VISIBILITY_RADIUS: Coord = 64;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Cell edge length in degrees.
    pub tile_width: f64,
    /// Half-width of the square visibility window, in cells.
    pub visibility_radius: Coord,
    /// Luck threshold under which a cell hosts a cache.
    pub spawn_probability: f64,
    /// Multiplier turning a cell's luck into its coin count.
    pub coin_scale: f64,
    pub start: LatLng,
    pub reset_policy: ResetPolicy,
}

impl GameConfig {
    pub const fn new() -> Self {
        Self {
            tile_width: 1e-4,
            visibility_radius: 8,
            spawn_probability: 0.1,
            coin_scale: 100.,
            start: DEFAULT_START,
            reset_policy: ResetPolicy::RestoreSpawned,
        }
    }

    /// Same config with a different visibility radius, clamped to `0..=MAX_VISIBILITY_RADIUS`.
    pub fn with_radius(mut self, radius: Coord) -> Self {
        self.visibility_radius = radius.clamp(0, MAX_VISIBILITY_RADIUS);
        self
    }

    pub const fn with_reset_policy(mut self, reset_policy: ResetPolicy) -> Self {
        self.reset_policy = reset_policy;
        self
    }

    pub const fn with_start(mut self, start: LatLng) -> Self {
        self.start = start;
        self
    }

    /// Config with every field brought into a usable range.
    ///
    /// Values that can't be clamped meaningfully (non-finite or non-positive tile width, off-globe start) fall back to
    /// the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::new();
        let tile_width = if self.tile_width.is_finite() && self.tile_width > 0. {
            self.tile_width
        } else {
            log::warn!("Invalid tile width {}, using {}", self.tile_width, defaults.tile_width);
            defaults.tile_width
        };
        let spawn_probability = if self.spawn_probability.is_nan() {
            defaults.spawn_probability
        } else {
            self.spawn_probability.clamp(0., 1.)
        };
        let coin_scale = if self.coin_scale.is_finite() {
            self.coin_scale.clamp(0., Serial::MAX as f64)
        } else {
            defaults.coin_scale
        };
        let start = if self.start.is_valid() {
            self.start
        } else {
            log::warn!("Invalid start {}, using {}", self.start, defaults.start);
            defaults.start
        };

        Self {
            tile_width,
            spawn_probability,
            coin_scale,
            start,
            ..self
        }
        .with_radius(self.visibility_radius)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What a reset does to cache contents.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResetPolicy {
    /// Forget every cache so each one respawns with its original coins when seen again.
    RestoreSpawned,
    /// Leave cache contents as they are; coins held in the wallet are discarded.
    KeepCaches,
}

impl Default for ResetPolicy {
    fn default() -> Self {
        Self::RestoreSpawned
    }
}

/// Outcome of moving a coin between a cache and the wallet.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TransferOutcome {
    NoChange,
    Moved {
        coin: Coin,
        cache_coins: usize,
        wallet_coins: usize,
    },
}

impl TransferOutcome {
    /// Whether the renderer needs to redraw the cache popup and the wallet.
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Moved { .. } => true,
        }
    }

    pub const fn coin(self) -> Option<Coin> {
        match self {
            Self::NoChange => None,
            Self::Moved { coin, .. } => Some(coin),
        }
    }
}
