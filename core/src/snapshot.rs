use serde::{Deserialize, Serialize};

use crate::*;

/// Names the slot a value is persisted under.
pub trait StorageKey {
    const KEY: &'static str;
}

/// Persisted form of a whole session.
///
/// ```json
/// {
///   "playerWallet": [{"spawnLocation": {"i": 1, "j": 2}, "serial": 0}],
///   "cacheStates": [["1:2", [{"spawnLocation": {"i": 1, "j": 2}, "serial": 1}]]],
///   "movementHistory": [{"lat": 36.9894, "lng": -122.0627}]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub player_wallet: Vec<Coin>,
    pub cache_states: Vec<(String, Vec<Coin>)>,
    pub movement_history: Vec<LatLng>,
}

impl SessionSnapshot {
    pub fn capture<L: Luck, S: SnapshotStorage>(session: &GameSession<L, S>) -> Self {
        Self {
            player_wallet: session.wallet().to_vec(),
            cache_states: session
                .store()
                .iter()
                .map(|(cell, coins)| (cell.key(), coins.to_vec()))
                .collect(),
            movement_history: session.history().to_vec(),
        }
    }

    pub fn to_json(&self) -> core::result::Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> core::result::Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> core::result::Result<(), SnapshotError> {
        if self.movement_history.is_empty() {
            return Err(SnapshotError::EmptyHistory);
        }
        if let Some(point) = self.movement_history.iter().find(|point| !point.is_valid()) {
            return Err(SnapshotError::InvalidPosition(*point));
        }
        for (key, _) in &self.cache_states {
            key.parse::<Cell>()?;
        }
        Ok(())
    }

    /// Rebuilds the memento store from the persisted entries.
    pub fn cache_state_store(&self) -> core::result::Result<CacheStateStore, SnapshotError> {
        self.cache_states
            .iter()
            .map(|(key, coins)| {
                key.parse::<Cell>()
                    .map(|cell| (cell, coins.clone()))
                    .map_err(SnapshotError::CacheKey)
            })
            .collect()
    }

    /// Where the player was last seen.
    pub fn last_position(&self) -> Option<LatLng> {
        self.movement_history.last().copied()
    }
}

impl StorageKey for SessionSnapshot {
    const KEY: &'static str = "geocoin:session:v1";
}
