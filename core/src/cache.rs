use core::fmt;
use serde::{Deserialize, Serialize};

use crate::*;

/// Coin identified by the cell that spawned it and a per-cache serial.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub spawn_location: Cell,
    pub serial: Serial,
}

impl Coin {
    pub const fn new(spawn_location: Cell, serial: Serial) -> Self {
        Self {
            spawn_location,
            serial,
        }
    }
}

/// `"i:j#serial"`
impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.spawn_location, self.serial)
    }
}

/// Coin holdings of one cell.
///
/// `coins` is a LIFO stack: the last coin deposited is the first one collected.
#[derive(Clone, Debug, PartialEq)]
pub struct Cache {
    location: Cell,
    coins: Vec<Coin>,
    next_serial: Serial,
}

impl Cache {
    /// Freshly spawned cache holding coins serialed `0..coin_count`.
    pub fn spawn(location: Cell, coin_count: Serial) -> Self {
        let mut cache = Self {
            location,
            coins: Vec::with_capacity(coin_count as usize),
            next_serial: 0,
        };
        for _ in 0..coin_count {
            cache.mint();
        }
        cache
    }

    /// Transient view over coins read back from the memento store.
    pub fn restore(location: Cell, coins: &[Coin]) -> Self {
        let next_serial = coins
            .iter()
            .filter(|coin| coin.spawn_location == location)
            .map(|coin| coin.serial + 1)
            .max()
            .unwrap_or(0);
        Self {
            location,
            coins: coins.to_vec(),
            next_serial,
        }
    }

    fn mint(&mut self) {
        self.coins.push(Coin::new(self.location, self.next_serial));
        self.next_serial += 1;
    }

    pub fn location(&self) -> Cell {
        self.location
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    /// Coin that the next [`take`](Self::take) would return.
    pub fn top(&self) -> Option<&Coin> {
        self.coins.last()
    }

    pub fn take(&mut self) -> Option<Coin> {
        self.coins.pop()
    }

    pub fn put(&mut self, coin: Coin) {
        self.coins.push(coin);
    }
}

/// Number of coins a lucky cell spawns with, `floor(luck * scale)`.
pub fn coin_count_for(luck: f64, scale: f64) -> Serial {
    (luck * scale).floor().max(0.) as Serial
}
