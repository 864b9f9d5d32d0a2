use std::collections::BTreeMap;

use crate::*;

/// Memento store holding the authoritative coins of every cache ever spawned.
///
/// Entries outlive the rendering of their cache: a cache evicted from the visibility window is rebuilt from here,
/// coin for coin, when the player comes back. Entries are only dropped by [`clear`](Self::clear) on reset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheStateStore {
    states: BTreeMap<Cell, Vec<Coin>>,
}

impl CacheStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, cell: Cell) -> bool {
        self.states.contains_key(&cell)
    }

    pub fn get(&self, cell: Cell) -> Option<&[Coin]> {
        self.states.get(&cell).map(Vec::as_slice)
    }

    /// Overwrites the entry for `cell`.
    pub fn set(&mut self, cell: Cell, coins: Vec<Coin>) {
        self.states.insert(cell, coins);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Entries in cell order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &[Coin])> {
        self.states
            .iter()
            .map(|(&cell, coins)| (cell, coins.as_slice()))
    }

    pub fn total_coins(&self) -> usize {
        self.states.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl FromIterator<(Cell, Vec<Coin>)> for CacheStateStore {
    fn from_iter<I: IntoIterator<Item = (Cell, Vec<Coin>)>>(iter: I) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}
