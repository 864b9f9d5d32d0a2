use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::GameError;

/// Single grid axis index, used for both `i` (latitude) and `j` (longitude).
pub type Coord = i32;

/// Serial number of a coin, unique within the cache that spawned it.
pub type Serial = u32;

/// Grid cell `(i, j)`.
///
/// Equality is structural, the string key is `"i:j"`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub i: Coord,
    pub j: Coord,
}

impl Cell {
    pub const fn new(i: Coord, j: Coord) -> Self {
        Self { i, j }
    }

    /// String identity used for luck lookups and as the memento store key.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.i, self.j)
    }
}

impl FromStr for Cell {
    type Err = GameError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let invalid = || GameError::InvalidCellKey(key.into());
        let (i, j) = key.split_once(':').ok_or_else(invalid)?;
        let i = i.trim().parse().map_err(|_| invalid())?;
        let j = j.trim().parse().map_err(|_| invalid())?;
        Ok(Self { i, j })
    }
}

impl From<(Coord, Coord)> for Cell {
    fn from((i, j): (Coord, Coord)) -> Self {
        Self { i, j }
    }
}

/// Continuous map position in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and on the globe: latitude within ±90, longitude within ±180.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Centre of `cell`.
    pub fn center_of(cell: Cell, tile_width: f64) -> Self {
        Self {
            lat: (cell.i as f64 + 0.5) * tile_width,
            lng: (cell.j as f64 + 0.5) * tile_width,
        }
    }

    pub fn offset(self, dlat: f64, dlng: f64) -> Self {
        Self {
            lat: self.lat + dlat,
            lng: self.lng + dlng,
        }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}

/// Rectangle a renderer draws for one cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

/// One-tile movement used by the step buttons.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// `(di, dj)` in cells.
    pub const fn offset(self) -> (Coord, Coord) {
        use Direction::*;
        match self {
            North => (1, 0),
            South => (-1, 0),
            East => (0, 1),
            West => (0, -1),
        }
    }
}

impl FromStr for Direction {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Direction::*;
        match s.to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(North),
            "s" | "south" => Ok(South),
            "e" | "east" => Ok(East),
            "w" | "west" => Ok(West),
            _ => Err(GameError::InvalidDirection(s.into())),
        }
    }
}
