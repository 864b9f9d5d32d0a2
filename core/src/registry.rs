use hashbrown::HashMap;
use std::rc::Rc;

use crate::*;

/// Shared handle to a canonical cell.
pub type CellRef = Rc<Cell>;

/// Canonicalizer for grid cells.
///
/// Every `(i, j)` maps to exactly one shared [`CellRef`] for the lifetime of the registry, so two lookups of "the cell
/// at this point" are interchangeable down to pointer identity.
#[derive(Clone, Debug, Default)]
pub struct CellRegistry {
    cells: HashMap<String, CellRef>,
}

impl CellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canonicalize(&mut self, i: Coord, j: Coord) -> CellRef {
        let cell = Cell::new(i, j);
        self.cells
            .entry(cell.key())
            .or_insert_with(|| Rc::new(cell))
            .clone()
    }

    /// Cell enclosing `point`, using floor division so negative coordinates land in the enclosing tile.
    pub fn cell_for_point(&mut self, point: LatLng, tile_width: f64) -> CellRef {
        let (i, j) = point_to_indices(point, tile_width);
        self.canonicalize(i, j)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

pub(crate) fn point_to_indices(point: LatLng, tile_width: f64) -> (Coord, Coord) {
    (
        (point.lat / tile_width).floor() as Coord,
        (point.lng / tile_width).floor() as Coord,
    )
}
