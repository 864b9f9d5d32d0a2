use crate::*;

/// Cells of the square neighborhood around `point`, `(2 * radius + 1)^2` of them.
///
/// Enumeration is row-major (`i` outer, `j` inner) so spawn evaluation happens in a stable order.
pub fn cells_near(
    registry: &mut CellRegistry,
    point: LatLng,
    tile_width: f64,
    radius: Coord,
) -> Vec<CellRef> {
    let origin = registry.cell_for_point(point, tile_width);
    let radius = radius.max(0);
    let side = 2 * radius as usize + 1;

    let mut cells = Vec::with_capacity(side * side);
    for di in -radius..=radius {
        for dj in -radius..=radius {
            cells.push(registry.canonicalize(
                origin.i.saturating_add(di),
                origin.j.saturating_add(dj),
            ));
        }
    }
    cells
}

/// Lat/lng rectangle covered by `cell`.
pub fn cell_bounds(cell: Cell, tile_width: f64) -> Bounds {
    Bounds {
        south_west: LatLng::new(cell.i as f64 * tile_width, cell.j as f64 * tile_width),
        north_east: LatLng::new(
            (cell.i as f64 + 1.) * tile_width,
            (cell.j as f64 + 1.) * tile_width,
        ),
    }
}
