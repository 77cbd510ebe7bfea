//! Offset-coordinate arithmetic for the pointy-top hex lattice.
//!
//! Rows run top to bottom; odd rows are shifted right by half a tile.
//! The map is finite and never wraps, so neighbour enumeration clips any
//! coordinate whose row or column would underflow zero.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::directions::{CornerDirection, EdgeDirection};

/// Height of a tile's bounding box in world units.
pub const TILE_HEIGHT: f64 = 50.0;

/// Width of a tile's bounding box in world units.
pub fn tile_width() -> f64 {
    TILE_HEIGHT * 3.0_f64.sqrt() / 2.0
}

/// Vertical distance between consecutive row origins.
pub fn row_height() -> f64 {
    TILE_HEIGHT * 0.75
}

/// Scale factor pulling the outer hexagon towards its centroid for the
/// inset used by edge wedges and corner kites.
pub const WEDGE_RATIO: f64 = 0.9;

/// Position of a tile: layer depth plus row/column on that layer's grid.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Coordinate {
    pub depth: u32,
    pub row: u32,
    pub column: u32,
}

impl Coordinate {
    pub fn new(depth: u32, row: u32, column: u32) -> Self {
        Self { depth, row, column }
    }

    fn is_odd_row(self) -> bool {
        self.row % 2 != 0
    }

    /// The adjacent coordinate across `direction`, or `None` if the row or
    /// column would underflow the map origin.
    pub fn neighbor(self, direction: EdgeDirection) -> Option<Coordinate> {
        let (row, column) = (self.row, self.column);
        let (nr, nc) = if self.is_odd_row() {
            match direction {
                EdgeDirection::W => (Some(row), column.checked_sub(1)),
                EdgeDirection::NW => (row.checked_sub(1), Some(column)),
                EdgeDirection::NE => (row.checked_sub(1), Some(column + 1)),
                EdgeDirection::E => (Some(row), Some(column + 1)),
                EdgeDirection::SE => (Some(row + 1), Some(column + 1)),
                EdgeDirection::SW => (Some(row + 1), Some(column)),
            }
        } else {
            match direction {
                EdgeDirection::W => (Some(row), column.checked_sub(1)),
                EdgeDirection::NW => (row.checked_sub(1), column.checked_sub(1)),
                EdgeDirection::NE => (row.checked_sub(1), Some(column)),
                EdgeDirection::E => (Some(row), Some(column + 1)),
                EdgeDirection::SE => (Some(row + 1), Some(column)),
                EdgeDirection::SW => (Some(row + 1), column.checked_sub(1)),
            }
        };
        Some(Coordinate::new(self.depth, nr?, nc?))
    }

    /// Up to six `(direction, coordinate)` neighbours in a stable
    /// W, NW, NE, E, SE, SW order.
    pub fn iter_neighbors(self) -> impl Iterator<Item = (EdgeDirection, Coordinate)> {
        EdgeDirection::ALL
            .into_iter()
            .filter_map(move |d| self.neighbor(d).map(|c| (d, c)))
    }

    /// The neighbours sharing the vertex `corner`, each paired with the
    /// edge direction of `self` that touches that neighbour.
    ///
    /// Interior vertices have two entries; vertices on the map boundary
    /// lose the entries whose coordinate would be negative.
    pub fn corner_neighbors(
        self,
        corner: CornerDirection,
    ) -> impl Iterator<Item = (Coordinate, EdgeDirection)> {
        corner
            .touching_edges()
            .into_iter()
            .filter_map(move |d| self.neighbor(d).map(|c| (c, d)))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.depth, self.row, self.column)
    }
}

/// Error from parsing a `"depth.row.column"` coordinate string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCoordinateError(String);

impl fmt::Display for ParseCoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid coordinate {:?}", self.0)
    }
}

impl std::error::Error for ParseCoordinateError {}

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let mut next = || {
            parts
                .next()
                .and_then(|p| p.parse::<u32>().ok())
                .ok_or_else(|| ParseCoordinateError(s.to_string()))
        };
        let (depth, row, column) = (next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(ParseCoordinateError(s.to_string()));
        }
        Ok(Coordinate::new(depth, row, column))
    }
}

/// World-space top-left origin of the tile at `(row, column)`.
///
/// Signed so callers may ask about positions one tile outside the map,
/// which the segment clip mask does along the top and left edges.
pub fn tile_origin(row: i64, column: i64) -> (f64, f64) {
    let mut x = column as f64 * tile_width();
    if row.rem_euclid(2) == 1 {
        x += tile_width() / 2.0;
    }
    let y = row as f64 * row_height();
    (x, y)
}

/// Outer vertices of the tile's hexagon in world coordinates, indexed
/// N, NE, SE, S, SW, NW.
pub fn hexagon_vertices(row: u32, column: u32) -> [[f64; 2]; 6] {
    let (x, y) = tile_origin(row as i64, column as i64);
    let w = tile_width();
    let v = TILE_HEIGHT / 4.0;
    [
        [x + w / 2.0, y],
        [x + w, y + v],
        [x + w, y + 3.0 * v],
        [x + w / 2.0, y + TILE_HEIGHT],
        [x, y + 3.0 * v],
        [x, y + v],
    ]
}

/// Vertices scaled towards the hexagon centroid; `scale` < 1 moves inward.
pub fn inset_vertices(outer: &[[f64; 2]; 6], scale: f64) -> [[f64; 2]; 6] {
    let (mut cx, mut cy) = (0.0, 0.0);
    for p in outer {
        cx += p[0];
        cy += p[1];
    }
    cx /= 6.0;
    cy /= 6.0;

    let mut inner = [[0.0; 2]; 6];
    for (i, p) in outer.iter().enumerate() {
        inner[i][0] = cx + (p[0] - cx) * scale;
        inner[i][1] = cy + (p[1] - cy) * scale;
    }
    inner
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_display_round_trip() {
        for c in [
            Coordinate::new(0, 0, 0),
            Coordinate::new(1, 17, 3),
            Coordinate::new(4, 999, 1000),
        ] {
            assert_eq!(c.to_string().parse::<Coordinate>().unwrap(), c);
        }
    }

    #[test]
    fn test_coordinate_parse_rejects_garbage() {
        assert!("1.2".parse::<Coordinate>().is_err());
        assert!("1.2.3.4".parse::<Coordinate>().is_err());
        assert!("a.b.c".parse::<Coordinate>().is_err());
        assert!("".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_neighbor_offsets_even_row() {
        let c = Coordinate::new(0, 2, 2);
        let got: Vec<_> = c.iter_neighbors().collect();
        assert_eq!(
            got,
            vec![
                (EdgeDirection::W, Coordinate::new(0, 2, 1)),
                (EdgeDirection::NW, Coordinate::new(0, 1, 1)),
                (EdgeDirection::NE, Coordinate::new(0, 1, 2)),
                (EdgeDirection::E, Coordinate::new(0, 2, 3)),
                (EdgeDirection::SE, Coordinate::new(0, 3, 2)),
                (EdgeDirection::SW, Coordinate::new(0, 3, 1)),
            ]
        );
    }

    #[test]
    fn test_neighbor_offsets_odd_row() {
        let c = Coordinate::new(0, 1, 2);
        let got: Vec<_> = c.iter_neighbors().collect();
        assert_eq!(
            got,
            vec![
                (EdgeDirection::W, Coordinate::new(0, 1, 1)),
                (EdgeDirection::NW, Coordinate::new(0, 0, 2)),
                (EdgeDirection::NE, Coordinate::new(0, 0, 3)),
                (EdgeDirection::E, Coordinate::new(0, 1, 3)),
                (EdgeDirection::SE, Coordinate::new(0, 2, 3)),
                (EdgeDirection::SW, Coordinate::new(0, 2, 2)),
            ]
        );
    }

    #[test]
    fn test_neighbor_clips_at_origin() {
        let c = Coordinate::new(0, 0, 0);
        let dirs: Vec<_> = c.iter_neighbors().map(|(d, _)| d).collect();
        assert_eq!(dirs, vec![EdgeDirection::E, EdgeDirection::SE]);
    }

    #[test]
    fn test_neighbor_symmetry() {
        // Every yielded neighbour must yield us back across the opposite edge.
        for row in 0..6u32 {
            for column in 0..6u32 {
                let a = Coordinate::new(0, row, column);
                for (d, b) in a.iter_neighbors() {
                    let back: Vec<_> = b.iter_neighbors().collect();
                    assert!(
                        back.contains(&(d.opposite(), a)),
                        "{a} -> {d:?} -> {b} not symmetric"
                    );
                }
            }
        }
    }

    #[test]
    fn test_corner_neighbors_interior_and_boundary() {
        let interior = Coordinate::new(0, 2, 2);
        for cd in CornerDirection::ALL {
            assert_eq!(interior.corner_neighbors(cd).count(), 2);
        }
        // Top-left tile: the N vertex loses both upward neighbours.
        let origin = Coordinate::new(0, 0, 0);
        assert_eq!(origin.corner_neighbors(CornerDirection::N).count(), 0);
        assert_eq!(origin.corner_neighbors(CornerDirection::SE).count(), 2);
    }

    #[test]
    fn test_corner_neighbors_share_the_vertex() {
        // The vertex seen through opposite_corner must resolve to the same
        // world-space point on the neighbour.
        use crate::directions::opposite_corner;
        let c = Coordinate::new(0, 3, 3);
        for cd in CornerDirection::ALL {
            let own = hexagon_vertices(c.row, c.column)[cd.vertex_index()];
            for (nc, ed) in c.corner_neighbors(cd) {
                let (ncd, _) = opposite_corner(cd, ed);
                let theirs = hexagon_vertices(nc.row, nc.column)[ncd.vertex_index()];
                assert!(
                    (own[0] - theirs[0]).abs() < 1e-9 && (own[1] - theirs[1]).abs() < 1e-9,
                    "corner {cd:?} of {c} != corner {ncd:?} of {nc}"
                );
            }
        }
    }

    #[test]
    fn test_tile_origin_parity_shift() {
        let w = tile_width();
        assert_eq!(tile_origin(0, 0), (0.0, 0.0));
        assert_eq!(tile_origin(1, 0), (w / 2.0, row_height()));
        // Negative rows keep the parity rule.
        assert_eq!(tile_origin(-1, 0).0, w / 2.0);
        assert_eq!(tile_origin(-2, 0).0, 0.0);
    }

    #[test]
    fn test_inset_vertices_shrink_toward_centroid() {
        let outer = hexagon_vertices(0, 0);
        let inner = inset_vertices(&outer, WEDGE_RATIO);
        let cx = outer.iter().map(|p| p[0]).sum::<f64>() / 6.0;
        let cy = outer.iter().map(|p| p[1]).sum::<f64>() / 6.0;
        for (o, i) in outer.iter().zip(inner.iter()) {
            let od = ((o[0] - cx).powi(2) + (o[1] - cy).powi(2)).sqrt();
            let id = ((i[0] - cx).powi(2) + (i[1] - cy).powi(2)).sqrt();
            assert!((id / od - WEDGE_RATIO).abs() < 1e-9);
        }
    }
}
