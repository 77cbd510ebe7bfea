//! Rectangular segment partitioning of a layer.
//!
//! A layer is covered by non-overlapping segments of at most
//! `max_rows × max_columns` tiles, arranged row-major into segment rows.
//! The trailing row/column segments shrink to the layer boundary.

use serde::{Deserialize, Serialize};

use crate::tiles::{Tile, TileIndex};

/// Half-open tile window of one segment: `[min_row, max_row)` by
/// `[min_column, max_column)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentBounds {
    pub depth: u32,
    pub min_row: u32,
    pub max_row: u32,
    pub min_column: u32,
    pub max_column: u32,
}

impl SegmentBounds {
    /// Whether `tile` falls inside the bounds extended by `margin` tiles
    /// on every side.
    pub fn include(&self, tile: &Tile, margin: u32) -> bool {
        let row = tile.coordinate.row as i64;
        let column = tile.coordinate.column as i64;
        let margin = margin as i64;
        row >= self.min_row as i64 - margin
            && row < self.max_row as i64 + margin
            && column >= self.min_column as i64 - margin
            && column < self.max_column as i64 + margin
    }
}

/// Per-segment serialized artefacts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRenderingSpec {
    pub svg: String,
    pub svg_lightweight: String,
}

/// A rectangular window of tiles serialized as one SVG.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub key: String,
    pub bounds: SegmentBounds,
    pub tiles: Vec<Tile>,
    #[serde(default)]
    pub rendering_spec: SegmentRenderingSpec,
}

/// One row of the segment grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentRow {
    pub segments: Vec<Segment>,
}

/// Partition the layer into a row-major segment grid and assign every
/// tile to exactly one segment.
pub fn partition(index: &TileIndex, max_rows: u32, max_columns: u32) -> Vec<SegmentRow> {
    let depth = index.depth();
    let total_rows = index.total_rows();
    let total_columns = index.total_columns();

    let segments_per_row = total_columns.div_ceil(max_columns);

    let mut segments = Vec::new();
    let mut row_start = 0;
    while row_start < total_rows {
        let mut column_start = 0;
        while column_start < total_columns {
            segments.push(Segment {
                key: format!("{depth}.{row_start}.{column_start}"),
                bounds: SegmentBounds {
                    depth,
                    min_row: row_start,
                    max_row: (row_start + max_rows).min(total_rows),
                    min_column: column_start,
                    max_column: (column_start + max_columns).min(total_columns),
                },
                tiles: Vec::with_capacity((max_rows * max_columns) as usize),
                rendering_spec: SegmentRenderingSpec::default(),
            });
            column_start += max_columns;
        }
        row_start += max_rows;
    }

    // Assign row-major: integer division picks the owning segment.
    for tile in index.iter() {
        let segment_row = tile.coordinate.row / max_rows;
        let segment_column = tile.coordinate.column / max_columns;
        let slot = (segment_row * segments_per_row + segment_column) as usize;
        segments[slot].tiles.push(tile.clone());
    }

    // Group into rows of the segment grid.
    let mut rows: Vec<SegmentRow> = Vec::with_capacity(total_rows.div_ceil(max_rows) as usize);
    for segment in segments {
        match rows.last_mut() {
            Some(row) if row.segments[0].bounds.min_row == segment.bounds.min_row => {
                row.segments.push(segment);
            }
            _ => rows.push(SegmentRow {
                segments: vec![segment],
            }),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Coordinate;
    use crate::terrain::GRASS;
    use std::collections::BTreeSet;

    fn grass_index(rows: u32, columns: u32) -> TileIndex {
        TileIndex::generate(0, rows, columns, |_, _| GRASS.to_string())
    }

    #[test]
    fn test_exact_partition() {
        let rows = partition(&grass_index(4, 4), 2, 2);
        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.segments.len(), 2);
            for segment in &row.segments {
                assert_eq!(segment.tiles.len(), 4);
            }
        }
        assert_eq!(rows[0].segments[0].bounds.min_row, 0);
        assert_eq!(rows[0].segments[0].bounds.max_row, 2);
        assert_eq!(rows[0].segments[1].bounds.min_column, 2);
    }

    #[test]
    fn test_trailing_segments_shrink() {
        // 64x64 at 15x15 gives a 5x5 grid; the last row/column cover 60..64.
        let rows = partition(&grass_index(64, 64), 15, 15);
        assert_eq!(rows.len(), 5);
        for row in &rows {
            assert_eq!(row.segments.len(), 5);
        }
        let last = &rows[4].segments[4];
        assert_eq!(last.bounds.min_row, 60);
        assert_eq!(last.bounds.max_row, 64);
        assert_eq!(last.bounds.min_column, 60);
        assert_eq!(last.bounds.max_column, 64);
        assert_eq!(last.tiles.len(), 16);
    }

    #[test]
    fn test_every_tile_in_exactly_one_segment() {
        let rows = partition(&grass_index(10, 7), 4, 3);
        let mut seen = BTreeSet::new();
        let mut total = 0;
        for row in &rows {
            for segment in &row.segments {
                for tile in &segment.tiles {
                    total += 1;
                    assert!(seen.insert(tile.coordinate), "duplicate {}", tile.key);
                    assert!(segment.bounds.include(tile, 0));
                }
            }
        }
        assert_eq!(total, 70);
    }

    #[test]
    fn test_tiles_row_major_within_segment() {
        let rows = partition(&grass_index(4, 4), 2, 2);
        let segment = &rows[1].segments[0];
        let coords: Vec<_> = segment.tiles.iter().map(|t| t.coordinate).collect();
        assert_eq!(
            coords,
            vec![
                Coordinate::new(0, 2, 0),
                Coordinate::new(0, 2, 1),
                Coordinate::new(0, 3, 0),
                Coordinate::new(0, 3, 1),
            ]
        );
    }

    #[test]
    fn test_segment_keys() {
        let rows = partition(&grass_index(4, 4), 2, 2);
        assert_eq!(rows[0].segments[0].key, "0.0.0");
        assert_eq!(rows[1].segments[1].key, "0.2.2");
    }

    #[test]
    fn test_bounds_include_with_margin() {
        let bounds = SegmentBounds {
            depth: 0,
            min_row: 2,
            max_row: 4,
            min_column: 2,
            max_column: 4,
        };
        let inside = Tile::new(Coordinate::new(0, 2, 3), GRASS);
        let fringe = Tile::new(Coordinate::new(0, 1, 4), GRASS);
        let outside = Tile::new(Coordinate::new(0, 0, 0), GRASS);
        assert!(bounds.include(&inside, 0));
        assert!(!bounds.include(&fringe, 0));
        assert!(bounds.include(&fringe, 1));
        assert!(!bounds.include(&outside, 1));
    }
}
