//! Per-segment SVG serialization.
//!
//! Each segment becomes a self-contained document: a clip mask built from
//! the union of hexagons over the segment window (with a one-tile overlap
//! so adjacent segments tile seamlessly), then per-tile terrain fills,
//! pattern overlays, edge wedges and corner kites. Every numeric literal
//! is snapped to a 1/2000-unit grid and printed with the shortest
//! representation that round-trips.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::grid::{
    hexagon_vertices, inset_vertices, row_height, tile_origin, tile_width, Coordinate,
    TILE_HEIGHT, WEDGE_RATIO,
};
use crate::segments::{Segment, SegmentBounds};
use crate::terrain::{RenderingType, TerrainRegistry};
use crate::tiles::{Tile, TileIndex};

/// Snap grid resolution: 1/2000 world units.
const SNAP_SCALE: f64 = 2000.0;

/// Fill used when a terrain id cannot be resolved against the registry.
const FALLBACK_FILL: &str = "#78716c";

/// Accent used when no contributing terrain can be resolved.
const FALLBACK_ACCENT: &str = "#44403c";

fn snap(v: f64) -> f64 {
    (v * SNAP_SCALE).round() / SNAP_SCALE + 0.0
}

/// Shortest round-trip decimal of a snapped value.
fn num(v: f64) -> String {
    format!("{}", snap(v))
}

/// World-space rectangle `(min_x, min_y, width, height)` of a segment.
pub fn segment_world_rect(bounds: &SegmentBounds) -> (f64, f64, f64, f64) {
    let w = tile_width();

    let mut left = bounds.min_column as f64 * w;
    if bounds.min_row % 2 != 0 {
        left += w / 2.0;
    }
    let mut right = (bounds.max_column + 1) as f64 * w;
    if bounds.max_row % 2 != 0 {
        right += w / 2.0;
    }

    let min_y = bounds.min_row as f64 * row_height();
    let bottom = bounds.max_row as f64 * row_height() + TILE_HEIGHT;
    (left, min_y, right - left, bottom - min_y)
}

/// Path data of the canonical pointy-top hexagon at the origin.
fn hexagon_path_d() -> String {
    let w = tile_width();
    let v = TILE_HEIGHT / 4.0;
    format!(
        "M{},{} L{},{} L{},{} L{},{} L{},{} L{},{} Z",
        num(w / 2.0),
        num(0.0),
        num(w),
        num(v),
        num(w),
        num(3.0 * v),
        num(w / 2.0),
        num(TILE_HEIGHT),
        num(0.0),
        num(3.0 * v),
        num(0.0),
        num(v),
    )
}

fn polygon_path_d(vertices: &[[f64; 2]; 6]) -> String {
    let mut d = format!("M{},{}", num(vertices[0][0]), num(vertices[0][1]));
    for p in &vertices[1..] {
        let _ = write!(d, " L{},{}", num(p[0]), num(p[1]));
    }
    d.push_str(" Z");
    d
}

/// Quad between the outer and inner hexagon along the edge from vertex
/// `a` to vertex `b`.
fn wedge_path(outer: &[[f64; 2]; 6], inner: &[[f64; 2]; 6], a: usize, b: usize) -> String {
    format!(
        "M{},{} L{},{} L{},{} L{},{} Z",
        num(outer[a][0]),
        num(outer[a][1]),
        num(outer[b][0]),
        num(outer[b][1]),
        num(inner[b][0]),
        num(inner[b][1]),
        num(inner[a][0]),
        num(inner[a][1]),
    )
}

/// Third vertices of the two equilateral triangles over the segment from
/// `outer` to `inner`: the outer→inner offset rotated ±60° about `outer`.
fn equilateral_third_vertices(outer: [f64; 2], inner: [f64; 2]) -> ([f64; 2], [f64; 2]) {
    let (ax, ay) = (outer[0], outer[1]);
    let (dx, dy) = (inner[0] - ax, inner[1] - ay);
    let cos60 = 0.5;
    let sin60 = 3.0_f64.sqrt() / 2.0;
    (
        [ax + dx * cos60 - dy * sin60, ay + dx * sin60 + dy * cos60],
        [ax + dx * cos60 + dy * sin60, ay - dx * sin60 + dy * cos60],
    )
}

/// Kite covering the vertex `vertex_index`: outer vertex, +60° rotation,
/// inner vertex, −60° rotation.
fn corner_path(outer: &[[f64; 2]; 6], inner: &[[f64; 2]; 6], vertex_index: usize) -> String {
    let o = outer[vertex_index];
    let i = inner[vertex_index];
    let (c1, c2) = equilateral_third_vertices(o, i);
    format!(
        "M{},{} L{},{} L{},{} L{},{} Z",
        num(o[0]),
        num(o[1]),
        num(c1[0]),
        num(c1[1]),
        num(i[0]),
        num(i[1]),
        num(c2[0]),
        num(c2[1]),
    )
}

fn segment_element_key(bounds: &SegmentBounds) -> String {
    format!(
        "segment-{}-{}-{}-{}",
        bounds.min_row, bounds.max_row, bounds.min_column, bounds.max_column
    )
}

/// Repeating motif for a terrain's pattern overlay, in the terrain's
/// accent colour: `(cell_width, cell_height, content)`.
fn pattern_motif(rendering_type: RenderingType, accent: &str) -> (f64, f64, String) {
    match rendering_type {
        RenderingType::Water | RenderingType::Abyss => (
            12.0,
            6.0,
            format!(
                r##"<path d="M0,3 Q3,0 6,3 T12,3" fill="none" stroke="{accent}" stroke-opacity="0.3"/>"##
            ),
        ),
        RenderingType::Grass | RenderingType::Swamp => (
            10.0,
            10.0,
            format!(
                r##"<circle cx="2.5" cy="2.5" r="1" fill="{accent}" fill-opacity="0.25"/><circle cx="7.5" cy="7.5" r="1" fill="{accent}" fill-opacity="0.25"/>"##
            ),
        ),
        RenderingType::Highlands | RenderingType::Rough => (
            12.0,
            8.0,
            format!(
                r##"<path d="M1,6 L4,2 L7,6" fill="none" stroke="{accent}" stroke-opacity="0.3"/>"##
            ),
        ),
        RenderingType::Snow => (
            8.0,
            8.0,
            format!(r##"<circle cx="4" cy="4" r="0.8" fill="{accent}" fill-opacity="0.2"/>"##),
        ),
        _ => (
            10.0,
            10.0,
            format!(
                r##"<path d="M4,5 H6 M5,4 V6" stroke="{accent}" stroke-opacity="0.25"/>"##
            ),
        ),
    }
}

/// The one-tile-extended window around the segment, shared by the clip
/// mask and the overlap tile collection.
fn window(bounds: &SegmentBounds) -> (std::ops::RangeInclusive<i64>, std::ops::RangeInclusive<i64>) {
    (
        bounds.min_row as i64 - 1..=bounds.max_row as i64,
        bounds.min_column as i64 - 1..=bounds.max_column as i64,
    )
}

/// Segment tiles first, then index tiles inside the one-cell bounds
/// extension, deduplicated by coordinate.
fn tiles_to_render<'a>(segment: &'a Segment, index: &'a TileIndex) -> Vec<&'a Tile> {
    let mut tiles: Vec<&Tile> = segment.tiles.iter().collect();
    let mut seen: BTreeSet<(u32, u32)> = segment
        .tiles
        .iter()
        .map(|t| (t.coordinate.row, t.coordinate.column))
        .collect();

    let (rows, columns) = window(&segment.bounds);
    for row in rows {
        if row < 0 {
            continue;
        }
        for column in columns.clone() {
            if column < 0 || seen.contains(&(row as u32, column as u32)) {
                continue;
            }
            let coordinate = Coordinate::new(index.depth(), row as u32, column as u32);
            if let Some(tile) = index.get(&coordinate) {
                seen.insert((row as u32, column as u32));
                tiles.push(tile);
            }
        }
    }
    tiles
}

fn render(
    segment: &Segment,
    index: &TileIndex,
    registry: &TerrainRegistry,
    with_decorations: bool,
) -> String {
    let bounds = &segment.bounds;
    let (min_x, min_y, seg_w, seg_h) = segment_world_rect(bounds);
    let key = segment_element_key(bounds);
    let hex_id = format!("{key}-hex");
    let clip_id = format!("{key}-clip");

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}" preserveAspectRatio="none">"#,
        num(seg_w),
        num(seg_h),
        num(min_x),
        num(min_y),
        num(seg_w),
        num(seg_h),
    );

    // Clip mask: a <use> of the canonical hex at every origin in the
    // extended window, so segment boundaries meet without seams.
    let mut uses = String::new();
    let (rows, columns) = window(bounds);
    for row in rows {
        for column in columns.clone() {
            let (x, y) = tile_origin(row, column);
            let _ = write!(
                uses,
                r##"<use href="#{hex_id}" x="{}" y="{}"/>"##,
                num(x),
                num(y)
            );
        }
    }

    let tiles = tiles_to_render(segment, index);

    let _ = write!(
        svg,
        r##"<defs><path id="{hex_id}" d="{}"/><clipPath id="{clip_id}" clipPathUnits="userSpaceOnUse">{uses}</clipPath>"##,
        hexagon_path_d(),
    );
    if with_decorations {
        let mut terrain_ids: BTreeSet<&str> = BTreeSet::new();
        for tile in &tiles {
            terrain_ids.insert(tile.terrain_id.as_str());
        }
        for id in terrain_ids {
            if let Some(terrain) = registry.get(id) {
                let spec = &terrain.rendering_spec;
                let (cell_w, cell_h, motif) =
                    pattern_motif(spec.rendering_type, &spec.accent_color);
                let _ = write!(
                    svg,
                    r#"<pattern id="pattern-{id}" width="{}" height="{}" patternUnits="userSpaceOnUse">{motif}</pattern>"#,
                    num(cell_w),
                    num(cell_h),
                );
            }
        }
    }
    svg.push_str("</defs>");

    let _ = write!(
        svg,
        r##"<g clip-path="url(#{clip_id})" shape-rendering="geometricPrecision">"##
    );

    for tile in tiles {
        let outer = hexagon_vertices(tile.coordinate.row, tile.coordinate.column);
        let terrain = registry.get(&tile.terrain_id);

        let fill = terrain
            .map(|t| t.rendering_spec.fill_color.as_str())
            .unwrap_or(FALLBACK_FILL);
        let _ = write!(svg, r#"<path d="{}" fill="{fill}"/>"#, polygon_path_d(&outer));

        if !with_decorations {
            continue;
        }

        if terrain.is_some() {
            let _ = write!(
                svg,
                r##"<path d="{}" fill="url(#pattern-{})"/>"##,
                polygon_path_d(&outer),
                tile.terrain_id,
            );
        }

        let spec = &tile.rendering_spec;
        if spec.edges.is_empty() && spec.corners.is_empty() {
            continue;
        }
        let inner = inset_vertices(&outer, WEDGE_RATIO);

        // Wedges blend outward in the tile's own accent colour.
        let accent = terrain
            .map(|t| t.rendering_spec.accent_color.as_str())
            .unwrap_or(FALLBACK_ACCENT);
        for edge in spec.edges.values() {
            let (a, b) = edge.direction.vertex_indices();
            let _ = write!(
                svg,
                r#"<path d="{}" fill="{accent}"/>"#,
                wedge_path(&outer, &inner, a, b),
            );
        }

        // Kites take the accent of the dominant contributing terrain.
        for corner in spec.corners.values() {
            let dominant = corner
                .edges
                .values()
                .filter_map(|e| registry.get(&e.neighbour_terrain_id))
                .max_by_key(|t| t.rendering_spec.rendering_type.ordinal());
            let Some(dominant) = dominant else {
                continue;
            };
            let _ = write!(
                svg,
                r#"<path d="{}" fill="{}"/>"#,
                corner_path(&outer, &inner, corner.direction.vertex_index()),
                dominant.rendering_spec.accent_color,
            );
        }
    }

    svg.push_str("</g></svg>");
    svg
}

/// Full renderer: clip mask, terrain fills, pattern overlays, edge wedges
/// and corner kites.
pub fn render_segment(segment: &Segment, index: &TileIndex, registry: &TerrainRegistry) -> String {
    render(segment, index, registry, true)
}

/// Lightweight renderer: clip mask and terrain fills only.
pub fn render_segment_lightweight(
    segment: &Segment,
    index: &TileIndex,
    registry: &TerrainRegistry,
) -> String {
    render(segment, index, registry, false)
}
