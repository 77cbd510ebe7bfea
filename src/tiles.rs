//! Per-layer tile index and the adjacency passes.
//!
//! A layer's tiles live in a dense row-major index. Three passes run over
//! it in order: the edge pass records directed decorations across
//! heterogeneous boundaries, the corner pass accumulates those edges onto
//! neighbouring vertices, and the pruning pass drops corners already
//! covered by a tile's own wedges.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::directions::{opposite_corner, CornerDirection, EdgeDirection};
use crate::error::WorldGenError;
use crate::grid::Coordinate;
use crate::terrain::TerrainRegistry;

/// Decoration along one hex side, pointing at a differing neighbour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub direction: EdgeDirection,
    pub neighbour_terrain_id: String,
}

/// Decoration at one hex vertex, referencing the neighbour edges that
/// meet there. Holds one or two edges, never more.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corner {
    pub direction: CornerDirection,
    pub edges: BTreeMap<EdgeDirection, Edge>,
}

impl Corner {
    fn new(direction: CornerDirection) -> Self {
        Self {
            direction,
            edges: BTreeMap::new(),
        }
    }
}

/// Edge and corner decorations of a single tile.
///
/// Both maps are ordered so serialization and rendering are byte-stable
/// across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRenderingSpec {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub edges: BTreeMap<EdgeDirection, Edge>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub corners: BTreeMap<CornerDirection, Corner>,
}

/// One hex tile of a layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub coordinate: Coordinate,
    pub key: String,
    pub terrain_id: String,
    #[serde(default)]
    pub rendering_spec: TileRenderingSpec,
}

impl Tile {
    pub fn new(coordinate: Coordinate, terrain_id: impl Into<String>) -> Self {
        Self {
            coordinate,
            key: format!(
                "{:03}.{:03}.{:03}",
                coordinate.depth, coordinate.row, coordinate.column
            ),
            terrain_id: terrain_id.into(),
            rendering_spec: TileRenderingSpec::default(),
        }
    }
}

/// Dense row-major map of every tile on one layer.
pub struct TileIndex {
    depth: u32,
    total_rows: u32,
    total_columns: u32,
    tiles: Vec<Tile>,
}

impl TileIndex {
    /// Build the index by asking `terrain_for` for each tile's terrain id,
    /// visiting tiles row-major so RNG-backed classifiers stay
    /// reproducible.
    pub fn generate(
        depth: u32,
        total_rows: u32,
        total_columns: u32,
        mut terrain_for: impl FnMut(u32, u32) -> String,
    ) -> Self {
        let mut tiles = Vec::with_capacity(total_rows as usize * total_columns as usize);
        for row in 0..total_rows {
            for column in 0..total_columns {
                let coordinate = Coordinate::new(depth, row, column);
                tiles.push(Tile::new(coordinate, terrain_for(row, column)));
            }
        }
        Self {
            depth,
            total_rows,
            total_columns,
            tiles,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn total_rows(&self) -> u32 {
        self.total_rows
    }

    pub fn total_columns(&self) -> u32 {
        self.total_columns
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn slot(&self, coordinate: &Coordinate) -> Option<usize> {
        if coordinate.depth != self.depth
            || coordinate.row >= self.total_rows
            || coordinate.column >= self.total_columns
        {
            return None;
        }
        Some((coordinate.row * self.total_columns + coordinate.column) as usize)
    }

    pub fn get(&self, coordinate: &Coordinate) -> Option<&Tile> {
        self.slot(coordinate).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, coordinate: &Coordinate) -> Option<&mut Tile> {
        self.slot(coordinate).map(move |i| &mut self.tiles[i])
    }

    /// Row-major iteration over all tiles.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    fn coordinates(&self) -> impl Iterator<Item = Coordinate> {
        let (depth, rows, columns) = (self.depth, self.total_rows, self.total_columns);
        (0..rows).flat_map(move |row| {
            (0..columns).map(move |column| Coordinate::new(depth, row, column))
        })
    }

    /// Edge pass: record a directed edge on the lower-or-equal-ordinal side
    /// of every heterogeneous boundary.
    ///
    /// A terrain id missing from the registry is fatal and reported with
    /// the offending tile key.
    pub fn compute_edges(&mut self, registry: &TerrainRegistry) -> Result<(), WorldGenError> {
        for coordinate in self.coordinates().collect::<Vec<_>>() {
            let tile = &self.tiles[self.slot(&coordinate).expect("own coordinate")];
            let own_terrain = tile.terrain_id.clone();
            let own_key = tile.key.clone();
            let own_ordinal = registry.ordinal(&own_terrain).ok_or_else(|| {
                WorldGenError::UnknownTerrain {
                    tile_key: own_key.clone(),
                    terrain_id: own_terrain.clone(),
                }
            })?;

            let mut edges = BTreeMap::new();
            for (direction, nc) in coordinate.iter_neighbors() {
                let Some(neighbour) = self.get(&nc) else {
                    continue;
                };
                if neighbour.terrain_id == own_terrain {
                    continue;
                }
                let neighbour_ordinal =
                    registry.ordinal(&neighbour.terrain_id).ok_or_else(|| {
                        WorldGenError::UnknownTerrain {
                            tile_key: neighbour.key.clone(),
                            terrain_id: neighbour.terrain_id.clone(),
                        }
                    })?;
                // Higher-ordinal terrain wins the boundary and draws nothing.
                if own_ordinal > neighbour_ordinal {
                    continue;
                }
                edges.insert(
                    direction,
                    Edge {
                        direction,
                        neighbour_terrain_id: neighbour.terrain_id.clone(),
                    },
                );
            }

            let tile = self.get_mut(&coordinate).expect("own coordinate");
            tile.rendering_spec.edges = edges;
            tile.rendering_spec.corners.clear();
        }
        Ok(())
    }

    /// Corner pass: for every vertex of every tile, copy the edges the
    /// corner neighbours point back with onto those neighbours' corners.
    pub fn derive_corners(&mut self) {
        for coordinate in self.coordinates().collect::<Vec<_>>() {
            for cd in CornerDirection::ALL {
                for (nc, edge_dir) in coordinate.corner_neighbors(cd) {
                    let (nbr_corner, nbr_edge) = opposite_corner(cd, edge_dir);
                    let Some(edge) = self
                        .get(&nc)
                        .and_then(|n| n.rendering_spec.edges.get(&nbr_edge))
                        .cloned()
                    else {
                        continue;
                    };
                    let neighbour = self.get_mut(&nc).expect("checked above");
                    neighbour
                        .rendering_spec
                        .corners
                        .entry(nbr_corner)
                        .or_insert_with(|| Corner::new(nbr_corner))
                        .edges
                        .insert(nbr_edge, edge);
                }
            }
        }
    }

    /// Pruning pass: drop a corner when the tile's own wedges already
    /// cover both of its vertex edges with a single neighbour terrain.
    pub fn prune_corners(&mut self) {
        for coordinate in self.coordinates().collect::<Vec<_>>() {
            'corners: for cd in CornerDirection::ALL {
                let vertex_edges: Vec<EdgeDirection> =
                    coordinate.corner_neighbors(cd).map(|(_, d)| d).collect();
                if vertex_edges.len() != 2 {
                    continue;
                }

                let tile = self.get(&coordinate).expect("own coordinate");
                let mut own_directions = BTreeSet::new();
                let mut own_terrains = BTreeSet::new();
                for edge in tile.rendering_spec.edges.values() {
                    own_directions.insert(edge.direction);
                    own_terrains.insert(edge.neighbour_terrain_id.as_str());
                }
                if own_terrains.len() > 1 {
                    continue;
                }
                for d in &vertex_edges {
                    if !own_directions.contains(d) {
                        continue 'corners;
                    }
                }

                // Both wedge edges already cover the vertex.
                self.get_mut(&coordinate)
                    .expect("own coordinate")
                    .rendering_spec
                    .corners
                    .remove(&cd);
            }
        }
    }
}
