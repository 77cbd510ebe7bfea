//! World container and the per-layer generation pipeline.
//!
//! A world is an ordered stack of layers. Layers are independent, so
//! generation fans out one task per depth and joins at the end,
//! collecting every failure rather than short-circuiting on the first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::WorldGenError;
use crate::fields::NoiseField;
use crate::grid::{tile_width, TILE_HEIGHT};
use crate::seeds::WorldSeeds;
use crate::segments::{partition, SegmentRow};
use crate::svg::{render_segment, render_segment_lightweight};
use crate::terrain::{classify, Terrain, TerrainRegistry};
use crate::tiles::TileIndex;

/// World-unit tile metrics shared by every layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRenderingSpec {
    pub tile_width: f64,
    pub tile_height: f64,
}

impl Default for WorldRenderingSpec {
    fn default() -> Self {
        Self {
            tile_width: tile_width(),
            tile_height: TILE_HEIGHT,
        }
    }
}

/// One 2D hex grid at a given depth.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub depth: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_rows: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub total_columns: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub segment_rows: Vec<SegmentRow>,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

/// A generated world, or a partial view of one inside a stream chunk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendering_spec: Option<WorldRenderingSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<Layer>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub terrain_registry: BTreeMap<String, Terrain>,
}

/// Effective dimensions of one generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    pub total_layers: u32,
    pub total_rows: u32,
    pub total_columns: u32,
    pub max_rows_per_segment: u32,
    pub max_columns_per_segment: u32,
}

/// Cooperative cancellation flag shared between the caller and the
/// layer tasks; polled between pipeline passes.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<(), WorldGenError> {
        if self.is_cancelled() {
            Err(WorldGenError::Cancelled)
        } else {
            Ok(())
        }
    }
}

fn layer_name(depth: u32) -> String {
    if depth == 0 {
        "surface".to_string()
    } else {
        format!("depth-{depth}")
    }
}

/// Run the whole per-layer pipeline for the layer at `depth`.
pub fn generate_layer(
    depth: u32,
    config: &WorldConfig,
    seeds: &WorldSeeds,
    registry: &TerrainRegistry,
    cancel: &CancelToken,
) -> Result<Layer, WorldGenError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seeds.layer(depth));
    let field = NoiseField::new(&mut rng, config.total_rows);

    // Classification and tile creation, row-major for reproducibility.
    let mut index = TileIndex::generate(
        depth,
        config.total_rows,
        config.total_columns,
        |row, column| {
            let sample = field.sample(row, column, &mut rng);
            classify(
                sample.height,
                sample.moisture,
                sample.temperature,
                depth,
                config.total_layers,
                &mut rng,
            )
            .to_string()
        },
    );
    cancel.check()?;

    index.compute_edges(registry)?;
    cancel.check()?;

    index.derive_corners();
    index.prune_corners();
    cancel.check()?;

    let mut segment_rows = partition(
        &index,
        config.max_rows_per_segment,
        config.max_columns_per_segment,
    );
    cancel.check()?;

    for row in &mut segment_rows {
        for segment in &mut row.segments {
            segment.rendering_spec.svg = render_segment(segment, &index, registry);
            segment.rendering_spec.svg_lightweight =
                render_segment_lightweight(segment, &index, registry);
        }
    }

    log::debug!(
        "layer {depth}: {} tiles, {} segment rows",
        index.len(),
        segment_rows.len()
    );

    Ok(Layer {
        depth,
        name: layer_name(depth),
        total_rows: config.total_rows,
        total_columns: config.total_columns,
        segment_rows,
    })
}

/// Generate every layer in parallel and assemble the world.
///
/// Layer failures are collected and joined into a single aggregate error
/// so the caller sees every failing depth; cancellation wins over other
/// failures.
pub fn generate_world(
    config: &WorldConfig,
    seeds: &WorldSeeds,
    registry: &TerrainRegistry,
    cancel: &CancelToken,
) -> Result<World, WorldGenError> {
    let results: Vec<(u32, Result<Layer, WorldGenError>)> = (0..config.total_layers)
        .into_par_iter()
        .map(|depth| (depth, generate_layer(depth, config, seeds, registry, cancel)))
        .collect();

    if cancel.is_cancelled() {
        return Err(WorldGenError::Cancelled);
    }

    let mut layers = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (depth, result) in results {
        match result {
            Ok(layer) => layers.push(layer),
            Err(err) => failures.push((depth, err)),
        }
    }
    if !failures.is_empty() {
        return Err(WorldGenError::Aggregate(failures));
    }

    log::info!(
        "generated {} layers of {}x{} tiles (seed {})",
        layers.len(),
        config.total_rows,
        config.total_columns,
        seeds.master
    );

    Ok(World {
        rendering_spec: Some(WorldRenderingSpec::default()),
        layers,
        terrain_registry: registry.snapshot(),
    })
}
