//! Request/stream interface around the generation pipeline.
//!
//! The transport shell is out of scope; this module owns the request
//! defaults, the response message shape, and the chunking rules for the
//! outbound stream. A transport implements [`ResponseSink`] and everything
//! else stays unchanged.
//!
//! Stream order: one dimensions message, then terrain-registry chunks,
//! then per-layer segment-row chunks, with progress messages interleaved.
//! A chunk is flushed once its serialized size reaches 32 KiB.

use std::collections::BTreeMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::WorldGenError;
use crate::progress::{Progress, ProgressTracker, Stage};
use crate::seeds::WorldSeeds;
use crate::terrain::{Terrain, TerrainRegistry};
use crate::world::{generate_world, CancelToken, Layer, World, WorldConfig};

pub const DEFAULT_TOTAL_LAYERS: u32 = 2;
pub const DEFAULT_TOTAL_ROWS: u32 = 64;
pub const DEFAULT_TOTAL_COLUMNS: u32 = 64;
pub const DEFAULT_MAX_ROWS_PER_SEGMENT: u32 = 15;
pub const DEFAULT_MAX_COLUMNS_PER_SEGMENT: u32 = 15;

/// Flush threshold for stream chunks, in serialized bytes.
pub const MAX_CHUNK_SIZE_BYTES: usize = 32 * 1024;

/// Sample-world request; zero fields fall back to documented defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetSampleWorldRequest {
    #[serde(default)]
    pub total_layers: u32,
    #[serde(default)]
    pub total_rows: u32,
    #[serde(default)]
    pub total_columns: u32,
    #[serde(default)]
    pub max_rows_per_segment: u32,
    #[serde(default)]
    pub max_columns_per_segment: u32,
}

fn or_default(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value
    }
}

impl GetSampleWorldRequest {
    /// Effective dimensions with zero values replaced by defaults.
    pub fn effective(&self) -> WorldConfig {
        WorldConfig {
            total_layers: or_default(self.total_layers, DEFAULT_TOTAL_LAYERS),
            total_rows: or_default(self.total_rows, DEFAULT_TOTAL_ROWS),
            total_columns: or_default(self.total_columns, DEFAULT_TOTAL_COLUMNS),
            max_rows_per_segment: or_default(
                self.max_rows_per_segment,
                DEFAULT_MAX_ROWS_PER_SEGMENT,
            ),
            max_columns_per_segment: or_default(
                self.max_columns_per_segment,
                DEFAULT_MAX_COLUMNS_PER_SEGMENT,
            ),
        }
    }
}

/// One message of the response stream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GetSampleWorldResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<World>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
}

impl GetSampleWorldResponse {
    fn with_world(world: World) -> Self {
        Self {
            world: Some(world),
            progress: None,
        }
    }

    fn with_progress(progress: Progress) -> Self {
        Self {
            world: None,
            progress: Some(progress),
        }
    }
}

/// Outbound half of the stream; implemented by the transport layer.
///
/// Send failures are fatal to the run and short-circuit immediately.
pub trait ResponseSink {
    fn send(&mut self, response: &GetSampleWorldResponse) -> Result<(), WorldGenError>;
}

/// Collecting sink used by tests and the CLI post-processing.
impl ResponseSink for Vec<GetSampleWorldResponse> {
    fn send(&mut self, response: &GetSampleWorldResponse) -> Result<(), WorldGenError> {
        self.push(response.clone());
        Ok(())
    }
}

fn serialized_size(response: &GetSampleWorldResponse) -> Result<usize, WorldGenError> {
    serde_json::to_string(response)
        .map(|s| s.len())
        .map_err(|e| WorldGenError::Send(e.to_string()))
}

/// Stream a generated world: dimensions, then registry chunks, then
/// per-layer content chunks.
pub fn send_world(sink: &mut impl ResponseSink, world: &World) -> Result<(), WorldGenError> {
    // Dimensions first: tile metrics plus per-layer sizes, no content.
    let dimensions = World {
        rendering_spec: world.rendering_spec,
        layers: world
            .layers
            .iter()
            .map(|layer| Layer {
                depth: layer.depth,
                name: layer.name.clone(),
                total_rows: layer.total_rows,
                total_columns: layer.total_columns,
                segment_rows: Vec::new(),
            })
            .collect(),
        terrain_registry: BTreeMap::new(),
    };
    sink.send(&GetSampleWorldResponse::with_world(dimensions))?;

    // Terrain registry, fragmented.
    let mut chunk: BTreeMap<String, Terrain> = BTreeMap::new();
    for (id, terrain) in &world.terrain_registry {
        chunk.insert(id.clone(), terrain.clone());
        let response = GetSampleWorldResponse::with_world(World {
            terrain_registry: chunk.clone(),
            ..World::default()
        });
        if serialized_size(&response)? >= MAX_CHUNK_SIZE_BYTES {
            sink.send(&response)?;
            chunk = BTreeMap::new();
        }
    }
    if !chunk.is_empty() {
        sink.send(&GetSampleWorldResponse::with_world(World {
            terrain_registry: chunk,
            ..World::default()
        }))?;
    }

    // Layer content, split on segment-row boundaries.
    for layer in &world.layers {
        let mut rows = Vec::new();
        for row in &layer.segment_rows {
            rows.push(row.clone());
            let response = GetSampleWorldResponse::with_world(World {
                layers: vec![Layer {
                    depth: layer.depth,
                    segment_rows: rows.clone(),
                    ..Layer::default()
                }],
                ..World::default()
            });
            if serialized_size(&response)? >= MAX_CHUNK_SIZE_BYTES {
                sink.send(&response)?;
                rows = Vec::new();
            }
        }
        if !rows.is_empty() {
            sink.send(&GetSampleWorldResponse::with_world(World {
                layers: vec![Layer {
                    depth: layer.depth,
                    segment_rows: rows,
                    ..Layer::default()
                }],
                ..World::default()
            }))?;
        }
    }

    Ok(())
}

fn send_progress(sink: &mut impl ResponseSink, tracker: &ProgressTracker) {
    let response = GetSampleWorldResponse::with_progress(tracker.snapshot());
    if let Err(err) = sink.send(&response) {
        log::warn!("failed to send progress: {err}");
    }
}

/// Generate a sample world and stream it into `sink`.
pub fn get_sample_world(
    request: &GetSampleWorldRequest,
    seeds: &WorldSeeds,
    registry: &TerrainRegistry,
    cancel: &CancelToken,
    sink: &mut impl ResponseSink,
) -> Result<(), WorldGenError> {
    let config = request.effective();

    let mut tracker = ProgressTracker::new(vec![
        Stage::running("Prepare grid"),
        Stage::waiting("Process tiles"),
        Stage::waiting("Process edges"),
        Stage::waiting("Process corners"),
        Stage::waiting("Render segments"),
    ]);
    send_progress(sink, &tracker);

    let start = Instant::now();
    let world = generate_world(&config, seeds, registry, cancel)?;

    tracker.complete_all(start.elapsed());
    tracker.set_percentage(1.0);
    send_progress(sink, &tracker);

    send_world(sink, &world)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl ResponseSink for FailingSink {
        fn send(&mut self, _response: &GetSampleWorldResponse) -> Result<(), WorldGenError> {
            Err(WorldGenError::Send("stream closed".to_string()))
        }
    }

    fn small_request() -> GetSampleWorldRequest {
        GetSampleWorldRequest {
            total_layers: 1,
            total_rows: 4,
            total_columns: 4,
            max_rows_per_segment: 2,
            max_columns_per_segment: 2,
        }
    }

    #[test]
    fn test_zero_fields_take_defaults() {
        let config = GetSampleWorldRequest::default().effective();
        assert_eq!(config.total_layers, 2);
        assert_eq!(config.total_rows, 64);
        assert_eq!(config.total_columns, 64);
        assert_eq!(config.max_rows_per_segment, 15);
        assert_eq!(config.max_columns_per_segment, 15);
    }

    #[test]
    fn test_non_zero_fields_are_honored() {
        let config = small_request().effective();
        assert_eq!(config.total_layers, 1);
        assert_eq!(config.total_rows, 4);
        assert_eq!(config.max_columns_per_segment, 2);
    }

    #[test]
    fn test_stream_order_and_content() {
        let mut sink: Vec<GetSampleWorldResponse> = Vec::new();
        get_sample_world(
            &small_request(),
            &WorldSeeds::from_master(42),
            &TerrainRegistry::standard(),
            &CancelToken::new(),
            &mut sink,
        )
        .unwrap();

        // Progress first and after generation.
        assert!(sink.first().unwrap().progress.is_some());
        assert!(sink.iter().filter(|r| r.progress.is_some()).count() >= 2);

        // The first world message carries dimensions only.
        let dims = sink
            .iter()
            .find_map(|r| r.world.as_ref())
            .expect("dimensions message");
        assert!(dims.rendering_spec.is_some());
        assert_eq!(dims.layers.len(), 1);
        assert_eq!(dims.layers[0].total_rows, 4);
        assert!(dims.layers[0].segment_rows.is_empty());
        assert!(dims.terrain_registry.is_empty());

        // Registry chunks cover the full registry.
        let registry_entries: usize = sink
            .iter()
            .filter_map(|r| r.world.as_ref())
            .map(|w| w.terrain_registry.len())
            .sum();
        assert_eq!(registry_entries, TerrainRegistry::standard().len());

        // Content chunks reassemble into the full segment grid.
        let rows: usize = sink
            .iter()
            .filter_map(|r| r.world.as_ref())
            .flat_map(|w| &w.layers)
            .map(|l| l.segment_rows.len())
            .sum();
        assert_eq!(rows, 2);
    }

    #[test]
    fn test_sink_errors_short_circuit() {
        // Progress failures are tolerated, but the world send must fail.
        let err = get_sample_world(
            &small_request(),
            &WorldSeeds::from_master(42),
            &TerrainRegistry::standard(),
            &CancelToken::new(),
            &mut FailingSink,
        )
        .unwrap_err();
        assert!(matches!(err, WorldGenError::Send(_)));
    }

    #[test]
    fn test_response_serialization_is_sparse() {
        let response = GetSampleWorldResponse::with_world(World::default());
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"world":{}}"#);
    }
}
