//! Error taxonomy for the generation pipeline.

use std::fmt;

/// Failure modes of world generation and streaming.
#[derive(Debug)]
pub enum WorldGenError {
    /// A tile references a terrain id absent from the registry.
    UnknownTerrain { tile_key: String, terrain_id: String },
    /// The outbound response stream rejected a message.
    Send(String),
    /// The caller cancelled generation; partial results were discarded.
    Cancelled,
    /// One or more layer tasks failed; every failure is retained with the
    /// depth of the layer that produced it.
    Aggregate(Vec<(u32, WorldGenError)>),
}

impl fmt::Display for WorldGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldGenError::UnknownTerrain {
                tile_key,
                terrain_id,
            } => write!(f, "tile {tile_key}: unknown terrain id {terrain_id:?}"),
            WorldGenError::Send(message) => write!(f, "sending response: {message}"),
            WorldGenError::Cancelled => write!(f, "generation cancelled"),
            WorldGenError::Aggregate(failures) => {
                write!(f, "generating layers:")?;
                for (depth, err) in failures {
                    write!(f, " [depth={depth}] {err};")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for WorldGenError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_terrain_names_tile_and_id() {
        let err = WorldGenError::UnknownTerrain {
            tile_key: "000.001.002".to_string(),
            terrain_id: "lava".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("000.001.002"));
        assert!(text.contains("lava"));
    }

    #[test]
    fn test_aggregate_lists_every_depth() {
        let err = WorldGenError::Aggregate(vec![
            (
                0,
                WorldGenError::UnknownTerrain {
                    tile_key: "000.000.000".to_string(),
                    terrain_id: "x".to_string(),
                },
            ),
            (3, WorldGenError::Cancelled),
        ]);
        let text = err.to_string();
        assert!(text.contains("[depth=0]"));
        assert!(text.contains("[depth=3]"));
    }
}
