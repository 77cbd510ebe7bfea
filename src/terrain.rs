//! Terrain registry and classification.
//!
//! Terrains are keyed by string id in an immutable registry built once at
//! startup. Classification maps the sampled scalar fields to a terrain id
//! through a cascade of height bands; deeper layers inject underground
//! terrain with probabilities that grow with depth.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

// Terrain ids used by the standard registry and the classifier.
pub const WATER: &str = "water";
pub const GRASS: &str = "grass";
pub const SWAMP: &str = "swamp";
pub const SNOW: &str = "snow";
pub const SAND: &str = "sand";
pub const DIRT: &str = "dirt";
pub const WASTELAND: &str = "wasteland";
pub const ROUGH: &str = "rough";
pub const HIGHLANDS: &str = "highlands";
pub const ASH: &str = "ash";
pub const SUBTERRANEAN: &str = "subterranean";
pub const ABYSS: &str = "abyss";

/// How a unit may traverse or occupy a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Walking,
    Swimming,
    Flying,
    Portaling,
}

/// Rendering class of a terrain.
///
/// The discriminants form the z-order used to pick which side of a
/// heterogeneous boundary draws its decoration: higher ordinals dominate.
/// Every registry entry must map to a distinct variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderingType {
    Abyss = 0,
    Water = 1,
    Swamp = 2,
    Sand = 3,
    Dirt = 4,
    Grass = 5,
    Rough = 6,
    Wasteland = 7,
    Highlands = 8,
    Snow = 9,
    Ash = 10,
    Subterranean = 11,
}

impl RenderingType {
    /// Position in the z-order; higher values visually dominate.
    pub fn ordinal(self) -> u8 {
        self as u8
    }
}

/// Visual attributes of a terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainRenderingSpec {
    pub rendering_type: RenderingType,
    pub fill_color: String,
    pub accent_color: String,
}

/// A registry entry: passability plus rendering attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Terrain {
    pub id: String,
    pub can_pass_with: Vec<MovementType>,
    pub can_stop_with: Vec<MovementType>,
    pub movement_penalty: f64,
    pub rendering_spec: TerrainRenderingSpec,
}

/// Immutable keyed dictionary of terrains, built once and passed down.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainRegistry {
    entries: BTreeMap<String, Terrain>,
}

const DEFAULT_PASS: [MovementType; 3] = [
    MovementType::Walking,
    MovementType::Flying,
    MovementType::Portaling,
];

fn land(
    id: &str,
    rendering_type: RenderingType,
    movement_penalty: f64,
    fill: &str,
    accent: &str,
) -> Terrain {
    Terrain {
        id: id.to_string(),
        can_pass_with: DEFAULT_PASS.to_vec(),
        can_stop_with: DEFAULT_PASS.to_vec(),
        movement_penalty,
        rendering_spec: TerrainRenderingSpec {
            rendering_type,
            fill_color: fill.to_string(),
            accent_color: accent.to_string(),
        },
    }
}

impl TerrainRegistry {
    pub fn from_terrains(terrains: impl IntoIterator<Item = Terrain>) -> Self {
        Self {
            entries: terrains.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    /// The built-in terrain set used by sample-world generation.
    pub fn standard() -> Self {
        let water = Terrain {
            id: WATER.to_string(),
            can_pass_with: vec![
                MovementType::Swimming,
                MovementType::Flying,
                MovementType::Portaling,
            ],
            can_stop_with: vec![MovementType::Swimming],
            movement_penalty: 1.0,
            rendering_spec: TerrainRenderingSpec {
                rendering_type: RenderingType::Water,
                fill_color: "#1f5b72".to_string(),
                accent_color: "#7fb8cf".to_string(),
            },
        };
        let abyss = Terrain {
            id: ABYSS.to_string(),
            can_pass_with: vec![MovementType::Flying, MovementType::Portaling],
            can_stop_with: vec![MovementType::Flying],
            movement_penalty: 1.0,
            rendering_spec: TerrainRenderingSpec {
                rendering_type: RenderingType::Abyss,
                fill_color: "#14101a".to_string(),
                accent_color: "#0a080f".to_string(),
            },
        };
        Self::from_terrains([
            water,
            abyss,
            land(GRASS, RenderingType::Grass, 1.0, "#0ea37e", "#0b7a60"),
            land(SWAMP, RenderingType::Swamp, 2.0, "#556b2f", "#6b8f5c"),
            land(SNOW, RenderingType::Snow, 1.5, "#e8eef2", "#ffffff"),
            land(SAND, RenderingType::Sand, 1.25, "#d9c97a", "#c2b26a"),
            land(DIRT, RenderingType::Dirt, 1.0, "#8a6f4d", "#6b5640"),
            land(WASTELAND, RenderingType::Wasteland, 1.25, "#6b5f56", "#544a43"),
            land(ROUGH, RenderingType::Rough, 1.5, "#7d766c", "#5f5952"),
            land(HIGHLANDS, RenderingType::Highlands, 1.25, "#9aa17a", "#7c8462"),
            land(ASH, RenderingType::Ash, 1.5, "#4a4a4a", "#2f2f2f"),
            land(SUBTERRANEAN, RenderingType::Subterranean, 1.25, "#3b3440", "#2a2430"),
        ])
    }

    pub fn get(&self, id: &str) -> Option<&Terrain> {
        self.entries.get(id)
    }

    /// Z-order ordinal of a terrain id, if registered.
    pub fn ordinal(&self, id: &str) -> Option<u8> {
        self.get(id).map(|t| t.rendering_spec.rendering_type.ordinal())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Terrain)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the entries, as embedded in a serialized world.
    pub fn snapshot(&self) -> BTreeMap<String, Terrain> {
        self.entries.clone()
    }
}

/// Classify one tile from its field samples.
///
/// Pure function of its inputs and the RNG stream: the probabilistic
/// depth overrides draw from `rng` in a fixed order, so a fixed seed
/// reproduces the same map. `total_layers` scales how strongly depth
/// pulls the classification underground.
pub fn classify(
    height: f64,
    moisture: f64,
    temperature: f64,
    depth: u32,
    total_layers: u32,
    rng: &mut impl Rng,
) -> &'static str {
    let depth_progress = depth as f64 / (total_layers.saturating_sub(1) as f64).max(1.0);
    let adjusted_height = height - 0.4 * depth_progress;

    if adjusted_height < -0.7 {
        // Abyss appears only in the deepest areas of deeper layers.
        let abyss_chance = depth_progress * 0.5;
        if depth_progress > 0.6 && rng.gen::<f64>() < abyss_chance {
            ABYSS
        } else if depth_progress > 0.3 && rng.gen::<f64>() < depth_progress * 0.8 {
            SUBTERRANEAN
        } else {
            WATER
        }
    } else if adjusted_height < -0.1 {
        // Surface layers prefer water, deeper layers subterranean and dirt.
        if rng.gen::<f64>() < depth_progress * 0.6 {
            SUBTERRANEAN
        } else if rng.gen::<f64>() < depth_progress * 0.4 {
            DIRT
        } else {
            WATER
        }
    } else if adjusted_height < 0.2 {
        if rng.gen::<f64>() < depth_progress * 0.5 {
            SUBTERRANEAN
        } else if rng.gen::<f64>() < depth_progress * 0.7 {
            DIRT
        } else if depth_progress < 0.3 {
            if moisture > 0.3 {
                SWAMP
            } else {
                WATER
            }
        } else if moisture > 0.3 && rng.gen::<f64>() < 0.3 {
            SWAMP
        } else if rng.gen::<f64>() < 0.4 {
            DIRT
        } else {
            WATER
        }
    } else if adjusted_height < 0.6 {
        if rng.gen::<f64>() < depth_progress * 0.6 {
            SUBTERRANEAN
        } else if rng.gen::<f64>() < depth_progress * 0.5 {
            DIRT
        } else if depth_progress < 0.2 {
            // Surface layer: lowlands favour grass and water biomes.
            if temperature < 0.2 {
                SNOW
            } else if moisture > 0.4 {
                SWAMP
            } else if moisture < -0.3 && temperature > 0.7 {
                SAND
            } else if moisture < -0.1 {
                DIRT
            } else {
                GRASS
            }
        } else if rng.gen::<f64>() < 0.3 {
            DIRT
        } else if moisture < -0.1 && rng.gen::<f64>() < 0.2 {
            SUBTERRANEAN
        } else if temperature < 0.2 {
            SNOW
        } else {
            GRASS
        }
    } else if adjusted_height < 1.0 {
        if rng.gen::<f64>() < depth_progress * 0.7 {
            SUBTERRANEAN
        } else if depth_progress > 0.5 && rng.gen::<f64>() < 0.3 {
            DIRT
        } else if depth_progress < 0.2 {
            // Surface layer: highland band.
            if temperature < 0.3 {
                SNOW
            } else if moisture < -0.2 && temperature > 0.6 {
                SAND
            } else if moisture < 0.0 {
                if rng.gen::<f64>() < 0.3 {
                    WASTELAND
                } else {
                    DIRT
                }
            } else if rng.gen::<f64>() < 0.2 {
                ROUGH
            } else {
                HIGHLANDS
            }
        } else if rng.gen::<f64>() < 0.3 {
            DIRT
        } else if temperature < 0.3 {
            SNOW
        } else {
            HIGHLANDS
        }
    } else if adjusted_height < 1.4 {
        if rng.gen::<f64>() < depth_progress * 0.8 {
            SUBTERRANEAN
        } else if depth_progress < 0.2 {
            if temperature < 0.4 {
                SNOW
            } else if moisture < -0.1 {
                WASTELAND
            } else if rng.gen::<f64>() < 0.3 {
                ASH
            } else {
                HIGHLANDS
            }
        } else if rng.gen::<f64>() < 0.4 {
            HIGHLANDS
        } else if rng.gen::<f64>() < 0.3 {
            ASH
        } else {
            DIRT
        }
    } else {
        // Very high terrain: abyss only in the deepest layers.
        let abyss_chance = ((depth_progress - 0.7) * 1.5).max(0.0);
        if rng.gen::<f64>() < abyss_chance {
            ABYSS
        } else if depth_progress > 0.3 {
            SUBTERRANEAN
        } else if temperature < 0.5 {
            SNOW
        } else if rng.gen::<f64>() < 0.5 {
            ASH
        } else {
            SUBTERRANEAN
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::BTreeSet;

    #[test]
    fn test_standard_registry_covers_classifier_outputs() {
        let registry = TerrainRegistry::standard();
        for id in [
            WATER, GRASS, SWAMP, SNOW, SAND, DIRT, WASTELAND, ROUGH, HIGHLANDS, ASH,
            SUBTERRANEAN, ABYSS,
        ] {
            assert!(registry.get(id).is_some(), "missing {id}");
        }
    }

    #[test]
    fn test_ordinals_are_unique() {
        let registry = TerrainRegistry::standard();
        let ordinals: BTreeSet<u8> = registry
            .iter()
            .map(|(_, t)| t.rendering_spec.rendering_type.ordinal())
            .collect();
        assert_eq!(ordinals.len(), registry.len());
    }

    #[test]
    fn test_water_below_grass_and_ash() {
        let registry = TerrainRegistry::standard();
        assert!(registry.ordinal(WATER) < registry.ordinal(GRASS));
        assert!(registry.ordinal(WATER) < registry.ordinal(ASH));
    }

    #[test]
    fn test_surface_bands_preserve_base_biomes() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        // depth 0 of 1: every probabilistic override has probability zero.
        assert_eq!(classify(-1.0, 0.0, 0.5, 0, 1, &mut rng), WATER);
        assert_eq!(classify(0.0, 0.5, 0.5, 0, 1, &mut rng), SWAMP);
        assert_eq!(classify(0.0, 0.0, 0.5, 0, 1, &mut rng), WATER);
        assert_eq!(classify(0.4, 0.0, 0.5, 0, 1, &mut rng), GRASS);
        assert_eq!(classify(0.4, 0.0, 0.1, 0, 1, &mut rng), SNOW);
        assert_eq!(classify(0.4, 0.5, 0.5, 0, 1, &mut rng), SWAMP);
        assert_eq!(classify(0.4, -0.4, 0.8, 0, 1, &mut rng), SAND);
        assert_eq!(classify(0.4, -0.2, 0.5, 0, 1, &mut rng), DIRT);
        assert_eq!(classify(0.8, 0.1, 0.1, 0, 1, &mut rng), SNOW);
        assert_eq!(classify(1.2, 0.0, 0.1, 0, 1, &mut rng), SNOW);
        assert_eq!(classify(1.2, -0.2, 0.5, 0, 1, &mut rng), WASTELAND);
    }

    #[test]
    fn test_surface_never_produces_abyss() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for i in 0..2000 {
            let height = -2.0 + i as f64 * 0.002;
            let id = classify(height, 0.0, 0.5, 0, 4, &mut rng);
            assert_ne!(id, ABYSS, "abyss at surface, height {height}");
        }
    }

    #[test]
    fn test_deepest_layer_can_produce_abyss() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut seen_abyss = false;
        for _ in 0..500 {
            if classify(-1.0, 0.0, 0.5, 3, 4, &mut rng) == ABYSS {
                seen_abyss = true;
                break;
            }
        }
        assert!(seen_abyss);
    }

    #[test]
    fn test_classification_deterministic_for_fixed_seed() {
        let run = || {
            let mut rng = ChaCha8Rng::seed_from_u64(99);
            (0..200)
                .map(|i| {
                    let h = -1.5 + i as f64 * 0.015;
                    classify(h, 0.1, 0.4, 2, 4, &mut rng)
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
