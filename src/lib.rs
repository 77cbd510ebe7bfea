//! Hex world generation library
//!
//! A procedural multi-layer hex-grid world generator featuring:
//! - Pointy-top offset-coordinate hex lattice with full neighbor/corner math
//! - Layered sum-of-sines height, moisture and temperature fields
//! - Depth-aware terrain classification over an immutable terrain registry
//! - Directed edge decorations and derived corner decorations
//! - Rectangular segment partitioning with per-segment SVG rendering
//! - Parallel per-layer generation, deterministic per seed
//! - A chunked response stream for transport shells to consume

pub mod directions;
pub mod error;
pub mod fields;
pub mod grid;
pub mod progress;
pub mod seeds;
pub mod segments;
pub mod service;
pub mod svg;
pub mod terrain;
pub mod tiles;
pub mod world;
