use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use hexworld::error::WorldGenError;
use hexworld::seeds::WorldSeeds;
use hexworld::service::{
    get_sample_world, GetSampleWorldRequest, GetSampleWorldResponse, ResponseSink,
};
use hexworld::terrain::TerrainRegistry;
use hexworld::world::CancelToken;

#[derive(Parser, Debug)]
#[command(name = "hexworld")]
#[command(about = "Generate a multi-layer hex-grid world and render it as SVG segments")]
struct Args {
    /// Number of layers (depths) to generate
    #[arg(short, long, default_value = "2")]
    layers: u32,

    /// Rows per layer
    #[arg(short = 'R', long, default_value = "64")]
    rows: u32,

    /// Columns per layer
    #[arg(short = 'C', long, default_value = "64")]
    columns: u32,

    /// Maximum rows per segment
    #[arg(long, default_value = "15")]
    segment_rows: u32,

    /// Maximum columns per segment
    #[arg(long, default_value = "15")]
    segment_columns: u32,

    /// Random seed (uses OS entropy if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(short, long, default_value = "world-out")]
    output: PathBuf,

    /// Write the lightweight SVG variant (clip mask only, no decorations)
    #[arg(long)]
    lightweight: bool,
}

/// Writes every stream message to `world.jsonl` and extracts each
/// segment's SVG into the segments directory as it passes through.
struct FileSink {
    stream: BufWriter<File>,
    segments_dir: PathBuf,
    lightweight: bool,
    segments_written: usize,
}

fn send_error(err: impl std::fmt::Display) -> WorldGenError {
    WorldGenError::Send(err.to_string())
}

impl ResponseSink for FileSink {
    fn send(&mut self, response: &GetSampleWorldResponse) -> Result<(), WorldGenError> {
        let line = serde_json::to_string(response).map_err(send_error)?;
        writeln!(self.stream, "{line}").map_err(send_error)?;

        let Some(world) = &response.world else {
            return Ok(());
        };
        for layer in &world.layers {
            for row in &layer.segment_rows {
                for segment in &row.segments {
                    let svg = if self.lightweight {
                        &segment.rendering_spec.svg_lightweight
                    } else {
                        &segment.rendering_spec.svg
                    };
                    let path = self.segments_dir.join(format!("{}.svg", segment.key));
                    fs::write(&path, svg).map_err(send_error)?;
                    self.segments_written += 1;
                }
            }
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let seeds = match args.seed {
        Some(master) => WorldSeeds::from_master(master),
        None => WorldSeeds::from_entropy(),
    };
    log::info!(
        "generating {} layers of {}x{} tiles (seed {})",
        args.layers,
        args.rows,
        args.columns,
        seeds.master
    );

    let segments_dir = args.output.join("segments");
    fs::create_dir_all(&segments_dir)
        .with_context(|| format!("creating output directory {}", segments_dir.display()))?;
    let stream_path = args.output.join("world.jsonl");
    let stream = File::create(&stream_path)
        .with_context(|| format!("creating {}", stream_path.display()))?;

    let request = GetSampleWorldRequest {
        total_layers: args.layers,
        total_rows: args.rows,
        total_columns: args.columns,
        max_rows_per_segment: args.segment_rows,
        max_columns_per_segment: args.segment_columns,
    };

    let mut sink = FileSink {
        stream: BufWriter::new(stream),
        segments_dir,
        lightweight: args.lightweight,
        segments_written: 0,
    };

    let start = Instant::now();
    get_sample_world(
        &request,
        &seeds,
        &TerrainRegistry::standard(),
        &CancelToken::new(),
        &mut sink,
    )
    .context("generating world")?;
    sink.stream.flush().context("flushing stream output")?;

    println!(
        "wrote {} segments and {} in {:.2?} (seed {})",
        sink.segments_written,
        stream_path.display(),
        start.elapsed(),
        seeds.master
    );
    Ok(())
}
