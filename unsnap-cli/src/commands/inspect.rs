use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::io;
use tracing::info;
use unsnap_core::{ReadStats, ReaderConfig, StreamReader};

use super::decode::open_input;

#[derive(Serialize)]
struct InspectReport<'a> {
    input: &'a str,
    compression_ratio: f64,
    stats: &'a ReadStats,
}

/// Decode `input` without keeping the output and report what it contained
pub fn execute(input: &str, verify_checksums: bool, json: bool) -> Result<ReadStats> {
    info!("Inspecting stream: {}", input);

    let config = ReaderConfig::new()
        .verify_checksums(verify_checksums)
        .collect_stats(true);
    let mut reader = StreamReader::with_config(open_input(Some(input))?, config);

    io::copy(&mut reader, &mut io::sink())
        .with_context(|| format!("Failed to decode stream: {}", input))?;

    let stats = reader.stats().cloned().unwrap_or_default();

    if json {
        let report = InspectReport {
            input,
            compression_ratio: stats.compression_ratio(),
            stats: &stats,
        };
        let text = serde_json::to_string_pretty(&report)
            .context("Failed to serialize inspection report")?;
        println!("{}", text);
        return Ok(stats);
    }

    println!("\n=== Stream Summary ===");
    println!("Encoded bytes:      {} bytes", stats.bytes_in);
    println!("Decoded bytes:      {} bytes", stats.bytes_out);
    println!("Skipped bytes:      {} bytes", stats.skipped_bytes);
    println!("Decode passes:      {}", stats.passes);
    println!("Compression ratio:  {:.2}x", stats.compression_ratio());
    println!();
    println!("=== Chunks ===");
    println!("Stream identifiers: {}", stats.frames.stream_identifiers);
    println!("Compressed:         {}", stats.frames.compressed);
    println!("Uncompressed:       {}", stats.frames.uncompressed);
    println!("Padding:            {}", stats.frames.padding);
    println!("Skippable:          {}", stats.frames.skippable);

    if verify_checksums {
        println!("\n{} All checksums verified", "✓".green());
    }

    Ok(stats)
}
