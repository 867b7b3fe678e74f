mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "unsnap")]
#[command(about = "Unsnap - Incremental decoder for Snappy framed streams", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a framed stream back into raw bytes
    Decode {
        /// Input file (stdin when omitted or "-")
        #[arg(short, long)]
        input: Option<String>,

        /// Output file (stdout when omitted or "-")
        #[arg(short, long)]
        output: Option<String>,

        /// Verify the masked CRC32C of every data chunk
        #[arg(long)]
        verify_checksums: bool,

        /// Size of each read handed to the decoder
        #[arg(long, default_value = "8192")]
        chunk_size: usize,
    },

    /// Decode a framed stream and report chunk statistics
    Inspect {
        /// Input file to inspect
        #[arg(short, long)]
        input: String,

        /// Verify the masked CRC32C of every data chunk
        #[arg(long)]
        verify_checksums: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Decoded bytes may go to stdout, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Decode {
            input,
            output,
            verify_checksums,
            chunk_size,
        } => commands::decode::execute(
            input.as_deref(),
            output.as_deref(),
            verify_checksums,
            chunk_size,
        )
        .map(|_| ()),

        Commands::Inspect {
            input,
            verify_checksums,
            json,
        } => commands::inspect::execute(&input, verify_checksums, json).map(|_| ()),
    }
}
