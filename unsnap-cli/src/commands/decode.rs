use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use tracing::{debug, info};
use unsnap_core::{ReaderConfig, StreamReader};

/// Open `input` for reading; `None` or `-` means stdin
pub fn open_input(input: Option<&str>) -> Result<Box<dyn Read>> {
    match input {
        None | Some("-") => Ok(Box::new(io::stdin().lock())),
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path))?;
            Ok(Box::new(file))
        }
    }
}

/// Open `output` for writing; `None` or `-` means stdout
pub fn open_output(output: Option<&str>) -> Result<Box<dyn Write>> {
    match output {
        None | Some("-") => Ok(Box::new(io::stdout().lock())),
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Ok(Box::new(file))
        }
    }
}

/// Stream-decode `input` into `output`, returning the number of bytes written
pub fn execute(
    input: Option<&str>,
    output: Option<&str>,
    verify_checksums: bool,
    chunk_size: usize,
) -> Result<u64> {
    info!(
        "Decoding {} to {}",
        input.unwrap_or("<stdin>"),
        output.unwrap_or("<stdout>")
    );

    let config = ReaderConfig::new().verify_checksums(verify_checksums);
    let mut reader = StreamReader::with_config(open_input(input)?, config);
    let mut writer = BufWriter::new(open_output(output)?);

    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut written = 0u64;
    let mut empty_reads = 0u64;

    loop {
        let outcome = reader
            .read_chunk(&mut buf)
            .with_context(|| format!("Failed to decode stream after {} bytes", written))?;

        if outcome.done {
            break;
        }
        if outcome.count == 0 {
            empty_reads += 1;
            continue;
        }

        writer
            .write_all(&buf[..outcome.count])
            .context("Failed to write decoded output")?;
        written += outcome.count as u64;
    }

    writer.flush().context("Failed to flush decoded output")?;

    debug!("{} reads made progress without output", empty_reads);
    info!("Decoded {} bytes", written);

    Ok(written)
}
