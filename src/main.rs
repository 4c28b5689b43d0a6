use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sfnt2woff::compress_woff1;

/// Convert an OpenType or TrueType font to WOFF.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the input .otf or .ttf font
    input: PathBuf,

    /// Directory the .woff file is written to
    #[arg(short, long, default_value = "./")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let sfnt = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read font: {}", cli.input.display()))?;

    let woff = compress_woff1(&sfnt)
        .with_context(|| format!("Failed to convert font: {}", cli.input.display()))?;

    let stem = cli.input.file_stem().context("Input path has no file name")?;
    let dest = cli.output.join(stem).with_extension("woff");
    std::fs::write(&dest, &woff)
        .with_context(|| format!("Failed to write WOFF: {}", dest.display()))?;

    log::info!("wrote {} ({} bytes)", dest.display(), woff.len());
    Ok(())
}
