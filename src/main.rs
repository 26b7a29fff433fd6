use clap::{Parser, Subcommand};
use print_prep::config::{self, PrintConfig};
use print_prep::input::{InputSource, LatestInDirectory, NamedFile};
use print_prep::upscale::{RealEsrgan, Upscaler};
use print_prep::{logger, output, pipeline};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "print-prep")]
#[command(about = "Prepare a photo for a 600 x 1200 mm print")]
#[command(long_about = "\
Prepare a photo for a 600 x 1200 mm print

Picks the newest photo in input/, center-crops it to exactly 1:2, optionally
enlarges it 4x with Real-ESRGAN, resizes it to 8504 x 17008 px, sharpens it,
and writes an LZW TIFF (360 DPI, sRGB profile) plus a JPEG preview.

Layout:

  input/                 # newest .webp/.jpg/.jpeg/.png is used
  work/                  # upscaler scratch files
  output/
  ├── photo_600x1200mm_360dpi.tiff
  └── preview.jpg

AI upscaling runs when REALESRGAN_BIN (or [upscaler] bin in print-prep.toml)
points at realesrgan-ncnn-vulkan. Otherwise, or if the tool fails, the
cropped photo is resized directly.

Run 'print-prep gen-config' to generate a documented print-prep.toml.")]
#[command(version)]
struct Cli {
    /// Config file [default: print-prep.toml, if present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print this file instead of the newest one in the input directory
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory searched for the newest photo
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Directory for upscaler scratch files
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Directory for the TIFF and preview
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a stock print-prep.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Printed directly so the reason survives RUST_LOG=off.
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(Command::GenConfig) = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = resolve_config(&cli)?;

    let input: Box<dyn InputSource> = match &cli.input {
        Some(path) => Box::new(NamedFile::new(path)),
        None => Box::new(LatestInDirectory::new(&config.paths.input_dir)),
    };
    let upscaler = RealEsrgan::from_config(&config);

    let summary = pipeline::run(
        &config,
        input.as_ref(),
        upscaler.as_ref().map(|u| u as &dyn Upscaler),
    )?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        output::print_summary(&summary);
    }
    Ok(())
}

/// Config file, then `REALESRGAN_BIN`, then command-line directory flags.
fn resolve_config(cli: &Cli) -> Result<PrintConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new(config::DEFAULT_CONFIG_FILE))?,
    };

    config
        .upscaler
        .apply_env(std::env::var(config::UPSCALER_ENV).ok());

    if let Some(dir) = &cli.input_dir {
        config.paths.input_dir = dir.clone();
    }
    if let Some(dir) = &cli.work_dir {
        config.paths.work_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.paths.output_dir = dir.clone();
    }
    Ok(config)
}
