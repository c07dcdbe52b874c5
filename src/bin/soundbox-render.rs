//! soundbox-render - offline renderer for SoundBox song JSON
//!
//! # Commands
//!
//! - `soundbox-render info <song.json>` - print the output shape
//! - `soundbox-render render <song.json> -o out.f32` - render to raw f32
//!
//! The raw output is interleaved stereo little-endian `f32` at 44100 Hz.
//! Set `RUST_LOG=debug` for per-track render statistics.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};

use soundbox_core::dsp::engine::{AudioEngine, DEFAULT_SEED};
use soundbox_core::dsp::renderer::write_raw_f32;
use soundbox_core::Song;

/// Offline renderer for SoundBox song JSON
#[derive(Parser)]
#[command(name = "soundbox-render")]
#[command(about = "Render SoundBox songs to raw PCM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sample rate, length and track count of a song
    Info(InfoArgs),

    /// Render a song to interleaved little-endian f32
    Render(RenderArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Song JSON file
    song: PathBuf,
}

#[derive(Args)]
struct RenderArgs {
    /// Song JSON file
    song: PathBuf,

    /// Output file for raw samples
    #[arg(short, long)]
    output: PathBuf,

    /// Noise seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info(args) => info(args),
        Commands::Render(args) => render(args),
    }
}

/// Read and parse a song, printing a diagnostic on malformed input.
fn load_song(path: &Path) -> Result<Song> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read song: {}", path.display()))?;
    match Song::from_json(&source) {
        Ok(song) => Ok(song),
        Err(e) => {
            eprint!("{}", e.report(&path.display().to_string(), &source));
            bail!("Failed to load song: {}", path.display())
        }
    }
}

fn info(args: InfoArgs) -> Result<()> {
    let song = load_song(&args.song)?;
    let info = song.info();
    println!("Song: {}", args.song.display());
    println!("  Sample rate: {} Hz", info.sample_rate);
    println!("  Channels:    {}", info.channels);
    println!("  Tracks:      {}", info.tracks);
    println!("  Frames:      {}", info.frames);
    println!("  Duration:    {:.2}s", info.duration_secs);
    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let song = load_song(&args.song)?;

    let start = Instant::now();
    let audio = AudioEngine::with_seed(args.seed).render_audio(&song);
    tracing::info!(
        frames = audio.frames(),
        peak = audio.peak(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "rendered {}",
        args.song.display()
    );

    let file = File::create(&args.output)
        .with_context(|| format!("Failed to create output: {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    write_raw_f32(&mut writer, &audio)
        .with_context(|| format!("Failed to write output: {}", args.output.display()))?;

    println!(
        "Wrote {} ({:.2}s, {} frames)",
        args.output.display(),
        audio.duration_secs(),
        audio.frames()
    );
    Ok(())
}
