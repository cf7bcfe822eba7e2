//! wavp - command-line WAV streamer
//!
//! `wavp info <FILE>` prints the decoded header.
//! `wavp play <FILE>` streams volume-scaled PCM to stdout, a file, or (with the
//! `device` feature) the default audio output.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};
use wavp_common::config::{ConfigResolver, ConfigSource, OutputWidth, PlayerSection};
use wavp_common::logging::init_tracing;
use wavp_player::{
    get_info, ErrorKind, NullSink, PlaybackSummary, Player, PlayerOptions, VolumeControl,
    WavFormat, WriterSink,
};

/// Command-line arguments for wavp
#[derive(Parser, Debug)]
#[command(name = "wavp")]
#[command(about = "Stream PCM WAV files with live volume scaling")]
#[command(version)]
struct Args {
    /// Configuration file (overrides WAVP_CONFIG and the default locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides the config file; RUST_LOG wins)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the header fields of a WAV file
    Info {
        /// WAV file to inspect
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Stream a WAV file through the volume pipeline
    Play(PlayArgs),
    /// List output audio devices
    #[cfg(feature = "device")]
    Devices,
}

#[derive(ClapArgs, Debug)]
struct PlayArgs {
    /// WAV file to play
    file: PathBuf,

    /// Destination for raw processed PCM ('-' for stdout)
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Initial volume 0-100 (clamped)
    #[arg(short, long, allow_negative_numbers = true)]
    volume: Option<i32>,

    /// Bytes read per chunk (aligned down to whole frames)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Sample width emitted for 24-bit files: native or pcm16
    #[arg(long)]
    output_width: Option<OutputWidth>,

    /// Decode and scale but discard the output
    #[arg(long, conflicts_with = "output")]
    dry_run: bool,

    /// Play on the audio device instead of writing bytes
    #[cfg(feature = "device")]
    #[arg(long, conflicts_with_all = ["output", "dry_run"])]
    device: bool,

    /// Output device name (default device if absent or not found)
    #[cfg(feature = "device")]
    #[arg(long, requires = "device")]
    device_name: Option<String>,
}

/// `wavp info --json` output
#[derive(Serialize)]
struct InfoReport<'a> {
    file: &'a Path,
    #[serde(flatten)]
    format: WavFormat,
    supported: bool,
    frames: u64,
    duration_secs: f64,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_status(&e))
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) = ConfigResolver::new()
        .with_cli_path(args.config.clone())
        .load()
        .context("Failed to load configuration")?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!(
        "Starting wavp v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("WAVP_GIT_HASH"),
        env!("WAVP_BUILD_TIMESTAMP"),
        env!("WAVP_BUILD_PROFILE")
    );
    info!("{}", describe_source(&source));
    debug!("Effective configuration: {:?}", config);

    match args.command {
        Command::Info { file, json } => run_info(&file, json),
        Command::Play(play) => run_play(&play, &config.player),
        #[cfg(feature = "device")]
        Command::Devices => run_devices(),
    }
}

fn describe_source(source: &ConfigSource) -> String {
    match source {
        ConfigSource::Defaults => "No configuration file found, using compiled defaults".to_string(),
        ConfigSource::CommandLine(path) => format!("Configuration: {} (--config)", path.display()),
        ConfigSource::Environment(path) => format!("Configuration: {} (WAVP_CONFIG)", path.display()),
        ConfigSource::Discovered(path) => format!("Configuration: {}", path.display()),
    }
}

fn run_info(file: &Path, json: bool) -> Result<()> {
    let format =
        get_info(file).with_context(|| format!("Failed to read header of {}", file.display()))?;

    if json {
        let report = InfoReport {
            file,
            format,
            supported: format.is_supported(),
            frames: format.frame_count(),
            duration_secs: format.duration().as_secs_f64(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File:            {}", file.display());
    println!("Channels:        {}", format.channels);
    println!("Sample rate:     {} Hz", format.sample_rate);
    println!("Bits per sample: {}", format.bits_per_sample);
    println!("Block align:     {}", format.block_align);
    println!("Data size:       {} bytes", format.data_size);
    println!("Frames:          {}", format.frame_count());
    println!("Duration:        {:.3} s", format.duration().as_secs_f64());
    match format.validate() {
        Ok(()) => println!("Supported:       yes"),
        Err(reason) => println!("Supported:       no ({})", reason),
    }
    Ok(())
}

#[cfg(feature = "device")]
fn run_devices() -> Result<()> {
    use wavp_player::sink::device::DeviceSink;

    for name in DeviceSink::list_devices()? {
        println!("{}", name);
    }
    Ok(())
}

/// Player from the `[player]` section with command-line flags applied on top
fn build_player(args: &PlayArgs, section: &PlayerSection) -> Result<Player> {
    let volume = Arc::new(VolumeControl::with_level(
        args.volume.unwrap_or(section.default_volume),
    ));

    let mut options = PlayerOptions::from(section);
    if let Some(chunk_size) = args.chunk_size {
        if chunk_size == 0 {
            bail!("--chunk-size must be greater than zero");
        }
        options.chunk_size = chunk_size;
    }
    if let Some(width) = args.output_width {
        options.output_width = width;
    }

    Ok(Player::new(volume, options))
}

/// Read and validate the header before any output is set up.
fn preflight(path: &Path) -> wavp_player::Result<WavFormat> {
    let format = get_info(path)?;
    format.validate().map_err(|reason| wavp_player::Error::Format {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(format)
}

fn run_play(args: &PlayArgs, section: &PlayerSection) -> Result<()> {
    let player = build_player(args, section)?;
    info!(
        "Playing {} at volume {}%",
        args.file.display(),
        player.get_volume()
    );

    let summary = if args.dry_run {
        let mut sink = NullSink::default();
        player.play(&args.file, Some(&mut sink))?
    } else if device_requested(args) {
        play_on_device(&player, args)?
    } else if args.output == "-" {
        let stdout = io::stdout();
        let mut sink = WriterSink::new(BufWriter::new(stdout.lock()));
        let summary = player.play(&args.file, Some(&mut sink))?;
        sink.finish().context("Failed to flush stdout")?;
        summary
    } else {
        preflight(&args.file)?;
        let file = File::create(&args.output)
            .with_context(|| format!("Failed to create output file {}", args.output))?;
        let mut sink = WriterSink::new(BufWriter::new(file));
        let summary = player.play(&args.file, Some(&mut sink))?;
        sink.finish()
            .with_context(|| format!("Failed to flush output file {}", args.output))?;
        summary
    };

    report(&summary);
    Ok(())
}

#[cfg(feature = "device")]
fn device_requested(args: &PlayArgs) -> bool {
    args.device
}

#[cfg(not(feature = "device"))]
fn device_requested(_args: &PlayArgs) -> bool {
    false
}

#[cfg(feature = "device")]
fn play_on_device(player: &Player, args: &PlayArgs) -> Result<PlaybackSummary> {
    use wavp_player::audio::sample::SourceDepth;
    use wavp_player::sink::device::DeviceSink;

    let format = preflight(&args.file)?;
    let depth = SourceDepth::from_bits(format.bits_per_sample)
        .context("Unsupported bits per sample")?;

    let mut sink = DeviceSink::open(
        args.device_name.as_deref(),
        &format,
        depth.output_bytes(player.options().output_width),
    )?;
    let summary = player.play(&args.file, Some(&mut sink))?;
    sink.drain()?;
    sink.stop()?;
    Ok(summary)
}

#[cfg(not(feature = "device"))]
fn play_on_device(_player: &Player, _args: &PlayArgs) -> Result<PlaybackSummary> {
    bail!("wavp was built without the 'device' feature")
}

fn report(summary: &PlaybackSummary) {
    info!(
        "Done: {} chunks, {} bytes read, {} bytes emitted",
        summary.chunks, summary.bytes_read, summary.bytes_emitted
    );
}

/// Process exit status per error class; 1 for anything outside the player
fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<wavp_player::Error>().map(|e| e.kind()) {
        Some(ErrorKind::InvalidArgument) => 2,
        Some(ErrorKind::IoFailure) => 3,
        Some(ErrorKind::FormatError) => 4,
        Some(ErrorKind::ResourceError) => 5,
        Some(ErrorKind::SinkFailure) => 6,
        None => 1,
    }
}
