// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use vttcast::app_config::{self, ChunkDuration, Config};
use vttcast::app_controller::Controller;
use vttcast::captions::{self, Transcript};
use vttcast::errors::AppError;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Segment the audio, render captions and serve them (default command)
    Serve(PipelineArgs),

    /// Segment the audio only
    Segment(PipelineArgs),

    /// Render a transcript to WebVTT without touching any audio
    Captions(CaptionsArgs),

    /// Generate shell completions for vttcast
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
struct PipelineArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Source audio file
    #[arg(short, long)]
    audio: Option<PathBuf>,

    /// Transcript file, one caption per line
    #[arg(short, long)]
    transcript: Option<PathBuf>,

    /// Directory for the playlist, segments and subtitles; leftover
    /// `<playlist stem><N>` segments from earlier runs are deleted from it
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Seconds per audio segment and per caption
    #[arg(short = 'd', long)]
    chunk_duration: Option<f64>,

    /// HTTP port
    #[arg(short, long)]
    port: Option<u16>,

    /// Landing page template (built-in page when omitted)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct CaptionsArgs {
    /// Transcript file, one caption per line
    #[arg(value_name = "TRANSCRIPT")]
    transcript: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seconds per caption
    #[arg(short = 'd', long, default_value_t = 2.0)]
    chunk_duration: f64,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// vttcast - HLS audio with synchronized captions
///
/// Splits an audio file into HLS segments, times one caption per segment
/// from a plain-text transcript, and serves both over HTTP.
#[derive(Parser, Debug)]
#[command(name = "vttcast")]
#[command(version)]
#[command(about = "Serve an audio file as HLS with WebVTT captions")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "vttcast segments an audio file with ffmpeg and renders a transcript as WebVTT captions, one line per segment.

EXAMPLES:
    vttcast                                       # Use conf.json (created if missing)
    vttcast -a talk.mp3 -t talk.txt               # Override input files
    vttcast -d 4 -p 9000                          # 4 second chunks, port 9000
    vttcast captions talk.txt -o talk.vtt         # Captions only
    vttcast completions bash > vttcast.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is written. Command line options override file values.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and label for level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, label) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, label, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn apply_log_level(level: &app_config::LogLevel) {
    log::set_max_level(level.into());
}

#[tokio::main]
async fn main() -> ExitCode {
    // Accept everything here; the effective level is set through log::set_max_level
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
        return ExitCode::FAILURE;
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vttcast", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Captions(args)) => run_captions(args),
        Some(Commands::Segment(args)) => run_segment(args).await,
        Some(Commands::Serve(args)) => run_serve(args).await,
        None => run_serve(cli.pipeline).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Attach the failing phase to a library error
fn phase_error(e: AppError) -> anyhow::Error {
    let phase = e.phase();
    anyhow::Error::new(e).context(format!("Startup failed during {} phase", phase))
}

async fn run_serve(args: PipelineArgs) -> Result<()> {
    let config = load_config(&args)?;
    let controller = Controller::with_config(config).map_err(phase_error)?;
    controller.run().await.map_err(phase_error)
}

async fn run_segment(args: PipelineArgs) -> Result<()> {
    let config = load_config(&args)?;
    let controller = Controller::with_config(config).map_err(phase_error)?;
    let stream = controller.segment().await.map_err(phase_error)?;

    for segment in &stream.segments {
        println!("{}", segment.path.display());
    }
    Ok(())
}

fn run_captions(args: CaptionsArgs) -> Result<()> {
    if let Some(level) = args.log_level {
        apply_log_level(&level.into());
    }

    let chunk = ChunkDuration::from_secs_f64(args.chunk_duration).map_err(phase_error)?;

    match args.output {
        Some(output) => {
            captions::write_captions(&args.transcript, &output, chunk).map_err(phase_error)?;
        }
        None => {
            let transcript = Transcript::from_file(&args.transcript).map_err(phase_error)?;
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(captions::render(&transcript, chunk).as_bytes())
                .context("Failed to write captions to stdout")?;
        }
    }

    Ok(())
}

/// Load or create the configuration file, then apply command line overrides
fn load_config(args: &PipelineArgs) -> Result<Config> {
    // Apply the command line level first so config loading is logged with it
    if let Some(level) = &args.log_level {
        apply_log_level(&level.clone().into());
    }

    let config_path: &Path = &args.config_path;
    let mut config = if config_path.exists() {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config file: {:?}", config_path))?
    } else {
        warn!("Config file not found at {:?}, creating default config.", config_path);
        let config = Config::default();
        config
            .save(config_path)
            .with_context(|| format!("Failed to write default config to file: {:?}", config_path))?;
        config
    };

    if let Some(audio) = &args.audio {
        config.paths.source_audio = audio.clone();
    }
    if let Some(transcript) = &args.transcript {
        config.paths.transcript = transcript.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.paths.output_dir = output_dir.clone();
    }
    if let Some(chunk_duration) = args.chunk_duration {
        config.chunk_duration_secs = chunk_duration;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(template) = &args.template {
        config.server.template_path = Some(template.clone());
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone().into();
    }

    config.validate().map_err(phase_error)?;
    apply_log_level(&config.log_level);

    Ok(config)
}
