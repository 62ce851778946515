use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::AppError;

/// Application configuration module
/// This module handles loading, validating and saving the settings shared by
/// the segmenter, the caption renderer and the HTTP server.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Length of one audio segment and one caption cue, in seconds
    #[serde(default = "default_chunk_duration_secs")]
    pub chunk_duration_secs: f64,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// External segmentation tool settings
    #[serde(default)]
    pub segmenter: SegmenterConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Input and output locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PathsConfig {
    /// Source audio file fed to the segmenter
    #[serde(default = "default_source_audio")]
    pub source_audio: PathBuf,

    /// Plain-text transcript, one caption per non-blank line
    #[serde(default = "default_transcript")]
    pub transcript: PathBuf,

    /// Directory receiving the playlist, segments and subtitles
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Playlist file name inside the output directory
    #[serde(default = "default_playlist_name")]
    pub playlist_name: String,

    /// Subtitle file name inside the output directory
    #[serde(default = "default_subtitles_name")]
    pub subtitles_name: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_audio: default_source_audio(),
            transcript: default_transcript(),
            output_dir: default_output_dir(),
            playlist_name: default_playlist_name(),
            subtitles_name: default_subtitles_name(),
        }
    }
}

/// External segmentation tool settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SegmenterConfig {
    /// ffmpeg binary name or path
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port (0 picks a free port)
    #[serde(default = "default_port")]
    pub port: u16,

    /// URL prefix the output directory is served under
    #[serde(default = "default_hls_prefix")]
    pub hls_prefix: String,

    /// Landing page template; the built-in page is used when unset
    #[serde(default)]
    pub template_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            hls_prefix: default_hls_prefix(),
            template_path: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Validated chunk length shared by segmentation and caption timing
///
/// Held as whole nanoseconds so that cue offsets are exact multiples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkDuration {
    nanos: u64,
}

impl ChunkDuration {
    /// Validate a duration in seconds
    ///
    /// Zero, negative and non-finite values are rejected, as are lengths that
    /// do not fit in a `u64` count of nanoseconds (about 584 years).
    pub fn from_secs_f64(secs: f64) -> Result<Self, AppError> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(AppError::Config(format!(
                "chunk duration must be a positive number of seconds, got {}",
                secs
            )));
        }

        let nanos = crate::captions::timestamp::seconds_to_nanos(secs);
        if nanos == 0 {
            return Err(AppError::Config(format!(
                "chunk duration {} is below one nanosecond",
                secs
            )));
        }

        let nanos = u64::try_from(nanos).map_err(|_| {
            AppError::Config(format!("chunk duration {} is too large", secs))
        })?;

        Ok(Self { nanos })
    }

    pub fn as_nanos(&self) -> u64 {
        self.nanos
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.nanos)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.as_duration().as_secs_f64()
    }

    /// Start offset, in nanoseconds, of the chunk at zero-based position `index`
    ///
    /// A `u64` chunk times a `usize` index always fits in `u128`.
    pub fn offset_nanos(&self, index: usize) -> u128 {
        u128::from(self.nanos) * index as u128
    }
}

// Renders `2` rather than `2.0`, as expected by ffmpeg's -hls_time
impl fmt::Display for ChunkDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_secs_f64())
    }
}

fn default_chunk_duration_secs() -> f64 {
    2.0
}

fn default_source_audio() -> PathBuf {
    PathBuf::from("res/audio.mp3")
}

fn default_transcript() -> PathBuf {
    PathBuf::from("res/text.txt")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("tmp/hls")
}

fn default_playlist_name() -> String {
    "playlist.m3u8".to_string()
}

fn default_subtitles_name() -> String {
    "subtitles.vtt".to_string()
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_hls_prefix() -> String {
    "/hls".to_string()
}

/// A bare file name: no separators, not `.` or `..`
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| AppError::Config(format!("failed to open {:?}: {}", path, e)))?;

        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| AppError::Config(format!("failed to parse {:?}: {}", path, e)))
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), AppError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("failed to serialize config: {}", e)))?;

        std::fs::write(path, json).map_err(|source| AppError::SinkWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        self.chunk_duration()?;

        if !is_plain_file_name(&self.paths.playlist_name) {
            return Err(AppError::Config(format!(
                "playlist name must be a plain file name, got {:?}",
                self.paths.playlist_name
            )));
        }

        if !is_plain_file_name(&self.paths.subtitles_name) {
            return Err(AppError::Config(format!(
                "subtitles name must be a plain file name, got {:?}",
                self.paths.subtitles_name
            )));
        }

        if self.paths.playlist_name == self.paths.subtitles_name {
            return Err(AppError::Config(
                "playlist and subtitles must use different file names".to_string(),
            ));
        }

        let prefix = &self.server.hls_prefix;
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            return Err(AppError::Config(format!(
                "hls prefix must look like \"/name\", got {:?}",
                prefix
            )));
        }

        if self.segmenter.ffmpeg_path.trim().is_empty() {
            return Err(AppError::Config("ffmpeg path is empty".to_string()));
        }

        Ok(())
    }

    /// The validated chunk duration
    pub fn chunk_duration(&self) -> Result<ChunkDuration, AppError> {
        ChunkDuration::from_secs_f64(self.chunk_duration_secs)
    }

    pub fn playlist_path(&self) -> PathBuf {
        self.paths.output_dir.join(&self.paths.playlist_name)
    }

    pub fn subtitles_path(&self) -> PathBuf {
        self.paths.output_dir.join(&self.paths.subtitles_name)
    }

    /// URL the landing page loads the playlist from
    pub fn playlist_url(&self) -> String {
        format!("{}/{}", self.server.hls_prefix, self.paths.playlist_name)
    }

    /// URL the landing page loads the subtitles from
    pub fn subtitles_url(&self) -> String {
        format!("{}/{}", self.server.hls_prefix, self.paths.subtitles_name)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            chunk_duration_secs: default_chunk_duration_secs(),
            paths: PathsConfig::default(),
            segmenter: SegmenterConfig::default(),
            server: ServerConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
