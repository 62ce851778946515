/*!
 * Audio segmentation through an external tool.
 *
 * The `Segmenter` trait is the only seam the rest of the crate sees. The
 * production implementation shells out to ffmpeg's HLS muxer, copying the
 * audio stream as-is into fixed-length segments plus an `.m3u8` playlist.
 */

use async_trait::async_trait;
use log::{debug, error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use crate::app_config::{ChunkDuration, Config};
use crate::errors::AppError;
use crate::file_utils::FileManager;

// @const: HLS segment duration tag
static EXTINF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#EXTINF:\s*([0-9]+(?:\.[0-9]+)?)").unwrap()
});

/// One segment listed in a playlist
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Segment file, resolved against the playlist directory
    pub path: PathBuf,
    /// Duration advertised by the preceding `#EXTINF` tag, if any
    pub duration_secs: Option<f64>,
}

/// Playlist plus the segments it references, in playback order
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedStream {
    pub playlist: PathBuf,
    pub segments: Vec<Segment>,
}

impl SegmentedStream {
    /// Read an HLS playlist and resolve its segment URIs
    pub fn from_playlist<P: AsRef<Path>>(playlist: P) -> Result<Self, AppError> {
        let playlist = playlist.as_ref();
        let content = std::fs::read_to_string(playlist).map_err(|e| {
            AppError::Segmentation(format!("cannot read playlist {:?}: {}", playlist, e))
        })?;

        let base = playlist.parent().unwrap_or(Path::new(""));
        Ok(Self {
            playlist: playlist.to_path_buf(),
            segments: parse_playlist(&content, base),
        })
    }

    /// Sum of the advertised segment durations
    pub fn total_duration_secs(&self) -> f64 {
        self.segments.iter().filter_map(|s| s.duration_secs).sum()
    }
}

/// Extract segment entries from playlist text
///
/// Any non-blank line that is not a tag or comment is a segment URI.
pub fn parse_playlist(content: &str, base: &Path) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut pending_duration = None;

    for line in content.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = EXTINF_REGEX.captures(line) {
            pending_duration = caps[1].parse::<f64>().ok();
            continue;
        }

        if line.starts_with('#') {
            continue;
        }

        segments.push(Segment {
            path: base.join(line),
            duration_secs: pending_duration.take(),
        });
    }

    segments
}

/// Splits a source audio file into a playlist and fixed-length segments
#[async_trait]
pub trait Segmenter: Send + Sync + Debug {
    /// Segment `source` into `output_dir`, overwriting any previous run
    ///
    /// # Arguments
    /// * `source` - Source audio file
    /// * `output_dir` - Existing directory receiving the playlist and segments
    /// * `chunk` - Target segment length
    async fn segment(
        &self,
        source: &Path,
        output_dir: &Path,
        chunk: ChunkDuration,
    ) -> Result<SegmentedStream, AppError>;
}

/// ffmpeg-backed segmenter
#[derive(Debug, Clone)]
pub struct FfmpegSegmenter {
    // @field: ffmpeg binary name or path
    binary: String,

    // @field: Playlist file name inside the output directory
    playlist_name: String,
}

impl FfmpegSegmenter {
    pub fn new(binary: impl Into<String>, playlist_name: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            playlist_name: playlist_name.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.segmenter.ffmpeg_path, &config.paths.playlist_name)
    }

    /// Arguments passed to ffmpeg for one segmentation run
    pub fn build_args(&self, source: &Path, output_dir: &Path, chunk: ChunkDuration) -> Vec<String> {
        vec![
            "-y".to_string(), // overwrite existing files
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(), // no re-encoding
            "-hls_time".to_string(),
            chunk.to_string(),
            "-hls_list_size".to_string(),
            "0".to_string(), // keep every segment in the playlist
            "-f".to_string(),
            "hls".to_string(),
            output_dir.join(&self.playlist_name).to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Segmenter for FfmpegSegmenter {
    async fn segment(
        &self,
        source: &Path,
        output_dir: &Path,
        chunk: ChunkDuration,
    ) -> Result<SegmentedStream, AppError> {
        if !FileManager::file_exists(source) {
            return Err(AppError::Segmentation(format!(
                "source audio does not exist: {:?}",
                source
            )));
        }

        let args = self.build_args(source, output_dir, chunk);
        debug!("Running {} {}", self.binary, args.join(" "));

        // ffmpeg diagnostics go straight to our own stdout/stderr
        let status = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| AppError::Segmentation(format!("failed to launch {}: {}", self.binary, e)))?;

        if !status.success() {
            error!("{} exited with {}", self.binary, status);
            return Err(AppError::Segmentation(format!(
                "{} exited with {}",
                self.binary, status
            )));
        }

        let stream = SegmentedStream::from_playlist(output_dir.join(&self.playlist_name))?;
        info!(
            "HLS segments generated: {} segment(s), {:.3}s total",
            stream.segments.len(),
            stream.total_duration_secs()
        );
        Ok(stream)
    }
}
