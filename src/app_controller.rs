use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::{ChunkDuration, Config};
use crate::captions;
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::segmenter::{FfmpegSegmenter, SegmentedStream, Segmenter};
use crate::server;

// @module: Application controller for the startup pipeline

/// Summary of a completed startup pipeline
#[derive(Debug, Clone)]
pub struct PreparedStream {
    /// Playlist and segments produced by the segmenter
    pub stream: SegmentedStream,
    /// Rendered subtitle document
    pub subtitles: PathBuf,
    /// Number of cues written
    pub cue_count: usize,
}

/// Main application controller: segment, caption, then serve
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Audio segmenter
    segmenter: Arc<dyn Segmenter>,
}

impl Controller {
    // @method: Create a controller backed by ffmpeg
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        let segmenter = Arc::new(FfmpegSegmenter::from_config(&config));
        Self::with_segmenter(config, segmenter)
    }

    // @method: Create a controller with a custom segmenter
    pub fn with_segmenter(config: Config, segmenter: Arc<dyn Segmenter>) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self { config, segmenter })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn chunk(&self) -> Result<ChunkDuration, AppError> {
        self.config.chunk_duration()
    }

    /// Run the whole pipeline and serve until shutdown
    pub async fn run(&self) -> Result<(), AppError> {
        self.prepare().await?;
        server::serve(&self.config).await
    }

    /// Produce every artifact the server exposes
    ///
    /// Segmentation runs first, then caption rendering. Either failing aborts
    /// the pipeline before anything is served.
    pub async fn prepare(&self) -> Result<PreparedStream, AppError> {
        let start_time = std::time::Instant::now();
        FileManager::ensure_dir(&self.config.paths.output_dir)?;

        let stream = self.segment().await?;
        let (subtitles, cue_count) = self.write_captions()?;

        if stream.segments.len() != cue_count {
            // Nothing enforces one cue per segment; the player just drifts out of sync
            warn!(
                "Playlist has {} segment(s) but the transcript produced {} cue(s)",
                stream.segments.len(),
                cue_count
            );
        }

        info!(
            "Prepared {} segment(s) and {} cue(s) in {:?} ({:.2?})",
            stream.segments.len(),
            cue_count,
            self.config.paths.output_dir,
            start_time.elapsed()
        );
        Ok(PreparedStream {
            stream,
            subtitles,
            cue_count,
        })
    }

    /// Segment the configured audio into the output directory
    pub async fn segment(&self) -> Result<SegmentedStream, AppError> {
        let chunk = self.chunk()?;
        let output_dir = &self.config.paths.output_dir;
        FileManager::ensure_dir(output_dir)?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Segmenting {:?} into {}s chunks", self.config.paths.source_audio, chunk));
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = self
            .segmenter
            .segment(&self.config.paths.source_audio, output_dir, chunk)
            .await;
        spinner.finish_and_clear();

        let stream = result?;
        self.prune_stale_segments(output_dir, &stream)?;
        Ok(stream)
    }

    /// Render the configured transcript into the output directory
    pub fn write_captions(&self) -> Result<(PathBuf, usize), AppError> {
        let chunk = self.chunk()?;
        let subtitles = self.config.subtitles_path();
        let cue_count = captions::write_captions(&self.config.paths.transcript, &subtitles, chunk)?;
        Ok((subtitles, cue_count))
    }

    // Segments left over from a longer previous run are not in the new playlist.
    // Only ffmpeg's own `<playlist stem><N>.<ext>` names are touched.
    fn prune_stale_segments(&self, output_dir: &Path, stream: &SegmentedStream) -> Result<(), AppError> {
        let Some(extension) = stream
            .segments
            .first()
            .and_then(|s| s.path.extension())
            .map(|ext| ext.to_string_lossy().to_string())
        else {
            return Ok(());
        };
        let Some(stem) = stream.playlist.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            return Ok(());
        };

        let current: HashSet<&Path> = stream.segments.iter().map(|s| s.path.as_path()).collect();
        for file in FileManager::list_files_with_extension(output_dir, &extension)? {
            if current.contains(file.as_path()) || !is_numbered_segment(&file, &stem, &extension) {
                continue;
            }
            debug!("Removing stale segment {:?}", file);
            if let Err(e) = std::fs::remove_file(&file) {
                warn!("Failed to remove stale segment {:?}: {}", file, e);
            }
        }

        Ok(())
    }
}

/// Whether `path` is named `<stem><digits>.<extension>`, the way ffmpeg's HLS muxer names segments
fn is_numbered_segment(path: &Path, stem: &str, extension: &str) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
        return false;
    };
    let Some(number) = name
        .strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
        .and_then(|rest| rest.strip_prefix(stem))
    else {
        return false;
    };
    !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit())
}
