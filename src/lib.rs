/*!
 * # vttcast - HLS audio with synchronized WebVTT captions
 *
 * Turns one audio file and a plain-text transcript into a browser-playable
 * HLS stream with captions, and serves both over HTTP.
 *
 * ## Features
 *
 * - Segment audio into fixed-length HLS chunks with ffmpeg (stream copy)
 * - Time one caption per chunk and render it as WebVTT
 * - Serve the playlist, segments and subtitles with a small landing page
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management and the shared chunk duration
 * - `captions`: Transcript loading, timestamp formatting and cue rendering:
 *   - `captions::transcript`: Line filtering
 *   - `captions::timestamp`: `HH:MM:SS.mmm` formatting
 *   - `captions::renderer`: Cue timing and document output
 * - `segmenter`: External segmentation tool adapter
 * - `server`: Static files and landing page
 * - `file_utils`: File system operations
 * - `app_controller`: Startup pipeline
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(non_snake_case)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod captions;
pub mod errors;
pub mod file_utils;
pub mod segmenter;
pub mod server;

// Re-export main types for easier usage
pub use app_config::{ChunkDuration, Config};
pub use app_controller::{Controller, PreparedStream};
pub use captions::{Cue, Transcript, format_seconds, render, render_lines, write_captions};
pub use errors::AppError;
pub use segmenter::{FfmpegSegmenter, SegmentedStream, Segmenter};
