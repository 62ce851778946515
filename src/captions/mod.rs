/*!
 * Caption timing and WebVTT output.
 *
 * - `transcript`: reading and filtering transcript lines
 * - `timestamp`: `HH:MM:SS.mmm` formatting
 * - `renderer`: fixed-interval cue timing and document rendering
 */

pub mod renderer;
pub mod timestamp;
pub mod transcript;

pub use renderer::{Cue, WEBVTT_HEADER, cues, render, render_lines, write_captions};
pub use timestamp::{format_duration, format_nanos, format_seconds};
pub use transcript::Transcript;
