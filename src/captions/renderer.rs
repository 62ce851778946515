/*!
 * Fixed-interval caption timing and WebVTT rendering.
 *
 * Line `i` (zero-based) of a transcript becomes a cue spanning
 * `[chunk * i, chunk * (i + 1))`. Cue boundaries are integer multiples of the
 * chunk length, so consecutive cues always share a boundary timestamp.
 */

use std::fmt;
use std::path::Path;

use log::{debug, info};

use crate::app_config::ChunkDuration;
use crate::captions::timestamp::format_nanos;
use crate::captions::transcript::Transcript;
use crate::errors::AppError;
use crate::file_utils::FileManager;

/// Marker line every WebVTT document starts with
pub const WEBVTT_HEADER: &str = "WEBVTT";

// @struct: Single timed caption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue<'a> {
    // @field: 1-based sequence number
    pub index: usize,

    // @field: Offset from the start of the stream, in nanoseconds
    pub start_nanos: u128,

    // @field: start_nanos + chunk length
    pub end_nanos: u128,

    // @field: Caption text
    pub text: &'a str,
}

impl Cue<'_> {
    /// Format start time as a WebVTT timestamp
    pub fn format_start_time(&self) -> String {
        format_nanos(self.start_nanos)
    }

    /// Format end time as a WebVTT timestamp
    pub fn format_end_time(&self) -> String {
        format_nanos(self.end_nanos)
    }
}

impl fmt::Display for Cue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Lazily derive one cue per line
pub fn cues<'a>(
    lines: &'a [String],
    chunk: ChunkDuration,
) -> impl Iterator<Item = Cue<'a>> + 'a {
    lines.iter().enumerate().map(move |(i, text)| Cue {
        index: i + 1,
        start_nanos: chunk.offset_nanos(i),
        end_nanos: chunk.offset_nanos(i + 1),
        text: text.as_str(),
    })
}

/// Render a complete WebVTT document
///
/// An empty transcript yields the bare header followed by a blank line.
pub fn render(transcript: &Transcript, chunk: ChunkDuration) -> String {
    let mut document = String::with_capacity(8 + transcript.len() * 64);
    document.push_str(WEBVTT_HEADER);
    document.push_str("\n\n");

    for cue in cues(transcript.lines(), chunk) {
        document.push_str(&cue.to_string());
    }

    document
}

/// Render raw lines, applying the same trimming and blank filtering as a transcript file
pub fn render_lines<S: AsRef<str>>(lines: &[S], chunk: ChunkDuration) -> String {
    render(&Transcript::from_lines(lines), chunk)
}

/// Read a transcript, render it and write the document to `output_path`
///
/// Returns the number of cues written.
pub fn write_captions<P1: AsRef<Path>, P2: AsRef<Path>>(
    transcript_path: P1,
    output_path: P2,
    chunk: ChunkDuration,
) -> Result<usize, AppError> {
    let output_path = output_path.as_ref();
    let transcript = Transcript::from_file(transcript_path)?;
    let document = render(&transcript, chunk);

    FileManager::write_to_file(output_path, &document)?;

    debug!("Wrote {} bytes to {:?}", document.len(), output_path);
    info!("Subtitles generated: {} cue(s) of {}s", transcript.len(), chunk);
    Ok(transcript.len())
}
