use std::fs;
use std::path::Path;

use log::debug;

use crate::errors::AppError;

// @module: Transcript loading

/// Ordered, non-empty caption lines read from a plain-text transcript
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    /// Build a transcript from already split lines, trimming and dropping blanks
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|line| line.as_ref().trim().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        Transcript { lines }
    }

    /// Split text on line endings (`\n` or `\r\n`)
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines())
    }

    /// Read a whole transcript file as UTF-8
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| AppError::SourceRead {
            path: path.to_path_buf(),
            source,
        })?;

        let transcript = Self::parse(&text);
        debug!("Read {} caption line(s) from {:?}", transcript.len(), path);
        Ok(transcript)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
