use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::AppError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), AppError> {
        let path = path.as_ref();
        if !Self::dir_exists(path) {
            fs::create_dir_all(path).map_err(|source| AppError::SinkWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    /// Write a string to a file, creating parent directories first
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<(), AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Self::ensure_dir(parent)?;
        }

        fs::write(path, content).map_err(|source| AppError::SinkWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    /// List files in `dir` with the given extension, sorted by name
    pub fn list_files_with_extension<P: AsRef<Path>>(
        dir: P,
        extension: &str,
    ) -> Result<Vec<PathBuf>, AppError> {
        let dir = dir.as_ref();
        let extension = extension.trim_start_matches('.');
        let entries = fs::read_dir(dir).map_err(|source| AppError::SourceRead {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            })
            .collect();

        files.sort();
        Ok(files)
    }
}
