// Cross-platform file utilities

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Extensions recognised as event logs
pub const EVENT_LOG_EXTENSIONS: [&str; 2] = ["ndjson", "jsonl"];

/// File utilities for cross-platform operations
pub struct FileUtils;

impl FileUtils {
    pub fn is_event_log(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| EVENT_LOG_EXTENSIONS.contains(&e))
    }

    /// Collect event logs from a file or directory. An explicitly named file
    /// is always included; directories are walked for known extensions.
    pub fn collect_event_logs(path: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            let walker = walkdir::WalkDir::new(path).into_iter().filter_entry(|e| {
                // Always include the root directory itself, even if it starts with '.'
                if e.depth() == 0 {
                    return true;
                }
                !e.file_name().to_string_lossy().starts_with('.')
            });

            for entry in walker.flatten() {
                if entry.file_type().is_file() && Self::is_event_log(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        }

        files
    }

    /// Sort files by given criteria
    pub fn sort_files(files: &mut [PathBuf], sort_by: &str) {
        match sort_by {
            "name" => files.sort_by(|a, b| a.file_name().cmp(&b.file_name())),
            "size" => files.sort_by_key(|a| Self::get_file_size(a).unwrap_or(0)),
            "mtime" => files.sort_by_key(|a| Self::get_mtime(a).unwrap_or(0)),
            _ => files.sort(), // Default path sort
        }
    }

    /// Get file modification time
    pub fn get_mtime(path: &Path) -> Result<i64> {
        use std::time::UNIX_EPOCH;
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;
        Ok(metadata.modified()?.duration_since(UNIX_EPOCH)?.as_secs() as i64)
    }

    /// Get file size
    pub fn get_file_size(path: &Path) -> Result<u64> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to get size for: {}", path.display()))?;
        Ok(metadata.len())
    }

    /// Read file content
    pub fn read_file(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }
}
