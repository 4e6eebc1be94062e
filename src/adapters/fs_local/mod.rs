// Local filesystem adapter - video discovery and file staging

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::ports::*;

/// Extensions picked up when scanning a clip directory
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "MP4"];

/// Filesystem adapter for the local disk
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFsAdapter;

impl LocalFsAdapter {
    pub fn new() -> Self {
        Self
    }

    fn is_video(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| VIDEO_EXTENSIONS.contains(&ext))
    }
}

impl FsPort for LocalFsAdapter {
    fn file_exists(&self, file_path: &Path) -> bool {
        file_path.is_file()
    }

    fn directory_exists(&self, dir_path: &Path) -> bool {
        dir_path.is_dir()
    }

    fn list_videos(&self, dir_path: &Path) -> Result<Vec<PathBuf>, DomainError> {
        let mut videos = Vec::new();
        for entry in WalkDir::new(dir_path).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                DomainError::InputError(format!(
                    "Failed to read directory {}: {}",
                    dir_path.display(),
                    e
                ))
            })?;
            if entry.file_type().is_file() && Self::is_video(entry.path()) {
                videos.push(entry.into_path());
            }
        }
        videos.sort();
        Ok(videos)
    }

    fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError> {
        fs::create_dir_all(dir_path).map_err(|e| {
            DomainError::MediaIoError(format!(
                "Failed to create directory {}: {}",
                dir_path.display(),
                e
            ))
        })
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), DomainError> {
        fs::copy(from, to).map(|_| ()).map_err(|e| {
            DomainError::MediaIoError(format!(
                "Failed to copy {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })
    }

    fn move_file(&self, from: &Path, to: &Path) -> Result<(), DomainError> {
        if fs::rename(from, to).is_ok() {
            return Ok(());
        }
        // Rename fails across filesystems
        self.copy_file(from, to)?;
        fs::remove_file(from).map_err(|e| {
            DomainError::MediaIoError(format!("Failed to remove {}: {}", from.display(), e))
        })
    }
}
