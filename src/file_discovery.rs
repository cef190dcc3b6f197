use crate::config::FileConfig;
use crate::error::{GuardError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Async file discovery for YAML documents
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    /// File extensions to include (e.g., ["yml", "yaml"])
    extensions: Vec<String>,
    /// Descend into subdirectories
    recursive: bool,
    /// Maximum depth for directory traversal (None = unlimited)
    max_depth: Option<usize>,
    /// Follow symbolic links
    follow_symlinks: bool,
}

impl FileDiscovery {
    /// Create a new FileDiscovery instance
    pub fn new() -> Self {
        Self {
            extensions: vec!["yml".to_string(), "yaml".to_string()],
            recursive: true,
            max_depth: None,
            follow_symlinks: false,
        }
    }

    /// Build from the `[files]` section of the configuration
    pub fn from_config(config: &FileConfig) -> Self {
        Self::new()
            .with_extensions(config.extensions.clone())
            .with_recursive(config.recursive)
            .with_max_depth(config.max_depth)
            .with_follow_symlinks(config.follow_symlinks)
    }

    /// Set file extensions to discover
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.to_lowercase())
            .collect();
        self
    }

    /// Only list the direct children of the root when `recursive` is false
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set maximum traversal depth
    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set whether to follow symbolic links
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Discover files in the given path (file or directory).
    ///
    /// The root must be readable; unreadable nested directories are skipped
    /// with a warning. Order follows the directory listing at each level.
    pub async fn discover_files(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| filesystem_error(path, e))?;

        if metadata.is_file() {
            if self.should_process(path) {
                return Ok(vec![path.to_path_buf()]);
            } else {
                return Ok(Vec::new());
            }
        }

        let mut files = Vec::new();

        let mut read_dir = fs::read_dir(path)
            .await
            .map_err(|e| filesystem_error(path, e))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| filesystem_error(path, e))?
        {
            let entry_path = entry.path();

            if entry_path.is_symlink() && !self.follow_symlinks {
                continue;
            }

            // Entries of the root are at depth 0
            if let Err(e) = self
                .discover_files_recursive(&entry_path, 0, &mut files)
                .await
            {
                tracing::warn!(path = %entry_path.display(), error = %e, "skipping unreadable entry");
            }
        }

        tracing::debug!(root = %path.display(), found = files.len(), "file discovery finished");
        Ok(files)
    }

    /// Recursive helper for discovering files
    fn discover_files_recursive<'a>(
        &'a self,
        path: &'a Path,
        depth: usize,
        files: &'a mut Vec<PathBuf>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + 'a>> {
        Box::pin(async move {
            let metadata = fs::metadata(path)
                .await
                .map_err(|e| filesystem_error(path, e))?;

            if metadata.is_file() {
                if self.should_process(path) {
                    files.push(path.to_path_buf());
                }
            } else if metadata.is_dir() {
                if !self.recursive {
                    return Ok(());
                }
                if let Some(max_depth) = self.max_depth
                    && depth >= max_depth
                {
                    return Ok(());
                }

                let mut read_dir = fs::read_dir(path)
                    .await
                    .map_err(|e| filesystem_error(path, e))?;

                while let Some(entry) = read_dir
                    .next_entry()
                    .await
                    .map_err(|e| filesystem_error(path, e))?
                {
                    let entry_path = entry.path();

                    if entry_path.is_symlink() && !self.follow_symlinks {
                        continue;
                    }

                    if let Err(e) = self
                        .discover_files_recursive(&entry_path, depth + 1, files)
                        .await
                    {
                        tracing::warn!(path = %entry_path.display(), error = %e, "skipping unreadable entry");
                    }
                }
            }

            Ok(())
        })
    }

    /// Check if a file should be processed based on its extension
    pub fn should_process(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}

impl Default for FileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

fn filesystem_error(path: &Path, source: std::io::Error) -> GuardError {
    GuardError::Filesystem {
        path: path.to_path_buf(),
        source,
    }
}
