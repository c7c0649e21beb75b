use crate::error::{Result, SurveyError};
use globset::{Glob, GlobMatcher, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Default file name pattern for MSBuild C++ projects
pub const DEFAULT_PROJECT_PATTERN: &str = "*.vcxproj";

/// Recursive project file discovery.
///
/// Directory entries are visited in sorted order, so repeated walks of the same
/// tree yield the same sequence.
#[derive(Debug, Clone)]
pub struct ProjectDiscovery {
    /// Case-sensitive pattern matched against file names
    name_matcher: GlobMatcher,
    /// Exclude patterns set, matched against full paths
    exclude_set: Option<GlobSet>,
    /// Follow symbolic links
    follow_symlinks: bool,
}

/// Files found under a set of roots, plus the roots that could not be walked
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub files: Vec<PathBuf>,
    pub missing_roots: Vec<PathBuf>,
    /// Directories below a root that could not be read
    pub skipped_dirs: Vec<PathBuf>,
}

impl ProjectDiscovery {
    pub fn new() -> Self {
        Self {
            name_matcher: Glob::new(DEFAULT_PROJECT_PATTERN)
                .expect("default project pattern is a valid glob")
                .compile_matcher(),
            exclude_set: None,
            follow_symlinks: false,
        }
    }

    /// Set the file name pattern (glob syntax, case-sensitive)
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        let glob = Glob::new(pattern).map_err(|e| SurveyError::Pattern {
            pattern: pattern.to_string(),
            reason: e.kind().to_string(),
        })?;
        self.name_matcher = glob.compile_matcher();
        Ok(self)
    }

    /// Add exclude patterns
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Result<Self> {
        if patterns.is_empty() {
            self.exclude_set = None;
            return Ok(self);
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = globset::GlobBuilder::new(&pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| SurveyError::Pattern {
                    pattern: pattern.clone(),
                    reason: e.kind().to_string(),
                })?;
            builder.add(glob);
        }

        self.exclude_set = Some(builder.build()?);
        Ok(self)
    }

    /// Set whether to follow symbolic links
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Walk every root in order.
    ///
    /// A root that does not exist is recorded in `missing_roots` and skipped;
    /// it never aborts the walk of the remaining roots.
    pub async fn discover(&self, roots: &[PathBuf]) -> Discovered {
        let mut discovered = Discovered::default();

        for root in roots {
            match fs::metadata(root).await {
                Ok(metadata) if metadata.is_file() => {
                    if self.should_process(root) {
                        discovered.files.push(root.clone());
                    }
                }
                Ok(_) => {
                    self.discover_recursive(root, &mut discovered).await;
                }
                Err(e) => {
                    debug!(root = %root.display(), error = %e, "root directory not found");
                    discovered.missing_roots.push(root.clone());
                }
            }
        }

        debug!(
            files = discovered.files.len(),
            missing = discovered.missing_roots.len(),
            "discovery finished"
        );
        discovered
    }

    /// Discover the project files below a single directory
    pub async fn discover_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let metadata = fs::metadata(dir).await?;
        if !metadata.is_dir() {
            return Err(SurveyError::FileSystemTraversal {
                path: dir.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        let mut discovered = Discovered::default();
        self.discover_recursive(dir, &mut discovered).await;
        Ok(discovered.files)
    }

    /// Recursive helper for discovering files
    fn discover_recursive<'a>(
        &'a self,
        dir: &'a Path,
        discovered: &'a mut Discovered,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + 'a>> {
        Box::pin(async move {
            let entries = match Self::sorted_entries(dir).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                    discovered.skipped_dirs.push(dir.to_path_buf());
                    return;
                }
            };

            for entry_path in entries {
                let is_symlink = fs::symlink_metadata(&entry_path)
                    .await
                    .map(|m| m.file_type().is_symlink())
                    .unwrap_or(false);
                if is_symlink && !self.follow_symlinks {
                    continue;
                }

                let metadata = match fs::metadata(&entry_path).await {
                    Ok(metadata) => metadata,
                    Err(e) => {
                        // dangling symlink or entry removed during the walk
                        debug!(path = %entry_path.display(), error = %e, "skipping entry");
                        continue;
                    }
                };

                if metadata.is_dir() {
                    self.discover_recursive(&entry_path, discovered).await;
                } else if metadata.is_file() && self.should_process(&entry_path) {
                    discovered.files.push(entry_path);
                }
            }
        })
    }

    async fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
        let mut read_dir = fs::read_dir(dir).await?;
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            entries.push(entry.path());
        }
        entries.sort();
        Ok(entries)
    }

    /// Check if a file should be processed based on its name and the exclude patterns
    pub fn should_process(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name() else {
            return false;
        };
        if !self.name_matcher.is_match(file_name) {
            return false;
        }

        if let Some(exclude_set) = &self.exclude_set
            && exclude_set.is_match(path)
        {
            return false;
        }

        true
    }
}

impl Default for ProjectDiscovery {
    fn default() -> Self {
        Self::new()
    }
}
