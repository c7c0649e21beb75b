//! Survey runner
//!
//! Drives discovery and validation for a whole run. Files are validated one at
//! a time in discovery order; each document is dropped before the next file is
//! read. Per-file outcomes are aggregated into [`SurveyResults`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::discovery::ProjectDiscovery;
use crate::error::Result;
use crate::validator::{
    FileValidationResult, ProjectValidator, ValidationOutcome, ValidatorOptions,
};

/// Something the runner reports while it works
#[derive(Debug, Clone, Copy)]
pub enum SurveyEvent<'a> {
    /// A root directory that does not exist and was skipped
    MissingRoot(&'a Path),
    /// A file finished validation
    FileValidated(&'a FileValidationResult),
}

/// Aggregated results of one survey run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyResults {
    pub total_files: usize,
    pub valid_files: usize,
    /// Files rejected by a structural rule
    pub invalid_files: usize,
    /// Files that could not be read or parsed
    pub error_files: usize,
    /// Files discovered but never validated because the run stopped early
    pub skipped_files: usize,
    pub missing_roots: Vec<PathBuf>,
    /// Directories below a root that could not be read
    pub skipped_dirs: Vec<PathBuf>,
    pub total_duration: Duration,
    pub file_results: Vec<FileValidationResult>,
}

impl SurveyResults {
    /// Aggregate individual file results into summary
    pub fn aggregate(
        file_results: Vec<FileValidationResult>,
        missing_roots: Vec<PathBuf>,
        skipped_files: usize,
        total_duration: Duration,
    ) -> Self {
        let mut results = Self {
            total_files: file_results.len() + skipped_files,
            skipped_files,
            missing_roots,
            total_duration,
            ..Self::default()
        };

        for result in &file_results {
            match result.outcome {
                ValidationOutcome::Valid => results.valid_files += 1,
                ValidationOutcome::SchemaViolation(_) => results.invalid_files += 1,
                ValidationOutcome::ParseError(_) => results.error_files += 1,
            }
        }

        results.file_results = file_results;
        results
    }

    /// Check if every discovered file validated; an empty survey counts as clean
    pub fn all_valid(&self) -> bool {
        !self.has_failures() && self.skipped_files == 0
    }

    pub fn has_failures(&self) -> bool {
        self.invalid_files > 0 || self.error_files > 0
    }

    /// The first file that did not validate
    pub fn first_failure(&self) -> Option<&FileValidationResult> {
        self.file_results.iter().find(|r| !r.outcome.is_valid())
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileValidationResult> {
        self.file_results.iter().filter(|r| !r.outcome.is_valid())
    }
}

/// Sequential discovery + validation for a set of root directories
pub struct SurveyRunner {
    discovery: ProjectDiscovery,
    validator: ProjectValidator,
    fail_fast: bool,
}

impl SurveyRunner {
    pub fn new(discovery: ProjectDiscovery, validator: ProjectValidator, fail_fast: bool) -> Self {
        Self {
            discovery,
            validator,
            fail_fast,
        }
    }

    /// Build a runner from resolved configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let discovery = ProjectDiscovery::new()
            .with_pattern(&config.files.pattern)?
            .with_exclude_patterns(config.files.exclude_patterns.clone())?
            .with_follow_symlinks(config.files.follow_symlinks);

        let validator = ProjectValidator::new(ValidatorOptions {
            strict_configurations: config.survey.strict_configurations,
        });

        Ok(Self::new(discovery, validator, config.survey.fail_fast))
    }

    pub fn validator(&self) -> &ProjectValidator {
        &self.validator
    }

    /// Survey the given roots
    pub async fn run(&mut self, roots: &[PathBuf]) -> SurveyResults {
        self.run_with_progress(roots, |_| {}).await
    }

    /// Survey the given roots, reporting every event as it happens
    pub async fn run_with_progress<F>(
        &mut self,
        roots: &[PathBuf],
        mut on_event: F,
    ) -> SurveyResults
    where
        F: FnMut(SurveyEvent<'_>),
    {
        let start = Instant::now();
        let discovered = self.discovery.discover(roots).await;

        for root in &discovered.missing_roots {
            on_event(SurveyEvent::MissingRoot(root));
        }

        let total = discovered.files.len();
        let mut file_results = Vec::with_capacity(total);

        for path in discovered.files {
            debug!(path = %path.display(), "validating project");
            let result = self.validator.validate_path(&path).await;
            on_event(SurveyEvent::FileValidated(&result));

            let failed = !result.outcome.is_valid();
            file_results.push(result);

            if failed && self.fail_fast {
                debug!("stopping at first failure");
                break;
            }
        }

        let skipped = total - file_results.len();
        let mut results = SurveyResults::aggregate(
            file_results,
            discovered.missing_roots,
            skipped,
            start.elapsed(),
        );
        results.skipped_dirs = discovered.skipped_dirs;

        let cache = self.validator.normalizer_stats();
        info!(
            total = results.total_files,
            valid = results.valid_files,
            invalid = results.invalid_files,
            errors = results.error_files,
            skipped = results.skipped_files,
            tag_cache_hits = cache.hits,
            tag_cache_misses = cache.misses,
            "survey finished"
        );

        results
    }
}
