//! Output and Reporting
//!
//! Diagnostic lines go to stdout as files are validated, warnings and
//! failures go to stderr, and a summary (or a JSON document) is written once
//! the run is over.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::config::{OutputConfig, OutputFormatConfig};
use crate::survey::{SurveyEvent, SurveyResults};
use crate::validator::{FileValidationResult, ValidationOutcome};

/// Output verbosity, derived from the quiet/verbose settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum VerbosityLevel {
    /// Only failures and warnings
    Quiet,
    #[default]
    Normal,
    /// Also per-file status and timings
    Verbose,
}

impl From<&OutputConfig> for VerbosityLevel {
    fn from(config: &OutputConfig) -> Self {
        if config.quiet {
            VerbosityLevel::Quiet
        } else if config.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Human-readable and JSON reporting for a survey run
pub struct Output {
    format: OutputFormatConfig,
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            format: config.format,
            verbosity: VerbosityLevel::from(config),
            show_colors: atty::is(atty::Stream::Stdout),
        }
    }

    /// Plain output without terminal colors
    pub fn plain(config: &OutputConfig) -> Self {
        Self {
            show_colors: false,
            ..Self::new(config)
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// Report a runner event as it happens
    pub fn handle_event(&self, event: SurveyEvent<'_>) {
        match event {
            SurveyEvent::MissingRoot(root) => {
                eprintln!("{}", format_missing_root(root));
            }
            SurveyEvent::FileValidated(result) => {
                if let Err(e) = self.write_file_diagnostics(&mut io::stdout().lock(), result) {
                    debug!(
                        path = %result.path.display(),
                        error = %e,
                        "failed to write diagnostics"
                    );
                }

                if !result.outcome.is_valid() && self.format != OutputFormatConfig::Json {
                    eprintln!("{}", self.format_failure(result));
                }
            }
        }
    }

    /// Write the diagnostic lines of one file and flush
    pub fn write_file_diagnostics<W: Write>(
        &self,
        out: &mut W,
        result: &FileValidationResult,
    ) -> io::Result<()> {
        out.write_all(self.format_file_diagnostics(result).as_bytes())?;
        out.flush()
    }

    /// Diagnostic lines of one file: the path, then one line per inspected element
    pub fn format_file_diagnostics(&self, result: &FileValidationResult) -> String {
        if self.format != OutputFormatConfig::Human || self.verbosity == VerbosityLevel::Quiet {
            return String::new();
        }

        let mut output = format!("{}\n", result.path.display());
        for diagnostic in &result.diagnostics {
            output.push_str(&format!("{}\n", diagnostic));
        }

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format!(
                "{} ({})\n",
                self.format_status(&result.outcome),
                format_duration(result.duration)
            ));
        }
        output
    }

    fn format_status(&self, outcome: &ValidationOutcome) -> String {
        match outcome {
            ValidationOutcome::Valid => self.colorize("✓ VALID", "32"),
            ValidationOutcome::SchemaViolation(_) => self.colorize("✗ INVALID", "31"),
            ValidationOutcome::ParseError(_) => self.colorize("⚠ ERROR", "33"),
        }
    }

    /// One line describing why a file failed
    pub fn format_failure(&self, result: &FileValidationResult) -> String {
        let detail = match &result.outcome {
            ValidationOutcome::Valid => return String::new(),
            ValidationOutcome::SchemaViolation(violation) => violation.to_string(),
            ValidationOutcome::ParseError(details) => details.clone(),
        };
        format!(
            "{}  {} - {}",
            self.format_status(&result.outcome),
            result.path.display(),
            detail
        )
    }

    /// Final report of a run
    pub fn format_results(&self, results: &SurveyResults) -> String {
        match self.format {
            OutputFormatConfig::Json => {
                serde_json::to_string_pretty(results).unwrap_or_else(|e| {
                    format!("{{\"error\": \"failed to serialize results: {}\"}}", e)
                }) + "\n"
            }
            OutputFormatConfig::Human | OutputFormatConfig::Summary => {
                if self.verbosity == VerbosityLevel::Quiet {
                    if results.has_failures() {
                        return format!(
                            "Invalid: {} Errors: {}\n",
                            results.invalid_files, results.error_files
                        );
                    }
                    return String::new();
                }
                self.format_summary(results)
            }
        }
    }

    pub fn print_results(&self, results: &SurveyResults) {
        print!("{}", self.format_results(results));
    }

    fn format_summary(&self, results: &SurveyResults) -> String {
        let mut output = String::new();
        output.push_str("Survey Summary:\n");
        output.push_str(&format!("  Total files: {}\n", results.total_files));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Valid:", "32"),
            results.valid_files
        ));

        if results.invalid_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                results.invalid_files
            ));
        }
        if results.error_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Errors:", "33"),
                results.error_files
            ));
        }
        if results.skipped_files > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Not checked:", "36"),
                results.skipped_files
            ));
        }
        if !results.missing_roots.is_empty() {
            output.push_str(&format!(
                "  Missing directories: {}\n",
                results.missing_roots.len()
            ));
        }
        if !results.skipped_dirs.is_empty() {
            output.push_str(&format!(
                "  Unreadable directories: {}\n",
                results.skipped_dirs.len()
            ));
        }

        output.push_str(&format!(
            "  Duration: {}\n",
            format_duration(results.total_duration)
        ));
        output
    }
}

/// Warning line for a root directory that does not exist
pub fn format_missing_root(root: &Path) -> String {
    format!("Warning: {} not found.", root.display())
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
