use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum SurveyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse project file: {file} - {details}")]
    Parse { file: PathBuf, details: String },

    #[error("Project structure violation: {file} - {violation}")]
    Schema {
        file: PathBuf,
        violation: SchemaViolation,
    },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("File system traversal error: {path} - {reason}")]
    FileSystemTraversal { path: PathBuf, reason: String },
}

/// A structural rule broken by a project file.
///
/// `position` is the zero-based index of the offending top-level child.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaViolation {
    #[error("child {position} <{tag}> is not part of the MSBuild namespace")]
    NotInNamespace { position: usize, tag: String },

    #[error("child {position} is <{found}>, expected <{expected}>")]
    UnexpectedTag {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("child {position} <{tag}> has no {attribute} attribute")]
    MissingAttribute {
        position: usize,
        tag: String,
        attribute: String,
    },

    #[error("child {position} is labeled {found:?}, expected {expected:?}")]
    UnexpectedLabel {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("unknown project configuration {include:?}")]
    UnknownConfiguration { include: String },

    #[error("project configuration {include:?} is declared more than once")]
    DuplicateConfiguration { include: String },

    #[error("missing project configurations: {}", .missing.join(", "))]
    MissingConfigurations { missing: Vec<String> },
}

impl SchemaViolation {
    /// Position of the top-level child the violation was found at
    pub fn position(&self) -> usize {
        match self {
            SchemaViolation::NotInNamespace { position, .. }
            | SchemaViolation::UnexpectedTag { position, .. }
            | SchemaViolation::MissingAttribute { position, .. }
            | SchemaViolation::UnexpectedLabel { position, .. } => *position,
            // configuration checks always run on the first child
            SchemaViolation::UnknownConfiguration { .. }
            | SchemaViolation::DuplicateConfiguration { .. }
            | SchemaViolation::MissingConfigurations { .. } => 0,
        }
    }
}

impl From<globset::Error> for SurveyError {
    fn from(err: globset::Error) -> Self {
        SurveyError::Pattern {
            pattern: err.glob().unwrap_or_default().to_string(),
            reason: err.kind().to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SurveyError>;
