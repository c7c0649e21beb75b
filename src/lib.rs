//! # vs-project-survey Library
//!
//! Surveys directory trees for MSBuild C++ project files (`*.vcxproj`) and
//! checks that each one starts with the expected configuration list and
//! globals property group.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod namespace;
pub mod output;
pub mod project;
pub mod survey;
pub mod validator;

pub use cli::{Cli, OutputFormat};
pub use config::{Config, ConfigError, ConfigManager, EnvProvider, OutputFormatConfig};
pub use discovery::{DEFAULT_PROJECT_PATTERN, Discovered, ProjectDiscovery};
pub use error::{Result, SchemaViolation, SurveyError};
pub use namespace::{
    MSBUILD_NAMESPACE, MSBUILD_PREFIX, NamespaceNormalizer, NormalizerStats, strip_namespace,
};
pub use output::{Output, VerbosityLevel};
pub use project::{Element, ProjectDocument};
pub use survey::{SurveyEvent, SurveyResults, SurveyRunner};
pub use validator::{
    Diagnostic, EXPECTED_CONFIGURATIONS, ExpectedPosition, FileValidationResult, ProjectValidator,
    ValidationOutcome, ValidatorOptions,
};
