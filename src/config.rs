use crate::cli::{Cli, OutputFormat};
use crate::discovery::DEFAULT_PROJECT_PATTERN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub survey: SurveyConfig,
    pub files: FileConfig,
    pub output: OutputConfig,
}

/// Survey behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SurveyConfig {
    /// Stop at the first file that fails validation
    pub fail_fast: bool,
    /// Reject repeated configurations and incomplete configuration sets
    pub strict_configurations: bool,
}

/// File discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// Project file name pattern (glob syntax, case-sensitive)
    pub pattern: String,
    /// Exclude patterns (glob syntax)
    pub exclude_patterns: Vec<String>,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormatConfig,
    pub verbose: bool,
    /// Only report failures
    pub quiet: bool,
}

/// Output format configuration (serializable version of CLI OutputFormat)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormatConfig {
    #[default]
    Human,
    Json,
    Summary,
}

impl From<OutputFormat> for OutputFormatConfig {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputFormatConfig::Human,
            OutputFormat::Json => OutputFormatConfig::Json,
            OutputFormat::Summary => OutputFormatConfig::Summary,
        }
    }
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            fail_fast: true,
            strict_configurations: false,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PROJECT_PATTERN.to_string(),
            exclude_patterns: vec![],
            follow_symlinks: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormatConfig::Human,
            verbose: false,
            quiet: false,
        }
    }
}

const CONFIG_NAMES: [&str; 4] = [
    "vs-project-survey.toml",
    "vs-project-survey.json",
    ".vs-project-survey.toml",
    ".vs-project-survey.json",
];

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        Self::load_config_with(&SystemEnvProvider, cli).await
    }

    /// Same as [`ConfigManager::load_config`] with a custom environment provider
    pub async fn load_config_with(env: &impl EnvProvider, cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path).await?;
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = found_config;
        }

        config = Self::apply_environment_overrides_with(env, config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        for name in &CONFIG_NAMES {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("vs-project-survey");
            for name in &CONFIG_NAMES {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(fail_fast) = env.get("VS_PROJECT_SURVEY_FAIL_FAST") {
            config.survey.fail_fast = parse_bool("VS_PROJECT_SURVEY_FAIL_FAST", &fail_fast)?;
        }

        if let Some(strict) = env.get("VS_PROJECT_SURVEY_STRICT") {
            config.survey.strict_configurations = parse_bool("VS_PROJECT_SURVEY_STRICT", &strict)?;
        }

        if let Some(pattern) = env.get("VS_PROJECT_SURVEY_PATTERN") {
            config.files.pattern = pattern;
        }

        if let Some(verbose) = env.get("VS_PROJECT_SURVEY_VERBOSE") {
            config.output.verbose = parse_bool("VS_PROJECT_SURVEY_VERBOSE", &verbose)?;
        }

        if let Some(quiet) = env.get("VS_PROJECT_SURVEY_QUIET") {
            config.output.quiet = parse_bool("VS_PROJECT_SURVEY_QUIET", &quiet)?;
        }

        if let Some(format) = env.get("VS_PROJECT_SURVEY_FORMAT") {
            config.output.format = match format.to_lowercase().as_str() {
                "human" => OutputFormatConfig::Human,
                "json" => OutputFormatConfig::Json,
                "summary" => OutputFormatConfig::Summary,
                _ => {
                    return Err(ConfigError::Environment(format!(
                        "Invalid VS_PROJECT_SURVEY_FORMAT value: {}",
                        format
                    )));
                }
            };
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence).
    ///
    /// Boolean flags only ever switch a setting on; leaving a flag out keeps
    /// whatever the file or environment chose.
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if cli.keep_going {
            config.survey.fail_fast = false;
        }
        if cli.strict_configurations {
            config.survey.strict_configurations = true;
        }

        if let Some(pattern) = &cli.pattern {
            config.files.pattern = pattern.clone();
        }
        if !cli.exclude_patterns.is_empty() {
            config.files.exclude_patterns = cli.exclude_patterns.clone();
        }
        if cli.follow_symlinks {
            config.files.follow_symlinks = true;
        }

        if let Some(format) = cli.format {
            config.output.format = format.into();
        }
        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if config.files.pattern.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Project file pattern must not be empty".to_string(),
            ));
        }

        if config.files.pattern.contains('/') || config.files.pattern.contains('\\') {
            return Err(ConfigError::Validation(format!(
                "Project file pattern must match file names, not paths: {}",
                config.files.pattern
            )));
        }

        for pattern in std::iter::once(&config.files.pattern).chain(&config.files.exclude_patterns)
        {
            globset::Glob::new(pattern).map_err(|e| {
                ConfigError::Validation(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
        }

        if config.output.verbose && config.output.quiet {
            return Err(ConfigError::Validation(
                "Cannot enable both verbose and quiet modes".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Environment(format!(
            "Invalid {} value: {}",
            name, value
        ))),
    }
}
