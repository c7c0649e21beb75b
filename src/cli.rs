use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Diagnostic lines per file followed by a summary
    Human,
    /// One JSON document describing the whole run
    Json,
    /// Only the summary block
    Summary,
}

/// Survey existing MSBuild-based C++ projects
#[derive(Parser, Debug, Clone)]
#[command(name = "vs-project-survey")]
#[command(about = "This helps to survey existing MSBuild-based C++ projects")]
#[command(version)]
#[command(after_help = "EXAMPLES:
    vs-project-survey src
    vs-project-survey --keep-going --format summary src tools
    RUST_LOG=debug vs-project-survey src")]
pub struct Cli {
    /// Directories to search for project files
    #[arg(value_name = "DIRECTORY", required = true, num_args = 1..)]
    pub dirs: Vec<PathBuf>,

    /// Validate every file instead of stopping at the first failure
    #[arg(long = "keep-going")]
    pub keep_going: bool,

    /// Also reject repeated or missing project configurations
    #[arg(long = "strict-configurations")]
    pub strict_configurations: bool,

    /// Project file name pattern (glob syntax)
    #[arg(long = "pattern", value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Exclude file patterns (glob syntax)
    #[arg(long = "exclude", value_name = "GLOB", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,

    /// Follow symbolic links while walking directories
    #[arg(long = "follow-symlinks")]
    pub follow_symlinks: bool,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file (TOML or JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Only report failures
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_basic_cli_parsing() {
        let cli = Cli::try_parse_from(["vs-project-survey", "src"]).unwrap();
        assert_eq!(cli.dirs, vec![PathBuf::from("src")]);
        assert!(!cli.keep_going);
        assert_eq!(cli.format, None);
    }

    #[test]
    fn test_multiple_directories() {
        let cli = Cli::try_parse_from(["vs-project-survey", "src", "tools", "missing"]).unwrap();
        assert_eq!(cli.dirs.len(), 3);
        assert_eq!(cli.dirs[2], PathBuf::from("missing"));
    }

    #[test]
    fn test_directory_required() {
        let err = Cli::try_parse_from(["vs-project-survey"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let err = Cli::try_parse_from(["vs-project-survey", "-v", "-q", "src"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "vs-project-survey",
            "--keep-going",
            "--strict-configurations",
            "--pattern",
            "*.vcxproj",
            "--exclude",
            "a/**",
            "--exclude",
            "b/**",
            "--follow-symlinks",
            "--format",
            "json",
            "src",
        ])
        .unwrap();

        assert!(cli.keep_going);
        assert!(cli.strict_configurations);
        assert_eq!(cli.pattern.as_deref(), Some("*.vcxproj"));
        assert_eq!(cli.exclude_patterns, vec!["a/**", "b/**"]);
        assert!(cli.follow_symlinks);
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }
}
