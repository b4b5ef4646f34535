//! Command-line argument parsing for tabletalk.

use clap::Parser;
use std::path::PathBuf;

/// Ask natural-language questions about a CSV dataset.
#[derive(Parser, Debug)]
#[command(name = "tabletalk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the CSV file to load
    #[arg(value_name = "DATASET")]
    pub dataset: Option<PathBuf>,

    /// LLM provider: openai, ollama, or mock
    #[arg(long, value_name = "PROVIDER", env = "TABLETALK_PROVIDER")]
    pub provider: Option<String>,

    /// Model name (e.g., gpt-4o-mini)
    #[arg(short, long, value_name = "MODEL", env = "TABLETALK_MODEL")]
    pub model: Option<String>,

    /// Path to the config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Ask a single question and exit instead of starting the REPL
    #[arg(short, long, value_name = "QUESTION")]
    pub question: Option<String>,

    /// Print the generated SQL alongside the answer
    #[arg(long)]
    pub show_sql: bool,
}

impl Cli {
    /// Parses CLI arguments from the process environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path, defaulting to `tabletalk.toml`.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from("tabletalk.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset_argument() {
        let cli = Cli::parse_from(["tabletalk", "sales.csv"]);
        assert_eq!(cli.dataset, Some(PathBuf::from("sales.csv")));
        assert!(!cli.show_sql);
    }

    #[test]
    fn test_parse_single_question() {
        let cli = Cli::parse_from(["tabletalk", "sales.csv", "-q", "How many rows?"]);
        assert_eq!(cli.question.as_deref(), Some("How many rows?"));
    }

    #[test]
    fn test_config_path_default() {
        let cli = Cli::parse_from(["tabletalk"]);
        assert_eq!(cli.config_path(), PathBuf::from("tabletalk.toml"));
    }

    #[test]
    fn test_provider_flag() {
        let cli = Cli::parse_from(["tabletalk", "--provider", "mock", "--show-sql"]);
        assert_eq!(cli.provider.as_deref(), Some("mock"));
        assert!(cli.show_sql);
    }
}
