// CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Hierarchical scenario reports from test lifecycle events
#[derive(Parser, Debug)]
#[command(name = "stepreport")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build scenario reports from recorded test events and validate HTTP/JSON responses", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose debug output
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(short = 'c', long, global = true, default_value_t = false)]
    pub no_color: bool,

    /// Configuration file (default: .stepreportrc lookup)
    #[arg(long, global = true, value_name = "CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Show current configuration and exit
    #[arg(long, default_value_t = false)]
    pub config: bool,

    /// Create default configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,

    /// Install shell completion (bash, zsh, fish, powershell)
    #[arg(long, value_name = "SHELL_TYPE", value_parser = ["bash", "zsh", "fish", "powershell"])]
    pub completion: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay recorded event logs and write reports
    Replay(ReplayArgs),

    /// Validate a recorded HTTP response
    Validate(ValidateArgs),

    /// Count the items in a JSON response body
    Count(CountArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Event log files (.ndjson, .jsonl) or directories containing them
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Reporters to run, comma separated (console, json, junit)
    #[arg(short = 'f', long, value_delimiter = ',')]
    pub format: Vec<String>,

    /// Directory for report files
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Replay N units concurrently ("auto" for CPU count)
    #[arg(short = 'p', long)]
    pub parallel: Option<String>,

    /// Feed all events through a single consuming loop
    #[arg(long, default_value_t = false)]
    pub bus: bool,

    /// Open the first report file once written
    #[arg(long, default_value_t = false)]
    pub open: bool,

    /// Order in which log files are read (path, name, mtime, size)
    #[arg(short = 's', long, default_value = "path")]
    pub sort: String,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// File holding the response body
    #[arg(long, value_name = "FILE")]
    pub body: PathBuf,

    /// Actual status code
    #[arg(long)]
    pub status: u16,

    /// Actual status message
    #[arg(long, default_value = "")]
    pub message: String,

    /// Actual content type
    #[arg(long, default_value = "application/json")]
    pub content_type: String,

    /// Expected status code
    #[arg(long, default_value_t = 200)]
    pub expect_status: u16,

    /// Expected status message
    #[arg(long)]
    pub expect_message: Option<String>,

    /// Expected content type (substring match)
    #[arg(long)]
    pub expect_content_type: Option<String>,

    /// Every item's field must start with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Dotted path of the field checked by --prefix
    #[arg(long, default_value = "address.postCode")]
    pub field: String,

    /// Expected number of items
    #[arg(long)]
    pub count: Option<usize>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Args, Debug, Clone)]
pub struct CountArgs {
    /// File holding the response body
    #[arg(long, value_name = "FILE")]
    pub body: PathBuf,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,
}

impl Cli {
    /// Parallel job count: command line, then config, then "auto"
    pub fn parallel_jobs(&self, configured: Option<&str>) -> usize {
        let parallel = match &self.command {
            Some(Commands::Replay(args)) => args.parallel.as_deref(),
            _ => None,
        };

        crate::config::parse_parallel(parallel.or(configured).unwrap_or("auto"))
    }
}

fn is_json_format(value: &str) -> bool {
    value.eq_ignore_ascii_case("json")
}

impl ValidateArgs {
    pub fn is_json(&self) -> bool {
        is_json_format(&self.format)
    }
}

impl CountArgs {
    pub fn is_json(&self) -> bool {
        is_json_format(&self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replay() {
        let cli = Cli::parse_from([
            "stepreport",
            "replay",
            "logs/",
            "--format",
            "json,junit",
            "--parallel",
            "3",
            "--bus",
        ]);

        let Some(Commands::Replay(args)) = &cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.paths, vec![PathBuf::from("logs/")]);
        assert_eq!(args.format, vec!["json", "junit"]);
        assert!(args.bus);
        assert_eq!(cli.parallel_jobs(Some("8")), 3);
    }

    #[test]
    fn test_parallel_falls_back_to_config() {
        let cli = Cli::parse_from(["stepreport", "count", "--body", "b.json"]);
        assert_eq!(cli.parallel_jobs(Some("2")), 2);
    }

    #[test]
    fn test_prefix_uses_default_field() {
        let cli = Cli::parse_from([
            "stepreport",
            "validate",
            "--body",
            "b.json",
            "--status",
            "200",
            "--prefix",
            "EH",
        ]);
        let Some(Commands::Validate(args)) = &cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.field, "address.postCode");
        assert_eq!(args.prefix.as_deref(), Some("EH"));
    }
}
