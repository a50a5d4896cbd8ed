// reident CLI - config-driven record linkage and re-identification

mod commands;
mod exit_codes;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use reident_io::LoadError;
use reident_linkage::LinkageError;
use tracing_subscriber::EnvFilter;

use exit_codes::{linkage_exit_code, EXIT_ERROR, EXIT_LOAD, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "reident")]
#[command(about = "Link masked and plaintext records across datasets")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug). REIDENT_LOG overrides.
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Outer-join the two configured sources
    #[command(after_help = "\
Examples:
  reident join job.toml
  reident join job.toml --json
  reident join job.toml --output joined.json")]
    Join {
        /// Path to the job config (.toml)
        config: PathBuf,

        /// Print JSON to stdout instead of rendered records
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Join, then list records matching every --where term, best linked first
    #[command(after_help = "\
Examples:
  reident find job.toml --where name=이수
  reident find job.toml --where email=naver.com --where city=Seoul --limit 5")]
    Find {
        /// Path to the job config (.toml)
        config: PathBuf,

        /// Query term. Repeatable; all terms must match.
        #[arg(long = "where", value_name = "ATTR=VALUE", required = true)]
        terms: Vec<String>,

        /// Print JSON to stdout instead of rendered records
        #[arg(long)]
        json: bool,

        /// Show at most N records
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Join, then keep one record per group of records equal on --by attributes
    #[command(after_help = "\
Examples:
  reident unique job.toml --by name --by phone")]
    Unique {
        /// Path to the job config (.toml)
        config: PathBuf,

        /// Key attribute. Repeatable.
        #[arg(long, value_name = "ATTR", required = true)]
        by: Vec<String>,

        /// Print JSON to stdout instead of rendered records
        #[arg(long)]
        json: bool,
    },

    /// Validate a job config without loading sources
    #[command(after_help = "\
Examples:
  reident validate job.toml")]
    Validate {
        /// Path to the job config (.toml)
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_COMMIT_HASH"),
        ")",
        "\nlinkage: reident-linkage ",
        env!("CARGO_PKG_VERSION"),
        "\ntarget:  ",
        env!("TARGET"),
    )
}

/// Route `log` records from the library crates and our own output through a
/// stderr subscriber. `REIDENT_LOG` wins over `RUST_LOG`; `-v` sets the default.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("REIDENT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Join { config, json, output } => commands::cmd_join(config, json, output),
        Commands::Find {
            config,
            terms,
            json,
            limit,
        } => commands::cmd_find(config, terms, json, limit),
        Commands::Unique { config, by, json } => commands::cmd_unique(config, by, json),
        Commands::Validate { config } => commands::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn load(err: LoadError) -> Self {
        let hint = match &err {
            LoadError::Encoding { .. } => Some("re-save the file as UTF-8".to_string()),
            LoadError::Sqlite { .. } => Some("check table and column names in the config".to_string()),
            _ => None,
        };
        Self { code: EXIT_LOAD, message: err.to_string(), hint }
    }

    pub fn linkage(err: LinkageError) -> Self {
        let hint = match &err {
            LinkageError::UnsupportedMerge { .. } => {
                Some("both sources mask this attribute; mask it on one side only".to_string())
            }
            LinkageError::NotSupported(_) => Some("use left-aligned masks".to_string()),
            _ => None,
        };
        Self { code: linkage_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
