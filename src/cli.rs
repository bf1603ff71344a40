//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  chat-editor                         Launch the editor, load a file from the welcome screen
  chat-editor conversations.json      Open a dataset directly
  cat data.jsonl | chat-editor -      Load the dataset from stdin
  chat-editor check data.jsonl        Validate a dataset and print statistics
  chat-editor config                  Show endpoint, model, and API key status
  chat-editor completions bash        Generate bash completions

ENVIRONMENT:
  TOGETHER_API_KEY         Credential for the completion API (needed for rewrite only)
  CHAT_EDITOR_BASE_URL     OpenAI-compatible endpoint (default https://api.together.xyz/v1)
  CHAT_EDITOR_MODEL        Model ID
  CHAT_EDITOR_MAX_TOKENS   Completion token limit
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Terminal editor for line-delimited JSON chat datasets",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Dataset to open ('-' reads it from stdin)
    pub path: Option<PathBuf>,

    /// Override the completion model
    #[arg(short = 'm', long, help = "Model ID (e.g. mistralai/Mixtral-8x7B-Instruct-v0.1)")]
    pub model: Option<String>,

    /// Override the completion token limit
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a dataset and print record and message counts
    Check {
        /// Dataset file ('-' for stdin)
        path: PathBuf,
    },
    /// Show endpoint, model, API key status, and log path
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }

    /// True when the run opens the TUI (logs must not go to the terminal).
    pub fn is_tui(&self) -> bool {
        self.command.is_none()
    }
}
