//! # Chat Editor - terminal editor for chat datasets
//!
//! Browse line-delimited JSON conversations, edit messages, run text normalizers,
//! and ask a hosted model to rewrite assistant answers.
//!
//! ## Modes
//! - Interactive TUI (default), optionally opening a dataset given on the command line
//! - `check`: validate a dataset and print statistics
//! - `config`, `completions`: configuration report and shell completions

mod cli;
mod core;
mod run;
mod tui;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{Args, Commands};
use core::config::{Config, Overrides};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(&args);

    // Print user-friendly message; exit uses Display not Debug
    let config = Config::load(Overrides {
        model: args.model.clone(),
        max_tokens: args.max_tokens,
    })
    .unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    match args.command {
        Some(Commands::Check { path }) => {
            if let Err(e) = run::run_check(&path) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => run::run_config(&config),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Args::command();
            cli::generate(shell, &mut cmd, core::app::NAME, &mut std::io::stdout());
        }
        None => run::launch_tui(config, args.path).await?,
    }
    Ok(())
}
