//! Application run modes: logger init, dataset check, config report, TUI launch.

use std::io;
use std::path::{Path, PathBuf};

use crate::cli::Args;
use crate::core;
use crate::core::config::Config;
use crate::core::dataset::Dataset;

/// Initialize env_logger. In TUI mode, writes to file to avoid corrupting the display.
pub fn init_logger(args: &Args) {
    let log_level = args.log_level();
    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level));

    if args.is_tui()
        && let Some(path) = core::paths::log_file()
        && path.parent().is_some_and(|dir| std::fs::create_dir_all(dir).is_ok())
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        logger.target(env_logger::Target::Pipe(Box::new(file)));
    }
    let _ = logger.try_init();
}

fn load_dataset(path: &Path) -> Result<Dataset, core::dataset::DatasetError> {
    if path == Path::new("-") {
        Dataset::from_reader(io::stdin().lock())
    } else {
        Dataset::load(path)
    }
}

/// Load a dataset and print its statistics.
pub fn run_check(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_dataset(path)?;
    println!("{}: {}", path.display(), dataset.stats());
    Ok(())
}

/// Print the effective configuration (never the key itself).
pub fn run_config(config: &Config) {
    println!("Endpoint:   {}", config.base_url);
    println!("Model:      {}", config.model_id);
    println!("Max tokens: {}", config.max_tokens);
    println!(
        "API key:    {}",
        if config.has_api_key() {
            "set"
        } else {
            "not set (rewrite disabled)"
        }
    );
    println!(
        "Log file:   {}",
        core::paths::log_file()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(unavailable)".to_string())
    );
}

/// Launch the TUI in a blocking thread. Returns on panic or IO error.
pub async fn launch_tui(
    config: Config,
    initial: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let join_result: Result<io::Result<()>, tokio::task::JoinError> =
        tokio::task::spawn_blocking(move || {
            let mut editor = core::editor::Editor::new();
            let loaded = match initial.as_deref() {
                // stdin is consumed here; the TUI reads keys from the terminal.
                Some(path) if path == Path::new("-") => {
                    editor.load_from_reader(io::stdin().lock())
                }
                Some(path) => editor.load(path),
                None => Ok(()),
            };
            let startup_error = loaded.err().map(|e| e.to_string());
            crate::tui::run(config, editor, startup_error)
        })
        .await;

    match join_result {
        Ok(io_result) => io_result?,
        Err(join_err) => {
            if let Ok(panic) = join_err.try_into_panic() {
                let msg = if let Some(s) = panic.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    format!("{:?}", panic)
                };
                eprintln!("TUI panic: {}", msg);
            }
            return Err(
                Box::new(io::Error::other("TUI thread panicked")) as Box<dyn std::error::Error>
            );
        }
    }
    Ok(())
}
