// commit-msg - LLM commit message generation with a local response cache
// Author: kelexine (https://github.com/kelexine)

use anyhow::{Context, Result};
use clap::Parser;
use commit_msg::cache::CacheManager;
use commit_msg::cli::commands;
use commit_msg::cli::{Args, CacheAction, Command};
use commit_msg::config::AppConfig;
use commit_msg::utils::logging;
use std::io;
use std::process::ExitCode;
use tracing::debug;

fn main() -> Result<ExitCode> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration, CLI flags win
    let mut config = AppConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(cache_file) = args.cache_file {
        config.cache.cache_file_path = cache_file;
    }

    // Phase 2: Initialize logging
    logging::init(&config.logging)?;
    debug!("Starting commit-msg v{}", env!("CARGO_PKG_VERSION"));

    let action = match args.command {
        Command::Config => {
            print!("{}", config.to_toml()?);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Cache { action } => action,
    };

    // Phase 3: Open the cache (never fails, a broken file starts empty)
    debug!("Using cache file {}", config.cache.cache_file_path.display());
    let cache = CacheManager::new(config.cache);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    match action {
        CacheAction::Stats => commands::show_stats(&cache, &mut stdout)?,
        CacheAction::Clear { yes } => {
            commands::clear_cache(&cache, yes, &mut stdin.lock(), &mut stdout)?
        }
        CacheAction::Cleanup => commands::cleanup_cache(&cache, &mut stdout)?,
        CacheAction::Key(request) => {
            let diff = commands::read_diff(request.diff.as_deref(), &mut stdin.lock())?;
            commands::print_key(&request, &diff, &mut stdout)?;
        }
        CacheAction::Get(request) => {
            let diff = commands::read_diff(request.diff.as_deref(), &mut stdin.lock())?;
            if !commands::get_cached(&cache, &request, &diff, &mut stdout)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        CacheAction::Put {
            request,
            message,
            cost,
        } => {
            let diff = commands::read_diff(request.diff.as_deref(), &mut stdin.lock())?;
            commands::put_cached(&cache, &request, &diff, &message, cost, &mut stdout)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
