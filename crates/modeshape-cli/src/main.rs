//! ModeShape server registry CLI
//!
//! Restores the registry, runs one command, saves when the command changed
//! something, and reports the resulting statuses.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} ModeShape server registry", "msreg".green().bold());
        println!();
        println!("Run {} for available commands.", "msreg --help".cyan());
        return Ok(());
    };

    let ctx = Context::load(cli.config, cli.state_dir)?;
    execute_command(&ctx, command)
}

fn init_tracing(verbose: bool) {
    let directives = filter_directives(verbose, std::env::var("RUST_LOG").ok());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(ctx: &Context, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List { json } => commands::run_list(ctx, json),
        Commands::Add {
            server,
            persist_password,
        } => commands::run_add(ctx, &server, persist_password),
        Commands::Remove { url, user } => commands::run_remove(ctx, &url, &user),
        Commands::Update {
            url,
            user,
            new_url,
            new_user,
            password,
            persist_password,
            forget_password,
        } => commands::run_update(
            ctx,
            &url,
            &user,
            new_url.as_deref(),
            new_user.as_deref(),
            password.as_deref(),
            persist_choice(persist_password, forget_password),
        ),
        Commands::Ping { server } => commands::run_ping(ctx, &server),
        Commands::Repos { server } => commands::run_repos(ctx, &server),
        Commands::Workspaces { server, repo } => commands::run_workspaces(ctx, &server, &repo),
        Commands::Publish {
            target,
            path,
            versionable,
            file,
        } => commands::run_publish(ctx, &target, &path, &file, versionable),
        Commands::Unpublish { target, path, file } => {
            commands::run_unpublish(ctx, &target, &path, &file)
        }
        Commands::Query {
            target,
            language,
            statement,
        } => commands::run_query(ctx, &target, &language, &statement),
    }
}

/// `RUST_LOG` wins, even with `--verbose`; otherwise warnings only, or
/// debug with `--verbose`.
fn filter_directives(verbose: bool, rust_log: Option<String>) -> String {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => directives,
        _ if verbose => "debug".to_string(),
        _ => "warn".to_string(),
    }
}

/// `None` when neither flag was given.
fn persist_choice(persist: bool, forget: bool) -> Option<bool> {
    match (persist, forget) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}
