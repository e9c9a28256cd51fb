//! Read-only commands against a registered server

use colored::Colorize;

use modeshape_registry::{QueryRow, Repository};

use super::{resolve_server, resolve_workspace};
use crate::cli::{ServerArgs, WorkspaceArgs};
use crate::context::Context;
use crate::error::Result;

/// Run the repos command
pub fn run_repos(ctx: &Context, args: &ServerArgs) -> Result<()> {
    let server = resolve_server(&ctx.registry, args);
    let repositories = ctx.registry.repositories(&server)?;

    println!("{} {}", "Repositories on".bold(), server);
    if repositories.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for repository in &repositories {
        println!("  {}", repository.name().green());
    }
    Ok(())
}

/// Run the workspaces command
pub fn run_workspaces(ctx: &Context, args: &ServerArgs, repo: &str) -> Result<()> {
    let repository = Repository::new(repo, resolve_server(&ctx.registry, args));
    let workspaces = ctx.registry.workspaces(&repository)?;

    println!("{} {}", "Workspaces in".bold(), repository);
    if workspaces.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for workspace in &workspaces {
        println!("  {}", workspace.name().green());
    }
    Ok(())
}

/// Run the query command. Rows print as `column = value` blocks.
pub fn run_query(
    ctx: &Context,
    target: &WorkspaceArgs,
    language: &str,
    statement: &str,
) -> Result<()> {
    let workspace = resolve_workspace(&ctx.registry, target);
    let rows = ctx.registry.query(&workspace, language, statement)?;

    for (index, row) in rows.iter().enumerate() {
        println!("{}", format!("Row {}", index + 1).bold());
        print_row(row);
    }
    println!("{} {} rows", "Total:".dimmed(), rows.len());
    Ok(())
}

fn print_row(row: &QueryRow) {
    let width = row.keys().map(String::len).max().unwrap_or(0);
    for (column, value) in row {
        println!("  {:<width$} = {}", column.cyan(), value, width = width);
    }
}
