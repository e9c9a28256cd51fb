//! Server registration commands

use colored::Colorize;
use serde::Serialize;

use modeshape_registry::{Server, is_server_valid};

use super::{print_status, resolve_server};
use crate::cli::ServerArgs;
use crate::context::Context;
use crate::error::{CliError, Result};

/// What `list --json` prints per server; never includes the password.
#[derive(Debug, Serialize)]
struct ServerEntry<'a> {
    url: &'a str,
    user: &'a str,
    persist_password: bool,
}

/// Run the list command
pub fn run_list(ctx: &Context, json: bool) -> Result<()> {
    let servers = ctx.registry.servers();

    if json {
        let entries: Vec<ServerEntry<'_>> = servers
            .iter()
            .map(|s| ServerEntry {
                url: s.url(),
                user: s.user(),
                persist_password: s.persist_password(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if servers.is_empty() {
        println!("No servers registered. Use {} to add one.", "msreg add".cyan());
        return Ok(());
    }

    println!("{}", "Registered Servers".bold());
    for server in &servers {
        let saved = if server.persist_password() {
            " (password saved)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {} {}{}", server.user().green(), server.url(), saved);
    }
    Ok(())
}

/// Run the add command
pub fn run_add(ctx: &Context, args: &ServerArgs, persist_password: bool) -> Result<()> {
    is_server_valid(&args.url, &args.user, args.password.as_deref())?;

    let server = Server::new(
        args.url.clone(),
        args.user.clone(),
        args.password.clone(),
        persist_password,
    );
    let status = ctx.registry.add_server(server)?;
    print_status(&status);
    ctx.save()?;
    Ok(())
}

/// Run the remove command
pub fn run_remove(ctx: &Context, url: &str, user: &str) -> Result<()> {
    let server = ctx
        .registry
        .find_server(url, user)
        .ok_or_else(|| not_registered(url, user))?;

    let status = ctx.registry.remove_server(&server)?;
    print_status(&status);
    ctx.save()?;
    Ok(())
}

/// Run the update command.
///
/// Unset replacement fields keep the registered server's values, and
/// `persist_password: None` keeps the saved-password setting. State is only
/// saved when the update succeeds, so a failed replacement leaves the
/// registry file untouched.
pub fn run_update(
    ctx: &Context,
    url: &str,
    user: &str,
    new_url: Option<&str>,
    new_user: Option<&str>,
    password: Option<&str>,
    persist_password: Option<bool>,
) -> Result<()> {
    let old = ctx
        .registry
        .find_server(url, user)
        .ok_or_else(|| not_registered(url, user))?;

    let url = new_url.unwrap_or(old.url()).to_string();
    let user = new_user.unwrap_or(old.user()).to_string();
    let password = password.or(old.password()).map(str::to_string);
    is_server_valid(&url, &user, password.as_deref())?;

    let persist = persist_password.unwrap_or(old.persist_password());
    let new = Server::new(url, user, password, persist);
    let status = ctx.registry.update_server(&old, new)?;
    print_status(&status);
    ctx.save()?;
    Ok(())
}

/// Run the ping command
pub fn run_ping(ctx: &Context, args: &ServerArgs) -> Result<()> {
    is_server_valid(&args.url, &args.user, args.password.as_deref())?;
    let server = resolve_server(&ctx.registry, args);
    let status = ctx.registry.ping(&server)?;
    print_status(&status);
    Ok(())
}

fn not_registered(url: &str, user: &str) -> CliError {
    CliError::user(format!(
        "No server registered for {}@{}. Use 'msreg list' to see registered servers.",
        user, url
    ))
}
