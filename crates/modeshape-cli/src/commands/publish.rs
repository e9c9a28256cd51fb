//! Publishing files to a workspace

use std::path::Path;

use super::{print_status, resolve_workspace};
use crate::cli::WorkspaceArgs;
use crate::context::Context;
use crate::error::{CliError, Result};

/// Run the publish command
pub fn run_publish(
    ctx: &Context,
    target: &WorkspaceArgs,
    path: &str,
    file: &Path,
    versionable: bool,
) -> Result<()> {
    if !file.is_file() {
        return Err(CliError::user(format!("Not a file: {}", file.display())));
    }

    let workspace = resolve_workspace(&ctx.registry, target);
    let status = ctx.registry.publish(&workspace, path, file, versionable)?;
    print_status(&status);

    let url = ctx.registry.file_url(file, path, &workspace)?;
    println!("  {}", url);
    Ok(())
}

/// Run the unpublish command
pub fn run_unpublish(ctx: &Context, target: &WorkspaceArgs, path: &str, file: &Path) -> Result<()> {
    let workspace = resolve_workspace(&ctx.registry, target);
    let status = ctx.registry.unpublish(&workspace, path, file)?;
    print_status(&status);
    Ok(())
}
