//! Command implementations for modeshape-cli

pub mod browse;
pub mod publish;
pub mod servers;

pub use browse::{run_query, run_repos, run_workspaces};
pub use publish::{run_publish, run_unpublish};
pub use servers::{run_add, run_list, run_ping, run_remove, run_update};

use colored::Colorize;
use modeshape_registry::{Repository, Server, ServerRegistry, Severity, Status, Workspace};

use crate::cli::{ServerArgs, WorkspaceArgs};

/// Print a status line, with any details indented below it.
///
/// Warnings and errors go to stderr so `--json` output stays clean.
pub fn print_status(status: &Status) {
    let label = match status.severity() {
        Severity::Ok => "ok".green().bold(),
        Severity::Info => "info".cyan().bold(),
        Severity::Warning => "warning".yellow().bold(),
        Severity::Error => "error".red().bold(),
    };

    if status.severity() >= Severity::Warning {
        eprintln!("{}: {}", label, status.message());
        for detail in status.details() {
            eprintln!("  - {}", detail);
        }
    } else {
        println!("{}: {}", label, status.message());
        for detail in status.details() {
            println!("  - {}", detail);
        }
    }
}

/// Build the server named by `args`, taking the saved password when none
/// was given on the command line.
pub(crate) fn resolve_server(registry: &ServerRegistry, args: &ServerArgs) -> Server {
    let stored = registry.find_server(&args.url, &args.user);
    let password = args
        .password
        .clone()
        .or_else(|| stored.as_ref().and_then(|s| s.password().map(str::to_string)));
    let persist = stored.is_some_and(|s| s.persist_password());
    Server::new(args.url.clone(), args.user.clone(), password, persist)
}

pub(crate) fn resolve_workspace(registry: &ServerRegistry, args: &WorkspaceArgs) -> Workspace {
    let server = resolve_server(registry, &args.server);
    Workspace::new(args.workspace.clone(), Repository::new(args.repo.clone(), server))
}

#[cfg(test)]
mod tests {
    use super::*;
    use modeshape_test_utils::MockRestDelegate;
    use std::sync::Arc;

    fn args(password: Option<&str>) -> ServerArgs {
        ServerArgs {
            url: "http://h:8080".into(),
            user: "admin".into(),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_resolve_uses_saved_password() {
        let registry = ServerRegistry::new(Arc::new(MockRestDelegate::new()));
        registry
            .add_server(Server::new("http://h:8080", "admin", Some("saved".into()), true))
            .unwrap();

        let server = resolve_server(&registry, &args(None));
        assert_eq!(server.password(), Some("saved"));
        assert!(server.persist_password());

        let server = resolve_server(&registry, &args(Some("given")));
        assert_eq!(server.password(), Some("given"));
    }

    #[test]
    fn test_resolve_unregistered_server() {
        let registry = ServerRegistry::new(Arc::new(MockRestDelegate::new()));
        let server = resolve_server(&registry, &args(None));
        assert_eq!(server.password(), None);
        assert!(!registry.is_registered(&server));
    }

    #[test]
    fn test_resolve_workspace_scopes_names() {
        let registry = ServerRegistry::new(Arc::new(MockRestDelegate::new()));
        let target = WorkspaceArgs {
            server: args(Some("pw")),
            repo: "sample".into(),
            workspace: "default".into(),
        };
        let workspace = resolve_workspace(&registry, &target);
        assert_eq!(workspace.name(), "default");
        assert_eq!(workspace.repository().name(), "sample");
        assert_eq!(workspace.server().user(), "admin");
    }
}
