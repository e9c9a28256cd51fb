//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// ModeShape server registry - manage the servers your tools publish to
#[derive(Parser, Debug)]
#[command(name = "msreg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (toml, json or yaml)
    #[arg(long, global = true, env = "MSREG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the registry file, overriding the configuration
    #[arg(long, global = true, env = "MSREG_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Identifies a server by its (URL, user) key.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServerArgs {
    /// Server URL, including an explicit port
    #[arg(long)]
    pub url: String,

    /// User name
    #[arg(long)]
    pub user: String,

    /// Password; falls back to the saved one for registered servers
    #[arg(long, env = "MODESHAPE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Identifies a workspace on a registered server.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceArgs {
    #[command(flatten)]
    pub server: ServerArgs,

    /// Repository name
    #[arg(long)]
    pub repo: String,

    /// Workspace name
    #[arg(long, short)]
    pub workspace: String,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List registered servers
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Register a server
    ///
    /// Examples:
    ///   msreg add --url http://localhost:8080/modeshape-rest --user admin
    ///   msreg add --url http://h:8080/rest --user admin --password secret --persist-password
    Add {
        #[command(flatten)]
        server: ServerArgs,

        /// Save the password (base64 encoded) in the registry file
        #[arg(long)]
        persist_password: bool,
    },

    /// Unregister a server
    Remove {
        /// Server URL
        #[arg(long)]
        url: String,

        /// User name
        #[arg(long)]
        user: String,
    },

    /// Change a registered server
    Update {
        /// URL of the registered server
        #[arg(long)]
        url: String,

        /// User of the registered server
        #[arg(long)]
        user: String,

        /// Replacement URL
        #[arg(long)]
        new_url: Option<String>,

        /// Replacement user
        #[arg(long)]
        new_user: Option<String>,

        /// Replacement password
        #[arg(long, env = "MODESHAPE_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Save the password in the registry file
        #[arg(long, conflicts_with = "forget_password")]
        persist_password: bool,

        /// Stop saving the password in the registry file
        #[arg(long)]
        forget_password: bool,
    },

    /// Check that a server answers, registered or not
    Ping {
        #[command(flatten)]
        server: ServerArgs,
    },

    /// List the repositories of a registered server
    Repos {
        #[command(flatten)]
        server: ServerArgs,
    },

    /// List the workspaces of a repository
    Workspaces {
        #[command(flatten)]
        server: ServerArgs,

        /// Repository name
        #[arg(long)]
        repo: String,
    },

    /// Upload a file into a workspace
    Publish {
        #[command(flatten)]
        target: WorkspaceArgs,

        /// Parent path inside the workspace
        #[arg(long, default_value = "/")]
        path: String,

        /// Make the uploaded node versionable
        #[arg(long)]
        versionable: bool,

        /// Local file to upload
        file: PathBuf,
    },

    /// Delete a previously published file from a workspace
    Unpublish {
        #[command(flatten)]
        target: WorkspaceArgs,

        /// Parent path inside the workspace
        #[arg(long, default_value = "/")]
        path: String,

        /// Local file whose remote copy is removed
        file: PathBuf,
    },

    /// Run a query against a workspace
    Query {
        #[command(flatten)]
        target: WorkspaceArgs,

        /// Query language
        #[arg(long, short, default_value = "JCR-SQL2")]
        language: String,

        /// Query statement
        statement: String,
    },
}
