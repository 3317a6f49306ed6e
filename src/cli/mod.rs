use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "gitkeeper")]
#[command(about = "Administer users, repositories and access on a git host over SSH")]
#[command(long_about = "gitkeeper runs administrative commands on a git host through SSH and keeps \
                       track of your local clones. Connection settings default to the last \
                       successful login; start with 'gitkeeper login'.")]
pub struct Cli {
    /// Remote host name
    #[arg(long, global = true)]
    pub host: Option<String>,
    /// SSH port
    #[arg(long, short = 'P', global = true)]
    pub port: Option<u16>,
    /// Account login
    #[arg(long, short = 'l', global = true)]
    pub login: Option<String>,
    /// Account password
    #[arg(long, env = "GITKEEPER_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
    /// Override the configuration store location
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check credentials, show the account role and remember the connection
    Login,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommand,
    },
    /// Manage remote repositories
    Repo {
        #[command(subcommand)]
        command: RepoCommand,
    },
    /// Grant or revoke repository access
    Access {
        #[command(subcommand)]
        command: AccessCommand,
    },
    /// Promote or demote administrators
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Commands for the logged-in account
    Account {
        #[command(subcommand)]
        command: AccountCommand,
    },
    /// Locally tracked clones
    Tracked {
        #[command(subcommand)]
        command: TrackedCommand,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create { login: String, password: String },
    /// Delete a user
    Delete { login: String },
    /// List users with their roles
    List,
    /// Set another user's password
    Passwd { login: String, password: String },
}

#[derive(Subcommand)]
pub enum RepoCommand {
    /// Create a repository
    Create { repo: String },
    /// Delete a repository
    Delete { repo: String },
    /// List repositories
    List,
}

#[derive(Subcommand)]
pub enum AccessCommand {
    /// Allow a user to access a repository
    Allow { login: String, repo: String },
    /// Revoke a user's access to a repository
    Deny { login: String, repo: String },
    /// Repositories a user can access
    List { login: String },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Make a user an administrator
    Promote { login: String },
    /// Revoke administrator rights
    Demote { login: String },
}

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Change your own password
    Passwd { new_password: String },
    /// Repositories you can access
    Repos,
    /// Your role on the host
    Role,
}

#[derive(Subcommand)]
pub enum TrackedCommand {
    /// List tracked clones
    List,
    /// Track an existing clone
    Add {
        /// Path to the clone
        path: PathBuf,
        /// Name to track it under (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Stop tracking clones by name
    Remove {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Track every clone found directly under a directory
    Scan { dir: PathBuf },
}
