use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing::warn;

use gitkeeper::cli::commands::login::LoginCommand;
use gitkeeper::cli::commands::remote::{
    AccessCommandRunner, AccountCommandRunner, AdminCommandRunner, RepoCommandRunner, UserCommandRunner,
};
use gitkeeper::cli::commands::tracked::TrackedCommandRunner;
use gitkeeper::cli::commands::{Command, ConnectionArgs, Context};
use gitkeeper::cli::{Cli, Commands};
use gitkeeper::{init_telemetry, CommandError, Settings};

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", describe(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // A broken .env should not stop the tool; it is reported once logging is up
    let env_file = Settings::load_env_file();
    let mut settings = Settings::load()?;
    if let Some(store) = cli.store {
        settings.store_path = store;
    }
    init_telemetry(&settings.log)?;
    if let Err(e) = env_file {
        warn!(error = %e, "Ignoring .env file");
    }

    let connection = ConnectionArgs {
        host: cli.host,
        port: cli.port,
        login: cli.login,
        password: cli.password,
    };
    let ctx = Context::new(settings, connection, cli.json);

    match &cli.command {
        Commands::Login => LoginCommand::new(&ctx).execute(),
        Commands::User { command } => UserCommandRunner::new(&ctx, command).execute(),
        Commands::Repo { command } => RepoCommandRunner::new(&ctx, command).execute(),
        Commands::Access { command } => AccessCommandRunner::new(&ctx, command).execute(),
        Commands::Admin { command } => AdminCommandRunner::new(&ctx, command).execute(),
        Commands::Account { command } => AccountCommandRunner::new(&ctx, command).execute(),
        Commands::Tracked { command } => TrackedCommandRunner::new(&ctx, command).execute(),
    }
}

/// Remote failures get their descriptive message, everything else the chain
fn describe(error: &anyhow::Error) -> String {
    match error.downcast_ref::<CommandError>() {
        Some(command_error) => command_error.describe(),
        None => format!("{error:#}"),
    }
}
