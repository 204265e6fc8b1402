//! EchoChat CLI entry point.
//!
//! Binary name: `echochat`
//!
//! Parses CLI arguments, wires the session store, remote gateway and
//! inference client, dispatches to the command handler, and waits for
//! background remote mirrors before exiting.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli);

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "echochat", &mut std::io::stdout());
        return Ok(());
    }

    let mut state = AppState::init(cli.data_dir.as_deref(), cli.ephemeral).await?;

    let result = dispatch(&mut state, &cli).await;

    // Mirrors run in the background; let them land before the runtime stops.
    state.shutdown(cli.quiet || cli.json).await;

    result
}

/// Install the tracing subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_tracing(cli: &Cli) {
    let level = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,echochat_core=debug,echochat_infra=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn dispatch(state: &mut AppState, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Chat { session } => {
            cli::chat::loop_runner::run_chat_loop(state, session.as_deref()).await?;
        }

        Commands::Send { message, session } => {
            cli::send::send_message(state, message, session.as_deref(), cli.json).await?;
        }

        Commands::Sessions => {
            cli::session::list_sessions(state, cli.json).await?;
        }

        Commands::Show { id } => {
            cli::session::show_session(state, id, cli.json).await?;
        }

        Commands::New => {
            cli::session::new_session(state, cli.json).await?;
        }

        Commands::Delete { id, force } => {
            cli::session::delete_session(state, id, *force, cli.json).await?;
        }

        Commands::Models => {
            cli::models::list_models(state, cli.json)?;
        }

        Commands::Status => {
            cli::status::status(state, cli.json).await?;
        }

        Commands::ResetLocal { force } => {
            cli::session::reset_local(state, *force, cli.json)?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
