use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use latchkey::{bootstrap, shell};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Shell(shell::Command),
    Eval,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose > 0 {
        "latchkey=debug"
    } else {
        "latchkey=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("initialized, ready");

    match &cli.command {
        Some(Commands::Shell(cmd)) => shell::execute_command(cmd),
        Some(Commands::Eval) => {
            let mut world = bootstrap::new_game()?;
            for line in bootstrap::walkthrough() {
                println!("> {}", line);
                println!("{}", world.handle_command(line));
            }
            Ok(())
        }
        None => shell::execute_command(&shell::Command::default()),
    }
}
