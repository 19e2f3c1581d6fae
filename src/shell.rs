use anyhow::Result;
use clap::Args;
use rustyline::error::ReadlineError;
use rustyline::Editor;
use std::path::PathBuf;

use crate::bootstrap;

#[derive(Debug, Args)]
pub struct Command {
    #[arg(short = 'H', long, default_value = "history.txt")]
    history: PathBuf,
}

impl Default for Command {
    fn default() -> Self {
        Self {
            history: PathBuf::from("history.txt"),
        }
    }
}

pub fn execute_command(cmd: &Command) -> Result<()> {
    let mut world = bootstrap::new_game()?;

    let mut rl = Editor::<()>::new()?;
    if rl.load_history(&cmd.history).is_err() {
        println!("No previous history.");
    }
    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                rl.add_history_entry(line.as_str());
                println!("{}", world.handle_command(&line));
            }
            Err(ReadlineError::Interrupted) => {
                println!("ctrl-c");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("ctrl-d");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(rl.save_history(&cmd.history)?)
}
