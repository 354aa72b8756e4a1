use clap::Parser;
use minish_core::prelude::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::HashMap;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// minish - interactive file shell with trash-backed undo
#[derive(Parser, Debug)]
#[command(name = "minish", version, about)]
struct Args {
    /// History file (default: .history in the start directory)
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Trash directory (default: .trash in the start directory)
    #[arg(long)]
    trash_dir: Option<PathBuf>,

    /// Operation log (default: shell.log in the start directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Execute one command and exit
    #[arg(short = 'c')]
    command: Option<String>,
}

/// Reads the answer to a confirmation question from stdin.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        print!("{question}");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(err) => {
                log::warn!("could not read confirmation: {err}");
                false
            }
        }
    }
}

fn build_config(args: &Args) -> io::Result<ShellConfig> {
    let environ: HashMap<String, String> = env::vars().collect();
    let mut config = ShellConfig::from_environ(env::current_dir()?, &environ);
    if let Some(path) = &args.history_file {
        config.history_file = path.clone();
    }
    if let Some(path) = &args.trash_dir {
        config.trash_dir = path.clone();
    }
    if let Some(path) = &args.log_file {
        config.log_file = path.clone();
    }
    Ok(config)
}

fn repl(shell: &mut Shell) -> std::result::Result<(), ReadlineError> {
    let mut editor = DefaultEditor::new()?;
    println!("minish {}. Type 'help' for help, 'exit' to quit.", env!("CARGO_PKG_VERSION"));

    loop {
        let prompt = format!("{} $ ", shell.current_dir().display());
        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if let Err(err) = editor.add_history_entry(line) {
                    log::debug!("could not record line in editor history: {err}");
                }

                let output = shell.execute(line);
                println!("{output}");
                if output.command == Some(CommandKind::Exit) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("\nExiting...");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

fn run() -> i32 {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("minish: cannot determine current directory: {err}");
            return 1;
        }
    };
    let mut shell = match Shell::open(config, StdinConfirm) {
        Ok(shell) => shell,
        Err(err) => {
            eprintln!("minish: {err}");
            return 1;
        }
    };

    if let Some(command) = args.command {
        let output = shell.execute(&command);
        println!("{output}");
        return if output.success { 0 } else { 1 };
    }

    match repl(&mut shell) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("minish: terminal error: {err}");
            1
        }
    }
}

fn main() {
    std::process::exit(run());
}
