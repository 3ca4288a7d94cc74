//! rcalc - infix expression calculator
//!
//! Usage:
//!   rcalc                 Start interactive REPL
//!   rcalc -c "expr"       Evaluate a single expression
//!   rcalc -m int -c "2^64" ...

mod cli;
mod logger;
mod repl;
mod terminal;

use cli::{parse_args, print_help, print_version, Config};
use repl::run_repl;
use std::env;
use std::process::ExitCode;
use terminal::Session;

fn main() -> ExitCode {
    logger::init();

    let args: Vec<String> = env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if cli.version {
        print_version();
        return ExitCode::SUCCESS;
    }

    // Flags override the environment
    let config = Config::from_env();
    let mut session = Session::new(cli.mode.unwrap_or(config.mode));

    for assignment in &cli.vars {
        if let Err(e) = session.execute_line(assignment) {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if let Some(expr) = cli.command {
        return execute_command(&mut session, &expr);
    }

    match run_repl(session, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("REPL error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Evaluate a single expression and print the result
fn execute_command(session: &mut Session, expr: &str) -> ExitCode {
    match session.execute_line(expr) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
