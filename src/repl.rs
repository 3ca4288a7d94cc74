use rcalc::{Function, Mode};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper, Result as RlResult};
use std::borrow::Cow;
use std::sync::{Arc, Mutex};

use crate::cli::{print_help, Config, VERSION};
use crate::terminal::Session;

const PROMPT: &str = "rcalc> ";

const COMMANDS: [&str; 4] = [":mode", ":vars", ":help", ":quit"];

/// State shared between the REPL loop and the line-editor helper
struct SharedState {
    mode: Mode,
    /// Session variable names, for completion
    variables: Vec<String>,
}

impl SharedState {
    fn sync(&mut self, session: &Session) {
        self.mode = session.mode;
        self.variables = session.vars.keys().cloned().collect();
    }
}

struct CalcHelper {
    state: Arc<Mutex<SharedState>>,
}

impl CalcHelper {
    /// Candidates for the word ending at the cursor
    fn candidates(&self, prefix: &str) -> Vec<String> {
        if prefix.starts_with(':') {
            return COMMANDS
                .iter()
                .filter(|c| c.starts_with(prefix))
                .map(|c| c.to_string())
                .collect();
        }

        let lower = prefix.to_ascii_lowercase();
        let mut names: Vec<String> = Vec::new();
        if let Ok(state) = self.state.lock() {
            // Functions are unavailable in integer mode
            if state.mode != Mode::BigInt {
                names.extend(
                    Function::ALL
                        .iter()
                        .map(|f| f.name())
                        .filter(|n| n.starts_with(&lower))
                        .map(|n| format!("{}(", n)),
                );
            }
            names.extend(state.variables.iter().filter(|v| v.starts_with(&lower)).cloned());
        }
        names.sort();
        names
    }
}

/// Start of the identifier (or `:command`) ending at `pos`
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == ':'))
        .map(|i| i + 1)
        .unwrap_or(0)
}

impl Helper for CalcHelper {}

impl Completer for CalcHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = word_start(line, pos);
        let prefix = &line[start..pos];

        if prefix.is_empty() || prefix.starts_with(|c: char| c.is_ascii_digit()) {
            return Ok((start, Vec::new()));
        }

        let pairs: Vec<Pair> = self
            .candidates(prefix)
            .into_iter()
            .map(|c| Pair {
                display: c.clone(),
                replacement: c,
            })
            .collect();

        Ok((start, pairs))
    }
}

impl Hinter for CalcHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        // Only hint at the end of the line and for an unambiguous match
        if pos < line.len() {
            return None;
        }
        let start = word_start(line, pos);
        let prefix = &line[start..pos];
        if prefix.len() < 2 {
            return None;
        }
        match self.candidates(prefix).as_slice() {
            [only] if only.len() > prefix.len() => Some(only[prefix.len()..].to_string()),
            _ => None,
        }
    }
}

impl Highlighter for CalcHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }

    fn highlight_char(&self, _line: &str, _pos: usize) -> bool {
        false
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        // Dim the completion hint
        Cow::Owned(format!("\x1b[90m{}\x1b[0m", hint))
    }
}

impl Validator for CalcHelper {}

/// Handle a `:command` line. Returns false when the REPL should exit.
fn run_command(session: &mut Session, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(":quit") | Some(":q"), _) => return false,
        (Some(":help") | Some(":h"), _) => print_help(),
        (Some(":vars"), _) => {
            if session.vars.is_empty() {
                println!("No variables");
            } else {
                println!("{}", session.describe_vars());
            }
        }
        (Some(":mode"), None) => println!("{}", session.mode),
        (Some(":mode"), Some(name)) => match name.parse::<Mode>() {
            Ok(mode) => {
                session.mode = mode;
                println!("mode: {}", mode);
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        (Some(other), _) => eprintln!("Error: unknown command '{}' (try :help)", other),
        (None, _) => {}
    }
    true
}

/// Run the interactive loop until :quit, exit or Ctrl-D
pub(crate) fn run_repl(mut session: Session, config: &Config) -> RlResult<()> {
    let mut rl = Editor::new()?;

    let shared_state = Arc::new(Mutex::new(SharedState {
        mode: session.mode,
        variables: Vec::new(),
    }));
    rl.set_helper(Some(CalcHelper {
        state: Arc::clone(&shared_state),
    }));

    // Show banner only if RCALC_BANNER=1
    if config.banner {
        println!("rcalc {} - {} mode", VERSION, session.mode);
        println!("  Type ':help' for usage, 'exit' or Ctrl-D to quit");
    }

    loop {
        if let Ok(mut state) = shared_state.lock() {
            state.sync(&session);
        }

        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                if trimmed == "exit" {
                    break;
                }
                if trimmed.starts_with(':') {
                    if !run_command(&mut session, trimmed) {
                        break;
                    }
                    continue;
                }

                match session.execute_line(trimmed) {
                    Ok(output) => println!("{}", output),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C drops the current line
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
