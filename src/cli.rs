use log::warn;
use rcalc::Mode;
use std::env;

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parsed command-line arguments
#[derive(Debug, Default)]
pub(crate) struct CliArgs {
    pub(crate) command: Option<String>,
    pub(crate) mode: Option<Mode>,
    /// Raw `name=expr` assignments from -v, applied in order
    pub(crate) vars: Vec<String>,
    pub(crate) help: bool,
    pub(crate) version: bool,
}

/// Parse command-line arguments
pub(crate) fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();

    let mut i = 1; // Skip program name
    while i < args.len() {
        match args[i].as_str() {
            "-c" => {
                // Everything after -c is the expression
                if i + 1 < args.len() {
                    cli.command = Some(args[i + 1..].join(" "));
                    break;
                }
                return Err("-c requires an expression".to_string());
            }
            "-m" | "--mode" => {
                i += 1;
                let value = args.get(i).ok_or("--mode requires a value")?;
                cli.mode = Some(value.parse()?);
            }
            "-v" | "--var" => {
                i += 1;
                let value = args.get(i).ok_or("--var requires name=value")?;
                if !value.contains('=') {
                    return Err(format!("--var expects name=value, got '{}'", value));
                }
                cli.vars.push(value.clone());
            }
            "--help" | "-h" => {
                cli.help = true;
            }
            "--version" | "-V" => {
                cli.version = true;
            }
            other => {
                return Err(format!("unknown argument '{}' (try --help)", other));
            }
        }
        i += 1;
    }

    Ok(cli)
}

/// Startup settings read from the environment
#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) mode: Mode,
    pub(crate) banner: bool,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        let mode = match env::var("RCALC_MODE") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                warn!("RCALC_MODE: {}, using {}", e, Mode::default());
                Mode::default()
            }),
            Err(_) => Mode::default(),
        };
        let banner = env::var("RCALC_BANNER").map(|v| v == "1").unwrap_or(false);
        Config { mode, banner }
    }
}

pub(crate) fn print_help() {
    println!(
        r#"rcalc {} - infix expression calculator

USAGE:
    rcalc                       Start interactive REPL
    rcalc -c <expr...>          Evaluate one expression and exit
    rcalc -m, --mode <mode>     Numeric mode: float, int or decimal
    rcalc -v, --var name=expr   Define a variable (repeatable)
    rcalc --help                Show this help message
    rcalc --version             Show version

MODES:
    float                   64-bit floating point (default)
    int                     Arbitrary-precision integers; no '.', '^' or functions
    decimal                 50 significant digits

SYNTAX:
    + - * /                 Arithmetic (x and : also multiply and divide)
    ^                       Power, right-associative: 2^3^2 = 512
    n!                      Factorial
    ( )                     Grouping
    sin cos tan cot         Trigonometry (radians)
    asin acos atan sinh     Inverse and hyperbolic
    log exp sqrt            Natural log, e^x, square root

REPL:
    name = expr             Store a session variable
    ans                     Result of the previous line
    :mode [mode]            Show or switch the numeric mode
    :vars                   List session variables
    :help                   Show this help
    :quit, exit             Leave the REPL

ENVIRONMENT:
    RCALC_MODE              Default mode when --mode is absent
    RCALC_LOG               Log level: error, warn, info, debug, trace
    RCALC_BANNER=1          Show startup banner"#,
        VERSION
    );
}

pub(crate) fn print_version() {
    println!("rcalc {}", VERSION);
}
