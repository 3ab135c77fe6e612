//! # Calculator CLI
//!
//! Line-oriented front end for `calc_core`. Pass an expression to evaluate
//! it once, or start without one for an interactive session.
//!
//! ```text
//! calc_cli "sin(30)+2^3"
//! calc_cli --mode programmer --base hex "FF+1"
//! calc_cli --history history.json
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use calc_core::history::load_history_or_default;
use calc_core::{
    load_settings, save_history, CalcError, CalculatorMode, Engine, EngineSettings, History,
    HistoryEntry, ProgrammerSession, Radix, ScientificSession,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Engineering,
    Programmer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BaseArg {
    Bin,
    Oct,
    Dec,
    Hex,
}

impl From<BaseArg> for Radix {
    fn from(base: BaseArg) -> Self {
        match base {
            BaseArg::Bin => Radix::Bin,
            BaseArg::Oct => Radix::Oct,
            BaseArg::Dec => Radix::Dec,
            BaseArg::Hex => Radix::Hex,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "calc_cli", version, about = "Scientific and programmer calculator")]
struct Args {
    /// Expression to evaluate; omit for an interactive session
    expression: Option<String>,

    /// Calculator to start in
    #[arg(long, value_enum, default_value_t = ModeArg::Engineering)]
    mode: ModeArg,

    /// Radix for programmer mode (defaults to the configured radix)
    #[arg(long, value_enum)]
    base: Option<BaseArg>,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON history file; calculations are recorded when given
    #[arg(long)]
    history: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Print a core error the same way for every failing command.
fn report_error(e: &CalcError) {
    eprintln!("Error: {}", e);
    if let Ok(json) = serde_json::to_string_pretty(e) {
        eprintln!();
        eprintln!("Error JSON:");
        eprintln!("{}", json);
    }
}

/// Both calculators behind one prompt.
struct Calculator {
    engine: Engine,
    mode: CalculatorMode,
    scientific: ScientificSession,
    programmer: ProgrammerSession,
    history: History,
    history_path: Option<PathBuf>,
    json: bool,
}

impl Calculator {
    fn new(args: &Args, settings: EngineSettings, history: History) -> Self {
        let radix = args.base.map(Radix::from).unwrap_or(settings.default_radix);
        let mode = match args.mode {
            ModeArg::Engineering => CalculatorMode::Engineering,
            ModeArg::Programmer => CalculatorMode::Programmer,
        };
        Calculator {
            engine: Engine::new(settings),
            mode,
            scientific: ScientificSession::new(),
            programmer: ProgrammerSession::new(radix),
            history,
            history_path: args.history.clone(),
            json: args.json,
        }
    }

    fn prompt(&self) -> String {
        match self.mode {
            CalculatorMode::Programmer => format!("[{}] > ", self.programmer.radix()),
            _ => "> ".to_string(),
        }
    }

    /// Evaluate one line in the current mode and print the result.
    /// Returns false when the result is a plain "Error".
    fn calculate(&mut self, line: &str) -> bool {
        let (entry, succeeded) = match self.mode {
            CalculatorMode::Programmer => {
                self.programmer.enter(line);
                let entry = self.programmer.calculate(&self.engine);
                self.print_result(self.programmer.result().as_str(), entry.as_ref());
                self.print_conversions();
                (entry, !self.programmer.result().is_plain_error())
            }
            _ => {
                self.scientific.enter(line);
                let entry = self.scientific.calculate(&self.engine);
                self.print_result(self.scientific.result().as_str(), entry.as_ref());
                (entry, !self.scientific.result().is_plain_error())
            }
        };

        if let Some(entry) = entry {
            self.record(entry);
        }
        succeeded
    }

    fn print_result(&self, result: &str, entry: Option<&HistoryEntry>) {
        if !self.json {
            println!("= {}", result);
            return;
        }
        let json = match entry {
            Some(entry) => serde_json::to_string_pretty(entry),
            None => serde_json::to_string_pretty(&serde_json::json!({ "result": result })),
        };
        if let Ok(json) = json {
            println!("{}", json);
        }
    }

    fn print_conversions(&self) {
        let conversions = self.programmer.conversions();
        if self.json {
            if let Ok(json) = serde_json::to_string_pretty(&conversions) {
                println!("{}", json);
            }
            return;
        }
        for conversion in conversions {
            println!("  {:<4} {}", conversion.radix.name(), conversion.text);
        }
    }

    fn record(&mut self, entry: HistoryEntry) {
        let Some(path) = self.history_path.clone() else {
            return;
        };
        self.history.add(entry);
        self.history.truncate(self.engine.settings().history_limit);
        if let Err(e) = save_history(&self.history, &path) {
            warn!(path = %path.display(), error = %e, "could not save history");
            report_error(&e);
        }
    }

    fn print_history(&self) {
        if self.history.is_empty() {
            println!("(history is empty)");
            return;
        }
        for (index, entry) in self.history.entries().iter().enumerate() {
            println!(
                "{:>3}. [{}] {} = {}",
                index + 1,
                entry.calculator_type.tag(),
                entry.expression,
                entry.result
            );
        }
    }

    /// Reopen the `n`th history entry (1-based) in its own calculator.
    fn recall(&mut self, number: &str) {
        let entry = number
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.history.entries().get(i))
            .cloned();
        let Some(entry) = entry else {
            println!("No history entry {}", number);
            return;
        };

        match entry.calculator_type {
            CalculatorMode::Programmer => {
                self.mode = CalculatorMode::Programmer;
                self.programmer.restore(&entry.expression, &self.engine);
                println!("{}", entry.expression);
                println!("= {}", self.programmer.result());
            }
            CalculatorMode::Engineering => {
                self.mode = CalculatorMode::Engineering;
                self.scientific.restore(&entry.expression, &self.engine);
                println!("{}", entry.expression);
                println!("= {}", self.scientific.result());
            }
            CalculatorMode::Graph => println!("Graph entries cannot be recalled here"),
        }
    }

    fn clear_history(&mut self) {
        self.history.clear();
        if let Some(path) = &self.history_path {
            if let Err(e) = save_history(&self.history, path) {
                report_error(&e);
                return;
            }
        }
        println!("History cleared");
    }

    /// Handle a `:command` line. Returns false when the session should end.
    fn command(&mut self, line: &str) -> bool {
        let mut parts = line.split_whitespace();
        let name = parts.next().unwrap_or("");
        let argument = parts.next();
        debug!(command = name, ?argument, "command");

        match (name, argument) {
            (":quit" | ":q" | ":exit", _) => return false,
            (":help", _) => print_help(),
            (":mode", Some("engineering")) => self.mode = CalculatorMode::Engineering,
            (":mode", Some("programmer")) => self.mode = CalculatorMode::Programmer,
            (":mode", _) => println!("Usage: :mode engineering|programmer"),
            (":base", Some(base)) => match Radix::from_name(base) {
                Some(radix) => {
                    self.programmer.change_base(radix);
                    println!("Base {} (input {})", radix, self.programmer.input());
                }
                None => println!("Unknown base '{}' (BIN, OCT, DEC or HEX)", base),
            },
            (":base", None) => println!("Base {}", self.programmer.radix()),
            (":convert", _) => self.print_conversions(),
            (":history", None) => self.print_history(),
            (":history", Some(number)) => self.recall(number),
            (":clear-history", _) => self.clear_history(),
            _ => println!("Unknown command '{}'; try :help", name),
        }
        true
    }

    fn run_interactive(&mut self) {
        println!("Calculator - engineering and programmer modes");
        println!("=============================================");
        println!("Type an expression, or :help for commands.");
        println!();

        let stdin = io::stdin();
        let mut input = stdin.lock();
        loop {
            print!("{}", self.prompt());
            if io::stdout().flush().is_err() {
                break;
            }

            let mut line = String::new();
            match input.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with(':') {
                if !self.command(line) {
                    break;
                }
            } else {
                self.calculate(line);
            }
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  :mode engineering|programmer   switch calculator");
    println!("  :base bin|oct|dec|hex          change programmer radix");
    println!("  :convert                       show the operand in every radix");
    println!("  :history [n]                   list history, or reopen entry n");
    println!("  :clear-history                 delete all history entries");
    println!("  :quit                          leave");
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging();

    let settings = match &args.config {
        Some(path) => match load_settings(path) {
            Ok(settings) => settings,
            Err(e) => {
                report_error(&e);
                return ExitCode::FAILURE;
            }
        },
        None => EngineSettings::default(),
    };

    let history = match &args.history {
        Some(path) => match load_history_or_default(path) {
            Ok(history) => history,
            Err(e) => {
                report_error(&e);
                return ExitCode::FAILURE;
            }
        },
        None => History::new(),
    };

    let mut calculator = Calculator::new(&args, settings, history);
    match &args.expression {
        Some(expression) if !calculator.calculate(expression) => ExitCode::FAILURE,
        Some(_) => ExitCode::SUCCESS,
        None => {
            calculator.run_interactive();
            ExitCode::SUCCESS
        }
    }
}
