//! CLI wrapper for the literal tracer.
//!
//! Usage:
//!   literal_tracer trace <file.js> [--line L --column C]
//!   literal_tracer elements <file.js> --line L
//!   literal_tracer execute <file.js> --line L --until K
//!   literal_tracer context <file.js> --line L

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde::Serialize;

use literal_tracer::parser::ast::Position;
use literal_tracer::{Session, SessionError, TracerConfig};

#[derive(Parser)]
#[command(name = "literal_tracer")]
#[command(version)]
#[command(about = "Static values and call-chain replay for JavaScript snippets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with interpreter limits and method aliases
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log tracing decisions to stderr
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the bindings visible at a position
    Trace {
        file: PathBuf,
        #[arg(short, long, default_value_t = 1)]
        line: usize,
        #[arg(short, long, default_value_t = 0)]
        column: usize,
    },
    /// Print the call-chain elements of a source line with traced values
    Elements {
        file: PathBuf,
        #[arg(short, long)]
        line: usize,
    },
    /// Replay the call chain of a source line up to a step
    Execute {
        file: PathBuf,
        #[arg(short, long)]
        line: usize,
        #[arg(short, long)]
        until: usize,
    },
    /// Print where the names used on a source line were set up
    Context {
        file: PathBuf,
        #[arg(short, long)]
        line: usize,
    },
}

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let logger = Box::new(StderrLogger { level });
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}

fn read_source(file: &PathBuf) -> String {
    match fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", file.display(), e);
            process::exit(1);
        }
    }
}

fn source_line(source: &str, line: usize) -> &str {
    match source.lines().nth(line.saturating_sub(1)) {
        Some(text) => text,
        None => {
            eprintln!("Line {} is past the end of the file", line);
            process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize result: {}", e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<(), SessionError> {
    let config = match &cli.config {
        Some(path) => TracerConfig::load(path)?,
        None => TracerConfig::default(),
    };
    let mut session = Session::with_config(config)?;

    match cli.command {
        Commands::Trace { file, line, column } => {
            let source = read_source(&file);
            let assignments = session.trace(&source, Position::new(line, column))?;
            print_json(&assignments);
        }
        Commands::Elements { file, line } => {
            let source = read_source(&file);
            session.trace(&source, Position::new(line, 0))?;
            print_json(&session.elements_for_line(source_line(&source, line))?);
        }
        Commands::Execute { file, line, until } => {
            let source = read_source(&file);
            session.trace(&source, Position::new(line, 0))?;
            print_json(&session.execute_line_until(source_line(&source, line), until)?);
        }
        Commands::Context { file, line } => {
            let source = read_source(&file);
            let context = session.context_for_position_in_source(Position::new(line, 0), &source)?;
            print_json(&context);
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli) {
        if log::log_enabled!(Level::Debug) {
            eprintln!("Error: {:?}", e);
        } else {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}
