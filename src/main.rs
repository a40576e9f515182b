use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::ast_printer::AstPrinter;
use rox::interpreter::{Interpreter, DEFAULT_MAX_CALL_DEPTH};
use rox::parser::Parser;
use rox::scanner::{scan_tokens, Scanner};
use rox::{Outcome, Session, StderrReporter};

#[derive(ClapParser, Debug)]
#[command(version, about = "Rox: a tree-walking Lox interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Option<Commands>,

    /// Enable logging to a file (app.log unless --log-file is given)
    #[arg(long, global = true)]
    log: bool,

    /// Where --log writes
    #[arg(long, global = true, value_name = "PATH", default_value = "app.log")]
    log_file: PathBuf,

    /// Nested calls allowed before a program fails with "Stack overflow."
    #[arg(long, global = true, value_name = "N", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print tokens as JSON, one per line
        #[arg(long)]
        json: bool,
    },

    /// Parses a program and prints its AST
    Parse {
        filename: Option<PathBuf>,

        /// Print the AST as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a program (starts the REPL without a file)
    Run { filename: Option<PathBuf> },

    /// Interactive prompt; definitions persist between lines
    Repl,
}

/// Source bytes, memory‑mapped when the file is non‑empty.
enum SourceBuf {
    Mapped(Mmap),
    Empty,
}

impl SourceBuf {
    fn as_bytes(&self) -> &[u8] {
        match self {
            SourceBuf::Mapped(map) => &map[..],
            SourceBuf::Empty => &[],
        }
    }
}

/// Maps a file read‑only.
fn read_file(filename: &Path) -> Result<SourceBuf> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).with_context(|| format!("Failed to open file {:?}", filename))?;

    let len: u64 = file
        .metadata()
        .with_context(|| format!("Failed to stat file {:?}", filename))?
        .len();

    if len == 0 {
        return Ok(SourceBuf::Empty);
    }

    // SAFETY: the mapping is read-only and only lives for this run; the file
    // is not expected to be truncated underneath us.
    let map: Mmap = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    info!("Mapped {} bytes from {:?}", len, filename);

    Ok(SourceBuf::Mapped(map))
}

fn init_logger(path: &Path) -> Result<()> {
    let log_file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;

    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("rox::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{} {}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug);

    // RUST_LOG overrides the default level
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

fn no_input() -> ! {
    info!("No filepath provided");
    println!("No input filepath was provided. Exiting...");
    std::process::exit(0);
}

fn exit_with(outcome: Outcome) {
    if !outcome.is_success() {
        debug!("Exiting with {:?}", outcome);
        std::process::exit(outcome.exit_code());
    }
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    let source = read_file(filename)?;
    let mut tokenized = true;

    for token in Scanner::new(source.as_bytes()) {
        match token {
            Ok(token) if json => println!("{}", serde_json::to_string(&token)?),

            Ok(token) => println!("{}", token),

            Err(e) => {
                tokenized = false;
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        exit_with(Outcome::SyntaxError);
    }

    Ok(())
}

fn parse(filename: &Path, json: bool) -> Result<()> {
    let source = read_file(filename)?;
    let mut reporter = StderrReporter;

    let (tokens, lex_error) = scan_tokens(source.as_bytes(), &mut reporter);
    let (statements, parse_error) = Parser::new(tokens, &mut reporter).parse();

    if lex_error || parse_error {
        exit_with(Outcome::SyntaxError);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&statements)?);
    } else {
        println!("{}", AstPrinter::print_program(&statements));
    }

    Ok(())
}

fn repl(session: &mut Session) -> Result<()> {
    info!("Starting REPL");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line: String = line.context("Failed to read from stdin")?;

        let outcome: Outcome = session.run(line.as_bytes(), &mut StderrReporter);
        debug!("REPL line finished: {:?}", outcome);
    }

    println!();
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger(&args.log_file)?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let interpreter = Interpreter::new().with_max_call_depth(args.max_call_depth);
    let mut session = Session::with_interpreter(interpreter);

    match args.commands {
        Some(Commands::Tokenize { filename, json }) => match filename {
            Some(filename) => tokenize(&filename, json)?,
            None => no_input(),
        },

        Some(Commands::Parse { filename, json }) => match filename {
            Some(filename) => parse(&filename, json)?,
            None => no_input(),
        },

        Some(Commands::Evaluate { filename }) => match filename {
            Some(filename) => {
                let source = read_file(&filename)?;

                match session.evaluate(source.as_bytes(), &mut StderrReporter) {
                    Ok(value) => println!("{}", value),
                    Err(outcome) => exit_with(outcome),
                }
            }
            None => no_input(),
        },

        Some(Commands::Run {
            filename: Some(filename),
        }) => {
            let source = read_file(&filename)?;
            let outcome: Outcome = session.run(source.as_bytes(), &mut StderrReporter);

            info!("Run finished: {:?}", outcome);
            exit_with(outcome);
        }

        Some(Commands::Run { filename: None }) | Some(Commands::Repl) | None => {
            repl(&mut session)?
        }
    }

    Ok(())
}
