use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use refjson::cli::{self, CheckOptions, CheckResult, CliError, OutputFormat};
use refjson::{Edition, Mode};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "refjson")]
#[command(about = "refjson - JSON5 with editions and internal references")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Full,
    Json5,
    Json,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Full => Mode::Full,
            ModeArg::Json5 => Mode::Json5Only,
            ModeArg::Json => Mode::StrictJson,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document, resolve its references and print the result
    Check {
        /// Document file (reads --input or stdin if not provided)
        file: Option<PathBuf>,

        /// Document text
        #[arg(short, long, conflicts_with = "file")]
        input: Option<String>,

        /// Edition year; any year resolves to the nearest edition below it
        #[arg(short, long, allow_negative_numbers = true)]
        edition: Option<i64>,

        #[arg(short, long, value_enum, default_value = "full")]
        mode: ModeArg,

        /// Reject integers above 2^53 - 1 instead of promoting them to BigInt
        #[arg(long)]
        strict_bigint: bool,

        /// Reject legacy octal literals such as 0755
        #[arg(long)]
        strict_octal: bool,

        /// Treat bare identifiers in value position as errors
        #[arg(long)]
        no_references: bool,

        /// Report every syntax error instead of the first
        #[arg(long)]
        tolerant: bool,

        /// Only validate syntax, don't resolve references
        #[arg(long)]
        syntax_only: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Print JSON5 instead of strict JSON
        #[arg(long)]
        json5: bool,
    },

    /// Report the syntax features a document uses
    Features {
        /// Document file (reads stdin if not provided)
        file: Option<PathBuf>,
    },

    /// Show which literal forms each edition accepts
    Editions,

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'refjson docs' to list categories)
        category: String,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            file,
            input,
            edition,
            mode,
            strict_bigint,
            strict_octal,
            no_references,
            tolerant,
            syntax_only,
            pretty,
            json5,
        } => read_input(file, input).and_then(|input| {
            let output_edition = edition.map_or_else(Edition::default, Edition::resolve);
            run_check(CheckOptions {
                input,
                edition,
                mode: mode.into(),
                strict_bigint,
                strict_octal,
                no_references,
                tolerant,
                syntax_only,
                format: OutputFormat::new(pretty, json5, output_edition),
            })
        }),
        Commands::Features { file } => read_input(file, None).and_then(|input| {
            let report = cli::execute_features(input.as_deref())?;
            println!("{}", report);
            Ok(())
        }),
        Commands::Editions => {
            print!("{}", cli::editions_table());
            Ok(())
        }
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; `REFJSON_LOG` takes precedence over `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("REFJSON_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(file: Option<PathBuf>, input: Option<String>) -> Result<Option<String>, CliError> {
    if let Some(path) = file {
        return Ok(Some(fs::read_to_string(path)?));
    }
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn run_check(options: CheckOptions) -> Result<(), CliError> {
    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => println!("{}", output),
    }
    Ok(())
}
