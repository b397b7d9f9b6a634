use clap::Parser;
use either::Either;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod data;
mod driver;
mod expand;
mod macros;
mod scanner;
mod stream;

use data::*;
use macros::MacroTable;

/// Turns comment macros such as `/*log x*/` into executable statements.
///
/// Declared macros expand as `{stuff;}`, or `{target(stuff);}` when declared
/// as `name:target`. A condition written directly after the name, as in
/// `/*name(cond) stuff*/`, wraps the block in `if (cond)`.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Active macros, each `name` or `name:target`.
    #[arg(value_name = "MACRO")]
    macros: Vec<String>,

    /// Line written as a `//` comment at the top of the output.
    #[arg(short, long, value_name = "TEXT")]
    comment: Vec<String>,

    /// Input file path. Reads stdin when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file path. Writes stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(line = e.line(), "run aborted");
            eprintln!("jsdev: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Installs a stderr subscriber when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run(args: &Args) -> Result<()> {
    let table = MacroTable::from_specs(&args.macros)?;

    if let (Some(input), Some(output)) = (&args.input, &args.output) {
        if same_file(input, output) {
            return Err(config_error("input and output files must differ"));
        }
    }

    let input = match &args.input {
        Some(path) => Either::Left(File::open(path).map_err(|e| open_error(path, e))?),
        None => Either::Right(io::stdin().lock()),
    };
    let output = match &args.output {
        Some(path) => Either::Left(File::create(path).map_err(|e| open_error(path, e))?),
        None => Either::Right(io::stdout().lock()),
    };
    let mut output = BufWriter::new(output);

    write_banner(&mut output, &args.comment)?;
    driver::transform(input, output, &table)?;
    Ok(())
}

fn write_banner<W: Write>(output: &mut W, comments: &[String]) -> Result<()> {
    for comment in comments {
        writeln!(output, "// {}", comment)
            .map_err(|source| JsDevError::Io { line: None, source })?;
    }
    Ok(())
}

/// Compares paths as given, then as resolved when both exist.
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn config_error(msg: &str) -> JsDevError {
    JsDevError::Config {
        arg: msg.to_string(),
    }
}

fn open_error(path: &Path, e: io::Error) -> JsDevError {
    config_error(&format!("{}: {}", path.display(), e))
}
