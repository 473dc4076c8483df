// ABOUTME: CLI entry point: load a .rkt file, interpret it, print the results

use clap::Parser;
use racketlet::source::SourceFile;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Tree-walking interpreter for a pocket-sized Racket dialect
#[derive(Parser, Debug)]
#[command(name = "racketlet")]
#[command(version)]
#[command(about = "A tree-walking interpreter for a pocket-sized Racket dialect")]
struct CliArgs {
    /// Racket source file to evaluate (.rkt)
    #[arg(value_name = "FILE")]
    script: PathBuf,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args.script) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(path: &Path) -> Result<(), racketlet::error::Error> {
    let source = SourceFile::load(path)?;
    for value in racketlet::interpret(&source)? {
        println!("{}", value);
    }
    Ok(())
}
