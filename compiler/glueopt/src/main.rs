// SPDX-License-Identifier: PMPL-1.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell

//! glueopt command-line interface.

use clap::Parser;
use glueopt::{process, Options};
use miette::{Context, IntoDiagnostic};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glueopt")]
#[command(author, version, about = "AST-level post-optimizer for wasm JS glue")]
struct Cli {
    /// Input file
    #[arg(value_name = "FILE")]
    infile: PathBuf,

    /// Passes to apply, in order
    #[arg(value_name = "PASS")]
    passes: Vec<String>,

    /// Keep comments attached through the printer
    #[arg(long)]
    closure_friendly: bool,

    /// Parse the input as an ES module
    #[arg(long)]
    export_es6: bool,

    /// Trace notes to stderr
    #[arg(long)]
    verbose: bool,

    /// Skip printing the transformed program
    #[arg(long)]
    no_print: bool,

    /// Emit whitespace-minified output
    #[arg(long)]
    minify_whitespace: bool,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long)]
    outfile: Option<PathBuf>,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let source = std::fs::read_to_string(&cli.infile)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", cli.infile.display()))?;

    let options = Options {
        passes: cli.passes,
        closure_friendly: cli.closure_friendly,
        export_es6: cli.export_es6,
        verbose: cli.verbose,
        no_print: cli.no_print,
        minify_whitespace: cli.minify_whitespace,
    };

    let output = process(&source, &options)?;

    for block in &output.stdout {
        println!("{block}");
    }

    if let Some(printed) = output.printed {
        match &cli.outfile {
            Some(path) => {
                std::fs::write(path, printed)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            }
            None => print!("{printed}"),
        }
    }

    Ok(())
}
