#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Write};

use closurize::cli::args::CliArgs;
use closurize::cli::{driver, reporter::Reporter};

const EXIT_SUCCESS: i32 = 0;
const EXIT_ERRORS: i32 = 1;

fn main() -> Result<()> {
    // Initialize tracing if CLOSURIZE_LOG or RUST_LOG is set.
    closurize::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;

    let result = driver::run(&args, &cwd)?;

    if args.out_dir.is_none() {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let printed: Vec<_> = result.outputs.iter().filter(|o| o.text.is_some()).collect();
        for output in &printed {
            if printed.len() > 1 {
                writeln!(out, "// {}", output.file_name)?;
            }
            if let Some(text) = &output.text {
                out.write_all(text.as_bytes())?;
            }
        }
        out.flush()?;
    }

    if !result.diagnostics.is_empty() {
        let pretty = args
            .pretty
            .unwrap_or_else(|| std::io::stderr().is_terminal());
        let mut reporter = Reporter::new(pretty);
        for (file, text) in &result.sources {
            reporter.add_source(file, text.clone());
        }
        eprint!("{}", reporter.render(&result.diagnostics));
        eprintln!("{}", reporter.summary(&result.diagnostics));
    }

    if result.has_errors() {
        std::process::exit(EXIT_ERRORS);
    }
    std::process::exit(EXIT_SUCCESS);
}
