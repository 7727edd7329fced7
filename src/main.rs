//! # `lmc` CLI
//!
//! Reads a `.man` assembly file or a `.script` source file, lowers it to a
//! word vector, and runs it to completion on the VM. Extension dispatch
//! decides which front end handles the file; everything downstream of that
//! (loading, running, printing output) is shared.
//!
//! Grounded in the teacher's `main.rs` (read file -> run each stage ->
//! report errors to stderr), enriched with `clap` for argument parsing and
//! `env_logger`/`log` for the ambient debug logging described in the
//! design, neither of which the teacher's zero-dependency binary needed.

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use lmc_toolchain::vm::{Machine, QueueInput};
use lmc_toolchain::{assembler, script, CoreError};

/// Assemble or compile an LMC program and run it.
#[derive(Parser, Debug)]
#[command(name = "lmc", version, about)]
struct Cli {
    /// Path to a `.man` assembly file or a `.script` source file.
    path: String,

    /// Integers fed to `INP`, in order. Repeat the flag for each value.
    #[arg(long = "input", value_name = "INT")]
    inputs: Vec<i64>,

    /// Shift operand-taking mnemonics' operands down by one, for assembly
    /// written with 1-based mailbox numbers. Ignored for `.script` files.
    #[arg(long)]
    one_based: bool,

    /// Override the machine's mailbox count.
    #[arg(long, default_value_t = lmc_toolchain::vm::DEFAULT_MAILBOXES)]
    mailboxes: usize,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            for line in output {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} ({})", err, err.kind_name());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<Vec<String>, CoreError> {
    let source = fs::read_to_string(&cli.path)
        .map_err(|e| CoreError::assembler(format!("failed to read '{}': {e}", cli.path)))?;

    let words = lower(cli, &source)?;
    let mut machine = Machine::with_mailboxes(cli.mailboxes, &words);
    let mut input = QueueInput::new(cli.inputs.iter().copied());
    machine.run(&mut input)
}

fn lower(cli: &Cli, source: &str) -> Result<Vec<i64>, CoreError> {
    let extension = cli.path.rsplit('.').next().unwrap_or("");
    match extension {
        "man" => {
            let result = assembler::assemble(source, cli.mailboxes, cli.one_based);
            if let Some(first) = result.errors.into_iter().next() {
                return Err(first);
            }
            Ok(result.words)
        }
        "script" => script::compile(source, cli.mailboxes),
        other => Err(CoreError::extension(other)),
    }
}
