//! # `lmc-debugger`
//!
//! A plain, line-oriented driver over the VM's stepping face
//! (`Machine::next`/`supply_input`/`rollback`/`reset`). Deliberately not a
//! TUI: presenting the stepping API behind a terminal UI is out of scope
//! (see DESIGN.md), so this is stdin commands in, one `StepOutcome` line
//! out, in the teacher's "read a line, do a thing, print a result" style.

use std::fs;
use std::io::{self, BufRead, Write};

use clap::Parser;
use lmc_toolchain::assembler;
use lmc_toolchain::script;
use lmc_toolchain::vm::{Machine, StepOutcome};

#[derive(Parser, Debug)]
#[command(name = "lmc-debugger", version, about)]
struct Cli {
    /// Path to a `.man` assembly file or a `.script` source file.
    path: String,

    #[arg(long)]
    one_based: bool,

    #[arg(long, default_value_t = lmc_toolchain::vm::DEFAULT_MAILBOXES)]
    mailboxes: usize,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.path).unwrap_or_else(|e| {
        eprintln!("failed to read '{}': {e}", cli.path);
        std::process::exit(1);
    });

    let extension = cli.path.rsplit('.').next().unwrap_or("");
    let words = match extension {
        "man" => {
            let result = assembler::assemble(&source, cli.mailboxes, cli.one_based);
            if let Some(err) = result.errors.into_iter().next() {
                eprintln!("{err}");
                std::process::exit(1);
            }
            result.words
        }
        "script" => script::compile(&source, cli.mailboxes).unwrap_or_else(|err| {
            eprintln!("{err}");
            std::process::exit(1);
        }),
        other => {
            eprintln!("unrecognised input file extension '{other}'");
            std::process::exit(1);
        }
    };

    let mut machine = Machine::with_mailboxes(cli.mailboxes, &words);
    repl(&mut machine);
}

/// Commands: `n` step once, `i <int>` supply a pending `INP`, `r` roll back
/// one step, `reset` reload the initial image, `q` quit.
fn repl(machine: &mut Machine) {
    let stdin = io::stdin();
    print_prompt();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        match line.split_once(' ').unwrap_or((line, "")) {
            ("n", _) => print_outcome(machine.next()),
            ("i", arg) => match arg.trim().parse::<i64>() {
                Ok(v) => machine.supply_input(v),
                Err(_) => eprintln!("'i' needs an integer argument"),
            },
            ("r", _) => {
                if !machine.rollback() {
                    eprintln!("no history to roll back to");
                }
            }
            ("reset", _) => machine.reset(),
            ("q", _) => break,
            _ => eprintln!("commands: n | i <int> | r | reset | q"),
        }
        print_state(machine);
        print_prompt();
    }
}

fn print_outcome(outcome: StepOutcome) {
    match outcome {
        StepOutcome::Ok => println!("ok"),
        StepOutcome::InputRequired => println!("input required (use 'i <int>')"),
        StepOutcome::OutputProduced(v) => println!("output: {v}"),
        StepOutcome::Halted => println!("halted"),
        StepOutcome::Error(e) => println!("fault: {e}"),
    }
}

fn print_state(machine: &Machine) {
    println!(
        "pc={} acc={} running={}",
        machine.program_counter(),
        machine.accumulator(),
        machine.is_running()
    );
}

fn print_prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
