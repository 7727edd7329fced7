//! # Script Compiler
//!
//! Compiles the small scripting dialect (`.script` files) down to the same
//! numeric instruction words the assembler (`crate::assembler`) produces for
//! `.man` files, by way of six stages: [`token`] (tokenize, with the
//! unary-sign fixup), [`grouper`] (flatten into a statement tree),
//! [`solver`] (shunting-yard expression evaluation, constant or runtime),
//! [`compiler`] (per-statement emission), [`instruction`]/[`memtable`] (the
//! intermediate representation), and [`linker`] (resolve symbolic
//! references to mailbox indices). [`context`] threads the shared counters
//! and memory table through the stages that need them.
//!
//! The compiled program always has the shape the teacher's `encoder`
//! produces for a "data after code" assembly layout: a leading `BRA` jumps
//! over the `MEM` prelude holding every variable/temporary slot, then the
//! statement bodies, then a final `HLT`.

pub mod compiler;
pub mod context;
pub mod grouper;
pub mod instruction;
pub mod linker;
pub mod memtable;
pub mod reader;
pub mod solver;
pub mod token;


use crate::error::CoreError;
use crate::isa::{inp_word, out_word, HLT_WORD};
use crate::vm::DEFAULT_MAILBOXES;
use context::Context;
use instruction::{Container, Instruction, Mnemonic, Operand};
use log::debug;

const DATA_END_LABEL: &str = "__data_end";

/// Compile `source` into a word vector for a machine of `mailboxes`
/// mailboxes.
pub fn compile(source: &str, mailboxes: usize) -> Result<Vec<i64>, CoreError> {
    let tokens = token::tokenize(source)?;
    let statements = grouper::group(&tokens)?;

    let mut ctx = Context::new();
    let body = compiler::compile_statements(&statements, &mut ctx)?;

    let containers = assemble_containers(&ctx, body);
    let instructions = linker::link(containers)?;

    let words: Result<Vec<i64>, CoreError> =
        instructions.iter().map(|instr| lower(instr, mailboxes)).collect();
    let words = words?;

    debug!("compiled script to {} word(s)", words.len());
    Ok(words)
}

/// Compile into the default-sized (100-mailbox) machine's word vector.
pub fn compile_default(source: &str) -> Result<Vec<i64>, CoreError> {
    compile(source, DEFAULT_MAILBOXES)
}

/// Lay out the final pre-link stream: jump over the data prelude, the data
/// prelude itself (in declaration order), the statement bodies, then `HLT`.
fn assemble_containers(ctx: &Context, body: Vec<Container>) -> Vec<Container> {
    let mut containers = Vec::new();
    containers.push(Container::Instruction(Instruction::new(
        Mnemonic::Bra,
        Operand::JumpRef(DATA_END_LABEL.to_string()),
    )));
    for (name, value) in ctx.memory.iter() {
        containers.push(Container::Instruction(Instruction::mem(name, value)));
    }
    containers.push(Container::JumpFlag(DATA_END_LABEL.to_string()));
    containers.extend(body);
    containers.push(Container::Instruction(Instruction::no_operand(Mnemonic::Hlt)));
    containers
}

fn lower(instr: &Instruction, mailboxes: usize) -> Result<i64, CoreError> {
    match instr.mnemonic {
        Mnemonic::Mem => match instr.operand {
            Operand::Literal(v) => Ok(v),
            _ => Err(CoreError::assembler("MEM instruction missing its literal value")),
        },
        Mnemonic::Hlt => Ok(HLT_WORD),
        Mnemonic::Inp => Ok(inp_word(mailboxes)),
        Mnemonic::Out => Ok(out_word(mailboxes)),
        _ => {
            let opcode = instr
                .mnemonic
                .opcode()
                .expect("every other mnemonic is operand-taking");
            match instr.operand {
                Operand::Resolved(addr) => Ok(opcode.encode(addr as i64, mailboxes)),
                _ => Err(CoreError::assembler(
                    "operand left unresolved after linking",
                )),
            }
        }
    }
}
