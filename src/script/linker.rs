//! # Symbolic Linker
//!
//! Three passes over the instruction stream produced by the statement
//! compiler, turning symbolic names into mailbox indices:
//!
//! 1. **Coalesce labels** — absorb every `Container::JumpFlag` into the
//!    `labels` of the instruction that follows it, collapsing
//!    `Vec<Container>` into `Vec<Instruction>`.
//! 2. **Bind memory references** — resolve every `Operand::MemRef` to the
//!    address of the `MEM` instruction carrying that alias.
//! 3. **Bind jump references** — resolve every `Operand::JumpRef` to the
//!    address of the instruction carrying that label.
//!
//! Grounded in the teacher's `first_pass` (build a symbol table, then a
//! second walk resolves references against it) generalized to two
//! independent reference kinds instead of one label table.

use std::collections::HashMap;

use crate::error::{CoreError, ParseErrorKind};
use crate::script::instruction::{Container, Instruction, Operand};

pub fn coalesce_labels(containers: Vec<Container>) -> Result<Vec<Instruction>, CoreError> {
    let mut out = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for container in containers {
        match container {
            Container::JumpFlag(label) => pending.push(label),
            Container::Instruction(mut instr) => {
                instr.labels.extend(pending.drain(..));
                out.push(instr);
            }
        }
    }

    if !pending.is_empty() {
        return Err(CoreError::assembler(format!(
            "jump flag(s) {:?} with no following instruction",
            pending
        )));
    }

    Ok(out)
}

pub fn bind_memory_refs(instructions: &mut [Instruction]) -> Result<(), CoreError> {
    let addr_of: HashMap<&str, usize> = instructions
        .iter()
        .enumerate()
        .filter_map(|(i, instr)| instr.alias.as_deref().map(|a| (a, i)))
        .collect();

    for instr in instructions.iter_mut() {
        if let Operand::MemRef(name) = &instr.operand {
            let addr = *addr_of.get(name.as_str()).ok_or_else(|| {
                CoreError::parse(
                    ParseErrorKind::UnresolvedMemory,
                    format!("undefined memory slot '{name}'"),
                )
            })?;
            instr.operand = Operand::Resolved(addr);
        }
    }
    Ok(())
}

pub fn bind_jump_refs(instructions: &mut [Instruction]) -> Result<(), CoreError> {
    let mut addr_of: HashMap<&str, usize> = HashMap::new();
    for (i, instr) in instructions.iter().enumerate() {
        for label in &instr.labels {
            addr_of.insert(label.as_str(), i);
        }
    }

    for instr in instructions.iter_mut() {
        if let Operand::JumpRef(name) = &instr.operand {
            let addr = *addr_of.get(name.as_str()).ok_or_else(|| {
                CoreError::parse(
                    ParseErrorKind::UnresolvedJump,
                    format!("undefined jump label '{name}'"),
                )
            })?;
            instr.operand = Operand::Resolved(addr);
        }
    }
    Ok(())
}

/// Run all three passes in order, returning the fully-resolved instruction
/// list. Every operand-taking instruction holds `Operand::Resolved`
/// afterwards; `link` is the single point where a dangling reference
/// becomes an error instead of silently lowering to a wrong address.
pub fn link(containers: Vec<Container>) -> Result<Vec<Instruction>, CoreError> {
    let mut instructions = coalesce_labels(containers)?;
    bind_memory_refs(&mut instructions)?;
    bind_jump_refs(&mut instructions)?;
    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::instruction::Mnemonic;

    #[test]
    fn coalesce_absorbs_flags_into_next_instruction() {
        let containers = vec![
            Container::JumpFlag("skip".into()),
            Container::Instruction(Instruction::no_operand(Mnemonic::Hlt)),
        ];
        let instrs = coalesce_labels(containers).unwrap();
        assert_eq!(instrs.len(), 1);
        assert_eq!(instrs[0].labels, vec!["skip".to_string()]);
    }

    #[test]
    fn trailing_flag_with_no_instruction_is_an_assembler_error() {
        let containers = vec![Container::JumpFlag("dangling".into())];
        let err = coalesce_labels(containers).unwrap_err();
        matches!(err, CoreError::Assembler { .. });
    }

    #[test]
    fn memory_ref_resolves_to_alias_address() {
        let mut instrs = vec![
            Instruction::new(Mnemonic::Lda, Operand::MemRef("x".into())),
            Instruction::mem("x", 7),
        ];
        bind_memory_refs(&mut instrs).unwrap();
        assert_eq!(instrs[0].operand, Operand::Resolved(1));
    }

    #[test]
    fn undefined_memory_ref_is_unresolved_memory_error() {
        let mut instrs = vec![Instruction::new(Mnemonic::Lda, Operand::MemRef("ghost".into()))];
        let err = bind_memory_refs(&mut instrs).unwrap_err();
        match err {
            CoreError::Parse { kind, .. } => assert_eq!(kind, ParseErrorKind::UnresolvedMemory),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn jump_ref_resolves_to_labelled_address() {
        let mut instrs = vec![
            Instruction::new(Mnemonic::Bra, crate::script::instruction::Operand::JumpRef("end".into())),
            Instruction::no_operand(Mnemonic::Hlt),
        ];
        instrs[1].labels.push("end".to_string());
        bind_jump_refs(&mut instrs).unwrap();
        assert_eq!(instrs[0].operand, Operand::Resolved(1));
    }
}
