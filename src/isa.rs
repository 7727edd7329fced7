//! # LMC Instruction Set
//!
//! The opcode table shared by the assembler (which lowers mnemonic text) and
//! the script compiler's linker (which lowers a resolved `Instruction`
//! stream) — both need the same `opcode * M + operand` encoding rule, so it
//! lives in one place instead of being duplicated as magic numbers in two
//! modules.

/// The seven operand-taking opcodes (`MEM`, `INP`, `OUT`, `HLT` are encoded
/// by whole-word value instead, see [`inp_word`]/[`out_word`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Add,
    Sub,
    Sta,
    Lda,
    Bra,
    Brz,
    Brp,
}

impl Opcode {
    pub const fn value(self) -> i64 {
        match self {
            Opcode::Add => 1,
            Opcode::Sub => 2,
            Opcode::Sta => 3,
            Opcode::Lda => 5,
            Opcode::Bra => 6,
            Opcode::Brz => 7,
            Opcode::Brp => 8,
        }
    }

    /// Encode `self` with `operand` for a machine of `mailboxes` mailboxes.
    pub fn encode(self, operand: i64, mailboxes: usize) -> i64 {
        self.value() * mailboxes as i64 + operand
    }
}

pub const fn inp_word(mailboxes: usize) -> i64 {
    9 * mailboxes as i64 + 1
}

pub const fn out_word(mailboxes: usize) -> i64 {
    9 * mailboxes as i64 + 2
}

pub const HLT_WORD: i64 = 0;
