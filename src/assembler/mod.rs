//! # Assembler
//!
//! Translates the LMC's line-oriented mnemonic source (`.man` files) into an
//! instruction word vector. Grounded in the teacher's `first_pass`/`encoder`
//! split (validate the structure of a line, then lower it to a word) but
//! collapsed into one pass, since LMC assembly has no forward label
//! references for the assembler to resolve — symbolic addressing belongs to
//! the script compiler (`crate::script`), not this layer.

#[cfg(test)]
mod tests;

use crate::error::{CoreError, ParseErrorKind, Span};
use crate::isa::{inp_word, out_word, Opcode, HLT_WORD};
use crate::vm::DEFAULT_MAILBOXES;
use log::debug;

/// Result of assembling a source string: the numeric instruction words plus
/// any errors encountered. Mirrors the teacher's `EncodeResult` shape.
pub struct AssembleResult {
    pub words: Vec<i64>,
    pub errors: Vec<CoreError>,
}

/// Assemble `source` into a word vector for a machine of `mailboxes`
/// mailboxes.
///
/// `one_based` is the compatibility toggle described in the design: when
/// set, operand-taking mnemonics (never `MEM`) have 1 subtracted from their
/// operand, for humans who number mailboxes from 1. It must never be set for
/// assembly generated internally by the script compiler.
#[must_use]
pub fn assemble(source: &str, mailboxes: usize, one_based: bool) -> AssembleResult {
    let mut words = Vec::new();
    let mut errors = Vec::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_number = idx + 1;
        match assemble_line(raw_line, mailboxes, one_based, line_number) {
            Ok(Some(word)) => words.push(word),
            Ok(None) => {} // blank or comment-only line
            Err(e) => errors.push(e),
        }
    }

    debug!("assembled {} word(s), {} error(s)", words.len(), errors.len());
    AssembleResult { words, errors }
}

/// Assemble into the default-sized (100-mailbox) machine's word vector.
pub fn assemble_default(source: &str, one_based: bool) -> AssembleResult {
    assemble(source, DEFAULT_MAILBOXES, one_based)
}

fn assemble_line(
    raw_line: &str,
    mailboxes: usize,
    one_based: bool,
    line_number: usize,
) -> Result<Option<i64>, CoreError> {
    let without_comment = match raw_line.find('#') {
        Some(idx) => &raw_line[..idx],
        None => raw_line,
    };
    let stripped = without_comment.trim();
    if stripped.is_empty() {
        return Ok(None);
    }

    let upper = stripped.to_ascii_uppercase();
    let tokens: Vec<&str> = upper.split_whitespace().collect();
    let span = Span::new(line_number, 1);

    match tokens.as_slice() {
        [mnemonic] => assemble_no_operand(mnemonic, mailboxes, span).map(Some),
        [mnemonic, operand] => {
            assemble_with_operand(mnemonic, operand, mailboxes, one_based, span).map(Some)
        }
        _ => Err(CoreError::parse_at(
            ParseErrorKind::InvalidLine,
            span,
            format!("line has {} tokens, expected 1 or 2: '{}'", tokens.len(), stripped),
        )),
    }
}

fn assemble_no_operand(mnemonic: &str, mailboxes: usize, span: Span) -> Result<i64, CoreError> {
    match mnemonic {
        "HLT" => Ok(HLT_WORD),
        "INP" => Ok(inp_word(mailboxes)),
        "OUT" => Ok(out_word(mailboxes)),
        m if is_operand_mnemonic(m) => Err(CoreError::parse_at(
            ParseErrorKind::MissingOperand,
            span,
            format!("{m} requires an operand"),
        )),
        other => Err(CoreError::parse_at(
            ParseErrorKind::UnknownMnemonic,
            span,
            format!("unknown mnemonic '{other}'"),
        )),
    }
}

fn assemble_with_operand(
    mnemonic: &str,
    operand: &str,
    mailboxes: usize,
    one_based: bool,
    span: Span,
) -> Result<i64, CoreError> {
    let value: i64 = operand.parse().map_err(|_| {
        CoreError::parse_at(
            ParseErrorKind::InvalidLine,
            span,
            format!("operand '{operand}' is not an integer"),
        )
    })?;

    let delta = if one_based && is_operand_mnemonic(mnemonic) {
        1
    } else {
        0
    };

    let opcode = match mnemonic {
        "ADD" => Opcode::Add,
        "SUB" => Opcode::Sub,
        "STA" => Opcode::Sta,
        "LDA" => Opcode::Lda,
        "BRA" => Opcode::Bra,
        "BRZ" => Opcode::Brz,
        "BRP" => Opcode::Brp,
        "MEM" => return Ok(value),
        "HLT" | "INP" | "OUT" => {
            return Err(CoreError::parse_at(
                ParseErrorKind::InvalidLine,
                span,
                format!("{mnemonic} takes no operand"),
            ))
        }
        other => {
            return Err(CoreError::parse_at(
                ParseErrorKind::UnknownMnemonic,
                span,
                format!("unknown mnemonic '{other}'"),
            ))
        }
    };

    Ok(opcode.encode(value - delta, mailboxes))
}

fn is_operand_mnemonic(mnemonic: &str) -> bool {
    matches!(
        mnemonic,
        "ADD" | "SUB" | "STA" | "LDA" | "BRA" | "BRZ" | "BRP"
    )
}
