//! # Error Taxonomy
//!
//! Typed failures crossing the VM / assembler / script-compiler boundary.
//!
//! All four kinds from the design (`ExtensionError`, `ParseError`,
//! `ExecuteError`, `AssemblerError`) live on one `CoreError` enum so callers
//! match on a single type. Sub-kinds are their own enums so a caller can
//! branch on "what went wrong" without parsing the message string.

use std::fmt;

/// A location in source text, 1-indexed. `Span::UNKNOWN` marks a failure with
/// no single originating line (e.g. a linker pass over the whole program).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub const UNKNOWN: Span = Span { line: 0, col: 0 };

    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    fn is_known(&self) -> bool {
        *self != Span::UNKNOWN
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Sub-kinds of `CoreError::Parse`, covering both the assembler and the
/// script compiler's tokenizer/grouper/solver/linker stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    InvalidLine,
    MissingOperand,
    UnknownMnemonic,
    Expression,
    UnsupportedOperator,
    UnresolvedMemory,
    UnresolvedJump,
    UnrecognisedStatement,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParseErrorKind::InvalidLine => "invalid_line",
            ParseErrorKind::MissingOperand => "missing_operand",
            ParseErrorKind::UnknownMnemonic => "unknown",
            ParseErrorKind::Expression => "expression",
            ParseErrorKind::UnsupportedOperator => "unsupported_operator",
            ParseErrorKind::UnresolvedMemory => "unresolved_memory",
            ParseErrorKind::UnresolvedJump => "unresolved_jump",
            ParseErrorKind::UnrecognisedStatement => "unrecognised_statement",
        };
        f.write_str(s)
    }
}

/// Sub-kinds of `CoreError::Execute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecuteErrorKind {
    PcOutOfRange,
    UnknownInstruction,
    BranchOutOfRange,
    IndexOutOfRange,
    InputExhausted,
}

impl fmt::Display for ExecuteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecuteErrorKind::PcOutOfRange => "pc_out_of_range",
            ExecuteErrorKind::UnknownInstruction => "unknown_instruction",
            ExecuteErrorKind::BranchOutOfRange => "branch_out_of_range",
            ExecuteErrorKind::IndexOutOfRange => "index_out_of_range",
            ExecuteErrorKind::InputExhausted => "input_exhausted",
        };
        f.write_str(s)
    }
}

/// Top-level error taxonomy for the whole toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    Extension { found: String },
    Parse {
        kind: ParseErrorKind,
        span: Span,
        message: String,
    },
    Execute {
        kind: ExecuteErrorKind,
        message: String,
    },
    Assembler { message: String },
}

impl CoreError {
    pub fn extension(found: impl Into<String>) -> Self {
        CoreError::Extension { found: found.into() }
    }

    /// A parse error with no single originating line (e.g. a whole-program
    /// linker check).
    pub fn parse(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        CoreError::Parse {
            kind,
            span: Span::UNKNOWN,
            message: message.into(),
        }
    }

    pub fn parse_at(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        CoreError::Parse {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn execute(kind: ExecuteErrorKind, message: impl Into<String>) -> Self {
        CoreError::Execute {
            kind,
            message: message.into(),
        }
    }

    pub fn assembler(message: impl Into<String>) -> Self {
        CoreError::Assembler {
            message: message.into(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            CoreError::Extension { .. } => "ExtensionError",
            CoreError::Parse { .. } => "ParseError",
            CoreError::Execute { .. } => "ExecuteError",
            CoreError::Assembler { .. } => "AssemblerError",
        }
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::Extension { found } => {
                write!(f, "ExtensionError: unrecognised input file extension '{found}'")
            }
            CoreError::Parse { kind, span, message } => {
                if span.is_known() {
                    write!(f, "ParseError (line {span}): {message} ({kind})")
                } else {
                    write!(f, "ParseError: {message} ({kind})")
                }
            }
            CoreError::Execute { kind, message } => {
                write!(f, "ExecuteError: {message} ({kind})")
            }
            CoreError::Assembler { message } => {
                write!(f, "AssemblerError: {message}")
            }
        }
    }
}

impl std::error::Error for CoreError {}

pub type CoreResult<T> = Result<T, CoreError>;
