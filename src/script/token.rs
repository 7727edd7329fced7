//! # Tokenizer
//!
//! Turns script source into a flat `Token` stream, then applies the
//! unary-minus/plus fixup described in the design: a `+`/`-` appearing
//! where an operand is expected (start of an expression, or right after
//! another binary operator) is rewritten as a synthetic `0` followed by a
//! binary `+`/`-`, so the shunting-yard solver (`crate::script::solver`)
//! never has to know about unary operators at all. A run of signs collapses
//! to one, the same way nested negatives cancel in arithmetic: `- +` nets to
//! `-`, `- -` nets to `+`.
//!
//! Grounded in the teacher's `lexer/mod.rs` (character-at-a-time scan with
//! line/col tracked via a cursor) and `lexer/token.rs` (lexeme + kind pair),
//! generalized from assembly mnemonics to the script dialect's reserved
//! words and punctuation.

use crate::error::{CoreError, ParseErrorKind, Span};
use crate::script::reader::StringReader;

/// The reserved callable names (§4.3): `print`/`read` have emission paths,
/// `sin`/`min`/`max` tokenize but have no defined evaluation semantics (see
/// `solver::UnsupportedOperator`), `def` is reserved for a macro facility
/// that does not exist in this dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Print,
    Read,
    Sin,
    Min,
    Max,
    Def,
}

/// `if` and `while` share one token kind because both are a
/// `keyword (expr) { block }` guard shape at the tokenizer/grouper level;
/// `while` is recognised but the statement compiler has no emission path for
/// it and rejects it outright (open question, recorded in DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conditional {
    If,
    While,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Function(Function),
    Conditional(Conditional),
    Equals,
    Add,
    Sub,
    Mul,
    Div,
    LParen,
    RParen,
    SemiColon,
    Seperator,
    FuncStart,
    FuncEnd,
    Period,
    Colon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub lexeme: String,
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    fn new(lexeme: impl Into<String>, kind: TokenKind, span: Span) -> Self {
        Self {
            lexeme: lexeme.into(),
            kind,
            span,
        }
    }

    /// `true` if an integer literal or variable name parses straight out of
    /// this token's lexeme (i.e. it is an `Identifier`).
    pub fn as_literal(&self) -> Option<i64> {
        if self.kind == TokenKind::Identifier {
            self.lexeme.parse().ok()
        } else {
            None
        }
    }
}

fn reserved_word(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "if" => TokenKind::Conditional(Conditional::If),
        "while" => TokenKind::Conditional(Conditional::While),
        "print" => TokenKind::Function(Function::Print),
        "read" => TokenKind::Function(Function::Read),
        "sin" => TokenKind::Function(Function::Sin),
        "min" => TokenKind::Function(Function::Min),
        "max" => TokenKind::Function(Function::Max),
        "def" => TokenKind::Function(Function::Def),
        _ => return None,
    };
    Some(kind)
}

/// Tokenize `source`, applying the unary-sign fixup before returning.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CoreError> {
    let raw = lex(source)?;
    Ok(fixup_unary_signs(raw))
}

fn lex(source: &str) -> Result<Vec<Token>, CoreError> {
    let mut reader = StringReader::new(source);
    let mut tokens = Vec::new();

    loop {
        reader.skip_whitespace();
        let Some(c) = reader.peek(0) else { break };
        let span = Span::new(reader.line(), reader.col());

        if c == '#' {
            reader.read_while(|c| c != '\n');
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let word = reader.read_while(|c| c.is_alphanumeric() || c == '_');
            let kind = reserved_word(&word).unwrap_or(TokenKind::Identifier);
            tokens.push(Token::new(word, kind, span));
            continue;
        }

        if c.is_ascii_digit() {
            let digits = reader.read_while(|c| c.is_ascii_digit());
            tokens.push(Token::new(digits, TokenKind::Identifier, span));
            continue;
        }

        let single = |kind| Some(kind);
        let kind = match c {
            '=' => single(TokenKind::Equals),
            '+' => single(TokenKind::Add),
            '-' => single(TokenKind::Sub),
            '*' => single(TokenKind::Mul),
            '/' => single(TokenKind::Div),
            '(' => single(TokenKind::LParen),
            ')' => single(TokenKind::RParen),
            ';' => single(TokenKind::SemiColon),
            ',' => single(TokenKind::Seperator),
            '{' => single(TokenKind::FuncStart),
            '}' => single(TokenKind::FuncEnd),
            '.' => single(TokenKind::Period),
            ':' => single(TokenKind::Colon),
            _ => None,
        };

        match kind {
            Some(kind) => {
                reader.next();
                tokens.push(Token::new(c.to_string(), kind, span));
            }
            None => {
                return Err(CoreError::parse_at(
                    ParseErrorKind::InvalidLine,
                    span,
                    format!("unrecognised character '{c}'"),
                ));
            }
        }
    }

    Ok(tokens)
}

fn starts_operand_position(prev: Option<&Token>) -> bool {
    match prev {
        None => true,
        Some(t) => matches!(
            t.kind,
            TokenKind::Equals
                | TokenKind::LParen
                | TokenKind::Add
                | TokenKind::Sub
                | TokenKind::Mul
                | TokenKind::Div
                | TokenKind::SemiColon
                | TokenKind::Seperator
                | TokenKind::FuncStart
                | TokenKind::Colon
        ),
    }
}

fn fixup_unary_signs(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let at_operand_position = starts_operand_position(out.last());
        if at_operand_position && matches!(tokens[i].kind, TokenKind::Add | TokenKind::Sub) {
            let span = tokens[i].span;
            let mut negative = false;
            while i < tokens.len() && matches!(tokens[i].kind, TokenKind::Add | TokenKind::Sub) {
                if tokens[i].kind == TokenKind::Sub {
                    negative = !negative;
                }
                i += 1;
            }
            out.push(Token::new("0", TokenKind::Identifier, span));
            if negative {
                out.push(Token::new("-", TokenKind::Sub, span));
            } else {
                out.push(Token::new("+", TokenKind::Add, span));
            }
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_and_identifiers() {
        let k = kinds("foo = print(x);");
        assert_eq!(
            k,
            vec![
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::Function(Function::Print),
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::RParen,
                TokenKind::SemiColon,
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let k = kinds("x = 1; # trailing\n");
        assert_eq!(
            k,
            vec![
                TokenKind::Identifier,
                TokenKind::Equals,
                TokenKind::Identifier,
                TokenKind::SemiColon,
            ]
        );
    }

    #[test]
    fn leading_unary_minus_becomes_synthetic_zero_minus() {
        let toks = tokenize("x = -5;").unwrap();
        let lexemes: Vec<&str> = toks.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["x", "=", "0", "-", "5", ";"]);
    }

    #[test]
    fn scenario_six_unary_run_collapses_to_single_minus() {
        // foo = -13 + - + 10;  ==>  foo = -23
        let toks = tokenize("foo = -13 + - + 10;").unwrap();
        let lexemes: Vec<&str> = toks.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(
            lexemes,
            vec!["foo", "=", "0", "-", "13", "+", "0", "-", "10", ";"]
        );
    }

    #[test]
    fn while_and_if_share_conditional_kind() {
        assert_eq!(
            kinds("if")[0],
            TokenKind::Conditional(Conditional::If)
        );
        assert_eq!(
            kinds("while")[0],
            TokenKind::Conditional(Conditional::While)
        );
    }

    #[test]
    fn unrecognised_character_is_a_parse_error() {
        let err = tokenize("x = 1 @ 2;").unwrap_err();
        match err {
            CoreError::Parse { kind, .. } => assert_eq!(kind, ParseErrorKind::InvalidLine),
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
