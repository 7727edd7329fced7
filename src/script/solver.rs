//! # Expression Solver
//!
//! Shunting-yard conversion of an expression's token slice to RPN, then one
//! of two evaluation modes:
//!
//! - **Constant mode**: every leaf is an integer literal, so the whole
//!   expression folds to a single `i64` at compile time (`+ - * /`, integer
//!   division truncating toward zero — Rust's `/` already does this).
//! - **Runtime mode**: at least one leaf is a variable, so the result can
//!   only be known when the program runs. Each operator lowers to an
//!   `LDA`/`ADD` or `SUB`/`STA` chain against temporary mailboxes, the way
//!   the LMC's single accumulator forces any multi-step arithmetic to be
//!   staged through memory. `*`/`/` have no runtime path because the LMC
//!   instruction set has no multiply or divide opcode — encountering one
//!   outside constant mode is `ParseErrorKind::UnsupportedOperator`, not a
//!   missing feature.
//!
//! Grounded in the teacher's `parser/mod.rs` expression handling (operator
//! precedence resolved by an explicit stack machine) and `encoder/mod.rs`
//! (allocate-a-temporary-then-chain-instructions emission style).

use crate::error::{CoreError, ParseErrorKind};
use crate::script::context::Context;
use crate::script::instruction::{Container, Instruction, Mnemonic, Operand};
use crate::script::token::{Token, TokenKind};

pub enum ExprResult {
    Constant(i64),
    /// Name of the memory slot holding the computed value once `code` runs.
    Slot(String),
}

pub struct SolvedExpr {
    pub result: ExprResult,
    pub code: Vec<Container>,
}

fn precedence(kind: TokenKind) -> Option<u8> {
    match kind {
        TokenKind::Add | TokenKind::Sub => Some(1),
        TokenKind::Mul | TokenKind::Div => Some(2),
        _ => None,
    }
}

/// Shunting-yard: infix tokens -> RPN token order.
fn to_rpn(tokens: &[Token]) -> Result<Vec<Token>, CoreError> {
    let mut output = Vec::new();
    let mut operators: Vec<Token> = Vec::new();

    for tok in tokens {
        match tok.kind {
            TokenKind::Identifier => output.push(tok.clone()),
            TokenKind::Add | TokenKind::Sub | TokenKind::Mul | TokenKind::Div => {
                let p = precedence(tok.kind).unwrap();
                while let Some(top) = operators.last() {
                    if matches!(top.kind, TokenKind::LParen) {
                        break;
                    }
                    if precedence(top.kind).unwrap_or(0) < p {
                        break;
                    }
                    output.push(operators.pop().unwrap());
                }
                operators.push(tok.clone());
            }
            TokenKind::LParen => operators.push(tok.clone()),
            TokenKind::RParen => {
                let mut found = false;
                while let Some(top) = operators.pop() {
                    if matches!(top.kind, TokenKind::LParen) {
                        found = true;
                        break;
                    }
                    output.push(top);
                }
                if !found {
                    return Err(CoreError::parse_at(
                        ParseErrorKind::Expression,
                        tok.span,
                        "unmatched ')'",
                    ));
                }
            }
            _ => {
                return Err(CoreError::parse_at(
                    ParseErrorKind::Expression,
                    tok.span,
                    format!("unexpected token '{}' in expression", tok.lexeme),
                ));
            }
        }
    }

    while let Some(top) = operators.pop() {
        if matches!(top.kind, TokenKind::LParen) {
            return Err(CoreError::parse_at(
                ParseErrorKind::Expression,
                top.span,
                "unmatched '('",
            ));
        }
        output.push(top);
    }

    Ok(output)
}

fn is_fully_constant(rpn: &[Token]) -> bool {
    rpn.iter()
        .all(|t| t.kind != TokenKind::Identifier || t.as_literal().is_some())
}

fn eval_constant(rpn: &[Token]) -> Result<i64, CoreError> {
    let mut stack: Vec<i64> = Vec::new();
    for tok in rpn {
        match tok.kind {
            TokenKind::Identifier => {
                let v = tok.as_literal().expect("caller checked is_fully_constant");
                stack.push(v);
            }
            TokenKind::Add | TokenKind::Sub | TokenKind::Mul | TokenKind::Div => {
                let rhs = stack.pop().ok_or_else(|| {
                    CoreError::parse_at(ParseErrorKind::Expression, tok.span, "missing operand")
                })?;
                let lhs = stack.pop().ok_or_else(|| {
                    CoreError::parse_at(ParseErrorKind::Expression, tok.span, "missing operand")
                })?;
                let result = match tok.kind {
                    TokenKind::Add => lhs + rhs,
                    TokenKind::Sub => lhs - rhs,
                    TokenKind::Mul => lhs * rhs,
                    TokenKind::Div => {
                        if rhs == 0 {
                            return Err(CoreError::parse_at(
                                ParseErrorKind::Expression,
                                tok.span,
                                "division by zero in constant expression",
                            ));
                        }
                        lhs / rhs
                    }
                    _ => unreachable!(),
                };
                stack.push(result);
            }
            _ => unreachable!("to_rpn only emits identifiers and operators"),
        }
    }
    stack.pop().ok_or_else(|| CoreError::parse(ParseErrorKind::Expression, "empty expression"))
}

fn eval_runtime(rpn: &[Token], ctx: &mut Context) -> Result<(String, Vec<Container>), CoreError> {
    let mut code = Vec::new();
    let mut stack: Vec<String> = Vec::new();

    for tok in rpn {
        match tok.kind {
            TokenKind::Identifier => {
                if let Some(v) = tok.as_literal() {
                    stack.push(ctx.new_temp(v));
                } else {
                    stack.push(tok.lexeme.clone());
                }
            }
            TokenKind::Mul | TokenKind::Div => {
                return Err(CoreError::parse_at(
                    ParseErrorKind::UnsupportedOperator,
                    tok.span,
                    "'*'/'/' have no runtime emission: the LMC has no multiply or divide instruction",
                ));
            }
            TokenKind::Add | TokenKind::Sub => {
                let rhs = stack.pop().ok_or_else(|| {
                    CoreError::parse_at(ParseErrorKind::Expression, tok.span, "missing operand")
                })?;
                let lhs = stack.pop().ok_or_else(|| {
                    CoreError::parse_at(ParseErrorKind::Expression, tok.span, "missing operand")
                })?;
                let mnemonic = if tok.kind == TokenKind::Add {
                    Mnemonic::Add
                } else {
                    Mnemonic::Sub
                };
                code.push(Container::Instruction(Instruction::new(
                    Mnemonic::Lda,
                    Operand::MemRef(lhs),
                )));
                code.push(Container::Instruction(Instruction::new(
                    mnemonic,
                    Operand::MemRef(rhs),
                )));
                let dest = ctx.new_temp(0);
                code.push(Container::Instruction(Instruction::new(
                    Mnemonic::Sta,
                    Operand::MemRef(dest.clone()),
                )));
                stack.push(dest);
            }
            _ => unreachable!("to_rpn only emits identifiers and operators"),
        }
    }

    let result = stack
        .pop()
        .ok_or_else(|| CoreError::parse(ParseErrorKind::Expression, "empty expression"))?;
    Ok((result, code))
}

/// Solve `tokens` (an expression, no surrounding `;`) in whichever mode
/// applies.
pub fn solve(tokens: &[Token], ctx: &mut Context) -> Result<SolvedExpr, CoreError> {
    if tokens.is_empty() {
        return Err(CoreError::parse(ParseErrorKind::Expression, "empty expression"));
    }
    let rpn = to_rpn(tokens)?;
    if is_fully_constant(&rpn) {
        let value = eval_constant(&rpn)?;
        Ok(SolvedExpr {
            result: ExprResult::Constant(value),
            code: Vec::new(),
        })
    } else {
        let (slot, code) = eval_runtime(&rpn, ctx)?;
        Ok(SolvedExpr {
            result: ExprResult::Slot(slot),
            code,
        })
    }
}
