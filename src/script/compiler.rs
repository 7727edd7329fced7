//! # Statement Compiler
//!
//! Dispatches each grouped `Statement` (see `crate::script::grouper`) by its
//! header shape — assignment, `if` conditional, or a `print`/`read` call —
//! and lowers it to a run of `Container`s. Grounded in the teacher's
//! `parser/mod.rs` macro-driven "match the token shape, build the node"
//! dispatch, generalized from assembly operand shapes to script statement
//! shapes.

use crate::error::{CoreError, ParseErrorKind, Span};
use crate::script::context::Context;
use crate::script::grouper::Statement;
use crate::script::instruction::{Container, Instruction, Mnemonic, Operand};
use crate::script::solver::{self, ExprResult};
use crate::script::token::{Conditional, Function, Token, TokenKind};

fn header_span(header: &[Token]) -> Span {
    header.first().map(|t| t.span).unwrap_or(Span::UNKNOWN)
}

pub fn compile_statements(
    statements: &[Statement],
    ctx: &mut Context,
) -> Result<Vec<Container>, CoreError> {
    let mut code = Vec::new();
    for stmt in statements {
        code.extend(compile_statement(stmt, ctx)?);
    }
    Ok(code)
}

fn compile_statement(stmt: &Statement, ctx: &mut Context) -> Result<Vec<Container>, CoreError> {
    let header = &stmt.tokens;

    if let Some(code) = try_compile_assignment(header, stmt, ctx)? {
        return Ok(code);
    }
    if let Some(code) = try_compile_conditional(header, stmt, ctx)? {
        return Ok(code);
    }
    if let Some(code) = try_compile_call(header, stmt, ctx)? {
        return Ok(code);
    }

    Err(CoreError::parse_at(
        ParseErrorKind::UnrecognisedStatement,
        header_span(header),
        "statement does not match assignment, conditional, or call shape",
    ))
}

/// `identifier = expression ;`
fn try_compile_assignment(
    header: &[Token],
    stmt: &Statement,
    ctx: &mut Context,
) -> Result<Option<Vec<Container>>, CoreError> {
    if !stmt.children.is_empty() {
        return Ok(None);
    }
    let [name_tok, eq_tok, rest @ ..] = header else {
        return Ok(None);
    };
    if name_tok.kind != TokenKind::Identifier || eq_tok.kind != TokenKind::Equals {
        return Ok(None);
    }
    if name_tok.as_literal().is_some() {
        // a bare integer can't be an assignment target
        return Ok(None);
    }

    let name = name_tok.lexeme.clone();
    let already_declared = ctx.memory.contains(&name);
    let solved = solver::solve(rest, ctx)?;

    let mut code = Vec::new();
    match solved.result {
        ExprResult::Constant(v) if !already_declared => {
            ctx.memory.declare(&name, v);
        }
        ExprResult::Constant(v) => {
            let temp = ctx.new_temp(v);
            code.push(lda(&temp));
            code.push(sta(&name));
        }
        ExprResult::Slot(slot) => {
            ctx.memory.declare(&name, 0);
            code.extend(solved.code);
            code.push(lda(&slot));
            code.push(sta(&name));
        }
    }
    Ok(Some(code))
}

/// `if (expr) { statements }` — skips the block when `expr` is zero.
/// `while (expr) { statements }` tokenizes identically but has no emission
/// path and is rejected (recognised-but-unsupported, see DESIGN.md).
fn try_compile_conditional(
    header: &[Token],
    stmt: &Statement,
    ctx: &mut Context,
) -> Result<Option<Vec<Container>>, CoreError> {
    let Some(first) = header.first() else {
        return Ok(None);
    };
    let keyword = match first.kind {
        TokenKind::Conditional(k) => k,
        _ => return Ok(None),
    };
    if keyword == Conditional::While {
        return Err(CoreError::parse_at(
            ParseErrorKind::UnrecognisedStatement,
            first.span,
            "'while' is recognised by the tokenizer but has no emission path",
        ));
    }

    let Some((TokenKind::LParen, TokenKind::RParen)) = header
        .get(1)
        .zip(header.last())
        .map(|(a, b)| (a.kind, b.kind))
    else {
        return Err(CoreError::parse_at(
            ParseErrorKind::UnrecognisedStatement,
            first.span,
            "'if' must be followed by '(condition)'",
        ));
    };
    let cond_tokens = &header[2..header.len() - 1];

    let solved = solver::solve(cond_tokens, ctx)?;
    let mut code = solved.code;
    let test_slot = match solved.result {
        ExprResult::Constant(v) => ctx.new_temp(v),
        ExprResult::Slot(slot) => slot,
    };

    let skip_label = ctx.new_jump_label();
    code.push(lda(&test_slot));
    code.push(Container::Instruction(Instruction::new(
        Mnemonic::Brz,
        Operand::JumpRef(skip_label.clone()),
    )));
    code.extend(compile_statements(&stmt.children, ctx)?);
    code.push(Container::JumpFlag(skip_label));

    Ok(Some(code))
}

/// `print(expression);` or `read(identifier);`
fn try_compile_call(
    header: &[Token],
    stmt: &Statement,
    ctx: &mut Context,
) -> Result<Option<Vec<Container>>, CoreError> {
    if !stmt.children.is_empty() || header.len() < 3 {
        return Ok(None);
    }
    let func_tok = &header[0];
    let TokenKind::Function(func) = func_tok.kind else {
        return Ok(None);
    };
    if header[1].kind != TokenKind::LParen || header.last().unwrap().kind != TokenKind::RParen {
        return Ok(None);
    }
    let args = &header[2..header.len() - 1];

    match func {
        Function::Print => {
            let solved = solver::solve(args, ctx)?;
            let mut code = solved.code;
            let source = match solved.result {
                ExprResult::Constant(v) => ctx.new_mem_alias(v),
                ExprResult::Slot(slot) => slot,
            };
            code.push(lda(&source));
            code.push(Container::Instruction(Instruction::no_operand(Mnemonic::Out)));
            Ok(Some(code))
        }
        Function::Read => {
            let [arg] = args else {
                return Err(CoreError::parse_at(
                    ParseErrorKind::UnrecognisedStatement,
                    func_tok.span,
                    "'read' takes exactly one variable name",
                ));
            };
            if arg.kind != TokenKind::Identifier || arg.as_literal().is_some() {
                return Err(CoreError::parse_at(
                    ParseErrorKind::UnrecognisedStatement,
                    arg.span,
                    "'read' requires a variable name, not an expression or literal",
                ));
            }
            if !ctx.memory.contains(&arg.lexeme) {
                return Err(CoreError::parse_at(
                    ParseErrorKind::UnrecognisedStatement,
                    arg.span,
                    format!("'read' target '{}' has no prior declaration", arg.lexeme),
                ));
            }
            // Latch through a temp rather than storing straight into the
            // target: INP; STA temp; LDA temp; STA x.
            let temp = ctx.new_temp(0);
            let mut code = Vec::new();
            code.push(Container::Instruction(Instruction::no_operand(Mnemonic::Inp)));
            code.push(sta(&temp));
            code.push(lda(&temp));
            code.push(sta(&arg.lexeme));
            Ok(Some(code))
        }
        Function::Sin | Function::Min | Function::Max | Function::Def => {
            Err(CoreError::parse_at(
                ParseErrorKind::UnsupportedOperator,
                func_tok.span,
                format!("'{}' is reserved but has no emission path", func_tok.lexeme),
            ))
        }
    }
}

fn lda(name: &str) -> Container {
    Container::Instruction(Instruction::new(Mnemonic::Lda, Operand::MemRef(name.to_string())))
}

fn sta(name: &str) -> Container {
    Container::Instruction(Instruction::new(Mnemonic::Sta, Operand::MemRef(name.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::grouper::group;
    use crate::script::token::tokenize;

    fn compile_src(src: &str) -> (Vec<Container>, Context) {
        let toks = tokenize(src).unwrap();
        let stmts = group(&toks).unwrap();
        let mut ctx = Context::new();
        let code = compile_statements(&stmts, &mut ctx).unwrap();
        (code, ctx)
    }

    #[test]
    fn literal_assignment_to_new_name_is_pure_declaration() {
        let (code, ctx) = compile_src("x = 5;");
        assert!(code.is_empty());
        assert_eq!(ctx.memory.value_of("x"), Some(5));
    }

    #[test]
    fn reassigning_an_existing_name_emits_store() {
        let (code, _) = compile_src("x = 5; x = 6;");
        assert!(!code.is_empty());
    }

    #[test]
    fn read_into_undeclared_variable_is_rejected() {
        let toks = tokenize("read(y);").unwrap();
        let stmts = group(&toks).unwrap();
        let mut ctx = Context::new();
        let err = compile_statements(&stmts, &mut ctx).unwrap_err();
        match err {
            CoreError::Parse { kind, .. } => assert_eq!(kind, ParseErrorKind::UnrecognisedStatement),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn while_is_rejected() {
        let toks = tokenize("while (x) { x = 0; }").unwrap();
        let stmts = group(&toks).unwrap();
        let mut ctx = Context::new();
        let err = compile_statements(&stmts, &mut ctx).unwrap_err();
        match err {
            CoreError::Parse { kind, .. } => assert_eq!(kind, ParseErrorKind::UnrecognisedStatement),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn conditional_emits_brz_and_skip_flag() {
        let (code, _) = compile_src("x = 0; if (x) { x = 1; }");
        let has_brz = code.iter().any(|c| matches!(
            c,
            Container::Instruction(Instruction { mnemonic: Mnemonic::Brz, .. })
        ));
        let has_flag = code.iter().any(|c| matches!(c, Container::JumpFlag(_)));
        assert!(has_brz);
        assert!(has_flag);
    }
}
