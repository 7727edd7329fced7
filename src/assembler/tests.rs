use super::*;

#[test]
fn inp_out_hlt() {
    let r = assemble_default("INP\nOUT\nHLT", false);
    assert!(r.errors.is_empty());
    assert_eq!(r.words, vec![901, 902, 0]);
}

#[test]
fn bra_over_mem() {
    let r = assemble_default("BRA 2\nMEM 33333\nLDA 1\nOUT\nHLT", false);
    assert!(r.errors.is_empty());
    assert_eq!(r.words, vec![602, 33333, 501, 902, 0]);
}

#[test]
fn comments_and_blank_lines_are_skipped() {
    let r = assemble_default("# a comment\n\nHLT # trailing comment\n", false);
    assert!(r.errors.is_empty());
    assert_eq!(r.words, vec![0]);
}

#[test]
fn case_insensitive_mnemonics() {
    let r = assemble_default("inp\nout\nhlt", false);
    assert!(r.errors.is_empty());
    assert_eq!(r.words, vec![901, 902, 0]);
}

#[test]
fn one_based_flag_shifts_operand_mnemonics_only() {
    let r = assemble_default("LDA 1\nMEM 5", true);
    assert!(r.errors.is_empty());
    // LDA 1 one-based -> operand 0; MEM is never shifted.
    assert_eq!(r.words, vec![500, 5]);
}

#[test]
fn mem_accepts_values_larger_than_m() {
    let r = assemble_default("MEM 33333", false);
    assert!(r.errors.is_empty());
    assert_eq!(r.words, vec![33333]);
}

#[test]
fn unknown_mnemonic_is_a_parse_error() {
    // scenario 9
    let r = assemble_default("INP\nOUTTTT\nHLT", false);
    assert_eq!(r.errors.len(), 1);
    match &r.errors[0] {
        CoreError::Parse { kind, .. } => assert_eq!(*kind, ParseErrorKind::UnknownMnemonic),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_operand_is_a_parse_error() {
    let r = assemble_default("ADD", false);
    assert_eq!(r.errors.len(), 1);
    match &r.errors[0] {
        CoreError::Parse { kind, .. } => assert_eq!(*kind, ParseErrorKind::MissingOperand),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn too_many_tokens_is_invalid_line() {
    let r = assemble_default("ADD 1 2", false);
    assert_eq!(r.errors.len(), 1);
    match &r.errors[0] {
        CoreError::Parse { kind, .. } => assert_eq!(*kind, ParseErrorKind::InvalidLine),
        other => panic!("expected parse error, got {other:?}"),
    }
}
