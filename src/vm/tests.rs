use super::*;

fn run_with(words: &[i64], inputs: &[i64]) -> Vec<String> {
    let mut m = Machine::with_mailboxes(DEFAULT_MAILBOXES, words);
    let mut input = QueueInput::new(inputs.iter().copied());
    m.run(&mut input).expect("program should run to completion")
}

#[test]
fn decode_classifies_the_opcode_table() {
    let m = DEFAULT_MAILBOXES;
    assert_eq!(decode(0, m).unwrap(), Decoded::Hlt);
    assert_eq!(decode(9 * m as i64 + 1, m).unwrap(), Decoded::Inp);
    assert_eq!(decode(9 * m as i64 + 2, m).unwrap(), Decoded::Out);
    assert_eq!(decode(m as i64 + 7, m).unwrap(), Decoded::Add(7));
    assert_eq!(decode(8 * m as i64 + 42, m).unwrap(), Decoded::Brp(42));
    assert!(decode(4 * m as i64 + 1, m).is_err());
}

#[test]
fn inp_out_echo() {
    // scenario 1
    let out = run_with(&[901, 902, 0], &[7]);
    assert_eq!(out, vec!["7"]);
}

#[test]
fn bra_over_data() {
    // scenario 2: BRA 2; MEM 33333; LDA 1; OUT; HLT
    let out = run_with(&[602, 33333, 501, 902, 0], &[]);
    assert_eq!(out, vec!["33333"]);
}

#[test]
fn brp_skip_on_positive() {
    // scenario 3
    let positive = run_with(&[505, 803, 506, 902, 0, 1, 5], &[]);
    assert_eq!(positive, vec!["1"]);
    let zero = run_with(&[505, 803, 506, 902, 0, 0, 5], &[]);
    assert_eq!(zero, vec!["5"]);
}

#[test]
fn add_and_sub() {
    // scenario 4: MEM 10; MEM 5; LDA 1; ADD 2; OUT; LDA 1; SUB 2; OUT; HLT
    let out = run_with(&[10, 5, 501, 102, 902, 501, 202, 902, 0], &[]);
    assert_eq!(out, vec!["15", "5"]);
}

#[test]
fn missing_hlt_is_diagnosed() {
    // scenario 8
    let mut m = Machine::with_mailboxes(DEFAULT_MAILBOXES, &[901, 902]);
    let mut input = QueueInput::new([1]);
    let err = m.run(&mut input).unwrap_err();
    match err {
        CoreError::Execute { kind, .. } => assert_eq!(kind, ExecuteErrorKind::PcOutOfRange),
        other => panic!("expected execute error, got {other:?}"),
    }
}

#[test]
fn unknown_instruction_word_faults() {
    let mut m = Machine::with_mailboxes(DEFAULT_MAILBOXES, &[400]);
    let mut input = QueueInput::new([]);
    let err = m.run(&mut input).unwrap_err();
    match err {
        CoreError::Execute { kind, .. } => assert_eq!(kind, ExecuteErrorKind::UnknownInstruction),
        other => panic!("expected execute error, got {other:?}"),
    }
}

#[test]
fn decode_operand_is_always_in_range() {
    // `lo = word % m` is structurally < m for any m > 0, so `branch_to`'s
    // bounds check can never actually fail when fed a `decode()` operand —
    // it exists as a defensive invariant guard, matching the spec's "branch
    // targets must be in [0, M)" machine invariant.
    let m = 7usize;
    for word in 0..(9 * m as i64 + 3) {
        if let Ok(Decoded::Bra(a) | Decoded::Brz(a) | Decoded::Brp(a)) = decode(word, m) {
            assert!(a < m);
        }
    }
}

#[test]
fn determinism_same_program_same_input_same_output() {
    let words = [901, 102, 902, 0, 5];
    let out1 = run_with(&words, &[3]);
    let out2 = run_with(&words, &[3]);
    assert_eq!(out1, out2);
}

#[test]
fn stepping_inp_requests_then_completes_on_supply() {
    let m_count = DEFAULT_MAILBOXES;
    let mut m = Machine::with_mailboxes(
        m_count,
        &[9 * m_count as i64 + 1, 9 * m_count as i64 + 2, 0],
    );
    match m.next() {
        StepOutcome::InputRequired => {}
        other => panic!("expected InputRequired, got {other:?}"),
    }
    m.supply_input(42);
    match m.next() {
        StepOutcome::Ok => {}
        other => panic!("expected Ok, got {other:?}"),
    }
    match m.next() {
        StepOutcome::OutputProduced(v) => assert_eq!(v, "42"),
        other => panic!("expected OutputProduced, got {other:?}"),
    }
    match m.next() {
        StepOutcome::Halted => {}
        other => panic!("expected Halted, got {other:?}"),
    }
}

#[test]
fn rollback_restores_prior_state() {
    let m_count = DEFAULT_MAILBOXES;
    let mut m = Machine::with_mailboxes(m_count, &[m_count as i64 + 2, 0, 5]);
    m.next(); // ADD 2 -> accumulator becomes 5
    assert_eq!(m.accumulator(), 5);
    assert!(m.rollback());
    assert_eq!(m.accumulator(), 0);
    assert_eq!(m.program_counter(), 0);
}

#[test]
fn reset_restores_initial_image() {
    let mut m = Machine::with_mailboxes(DEFAULT_MAILBOXES, &[3, 0]);
    m.next();
    m.reset();
    assert_eq!(m.accumulator(), 0);
    assert_eq!(m.program_counter(), 0);
    assert!(m.is_running());
}
