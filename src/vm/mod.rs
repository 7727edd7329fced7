//! # Virtual Machine
//!
//! The decimal-encoded fetch/execute loop over a fixed mailbox array, plus a
//! step-wise variant used for interactive debugging.
//!
//! Both faces share [`decode`]: given a word and the mailbox count `m`, it
//! splits the word into `(opcode, operand)` and classifies it per the LMC
//! opcode table. `Machine::run` drives `decode` to completion; `Machine::next`
//! (the stepping face) drives it one decode/execute at a time and returns
//! instead of blocking on I/O.

#[cfg(test)]
mod tests;

use crate::error::{CoreError, ExecuteErrorKind};
use std::collections::VecDeque;

/// Default mailbox count `M`, matching the classic LMC of 100 mailboxes.
pub const DEFAULT_MAILBOXES: usize = 100;

/// A decoded instruction. `Mem` is not a real opcode — it is the data-word
/// pseudo-op, decoded here only so callers can render a disassembly; `decode`
/// never returns it from live program memory (every in-range `hi` maps to a
/// real opcode or a fault).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Add(usize),
    Sub(usize),
    Sta(usize),
    Lda(usize),
    Bra(usize),
    Brz(usize),
    Brp(usize),
    Inp,
    Out,
    Hlt,
}

/// Decode `word` against a machine of `m` mailboxes.
///
/// `hi = word / m` selects the opcode; `lo = word % m` is the operand
/// address for the seven operand-taking opcodes. `INP`/`OUT`/`HLT` are
/// distinguished by their *whole* word value, not just `hi`, since they
/// carry no meaningful operand.
pub fn decode(word: i64, m: usize) -> Result<Decoded, CoreError> {
    let m = m as i64;
    if word == 0 {
        return Ok(Decoded::Hlt);
    }
    if word == 9 * m + 1 {
        return Ok(Decoded::Inp);
    }
    if word == 9 * m + 2 {
        return Ok(Decoded::Out);
    }

    let hi = word.div_euclid(m);
    let lo = word.rem_euclid(m) as usize;
    match hi {
        1 => Ok(Decoded::Add(lo)),
        2 => Ok(Decoded::Sub(lo)),
        3 => Ok(Decoded::Sta(lo)),
        5 => Ok(Decoded::Lda(lo)),
        6 => Ok(Decoded::Bra(lo)),
        7 => Ok(Decoded::Brz(lo)),
        8 => Ok(Decoded::Brp(lo)),
        _ => Err(CoreError::execute(
            ExecuteErrorKind::UnknownInstruction,
            format!("unknown instruction word {word}"),
        )),
    }
}

/// A provider of integers for `INP`. The batch executor pulls eagerly; the
/// stepping executor only asks once the caller has supplied a value via
/// [`Machine::supply_input`].
pub trait InputChannel {
    fn read_integer(&mut self) -> Option<i64>;
}

/// Feeds a fixed queue of integers, then reports end-of-input. Grounds the
/// "test configuration supplies a fixed integer" requirement from the
/// external-interfaces section, generalized to a queue.
pub struct QueueInput {
    values: VecDeque<i64>,
}

impl QueueInput {
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl InputChannel for QueueInput {
    fn read_integer(&mut self) -> Option<i64> {
        self.values.pop_front()
    }
}

/// Snapshot of the full machine state, used by the stepping executor's
/// rollback facility. Plain full-state clone, matching the "restores exactly
/// the prior state" contract over structural sharing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    accumulator: i64,
    program_counter: usize,
    memory: Vec<i64>,
    running: bool,
    output: Vec<String>,
}

/// Result of one step of the stepping executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step completed with no I/O event.
    Ok,
    /// The step hit `INP`; no value was read. Call `supply_input` then
    /// `next()` again.
    InputRequired,
    /// The step hit `OUT`; the value is already appended to `output()`.
    OutputProduced(String),
    /// `HLT` was executed; the machine is no longer running.
    Halted,
    /// Execution faulted. The machine is no longer running; `next()` returns
    /// this instead of propagating the error so a debugger can report and
    /// continue.
    Error(CoreError),
}

/// The LMC machine: accumulator, program counter, mailbox memory, the
/// append-only output sequence, and (for the stepping face) a bounded
/// snapshot history.
pub struct Machine {
    mailboxes: usize,
    accumulator: i64,
    program_counter: usize,
    memory: Vec<i64>,
    initial_memory: Vec<i64>,
    /// Number of words actually loaded by `load()`. Mailboxes beyond this are
    /// valid data storage (LDA/STA/branch targets may address them) but are
    /// never fetched as instructions — running off the end of the loaded
    /// program is the "missing HLT" fault, not an implicit halt.
    program_len: usize,
    running: bool,
    output: Vec<String>,
    history: Vec<Snapshot>,
    history_limit: usize,
    pending_inp_target: Option<usize>,
}

impl Machine {
    pub fn new(mailboxes: usize) -> Self {
        Self {
            mailboxes,
            accumulator: 0,
            program_counter: 0,
            memory: vec![0; mailboxes],
            initial_memory: vec![0; mailboxes],
            program_len: 0,
            running: false,
            output: Vec::new(),
            history: Vec::new(),
            history_limit: 1024,
            pending_inp_target: None,
        }
    }

    pub fn with_mailboxes(mailboxes: usize, program: &[i64]) -> Self {
        let mut m = Self::new(mailboxes);
        m.load(program);
        m
    }

    pub fn mailboxes(&self) -> usize {
        self.mailboxes
    }

    pub fn accumulator(&self) -> i64 {
        self.accumulator
    }

    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn memory(&self) -> &[i64] {
        &self.memory
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Load a fresh instruction image, overwriting memory beyond `m` is
    /// rejected — the caller's assembler/linker is responsible for producing
    /// at most `m` words.
    pub fn load(&mut self, program: &[i64]) {
        let mut image = vec![0i64; self.mailboxes];
        let n = program.len().min(self.mailboxes);
        image[..n].copy_from_slice(&program[..n]);
        self.initial_memory = image.clone();
        self.memory = image;
        self.program_len = n;
        self.accumulator = 0;
        self.program_counter = 0;
        self.running = true;
        self.output.clear();
        self.history.clear();
        self.pending_inp_target = None;
    }

    /// Restore the initial instruction image loaded by `load`.
    pub fn reset(&mut self) {
        self.memory = self.initial_memory.clone();
        self.accumulator = 0;
        self.program_counter = 0;
        self.running = true;
        self.output.clear();
        self.history.clear();
        self.pending_inp_target = None;
    }

    /// Run to completion against `input`. Fails with
    /// `ExecuteErrorKind::PcOutOfRange` if control falls off the end of
    /// memory without hitting `HLT` — the diagnostic for a missing `HLT`.
    /// Fails with `ExecuteErrorKind::InputExhausted` if `INP` runs once
    /// `input` has no more values to give.
    pub fn run(&mut self, input: &mut dyn InputChannel) -> Result<Vec<String>, CoreError> {
        self.running = true;
        while self.running {
            let word = self.fetch()?;
            self.program_counter += 1;
            match decode(word, self.mailboxes)? {
                Decoded::Add(a) => self.accumulator += self.load_mailbox(a)?,
                Decoded::Sub(a) => self.accumulator -= self.load_mailbox(a)?,
                Decoded::Sta(a) => self.store_mailbox(a, self.accumulator)?,
                Decoded::Lda(a) => self.accumulator = self.load_mailbox(a)?,
                Decoded::Bra(a) => self.branch_to(a)?,
                Decoded::Brz(a) => {
                    if self.accumulator == 0 {
                        self.branch_to(a)?;
                    }
                }
                Decoded::Brp(a) => {
                    if self.accumulator > 0 {
                        self.branch_to(a)?;
                    }
                }
                Decoded::Inp => match input.read_integer() {
                    Some(v) => self.accumulator = v,
                    None => {
                        self.running = false;
                        return Err(CoreError::execute(
                            ExecuteErrorKind::InputExhausted,
                            "INP requested a value but the input channel is exhausted",
                        ));
                    }
                },
                Decoded::Out => {
                    self.output.push(self.accumulator.to_string());
                }
                Decoded::Hlt => {
                    self.running = false;
                }
            }
        }
        Ok(self.output.clone())
    }

    /// Perform one decode/execute step. On `INP` this *requests* input
    /// rather than reading it — call [`Machine::supply_input`] then `next()`
    /// again to complete the instruction.
    pub fn next(&mut self) -> StepOutcome {
        if !self.running {
            return StepOutcome::Halted;
        }

        // Resume a pending INP once the caller has supplied a value.
        if let Some(target) = self.pending_inp_target.take() {
            return self.finish_inp(target);
        }

        let word = match self.fetch() {
            Ok(w) => w,
            Err(e) => {
                self.running = false;
                return StepOutcome::Error(e);
            }
        };
        self.program_counter += 1;

        let decoded = match decode(word, self.mailboxes) {
            Ok(d) => d,
            Err(e) => {
                self.running = false;
                return StepOutcome::Error(e);
            }
        };

        match decoded {
            Decoded::Add(a) => match self.load_mailbox(a) {
                Ok(v) => {
                    self.accumulator += v;
                    self.push_snapshot();
                    StepOutcome::Ok
                }
                Err(e) => self.fault(e),
            },
            Decoded::Sub(a) => match self.load_mailbox(a) {
                Ok(v) => {
                    self.accumulator -= v;
                    self.push_snapshot();
                    StepOutcome::Ok
                }
                Err(e) => self.fault(e),
            },
            Decoded::Sta(a) => match self.store_mailbox(a, self.accumulator) {
                Ok(()) => {
                    self.push_snapshot();
                    StepOutcome::Ok
                }
                Err(e) => self.fault(e),
            },
            Decoded::Lda(a) => match self.load_mailbox(a) {
                Ok(v) => {
                    self.accumulator = v;
                    self.push_snapshot();
                    StepOutcome::Ok
                }
                Err(e) => self.fault(e),
            },
            Decoded::Bra(a) => match self.branch_to(a) {
                Ok(()) => {
                    self.push_snapshot();
                    StepOutcome::Ok
                }
                Err(e) => self.fault(e),
            },
            Decoded::Brz(a) => {
                if self.accumulator == 0 {
                    if let Err(e) = self.branch_to(a) {
                        return self.fault(e);
                    }
                }
                self.push_snapshot();
                StepOutcome::Ok
            }
            Decoded::Brp(a) => {
                if self.accumulator > 0 {
                    if let Err(e) = self.branch_to(a) {
                        return self.fault(e);
                    }
                }
                self.push_snapshot();
                StepOutcome::Ok
            }
            Decoded::Inp => {
                // Roll back the PC advance until the value actually arrives,
                // so rollback() before the value is supplied is a no-op step.
                self.pending_inp_target = Some(self.program_counter);
                StepOutcome::InputRequired
            }
            Decoded::Out => {
                let rendered = self.accumulator.to_string();
                self.output.push(rendered.clone());
                self.push_snapshot();
                StepOutcome::OutputProduced(rendered)
            }
            Decoded::Hlt => {
                self.running = false;
                self.push_snapshot();
                StepOutcome::Halted
            }
        }
    }

    /// Supply the integer for a pending `INP` request. No-op if no `INP` is
    /// pending.
    pub fn supply_input(&mut self, value: i64) {
        if self.pending_inp_target.is_some() {
            self.accumulator = value;
        }
    }

    fn finish_inp(&mut self, _target: usize) -> StepOutcome {
        self.push_snapshot();
        StepOutcome::Ok
    }

    /// Restore the most recent snapshot, a best-effort single-step-back used
    /// by the terminal debugger. A no-op if no steps have been taken yet.
    pub fn rollback(&mut self) -> bool {
        match self.history.pop() {
            Some(snap) => {
                self.accumulator = snap.accumulator;
                self.program_counter = snap.program_counter;
                self.memory = snap.memory;
                self.running = snap.running;
                self.output = snap.output;
                true
            }
            None => false,
        }
    }

    fn push_snapshot(&mut self) {
        self.history.push(Snapshot {
            accumulator: self.accumulator,
            program_counter: self.program_counter,
            memory: self.memory.clone(),
            running: self.running,
            output: self.output.clone(),
        });
        if self.history.len() > self.history_limit {
            self.history.remove(0);
        }
    }

    fn fault(&mut self, e: CoreError) -> StepOutcome {
        self.running = false;
        StepOutcome::Error(e)
    }

    fn fetch(&self) -> Result<i64, CoreError> {
        if self.program_counter >= self.program_len {
            return Err(CoreError::execute(
                ExecuteErrorKind::PcOutOfRange,
                format!(
                    "program counter {} ran past the end of the loaded program ({} words) \u{2014} missing HLT?",
                    self.program_counter, self.program_len
                ),
            ));
        }
        Ok(self.memory[self.program_counter])
    }

    fn load_mailbox(&self, addr: usize) -> Result<i64, CoreError> {
        self.memory.get(addr).copied().ok_or_else(|| {
            CoreError::execute(
                ExecuteErrorKind::IndexOutOfRange,
                format!("mailbox {addr} is out of range"),
            )
        })
    }

    fn store_mailbox(&mut self, addr: usize, value: i64) -> Result<(), CoreError> {
        match self.memory.get_mut(addr) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(CoreError::execute(
                ExecuteErrorKind::IndexOutOfRange,
                format!("mailbox {addr} is out of range"),
            )),
        }
    }

    fn branch_to(&mut self, addr: usize) -> Result<(), CoreError> {
        if addr >= self.mailboxes {
            return Err(CoreError::execute(
                ExecuteErrorKind::BranchOutOfRange,
                format!("branch target {addr} is out of range"),
            ));
        }
        self.program_counter = addr;
        Ok(())
    }
}
