//! Execution engine for Intcode.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.

use crate::vm::decode::{self, DecodeError, Instruction, InstructionSet, Opcode, ParamMode};
use crate::vm::io::{IoError, NullIo, Peripheral};
use crate::vm::Memory;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Machine execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineState {
    /// Machine is running normally.
    Running,
    /// Machine has stopped (halt instruction or unrecognized opcode).
    Halted,
    /// Machine stopped on an execution error.
    Faulted,
}

/// Why a machine entered [`MachineState::Halted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// Executed opcode 99.
    Halt,
    /// Fetched a word whose opcode is unknown or not enabled.
    UnknownOpcode { pc: u64, word: i64 },
}

/// Result of a single [`Machine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The instruction ran and the machine is still running.
    Executed(Instruction),
    /// The machine halted during this step.
    Halted(HaltReason),
}

/// Register-level view of a machine, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub state: MachineState,
    pub pc: u64,
    pub relative_base: i64,
    pub cycles: u64,
    pub halt_reason: Option<HaltReason>,
}

/// An Intcode machine with an attached peripheral.
#[derive(Clone)]
pub struct Machine<P = NullIo> {
    mem: Memory,
    program: Vec<i64>,
    pc: u64,
    relative_base: i64,
    state: MachineState,
    cycles: u64,
    isa: InstructionSet,
    halt_reason: Option<HaltReason>,
    io: P,
}

impl Machine<NullIo> {
    /// Create a machine with no peripheral attached.
    pub fn new(program: &[i64]) -> Self {
        Self::with_peripheral(program, NullIo)
    }
}

impl<P: Peripheral> Machine<P> {
    /// Create a machine running `program` with `io` attached.
    pub fn with_peripheral(program: &[i64], io: P) -> Self {
        Self {
            mem: Memory::from_program(program),
            program: program.to_vec(),
            pc: 0,
            relative_base: 0,
            state: MachineState::Running,
            cycles: 0,
            isa: InstructionSet::default(),
            halt_reason: None,
            io,
        }
    }

    /// Restrict the machine to a smaller instruction set.
    pub fn with_instruction_set(mut self, isa: InstructionSet) -> Self {
        self.isa = isa;
        self
    }

    /// Reset registers and reload the original program.
    ///
    /// The peripheral is left as it is.
    pub fn reset(&mut self) {
        self.mem = Memory::from_program(&self.program);
        self.pc = 0;
        self.relative_base = 0;
        self.state = MachineState::Running;
        self.cycles = 0;
        self.halt_reason = None;
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        if self.state != MachineState::Running {
            return Err(MachineError::NotRunning(self.state));
        }

        // Fetch
        let pc = self.pc;
        let word = self.mem.read(pc);

        // Decode
        let instr = match decode::decode(word) {
            Ok(instr) if instr.opcode.required_set() <= self.isa => instr,
            Ok(_) | Err(DecodeError::UnknownOpcode(_)) => {
                return Ok(self.halt(HaltReason::UnknownOpcode { pc, word }));
            }
            Err(source) => return Err(self.fault(MachineError::Decode { pc, source })),
        };

        if self.isa < InstructionSet::Relative && instr.used_modes().contains(&ParamMode::Relative) {
            return Err(self.fault(MachineError::ModeNotSupported { pc, mode: ParamMode::Relative }));
        }

        log::trace!(
            "pc={} word={} op={} base={}",
            pc, word, instr.opcode.mnemonic(), self.relative_base
        );

        // Execute
        if instr.opcode == Opcode::Halt {
            self.cycles += 1;
            return Ok(self.halt(HaltReason::Halt));
        }
        if let Err(e) = self.execute(instr) {
            return Err(self.fault(e));
        }
        self.cycles += 1;

        Ok(Step::Executed(instr))
    }

    /// Run until the machine halts.
    pub fn run(&mut self) -> Result<HaltReason, MachineError> {
        loop {
            if let Step::Halted(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    /// Run for at most `max_cycles` instructions.
    ///
    /// Returns `None` if the budget ran out before the machine halted.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<Option<HaltReason>, MachineError> {
        for _ in 0..max_cycles {
            if let Step::Halted(reason) = self.step()? {
                return Ok(Some(reason));
            }
        }
        Ok(None)
    }

    /// Execute a decoded instruction other than halt.
    fn execute(&mut self, instr: Instruction) -> Result<(), MachineError> {
        match instr.opcode {
            Opcode::Add => {
                let (a, b) = (self.read_param(&instr, 0)?, self.read_param(&instr, 1)?);
                let sum = a.checked_add(b).ok_or(MachineError::Overflow { pc: self.pc })?;
                self.store(&instr, 2, sum)?;
            }

            Opcode::Multiply => {
                let (a, b) = (self.read_param(&instr, 0)?, self.read_param(&instr, 1)?);
                let product = a.checked_mul(b).ok_or(MachineError::Overflow { pc: self.pc })?;
                self.store(&instr, 2, product)?;
            }

            Opcode::Input => {
                let dst = self.write_address(&instr, 0)?;
                let value = self.io.request_input()?;
                self.mem.write(dst, value);
            }

            Opcode::Output => {
                let value = self.read_param(&instr, 0)?;
                self.io.emit_output(value);
            }

            Opcode::JumpIfTrue | Opcode::JumpIfFalse => {
                let (a, b) = (self.read_param(&instr, 0)?, self.read_param(&instr, 1)?);
                let taken = (a != 0) == (instr.opcode == Opcode::JumpIfTrue);
                if taken {
                    self.pc = self.address(b)?;
                    return Ok(());
                }
            }

            Opcode::LessThan => {
                let (a, b) = (self.read_param(&instr, 0)?, self.read_param(&instr, 1)?);
                self.store(&instr, 2, i64::from(a < b))?;
            }

            Opcode::Equals => {
                let (a, b) = (self.read_param(&instr, 0)?, self.read_param(&instr, 1)?);
                self.store(&instr, 2, i64::from(a == b))?;
            }

            Opcode::AdjustBase => {
                let a = self.read_param(&instr, 0)?;
                self.relative_base = self.relative_base
                    .checked_add(a)
                    .ok_or(MachineError::Overflow { pc: self.pc })?;
            }

            Opcode::Halt => unreachable!("halt is handled by step"),
        }

        self.pc += instr.size();
        Ok(())
    }

    /// Raw operand word of parameter `slot`.
    fn raw_param(&self, slot: usize) -> i64 {
        self.mem.read(self.pc + 1 + slot as u64)
    }

    /// Read value of parameter `slot` according to its mode.
    fn read_param(&self, instr: &Instruction, slot: usize) -> Result<i64, MachineError> {
        let raw = self.raw_param(slot);
        match instr.modes[slot] {
            ParamMode::Immediate => Ok(raw),
            ParamMode::Position => Ok(self.mem.read(self.address(raw)?)),
            ParamMode::Relative => Ok(self.mem.read(self.relative_address(raw)?)),
        }
    }

    /// Write address of parameter `slot` according to its mode.
    fn write_address(&self, instr: &Instruction, slot: usize) -> Result<u64, MachineError> {
        let raw = self.raw_param(slot);
        match instr.modes[slot] {
            ParamMode::Position => self.address(raw),
            ParamMode::Relative => self.relative_address(raw),
            ParamMode::Immediate => Err(MachineError::ImmediateWrite { pc: self.pc, slot }),
        }
    }

    fn store(&mut self, instr: &Instruction, slot: usize, value: i64) -> Result<(), MachineError> {
        let dst = self.write_address(instr, slot)?;
        self.mem.write(dst, value);
        Ok(())
    }

    fn address(&self, raw: i64) -> Result<u64, MachineError> {
        u64::try_from(raw).map_err(|_| MachineError::NegativeAddress { pc: self.pc, address: raw })
    }

    fn relative_address(&self, raw: i64) -> Result<u64, MachineError> {
        let addr = raw
            .checked_add(self.relative_base)
            .ok_or(MachineError::Overflow { pc: self.pc })?;
        self.address(addr)
    }

    fn halt(&mut self, reason: HaltReason) -> Step {
        log::debug!("halted at pc={} after {} cycles: {:?}", self.pc, self.cycles, reason);
        self.state = MachineState::Halted;
        self.halt_reason = Some(reason);
        Step::Halted(reason)
    }

    fn fault(&mut self, err: MachineError) -> MachineError {
        log::debug!("faulted at pc={}: {}", self.pc, err);
        self.state = MachineState::Faulted;
        err
    }

    /// Read a memory cell.
    pub fn peek(&self, addr: u64) -> i64 {
        self.mem.read(addr)
    }

    /// Overwrite a memory cell, e.g. to patch a program before running it.
    pub fn poke(&mut self, addr: u64, value: i64) {
        self.mem.write(addr, value);
    }

    /// Machine memory.
    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    /// Mutable machine memory.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    /// The program the machine was created with.
    pub fn program(&self) -> &[i64] {
        &self.program
    }

    /// Program counter.
    pub fn pc(&self) -> u64 {
        self.pc
    }

    /// Relative base register.
    pub fn relative_base(&self) -> i64 {
        self.relative_base
    }

    /// Current execution state.
    pub fn state(&self) -> MachineState {
        self.state
    }

    /// Instructions completed since creation or the last reset.
    ///
    /// The halt instruction counts; an instruction that faults does not.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Why the machine halted, if it has.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halt_reason
    }

    pub fn instruction_set(&self) -> InstructionSet {
        self.isa
    }

    /// The attached peripheral.
    pub fn peripheral(&self) -> &P {
        &self.io
    }

    /// The attached peripheral, mutably.
    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.io
    }

    /// Consume the machine and return its peripheral.
    pub fn into_peripheral(self) -> P {
        self.io
    }

    /// Check if the machine is halted.
    pub fn is_halted(&self) -> bool {
        self.state == MachineState::Halted
    }

    /// Check if the machine is running.
    pub fn is_running(&self) -> bool {
        self.state == MachineState::Running
    }

    pub fn summary(&self) -> Summary {
        Summary {
            state: self.state,
            pc: self.pc,
            relative_base: self.relative_base,
            cycles: self.cycles,
            halt_reason: self.halt_reason,
        }
    }
}

impl<P> std::fmt::Debug for Machine<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("state", &self.state)
            .field("pc", &self.pc)
            .field("relative_base", &self.relative_base)
            .field("cycles", &self.cycles)
            .field("mem", &self.mem)
            .finish()
    }
}

/// Errors that can occur during execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("machine not running: {0:?}")]
    NotRunning(MachineState),

    #[error("decode error at pc {pc}: {source}")]
    Decode { pc: u64, source: DecodeError },

    #[error("{mode:?} mode not supported by this instruction set (pc {pc})")]
    ModeNotSupported { pc: u64, mode: ParamMode },

    #[error("parameter {slot} of the instruction at pc {pc} writes to an immediate operand")]
    ImmediateWrite { pc: u64, slot: usize },

    #[error("negative address {address} at pc {pc}")]
    NegativeAddress { pc: u64, address: i64 },

    #[error("arithmetic overflow at pc {pc}")]
    Overflow { pc: u64 },

    #[error("peripheral error: {0}")]
    Peripheral(#[from] IoError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::BufferedIo;

    fn run_with_inputs(program: &[i64], inputs: &[i64]) -> Vec<i64> {
        let mut machine = Machine::with_peripheral(program, BufferedIo::with_inputs(inputs.to_vec()));
        machine.run().unwrap();
        machine.into_peripheral().drain_outputs()
    }

    #[test]
    fn test_halt_immediately() {
        let mut machine = Machine::new(&[99]);

        let reason = machine.run().unwrap();

        assert_eq!(reason, HaltReason::Halt);
        assert!(machine.is_halted());
        assert_eq!(machine.pc(), 0);
        assert_eq!(machine.memory().image(2), vec![99, 0]);
        assert_eq!(machine.memory().touched(), 1);
    }

    #[test]
    fn test_multiply_with_immediate_operand() {
        let mut machine = Machine::new(&[1002, 4, 3, 4, 33]);

        let step = machine.step().unwrap();
        assert!(matches!(step, Step::Executed(Instruction { opcode: Opcode::Multiply, .. })));
        assert_eq!(machine.peek(4), 99);
        assert_eq!(machine.pc(), 4);

        assert_eq!(machine.step().unwrap(), Step::Halted(HaltReason::Halt));
        assert_eq!(machine.pc(), 4);
        assert_eq!(machine.cycles(), 2);
    }

    #[test]
    fn test_position_mode_arithmetic() {
        let mut machine = Machine::new(&[1, 9, 10, 3, 2, 3, 11, 0, 99, 30, 40, 50]);
        machine.run().unwrap();
        assert_eq!(machine.peek(0), 3500);
        assert_eq!(machine.peek(3), 70);

        let mut machine = Machine::new(&[1, 1, 1, 4, 99, 5, 6, 0, 99]);
        machine.run().unwrap();
        assert_eq!(machine.memory().image(9), vec![30, 1, 1, 4, 2, 5, 6, 0, 99]);
    }

    #[test]
    fn test_relative_base_persists() {
        let mut machine = Machine::new(&[109, 19, 99]);
        machine.run().unwrap();
        assert_eq!(machine.relative_base(), 19);

        // 204,-15 reads address -15 + 19 = 4
        let outputs = run_with_inputs(&[109, 19, 204, -15, 99], &[]);
        assert_eq!(outputs, vec![99]);
    }

    #[test]
    fn test_relative_write() {
        // base := 10, then input stored at 2 + 10
        let mut machine = Machine::with_peripheral(&[109, 10, 203, 2, 99], BufferedIo::with_inputs([42]));
        machine.run().unwrap();
        assert_eq!(machine.peek(12), 42);
    }

    #[test]
    fn test_unknown_opcode_fails_soft() {
        let mut machine = Machine::new(&[1101, 2, 3, 0, 77, 99]);

        let reason = machine.run().unwrap();

        assert_eq!(reason, HaltReason::UnknownOpcode { pc: 4, word: 77 });
        assert!(machine.is_halted());
        assert_eq!(machine.pc(), 4);
        assert_eq!(machine.peek(0), 5);
        assert_eq!(machine.halt_reason(), Some(reason));
    }

    #[test]
    fn test_step_after_halt_is_error() {
        let mut machine = Machine::new(&[99]);
        machine.run().unwrap();
        assert_eq!(machine.step(), Err(MachineError::NotRunning(MachineState::Halted)));
    }

    #[test]
    fn test_comparisons_and_jumps() {
        // Output 1 if input == 8, else 0
        let equals_eight = [3, 9, 8, 9, 10, 9, 4, 9, 99, -1, 8];
        assert_eq!(run_with_inputs(&equals_eight, &[8]), vec![1]);
        assert_eq!(run_with_inputs(&equals_eight, &[7]), vec![0]);

        // Output 1 if input < 8 (immediate mode)
        let less_than_eight = [3, 3, 1107, -1, 8, 3, 4, 3, 99];
        assert_eq!(run_with_inputs(&less_than_eight, &[5]), vec![1]);
        assert_eq!(run_with_inputs(&less_than_eight, &[9]), vec![0]);

        // Output 0 if input is zero, else 1
        let jump_test = [3, 12, 6, 12, 15, 1, 13, 14, 13, 4, 13, 99, -1, 0, 1, 9];
        assert_eq!(run_with_inputs(&jump_test, &[0]), vec![0]);
        assert_eq!(run_with_inputs(&jump_test, &[3]), vec![1]);

        let jump_immediate = [3, 3, 1105, -1, 9, 1101, 0, 0, 12, 4, 12, 99, 1];
        assert_eq!(run_with_inputs(&jump_immediate, &[0]), vec![0]);
        assert_eq!(run_with_inputs(&jump_immediate, &[-4]), vec![1]);
    }

    #[test]
    fn test_quine() {
        let quine = [109, 1, 204, -1, 1001, 100, 1, 100, 1008, 100, 16, 101, 1006, 101, 0, 99];
        assert_eq!(run_with_inputs(&quine, &[]), quine.to_vec());
    }

    #[test]
    fn test_large_numbers() {
        assert_eq!(run_with_inputs(&[104, 1125899906842624, 99], &[]), vec![1125899906842624]);
        assert_eq!(
            run_with_inputs(&[1102, 34915192, 34915192, 7, 4, 7, 99, 0], &[]),
            vec![1219070632396864]
        );
    }

    #[test]
    fn test_immediate_write_faults() {
        let mut machine = Machine::new(&[11101, 1, 1, 0, 99]);

        let err = machine.run().unwrap_err();

        assert_eq!(err, MachineError::ImmediateWrite { pc: 0, slot: 2 });
        assert_eq!(machine.state(), MachineState::Faulted);
        assert_eq!(machine.peek(0), 11101);
    }

    #[test]
    fn test_invalid_mode_faults() {
        let mut machine = Machine::new(&[301, 0, 0, 0, 99]);
        let err = machine.run().unwrap_err();
        assert!(matches!(
            err,
            MachineError::Decode { pc: 0, source: DecodeError::InvalidMode { slot: 0, digit: 3, .. } }
        ));
        assert_eq!(machine.state(), MachineState::Faulted);
    }

    #[test]
    fn test_negative_address_faults() {
        let mut machine = Machine::new(&[1, -1, 0, 0, 99]);
        assert_eq!(
            machine.run(),
            Err(MachineError::NegativeAddress { pc: 0, address: -1 })
        );
    }

    #[test]
    fn test_overflow_faults() {
        let mut machine = Machine::new(&[1102, i64::MAX, 2, 0, 99]);
        assert_eq!(machine.run(), Err(MachineError::Overflow { pc: 0 }));
        assert_eq!(machine.cycles(), 0);
    }

    #[test]
    fn test_input_exhausted() {
        let mut machine = Machine::with_peripheral(&[1101, 1, 1, 9, 3, 0, 99], BufferedIo::new());
        assert_eq!(
            machine.run(),
            Err(MachineError::Peripheral(IoError::InputExhausted))
        );
        assert_eq!(machine.pc(), 4);
        // Only the add completed
        assert_eq!(machine.cycles(), 1);
    }

    #[test]
    fn test_unused_mode_digits_do_not_fault() {
        let mut machine = Machine::new(&[30099]);
        assert_eq!(machine.run(), Ok(HaltReason::Halt));
        assert_eq!(machine.state(), MachineState::Halted);

        assert_eq!(run_with_inputs(&[30004, 0, 99], &[]), vec![30004]);
    }

    #[test]
    fn test_capability_gating() {
        // Input is not part of the arithmetic set
        let mut machine = Machine::with_peripheral(&[3, 0, 99], BufferedIo::with_inputs([1]))
            .with_instruction_set(InstructionSet::Arithmetic);
        assert_eq!(machine.run(), Ok(HaltReason::UnknownOpcode { pc: 0, word: 3 }));
        assert_eq!(machine.peripheral().pending_inputs(), 1);

        // Adjust-base needs the relative set
        let mut machine = Machine::new(&[109, 1, 99]).with_instruction_set(InstructionSet::Io);
        assert_eq!(machine.run(), Ok(HaltReason::UnknownOpcode { pc: 0, word: 109 }));

        // So does relative mode
        let mut machine = Machine::new(&[204, 0, 99]).with_instruction_set(InstructionSet::Io);
        assert_eq!(
            machine.run(),
            Err(MachineError::ModeNotSupported { pc: 0, mode: ParamMode::Relative })
        );

        let mut machine = Machine::new(&[1, 0, 0, 0, 99]).with_instruction_set(InstructionSet::Arithmetic);
        assert_eq!(machine.run(), Ok(HaltReason::Halt));
        assert_eq!(machine.peek(0), 2);
    }

    #[test]
    fn test_run_limited() {
        // Jump to self forever
        let mut machine = Machine::new(&[1105, 1, 0]);
        assert_eq!(machine.run_limited(10), Ok(None));
        assert_eq!(machine.cycles(), 10);
        assert!(machine.is_running());
    }

    #[test]
    fn test_poke_and_reset() {
        let mut machine = Machine::new(&[1, 0, 0, 0, 99]);
        machine.poke(0, 2);
        machine.run().unwrap();
        assert_eq!(machine.peek(0), 4);

        machine.reset();
        assert!(machine.is_running());
        assert_eq!(machine.pc(), 0);
        assert_eq!(machine.peek(0), 1);
        machine.run().unwrap();
        assert_eq!(machine.peek(0), 2);
    }
}
