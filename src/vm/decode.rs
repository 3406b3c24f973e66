//! Instruction decoder for Intcode.
//!
//! An instruction word packs its opcode into the two lowest decimal digits
//! and one parameter mode per following digit:
//!
//! ```text
//!   ABCDE
//!    1002
//!   DE - two-digit opcode       (02 = multiply)
//!    C - mode of 1st parameter  (0 = position)
//!    B - mode of 2nd parameter  (1 = immediate)
//!    A - mode of 3rd parameter  (0 = position, omitted leading zero)
//! ```

use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Number of parameter slots carried by every decoded instruction.
pub const MAX_PARAMS: usize = 3;

/// Parameter addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamMode {
    /// The parameter is an address (mode digit 0).
    Position,
    /// The parameter is the value itself (mode digit 1).
    Immediate,
    /// The parameter is an address offset by the relative base (mode digit 2).
    Relative,
}

impl ParamMode {
    /// Create from a mode digit.
    pub fn from_digit(digit: i64) -> Option<Self> {
        match digit {
            0 => Some(ParamMode::Position),
            1 => Some(ParamMode::Immediate),
            2 => Some(ParamMode::Relative),
            _ => None,
        }
    }

    /// Convert to a mode digit.
    pub fn to_digit(self) -> i64 {
        match self {
            ParamMode::Position => 0,
            ParamMode::Immediate => 1,
            ParamMode::Relative => 2,
        }
    }
}

/// Capability level of a machine.
///
/// Each level is a strict superset of the one before it, so levels compare
/// with `<`/`>=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InstructionSet {
    /// Add, multiply and halt only.
    Arithmetic,
    /// Adds input/output, jumps and comparisons.
    Io,
    /// Adds relative-mode parameters and the adjust-base instruction.
    #[default]
    Relative,
}

/// Intcode operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// `[c] := a + b`
    Add,
    /// `[c] := a * b`
    Multiply,
    /// `[a] := input`
    Input,
    /// `output a`
    Output,
    /// `if a != 0 { pc := b }`
    JumpIfTrue,
    /// `if a == 0 { pc := b }`
    JumpIfFalse,
    /// `[c] := (a < b) as i64`
    LessThan,
    /// `[c] := (a == b) as i64`
    Equals,
    /// `relative_base += a`
    AdjustBase,
    /// Stop the machine.
    Halt,
}

impl Opcode {
    // Numeric opcode values
    const ADD: i64 = 1;
    const MUL: i64 = 2;
    const INP: i64 = 3;
    const OUT: i64 = 4;
    const JT: i64 = 5;
    const JF: i64 = 6;
    const LT: i64 = 7;
    const EQ: i64 = 8;
    const ARB: i64 = 9;
    const HLT: i64 = 99;

    /// Look up an opcode by its two-digit code.
    pub fn from_code(code: i64) -> Option<Self> {
        let op = match code {
            Self::ADD => Opcode::Add,
            Self::MUL => Opcode::Multiply,
            Self::INP => Opcode::Input,
            Self::OUT => Opcode::Output,
            Self::JT => Opcode::JumpIfTrue,
            Self::JF => Opcode::JumpIfFalse,
            Self::LT => Opcode::LessThan,
            Self::EQ => Opcode::Equals,
            Self::ARB => Opcode::AdjustBase,
            Self::HLT => Opcode::Halt,
            _ => return None,
        };
        Some(op)
    }

    /// The two-digit code of this opcode.
    pub fn code(self) -> i64 {
        match self {
            Opcode::Add => Self::ADD,
            Opcode::Multiply => Self::MUL,
            Opcode::Input => Self::INP,
            Opcode::Output => Self::OUT,
            Opcode::JumpIfTrue => Self::JT,
            Opcode::JumpIfFalse => Self::JF,
            Opcode::LessThan => Self::LT,
            Opcode::Equals => Self::EQ,
            Opcode::AdjustBase => Self::ARB,
            Opcode::Halt => Self::HLT,
        }
    }

    /// Number of parameters the operation consumes.
    pub fn param_count(self) -> usize {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::LessThan | Opcode::Equals => 3,
            Opcode::JumpIfTrue | Opcode::JumpIfFalse => 2,
            Opcode::Input | Opcode::Output | Opcode::AdjustBase => 1,
            Opcode::Halt => 0,
        }
    }

    /// Smallest instruction set that includes this opcode.
    pub fn required_set(self) -> InstructionSet {
        match self {
            Opcode::Add | Opcode::Multiply | Opcode::Halt => InstructionSet::Arithmetic,
            Opcode::AdjustBase => InstructionSet::Relative,
            _ => InstructionSet::Io,
        }
    }

    /// Assembly mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Add => "ADD",
            Opcode::Multiply => "MUL",
            Opcode::Input => "IN",
            Opcode::Output => "OUT",
            Opcode::JumpIfTrue => "JT",
            Opcode::JumpIfFalse => "JF",
            Opcode::LessThan => "LT",
            Opcode::Equals => "EQ",
            Opcode::AdjustBase => "ARB",
            Opcode::Halt => "HLT",
        }
    }
}

/// A decoded instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub modes: [ParamMode; MAX_PARAMS],
}

impl Instruction {
    /// Total length in words, including the instruction word itself.
    pub fn size(&self) -> u64 {
        self.opcode.param_count() as u64 + 1
    }

    /// Modes of the parameters this opcode actually uses.
    pub fn used_modes(&self) -> &[ParamMode] {
        &self.modes[..self.opcode.param_count()]
    }
}

/// Decode an instruction word.
///
/// The opcode is checked before the modes, so a word with an unknown opcode
/// always reports [`DecodeError::UnknownOpcode`]. Only the mode digits of
/// parameters the opcode consumes must be valid; any other digit decodes as
/// position mode.
pub fn decode(word: i64) -> Result<Instruction, DecodeError> {
    let opcode = Opcode::from_code(word % 100).ok_or(DecodeError::UnknownOpcode(word))?;

    let mut modes = [ParamMode::Position; MAX_PARAMS];
    let mut place = 100;
    for (slot, mode) in modes.iter_mut().enumerate() {
        let digit = (word / place) % 10;
        *mode = match ParamMode::from_digit(digit) {
            Some(mode) => mode,
            None if slot >= opcode.param_count() => ParamMode::Position,
            None => return Err(DecodeError::InvalidMode { word, slot, digit }),
        };
        place *= 10;
    }

    Ok(Instruction { opcode, modes })
}

/// Encode an instruction back to a word.
pub fn encode(instr: &Instruction) -> i64 {
    instr.modes
        .iter()
        .rev()
        .fold(0, |acc, mode| acc * 10 + mode.to_digit())
        * 100
        + instr.opcode.code()
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown opcode in word {0}")]
    UnknownOpcode(i64),

    #[error("invalid mode digit {digit} for parameter {slot} in word {word}")]
    InvalidMode { word: i64, slot: usize, digit: i64 },
}
