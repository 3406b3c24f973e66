//! # Intcode
//!
//! A virtual machine for the Intcode integer instruction set, with an
//! attachable arcade cabinet peripheral.
//!
//! The machine runs over sparse 64-bit memory with position, immediate and
//! relative addressing. Peripherals plug in through the [`Peripheral`] trait;
//! the [`Arcade`] cabinet turns the machine's output into a tile grid and
//! steers the paddle on its own.

pub mod vm;
pub mod arcade;
pub mod program;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export commonly used types
pub use vm::{
    decode, BufferedIo, DecodeError, HaltReason, Instruction, InstructionSet, IoError, Machine,
    MachineError, MachineState, Memory, NullIo, Opcode, ParamMode, Peripheral, Step,
};
pub use arcade::{Arcade, Joystick, Point, Screen, Tile};
pub use program::{disassemble, load_program, parse_program, ProgramError};

#[cfg(feature = "tui")]
pub use tui::run_viewer;
