//! The Intcode virtual machine.
//!
//! This module implements the complete machine:
//! - sparse, auto-extending memory of signed 64-bit words
//! - a decoder for opcodes and the three parameter modes
//! - the fetch-decode-execute engine with a relative base register
//! - the peripheral interface used for input and output

pub mod memory;
pub mod decode;
pub mod execute;
pub mod io;

pub use memory::Memory;
pub use decode::{decode, DecodeError, Instruction, InstructionSet, Opcode, ParamMode};
pub use execute::{HaltReason, Machine, MachineError, MachineState, Step, Summary};
pub use io::{BufferedIo, IoError, NullIo, Peripheral};
