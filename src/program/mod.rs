//! Program loading and disassembly.
//!
//! This module provides:
//! - A parser for comma-separated Intcode text
//! - A disassembler (words → readable mnemonics)

pub mod parse;
pub mod disasm;

pub use parse::{load_program, parse_program, ProgramError};
pub use disasm::{disassemble, disassemble_at};
