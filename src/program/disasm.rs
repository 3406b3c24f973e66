//! Disassembler for Intcode programs.
//!
//! Intcode freely mixes code and data, so a linear sweep can only guess:
//! any word that does not decode is shown as `DATA`.

use crate::vm::decode::{decode, Instruction, ParamMode};
use crate::vm::Memory;

/// Disassemble the instruction at `addr`.
///
/// Returns the text and the number of words it covers.
pub fn disassemble_at(mem: &Memory, addr: u64) -> (String, u64) {
    let word = mem.read(addr);
    match decode(word) {
        Ok(instr) => {
            let operands: Vec<String> = instr
                .used_modes()
                .iter()
                .enumerate()
                .map(|(slot, mode)| format_operand(mem.read(addr + 1 + slot as u64), *mode))
                .collect();
            (format_instruction(&instr, &operands), instr.size())
        }
        Err(_) => (format!("DATA {}", word), 1),
    }
}

/// Disassemble a whole program by linear sweep.
pub fn disassemble(program: &[i64]) -> String {
    let mem = Memory::from_program(program);
    let end = program.len() as u64;
    let mut output = String::new();
    output.push_str("; Intcode Disassembly\n");
    output.push_str("; -------------------\n\n");

    let mut addr = 0;
    while addr < end {
        let (line, size) = disassemble_at(&mem, addr);
        // An instruction running past the end is really trailing data
        let (line, size) = if addr + size > end {
            (format!("DATA {}", mem.read(addr)), 1)
        } else {
            (line, size)
        };
        let words: Vec<String> = (addr..addr + size).map(|a| mem.read(a).to_string()).collect();
        output.push_str(&format!("{:05}: {:<28} ; {}\n", addr, line, words.join(",")));
        addr += size;
    }

    output
}

fn format_instruction(instr: &Instruction, operands: &[String]) -> String {
    if operands.is_empty() {
        instr.opcode.mnemonic().to_string()
    } else {
        format!("{} {}", instr.opcode.mnemonic(), operands.join(", "))
    }
}

/// Format an operand: `[n]` position, `#n` immediate, `[rb+n]` relative.
fn format_operand(raw: i64, mode: ParamMode) -> String {
    match mode {
        ParamMode::Position => format!("[{}]", raw),
        ParamMode::Immediate => format!("#{}", raw),
        ParamMode::Relative if raw < 0 => format!("[rb{}]", raw),
        ParamMode::Relative => format!("[rb+{}]", raw),
    }
}
