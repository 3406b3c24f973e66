//! Intcode memory subsystem.
//!
//! Memory is conceptually infinite: every non-negative address holds a
//! signed 64-bit word, and any address that was never written reads as zero.
//! Only cells that have been written are materialized.

use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Sparse Intcode memory.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    cells: HashMap<u64, i64>,
}

impl Memory {
    /// Create an empty memory; every address reads as zero.
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
        }
    }

    /// Create a memory holding `program` at addresses `0..program.len()`.
    pub fn from_program(program: &[i64]) -> Self {
        let mut mem = Self::new();
        mem.load_program(0, program);
        mem
    }

    /// Read a cell. Never-written addresses read as zero.
    #[inline]
    pub fn read(&self, addr: u64) -> i64 {
        self.cells.get(&addr).copied().unwrap_or(0)
    }

    /// Write a cell, extending memory as needed.
    #[inline]
    pub fn write(&mut self, addr: u64, value: i64) {
        self.cells.insert(addr, value);
    }

    /// Copy `program` into memory starting at `start_addr`.
    pub fn load_program(&mut self, start_addr: u64, program: &[i64]) {
        for (addr, &word) in (start_addr..).zip(program) {
            self.write(addr, word);
        }
    }

    /// Clear all memory back to zeros.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of cells that have been written at least once.
    pub fn touched(&self) -> usize {
        self.cells.len()
    }

    /// Highest address ever written, if any.
    pub fn highest_address(&self) -> Option<u64> {
        self.cells.keys().copied().max()
    }

    /// Dense copy of addresses `0..len`.
    pub fn image(&self, len: u64) -> Vec<i64> {
        (0..len).map(|addr| self.read(addr)).collect()
    }

    /// Dump `count` cells starting at `start` (for debugging).
    pub fn dump(&self, start: u64, count: u64) -> Vec<(u64, i64)> {
        (start..start.saturating_add(count))
            .map(|addr| (addr, self.read(addr)))
            .collect()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.values().filter(|&&v| v != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("touched_cells", &self.cells.len())
            .finish()
    }
}
