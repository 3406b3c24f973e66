//! Peripheral interface.
//!
//! The engine talks to the outside world only through [`Peripheral`]: it
//! asks for one value on every input instruction and hands over one value
//! on every output instruction. Both calls are synchronous.

use serde::{Serialize, Deserialize};
use std::collections::VecDeque;
use thiserror::Error;

/// A device attached to the machine's input and output channels.
pub trait Peripheral {
    /// Supply the next input value.
    fn request_input(&mut self) -> Result<i64, IoError>;

    /// Accept one output value.
    fn emit_output(&mut self, value: i64);
}

impl<P: Peripheral + ?Sized> Peripheral for &mut P {
    fn request_input(&mut self) -> Result<i64, IoError> {
        (**self).request_input()
    }

    fn emit_output(&mut self, value: i64) {
        (**self).emit_output(value)
    }
}

impl<P: Peripheral + ?Sized> Peripheral for Box<P> {
    fn request_input(&mut self) -> Result<i64, IoError> {
        (**self).request_input()
    }

    fn emit_output(&mut self, value: i64) {
        (**self).emit_output(value)
    }
}

/// Nothing attached: input is unavailable and output is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullIo;

impl Peripheral for NullIo {
    fn request_input(&mut self) -> Result<i64, IoError> {
        Err(IoError::NoInputDevice)
    }

    fn emit_output(&mut self, value: i64) {
        log::debug!("output {} dropped: no device attached", value);
    }
}

/// Queued input values and collected output values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferedIo {
    inputs: VecDeque<i64>,
    outputs: Vec<i64>,
}

impl BufferedIo {
    /// Create with no queued input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with `inputs` queued in order.
    pub fn with_inputs<I: IntoIterator<Item = i64>>(inputs: I) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            outputs: Vec::new(),
        }
    }

    /// Queue one more input value.
    pub fn push_input(&mut self, value: i64) {
        self.inputs.push_back(value);
    }

    /// Number of input values not yet consumed.
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// All output values so far.
    pub fn outputs(&self) -> &[i64] {
        &self.outputs
    }

    /// Most recent output value.
    pub fn last_output(&self) -> Option<i64> {
        self.outputs.last().copied()
    }

    /// Take the collected outputs, leaving the buffer empty.
    pub fn drain_outputs(&mut self) -> Vec<i64> {
        std::mem::take(&mut self.outputs)
    }
}

impl Peripheral for BufferedIo {
    fn request_input(&mut self) -> Result<i64, IoError> {
        self.inputs.pop_front().ok_or(IoError::InputExhausted)
    }

    fn emit_output(&mut self, value: i64) {
        self.outputs.push(value);
    }
}

/// Errors a peripheral can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IoError {
    #[error("no input device attached")]
    NoInputDevice,

    #[error("input queue exhausted")]
    InputExhausted,
}
