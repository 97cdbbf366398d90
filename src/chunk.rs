//! Bytecode chunk storage
//!
//! A chunk is a growable run of bytes. What the bytes mean is up to
//! the compiler and interpreter that use it.

use std::fmt;

use pretty_hex::PrettyHex;

use crate::error::Result;
use crate::memory::buffer::GrowableBuffer;

/// Sequence of bytecode bytes
#[derive(Default)]
pub struct Chunk {
    code: GrowableBuffer<u8>,
}

impl Chunk {
    /// Empty chunk with no storage acquired
    pub fn new() -> Self {
        Chunk {
            code: GrowableBuffer::new(),
        }
    }

    /// Append a byte, halting the process if storage cannot be acquired
    pub fn write(&mut self, byte: u8) {
        self.code.append(byte)
    }

    /// Append a byte, reporting storage exhaustion to the caller
    pub fn try_write(&mut self, byte: u8) -> Result<()> {
        self.code.try_append(byte)
    }

    /// Release storage and return to the empty state
    pub fn free(&mut self) {
        self.code.destroy()
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.code.capacity()
    }

    pub fn code(&self) -> &[u8] {
        self.code.as_slice()
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.code().hex_dump())
    }
}
