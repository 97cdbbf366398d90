//! Contiguous append-only buffers with a fixed geometric growth
//! schedule, and the byte chunk that embeds one.
extern crate pretty_hex;
extern crate thiserror;
extern crate tracing;

pub mod chunk;
pub mod error;
pub mod memory;

pub use chunk::Chunk;
pub use error::BufferError;
pub use memory::{
    buffer::{BufferStats, GrowableBuffer},
    growth::GrowthPolicy,
};
