//! Storage acquisition and growth for buffers
pub mod alloc;
pub mod buffer;
pub mod growth;
