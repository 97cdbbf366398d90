//! Buffer errors
use thiserror::Error;

/// The single failure mode of a growable buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// A block could not be acquired, either because the allocator
    /// refused or because the size is not representable
    ///
    /// `requested` is in the units of whoever raised it: bytes from an
    /// [`Allocator`](crate::memory::alloc::Allocator), elements from a
    /// buffer, which converts allocator failures into element counts.
    #[error("storage exhausted acquiring room for {requested}")]
    StorageExhausted { requested: usize },
}

pub type Result<T> = std::result::Result<T, BufferError>;
