//! Blocks of memory acquired from an upstream allocator
//!
//! Buffers never talk to the global allocator directly; they go
//! through [`Allocator`] so an embedding system can bound or account
//! for the storage they hold.

use std::alloc::{alloc, dealloc, Layout};
use std::ptr::NonNull;

use crate::error::{BufferError, Result};

/// Source of raw storage blocks
pub trait Allocator {
    /// Acquire a block described by `layout`
    ///
    /// `layout` always has a non-zero size.
    fn alloc_bytes(&self, layout: Layout) -> Result<NonNull<u8>>;

    /// Release a block previously returned by `alloc_bytes`
    ///
    /// # Safety
    ///
    /// `ptr` must have come from `alloc_bytes` on this allocator with
    /// the same `layout` and must not have been released already.
    unsafe fn dealloc_bytes(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process-wide allocator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAllocator;

impl Allocator for SystemAllocator {
    fn alloc_bytes(&self, layout: Layout) -> Result<NonNull<u8>> {
        debug_assert!(layout.size() > 0);
        let ptr = unsafe { alloc(layout) };
        NonNull::new(ptr).ok_or(BufferError::StorageExhausted {
            requested: layout.size(),
        })
    }

    unsafe fn dealloc_bytes(&self, ptr: NonNull<u8>, layout: Layout) {
        dealloc(ptr.as_ptr(), layout)
    }
}

impl<A: Allocator + ?Sized> Allocator for &A {
    fn alloc_bytes(&self, layout: Layout) -> Result<NonNull<u8>> {
        (**self).alloc_bytes(layout)
    }

    unsafe fn dealloc_bytes(&self, ptr: NonNull<u8>, layout: Layout) {
        (**self).dealloc_bytes(ptr, layout)
    }
}
