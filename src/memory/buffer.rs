//! A growable append-only buffer
//!
//! `GrowableBuffer` owns one contiguous block and grows it on a
//! geometric schedule (8, 16, 32 ... by default) when an append would
//! overflow. Growth acquires the new block, copies the populated
//! prefix across and releases the old block. Storage never shrinks.
//!
//! Allocation failure is fatal for [`GrowableBuffer::append`] (as it is
//! for `Vec`). [`GrowableBuffer::try_append`] surfaces it instead and
//! leaves the buffer untouched.

use std::alloc::{handle_alloc_error, Layout};
use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::mem::{self, size_of};
use std::ptr::{self, NonNull};
use std::slice;

use tracing::{debug, error, trace};

use super::{
    alloc::{Allocator, SystemAllocator},
    growth::GrowthPolicy,
};
use crate::error::{BufferError, Result};

/// Backing block for [`GrowableBuffer<T>`]
///
/// Knows its capacity but not how many slots are populated, so it
/// never drops contents.
struct RawBuffer<T> {
    capacity: usize,
    ptr: Option<NonNull<T>>,
}

impl<T> RawBuffer<T> {
    /// New empty backing block
    fn new() -> Self {
        RawBuffer {
            capacity: 0,
            ptr: None,
        }
    }

    fn layout(capacity: usize) -> Result<Layout> {
        Layout::array::<T>(capacity).map_err(|_| BufferError::StorageExhausted {
            requested: capacity,
        })
    }

    /// Acquire a block with room for `capacity` elements
    fn alloc<A: Allocator>(mem: &A, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::new());
        }

        let layout = Self::layout(capacity)?;
        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            mem.alloc_bytes(layout)
                .map_err(|_| BufferError::StorageExhausted {
                    requested: capacity,
                })?
                .cast()
        };

        Ok(RawBuffer {
            capacity,
            ptr: Some(ptr),
        })
    }

    /// Hand the block back to `mem` and become empty
    fn release<A: Allocator>(&mut self, mem: &A) {
        if let Some(ptr) = self.ptr.take() {
            // layout was computed successfully when the block was acquired
            if let Ok(layout) = Self::layout(self.capacity) {
                if layout.size() > 0 {
                    unsafe { mem.dealloc_bytes(ptr.cast(), layout) }
                }
            }
        }
        self.capacity = 0;
    }

    fn base(&self) -> NonNull<T> {
        self.ptr.unwrap_or(NonNull::dangling())
    }
}

/// Counters describing the storage traffic of a buffer
///
/// Only maintained in debug builds or with the `telemetry` feature;
/// otherwise every field stays at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Number of times storage was replaced by a larger block
    pub growth_events: u64,
    /// Elements moved from old blocks into new ones
    pub elements_copied: u64,
    /// Total bytes of storage acquired
    pub bytes_acquired: u64,
    /// Total bytes of storage released
    pub bytes_released: u64,
}

impl BufferStats {
    #[allow(unused_variables)]
    fn record_growth(&mut self, copied: usize, acquired: usize, released: usize) {
        #[cfg(any(debug_assertions, feature = "telemetry"))]
        {
            self.growth_events += 1;
            self.elements_copied += copied as u64;
            self.bytes_acquired += acquired as u64;
            self.bytes_released += released as u64;
        }
    }

    #[allow(unused_variables)]
    fn record_release(&mut self, released: usize) {
        #[cfg(any(debug_assertions, feature = "telemetry"))]
        {
            self.bytes_released += released as u64;
        }
    }
}

/// Contiguous append-only buffer
///
/// Positions `[0, len)` hold appended values in order. The buffer
/// exclusively owns its storage and releases it on
/// [`destroy`](GrowableBuffer::destroy) or drop.
pub struct GrowableBuffer<T, A: Allocator = SystemAllocator> {
    /// Number of populated slots
    length: usize,
    /// Underlying storage
    data: RawBuffer<T>,
    policy: GrowthPolicy,
    mem: A,
    stats: BufferStats,
    _owns: PhantomData<T>,
}

unsafe impl<T: Send, A: Allocator + Send> Send for GrowableBuffer<T, A> {}
unsafe impl<T: Sync, A: Allocator + Sync> Sync for GrowableBuffer<T, A> {}

impl<T> GrowableBuffer<T> {
    /// Empty buffer on the system allocator with the default schedule
    pub fn new() -> Self {
        Self::with_policy_in(GrowthPolicy::default(), SystemAllocator)
    }

    /// Empty buffer on the system allocator with a custom schedule
    pub fn with_policy(policy: GrowthPolicy) -> Self {
        Self::with_policy_in(policy, SystemAllocator)
    }
}

impl<T> Default for GrowableBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator> GrowableBuffer<T, A> {
    /// Empty buffer drawing storage from `mem`
    pub fn new_in(mem: A) -> Self {
        Self::with_policy_in(GrowthPolicy::default(), mem)
    }

    /// Empty buffer drawing storage from `mem` on a custom schedule
    pub fn with_policy_in(policy: GrowthPolicy, mem: A) -> Self {
        GrowableBuffer {
            length: 0,
            data: RawBuffer::new(),
            policy,
            mem,
            stats: BufferStats::default(),
            _owns: PhantomData,
        }
    }

    /// Number of populated slots
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of slots in the current block
    pub fn capacity(&self) -> usize {
        self.data.capacity
    }

    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    pub fn allocator(&self) -> &A {
        &self.mem
    }

    pub fn stats(&self) -> BufferStats {
        self.stats
    }

    /// Add an item at the end, halting the process if storage cannot
    /// be acquired
    ///
    /// An allocator refusal aborts through [`handle_alloc_error`]; a
    /// capacity that cannot be represented panics with `capacity
    /// overflow`.
    pub fn append(&mut self, value: T) {
        if let Err(e) = self.try_append(value) {
            self.storage_failure(e)
        }
    }

    /// Add an item at the end
    ///
    /// On failure the buffer is exactly as it was before the call and
    /// `value` is dropped.
    pub fn try_append(&mut self, value: T) -> Result<()> {
        if self.data.capacity < self.length + 1 {
            self.grow()?;
        }

        unsafe {
            ptr::write(self.data.base().as_ptr().add(self.length), value);
        }
        self.length += 1;
        Ok(())
    }

    /// Checked read of the element at `index`
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Element at `index`
    ///
    /// # Panics
    ///
    /// If `index >= len()`.
    pub fn element_at(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => panic!(
                "bounds error: index {} but length is {}",
                index, self.length
            ),
        }
    }

    /// The populated prefix of storage
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.data.base().as_ptr(), self.length) }
    }

    /// Drop all elements, release storage and return to the empty
    /// state. Calling this on an empty buffer does nothing.
    pub fn destroy(&mut self) {
        if self.data.ptr.is_none() {
            self.length = 0;
            return;
        }

        debug!(
            length = self.length,
            capacity = self.data.capacity,
            "destroying buffer"
        );

        let len = mem::replace(&mut self.length, 0);
        let base = self.data.base();
        // releases the block even if an element's drop panics
        let _release = ReleaseGuard {
            data: &mut self.data,
            mem: &self.mem,
            stats: &mut self.stats,
        };
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(base.as_ptr(), len));
        }
    }

    fn storage_failure(&self, e: BufferError) -> ! {
        error!(
            length = self.length,
            capacity = self.data.capacity,
            "fatal: {}",
            e
        );
        let BufferError::StorageExhausted { requested } = e;
        if requested == usize::MAX {
            panic!("capacity overflow");
        }
        match Layout::array::<T>(requested) {
            Ok(layout) => handle_alloc_error(layout),
            Err(_) => panic!("capacity overflow"),
        }
    }

    /// Move contents and storage into a new buffer, leaving this one
    /// empty
    pub fn take(&mut self) -> Self
    where
        A: Clone,
    {
        GrowableBuffer {
            length: mem::replace(&mut self.length, 0),
            data: mem::replace(&mut self.data, RawBuffer::new()),
            policy: self.policy,
            mem: self.mem.clone(),
            stats: mem::take(&mut self.stats),
            _owns: PhantomData,
        }
    }

    /// Replace storage with the next block in the schedule
    fn grow(&mut self) -> Result<()> {
        let old_capacity = self.data.capacity;
        let new_capacity =
            self.policy
                .next_capacity(old_capacity)
                .ok_or(BufferError::StorageExhausted {
                    requested: usize::MAX,
                })?;

        let fresh = RawBuffer::alloc(&self.mem, new_capacity)?;
        if let (Some(old), Some(new)) = (self.data.ptr, fresh.ptr) {
            unsafe {
                ptr::copy_nonoverlapping(old.as_ptr(), new.as_ptr(), self.length);
            }
        }

        let mut old = mem::replace(&mut self.data, fresh);
        old.release(&self.mem);

        self.stats.record_growth(
            self.length,
            new_capacity * size_of::<T>(),
            old_capacity * size_of::<T>(),
        );
        trace!(
            length = self.length,
            old_capacity,
            new_capacity,
            "buffer grown"
        );
        Ok(())
    }
}

/// Hands a buffer's block back to its allocator when dropped
struct ReleaseGuard<'a, T, A: Allocator> {
    data: &'a mut RawBuffer<T>,
    mem: &'a A,
    stats: &'a mut BufferStats,
}

impl<'a, T, A: Allocator> Drop for ReleaseGuard<'a, T, A> {
    fn drop(&mut self) {
        let released = self.data.capacity * size_of::<T>();
        self.data.release(self.mem);
        self.stats.record_release(released);
    }
}

impl<T, A: Allocator> Drop for GrowableBuffer<T, A> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<T: Debug, A: Allocator> Debug for GrowableBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("length", &self.length)
            .field("capacity", &self.data.capacity)
            .field("elements", &self.as_slice())
            .finish()
    }
}
