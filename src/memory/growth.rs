//! Growth schedule for buffers

/// First capacity acquired by an empty buffer
pub const DEFAULT_INITIAL_CAPACITY: usize = 8;

/// Multiplier applied to capacity on each subsequent growth
pub const DEFAULT_GROWTH_FACTOR: usize = 2;

/// Geometric growth schedule
///
/// The default policy grows an empty buffer to 8 slots and doubles
/// from there: 8, 16, 32, 64 ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthPolicy {
    initial_capacity: usize,
    factor: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        GrowthPolicy {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            factor: DEFAULT_GROWTH_FACTOR,
        }
    }
}

impl GrowthPolicy {
    /// Capacity of the first block (at least 1)
    pub fn with_initial_capacity(self, initial_capacity: usize) -> Self {
        GrowthPolicy {
            initial_capacity: initial_capacity.max(1),
            ..self
        }
    }

    /// Growth multiplier (at least 2)
    pub fn with_factor(self, factor: usize) -> Self {
        GrowthPolicy {
            factor: factor.max(2),
            ..self
        }
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn factor(&self) -> usize {
        self.factor
    }

    /// Capacity to grow to from `existing_capacity`, `None` on overflow
    pub fn next_capacity(&self, existing_capacity: usize) -> Option<usize> {
        if existing_capacity == 0 {
            Some(self.initial_capacity)
        } else {
            existing_capacity.checked_mul(self.factor)
        }
    }
}
