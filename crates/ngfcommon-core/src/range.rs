//! Half-open index ranges.

/// Half-open interval `[first_idx, last_idx)` over slot indices.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub first_idx: usize,
    pub last_idx: usize,
}

impl Range {
    #[must_use]
    pub const fn new(first_idx: usize, last_idx: usize) -> Self {
        Self {
            first_idx,
            last_idx,
        }
    }

    /// Number of indices covered. Inverted ranges are empty.
    #[must_use]
    pub const fn len(self) -> usize {
        self.last_idx.saturating_sub(self.first_idx)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn contains(self, idx: usize) -> bool {
        self.first_idx <= idx && idx < self.last_idx
    }
}

impl From<core::ops::Range<usize>> for Range {
    fn from(r: core::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<Range> for core::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.first_idx..r.last_idx
    }
}
