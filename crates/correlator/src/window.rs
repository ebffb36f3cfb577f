//! Fixed-length delay line.
//!
//! Backed by a `HeapRb` allocated once; pushing into a full buffer overwrites
//! the oldest entry, so the window always holds exactly `len` values.

use std::fmt;
use std::iter;

use ringbuf::{traits::*, HeapRb};

/// Most recent `len` values, logically newest first.
///
/// Starts filled with `T::default()` (zero), which models the pipeline-fill
/// period: until `len` real samples have arrived the window is partly zero.
pub struct SlidingWindow<T> {
    buf: HeapRb<T>,
    len: usize,
}

impl<T: fmt::Debug> fmt::Debug for SlidingWindow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlidingWindow")
            .field("len", &self.len)
            .finish()
    }
}

impl<T: Copy + Default> SlidingWindow<T> {
    /// Create a zero-filled window
    ///
    /// `len` must be non-zero; callers validate the filter length first.
    pub fn new(len: usize) -> Self {
        let mut buf = HeapRb::new(len);
        buf.push_iter(iter::repeat(T::default()).take(len));
        Self { buf, len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Shift by one and insert `value` as the newest entry (index 0)
    #[inline]
    pub fn push(&mut self, value: T) {
        self.buf.push_overwrite(value);
    }

    /// Entries from newest (index 0) to oldest (index `len - 1`)
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let (head, tail) = self.buf.as_slices();
        head.iter().chain(tail.iter()).rev()
    }

    /// Refill with zeros
    pub fn clear(&mut self) {
        *self = Self::new(self.len);
    }
}
