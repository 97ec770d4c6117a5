//! Bounded history buffers backing the sparklines.

use std::collections::VecDeque;

/// Push `v`, evicting from the front until the deque fits `cap`.
pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if cap == 0 {
        dq.clear();
        return;
    }
    while dq.len() >= cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// Fixed-capacity series, oldest value first.
#[derive(Debug, Clone)]
pub struct RollingSeries<T> {
    values: VecDeque<T>,
    cap: usize,
}

impl<T> RollingSeries<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, v: T) {
        push_capped(&mut self.values, v, self.cap);
    }

    /// Change the capacity. Shrinking drops the oldest values and keeps the tail.
    pub fn resize(&mut self, cap: usize) {
        let excess = self.values.len().saturating_sub(cap);
        if excess > 0 {
            self.values.drain(..excess);
        }
        self.cap = cap;
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.values.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }
}

impl<T> Default for RollingSeries<T> {
    fn default() -> Self {
        Self::new(100)
    }
}
