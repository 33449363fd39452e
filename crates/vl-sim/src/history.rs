//! Rolling chart history.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One chart point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    /// Tick index the sample was computed at
    pub time: u64,
    /// Terminal voltage (V)
    pub voltage: f64,
    /// Load current (A)
    pub current: f64,
}

/// Bounded FIFO of the most recent samples, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    samples: VecDeque<HistorySample>,
    capacity: usize,
}

impl HistoryBuffer {
    pub const DEFAULT_CAPACITY: usize = 50;

    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "History capacity must be positive");
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when full.
    pub fn push(&mut self, sample: HistorySample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest(&self) -> Option<&HistorySample> {
        self.samples.front()
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    /// Chronological iterator.
    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<HistorySample> {
        self.samples.iter().copied().collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(t: u64) -> HistorySample {
        HistorySample {
            time: t,
            voltage: 1.0,
            current: 0.1,
        }
    }

    #[test]
    fn evicts_oldest_first() {
        let mut h = HistoryBuffer::new(3);
        for t in 0..5 {
            h.push(sample(t));
        }
        let times: Vec<u64> = h.iter().map(|s| s.time).collect();
        assert_eq!(times, vec![2, 3, 4]);
        assert_eq!(h.oldest().map(|s| s.time), Some(2));
        assert_eq!(h.latest().map(|s| s.time), Some(4));
    }

    #[test]
    fn default_holds_fifty() {
        let mut h = HistoryBuffer::default();
        for t in 0..=50 {
            h.push(sample(t));
        }
        assert_eq!(h.len(), 50);
        assert_eq!(h.oldest().map(|s| s.time), Some(1));
        assert_eq!(h.latest().map(|s| s.time), Some(50));
    }

    #[test]
    fn clear_empties() {
        let mut h = HistoryBuffer::new(2);
        h.push(sample(0));
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.capacity(), 2);
    }

    #[test]
    #[should_panic(expected = "History capacity must be positive")]
    fn zero_capacity_panics() {
        let _ = HistoryBuffer::new(0);
    }
}
