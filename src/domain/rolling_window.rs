//! Fixed-capacity sliding window with running sum and sum of squares.
//!
//! Every indicator keeps its rolling statistics in one of these rather than
//! re-summing the window each bar.

use std::collections::VecDeque;

/// Upper bound on storage reserved up front; larger windows grow on demand.
const MAX_RESERVED: usize = 1024;

#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    sum: f64,
    sum_sq: f64,
}

impl RollingWindow {
    /// Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity.min(MAX_RESERVED)),
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    /// Appends `value`, evicting and returning the oldest value once the
    /// window is over capacity.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);
        self.sum += value;
        self.sum_sq += value * value;

        if self.values.len() > self.capacity {
            let evicted = self.values.pop_front()?;
            self.sum -= evicted;
            self.sum_sq -= evicted * evicted;
            Some(evicted)
        } else {
            None
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            self.sum / self.values.len() as f64
        }
    }

    /// Population variance, clamped to be non-negative.
    pub fn variance(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let n = self.values.len() as f64;
        let mean = self.sum / n;
        (self.sum_sq / n - mean * mean).max(0.0)
    }

    pub fn stddev(&self) -> f64 {
        self.variance().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn empty_window_is_neutral() {
        let w = RollingWindow::new(3);
        assert!(w.is_empty());
        assert_eq!(w.mean(), 0.0);
        assert_eq!(w.variance(), 0.0);
        assert_eq!(w.stddev(), 0.0);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let mut w = RollingWindow::new(0);
        assert_eq!(w.capacity(), 1);
        assert_eq!(w.push(5.0), None);
        assert_eq!(w.push(7.0), Some(5.0));
        assert_eq!(w.len(), 1);
        assert_abs_diff_eq!(w.sum(), 7.0);
    }

    #[test]
    fn evicts_oldest_and_keeps_sums() {
        let mut w = RollingWindow::new(3);
        assert_eq!(w.push(1.0), None);
        assert_eq!(w.push(2.0), None);
        assert_eq!(w.push(3.0), None);
        assert_eq!(w.push(4.0), Some(1.0));

        assert_eq!(w.len(), 3);
        assert_abs_diff_eq!(w.sum(), 9.0);
        assert_abs_diff_eq!(w.mean(), 3.0);
    }

    #[test]
    fn population_variance() {
        let mut w = RollingWindow::new(8);
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            w.push(v);
        }
        assert_abs_diff_eq!(w.variance(), 4.0, epsilon = 1e-10);
        assert_abs_diff_eq!(w.stddev(), 2.0, epsilon = 1e-10);
    }

    #[test]
    fn constant_values_never_go_negative() {
        let mut w = RollingWindow::new(4);
        for _ in 0..50 {
            w.push(0.1 + 0.2);
            assert!(w.variance() >= 0.0);
        }
        assert_abs_diff_eq!(w.stddev(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn matches_direct_computation_after_many_evictions() {
        let values: Vec<f64> = (0..40).map(|i| ((i * 37) % 11) as f64 - 5.0).collect();
        let mut w = RollingWindow::new(5);
        for &v in &values {
            w.push(v);
        }
        let tail = &values[values.len() - 5..];
        let mean = tail.iter().sum::<f64>() / 5.0;
        let var = tail.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 5.0;
        assert_abs_diff_eq!(w.mean(), mean, epsilon = 1e-9);
        assert_abs_diff_eq!(w.variance(), var, epsilon = 1e-9);
    }

    #[test]
    fn huge_capacity_grows_on_demand() {
        let mut w = RollingWindow::new(usize::MAX);
        for v in [1.0, 2.0, 3.0] {
            assert_eq!(w.push(v), None);
        }
        assert_eq!(w.capacity(), usize::MAX);
        assert_eq!(w.len(), 3);
        assert_abs_diff_eq!(w.mean(), 2.0);
    }
}
