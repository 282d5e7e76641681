use std::collections::VecDeque;

/// Rolling window of the most recent trade prices
///
/// Holds at most `capacity` prices; pushing into a full window evicts the oldest.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    prices: VecDeque<f64>,
    capacity: usize,
}

impl PriceWindow {
    /// Create an empty window
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of prices to keep
    pub fn new(capacity: usize) -> Self {
        Self {
            prices: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append the newest price, dropping the oldest if over capacity
    pub fn push(&mut self, price: f64) {
        self.prices.push_back(price);

        if self.prices.len() > self.capacity {
            self.prices.pop_front();
        }
    }

    /// Snapshot of the window, oldest first
    ///
    /// Returns a copy so a computation never observes a half-updated window.
    pub fn values(&self) -> Vec<f64> {
        self.prices.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.prices.back().copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_window() {
        let window = PriceWindow::new(20);
        assert_eq!(window.capacity(), 20);
        assert!(window.is_empty());
        assert_eq!(window.latest(), None);
    }

    #[test]
    fn test_push_keeps_arrival_order() {
        let mut window = PriceWindow::new(20);

        window.push(100.0);
        window.push(101.0);
        window.push(102.0);

        assert_eq!(window.values(), vec![100.0, 101.0, 102.0]);
        assert_eq!(window.latest(), Some(102.0));
    }

    #[test]
    fn test_capacity_limit() {
        let mut window = PriceWindow::new(5);

        // Push 12 prices into a window of 5
        for i in 0..12 {
            window.push(100.0 + i as f64);
            assert!(window.len() <= 5);
        }

        // Should hold the last 5: 107..=111
        assert_eq!(window.values(), vec![107.0, 108.0, 109.0, 110.0, 111.0]);
    }

    #[test]
    fn test_values_is_a_snapshot() {
        let mut window = PriceWindow::new(3);
        window.push(1.0);
        window.push(2.0);

        let snapshot = window.values();
        window.push(3.0);
        window.push(4.0);

        assert_eq!(snapshot, vec![1.0, 2.0]);
        assert_eq!(window.values(), vec![2.0, 3.0, 4.0]);
    }
}
