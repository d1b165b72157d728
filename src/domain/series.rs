// Fixed-capacity rolling history feeding the sparklines
use std::collections::VecDeque;

pub const SERIES_CAPACITY: usize = 60;

#[derive(Debug, Clone)]
pub struct RollingSeries {
    max: usize,
    buf: VecDeque<f64>,
}

impl RollingSeries {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            buf: VecDeque::with_capacity(max + 1),
        }
    }

    /// Append `value`; evicts exactly one oldest sample once over capacity.
    pub fn push(&mut self, value: f64) {
        self.buf.push_back(value);
        if self.buf.len() > self.max {
            self.buf.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Oldest to newest.
    pub fn as_slice(&mut self) -> &[f64] {
        self.buf.make_contiguous()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.buf.iter().copied()
    }
}

impl Default for RollingSeries {
    fn default() -> Self {
        Self::new(SERIES_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_exceeds_capacity() {
        let mut series = RollingSeries::default();
        for i in 0..200 {
            series.push(i as f64);
            assert!(series.len() <= SERIES_CAPACITY);
        }
        assert_eq!(series.len(), SERIES_CAPACITY);
    }

    #[test]
    fn test_evicts_oldest_first() {
        let mut series = RollingSeries::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            series.push(v);
        }
        assert_eq!(series.as_slice(), &[2.0, 3.0, 4.0]);

        series.push(5.0);
        assert_eq!(series.iter().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
    }
}
