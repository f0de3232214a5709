//! Per-cycle Q-score histograms.

use crate::constants::MetricGroup;
use crate::metrics::MetricRecord;

/// Number of histogram bins in an unbinned Q-score histogram (Q1 through Q50).
pub const MAX_Q_BINS: usize = 50;

/// One Q-score bin: the quality range it covers and the value reported for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QScoreBin {
    pub lower: u8,
    pub upper: u8,
    pub value: u8,
}

impl QScoreBin {
    #[must_use]
    pub fn new(lower: u8, upper: u8, value: u8) -> Self {
        Self { lower, upper, value }
    }
}

/// Header of a Q metric set: the bin definitions, empty when unbinned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QHeader {
    pub bins: Vec<QScoreBin>,
}

impl QHeader {
    /// Number of histogram entries each record carries.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        if self.bins.is_empty() { MAX_Q_BINS } else { self.bins.len() }
    }

    /// Q-score represented by histogram entry `index`.
    #[must_use]
    pub fn qscore(&self, index: usize) -> u32 {
        match self.bins.get(index) {
            Some(bin) => u32::from(bin.value),
            None => u32::try_from(index + 1).unwrap_or(u32::MAX),
        }
    }
}

/// Q-score histogram of one tile at one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QMetric {
    lane: u32,
    tile: u32,
    cycle: u32,
    histogram: Vec<u32>,
}

impl QMetric {
    #[must_use]
    pub fn new(lane: u32, tile: u32, cycle: u32, histogram: Vec<u32>) -> Self {
        Self { lane, tile, cycle, histogram }
    }

    #[must_use]
    pub fn histogram(&self) -> &[u32] {
        &self.histogram
    }

    /// Total number of base calls in the histogram.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.histogram.iter().map(|&c| u64::from(c)).sum()
    }

    /// Calls with a Q-score of at least `threshold`.
    #[must_use]
    pub fn total_over(&self, threshold: u32, header: &QHeader) -> u64 {
        self.histogram
            .iter()
            .enumerate()
            .filter(|&(i, _)| header.qscore(i) >= threshold)
            .map(|(_, &c)| u64::from(c))
            .sum()
    }

    /// Percentage of calls with a Q-score of at least `threshold`, `NaN` when empty.
    #[must_use]
    pub fn percent_over(&self, threshold: u32, header: &QHeader) -> f32 {
        let total = self.total();
        if total == 0 {
            return f32::NAN;
        }
        (self.total_over(threshold, header) as f64 / total as f64 * 100.0) as f32
    }

    /// Q-score of the median call, 0 when empty.
    #[must_use]
    pub fn median(&self, header: &QHeader) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let mut cumulative = 0_u64;
        for (i, &count) in self.histogram.iter().enumerate() {
            cumulative += u64::from(count);
            if cumulative * 2 >= total {
                return header.qscore(i);
            }
        }
        0
    }
}

impl MetricRecord for QMetric {
    type Header = QHeader;
    const GROUP: MetricGroup = MetricGroup::Q;

    fn lane(&self) -> u32 {
        self.lane
    }

    fn tile(&self) -> u32 {
        self.tile
    }

    fn cycle(&self) -> u32 {
        self.cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unbinned(counts: &[(usize, u32)]) -> QMetric {
        let mut histogram = vec![0; MAX_Q_BINS];
        for &(q, count) in counts {
            histogram[q - 1] = count;
        }
        QMetric::new(1, 1101, 1, histogram)
    }

    #[test]
    fn test_unbinned_thresholds() {
        let header = QHeader::default();
        let metric = unbinned(&[(10, 10), (25, 30), (35, 60)]);
        assert_eq!(metric.total(), 100);
        assert_eq!(metric.total_over(20, &header), 90);
        assert_eq!(metric.total_over(30, &header), 60);
        assert!((metric.percent_over(30, &header) - 60.0).abs() < 1e-4);
        assert_eq!(metric.median(&header), 35);
    }

    #[test]
    fn test_binned_thresholds() {
        let header = QHeader {
            bins: vec![QScoreBin::new(1, 19, 14), QScoreBin::new(20, 29, 21), QScoreBin::new(30, 41, 38)],
        };
        assert_eq!(header.bin_count(), 3);
        let metric = QMetric::new(1, 1101, 1, vec![5, 5, 10]);
        assert_eq!(metric.total_over(20, &header), 15);
        assert_eq!(metric.total_over(30, &header), 10);
        assert_eq!(metric.median(&header), 38);
    }

    #[test]
    fn test_empty_histogram() {
        let metric = QMetric::new(1, 1101, 1, vec![0; MAX_Q_BINS]);
        assert!(metric.percent_over(30, &QHeader::default()).is_nan());
        assert_eq!(metric.median(&QHeader::default()), 0);
    }
}
