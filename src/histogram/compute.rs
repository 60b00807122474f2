//! 256-bin intensity histograms.
//!
//! One [`Histogram`] per plane, in storage order. Counts are exact: bins of
//! one plane always sum to `height * width`.

use ndarray::ArrayView2;

use crate::plane::ColorImage;

/// Number of intensity levels of an 8-bit sample.
pub const BINS: usize = 256;

/// Pixel counts per intensity value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; BINS],
}

impl Histogram {
    /// Histogram with every bin at zero.
    pub fn empty() -> Self {
        Histogram { bins: [0; BINS] }
    }

    /// Wrap precomputed bin counts.
    pub fn from_bins(bins: [u64; BINS]) -> Self {
        Histogram { bins }
    }

    pub fn bins(&self) -> &[u64; BINS] {
        &self.bins
    }

    /// Count for intensity `value`.
    pub fn count(&self, value: u8) -> u64 {
        self.bins[value as usize]
    }

    /// Sum of all bins.
    pub fn total(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Largest single bin count.
    pub fn max_count(&self) -> u64 {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// Intensity with the highest count (lowest value wins ties).
    pub fn peak(&self) -> u8 {
        let max = self.max_count();
        self.bins.iter().position(|&c| c == max).unwrap_or(0) as u8
    }

    /// Intensities with a non-zero count.
    pub fn occupied(&self) -> impl Iterator<Item = u8> + '_ {
        self.bins
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(v, _)| v as u8)
    }

    /// Cumulative distribution: `cdf[v]` counts samples `<= v`.
    pub fn cdf(&self) -> [u64; BINS] {
        let mut cdf = [0u64; BINS];
        let mut running = 0u64;
        for (slot, &count) in cdf.iter_mut().zip(self.bins.iter()) {
            running += count;
            *slot = running;
        }
        cdf
    }
}

impl Default for Histogram {
    fn default() -> Self {
        Self::empty()
    }
}

/// Count the samples of one plane.
pub fn channel_histogram(plane: ArrayView2<u8>) -> Histogram {
    let mut bins = [0u64; BINS];
    for &v in plane.iter() {
        bins[v as usize] += 1;
    }
    Histogram { bins }
}

/// One histogram per plane, in storage order.
pub fn histograms(image: &ColorImage) -> Vec<Histogram> {
    image
        .planes()
        .iter()
        .map(|plane| channel_histogram(plane.view()))
        .collect()
}
