//! Standard paper sizes, all in inches, all landscape unless noted.

use serde::{Deserialize, Serialize};

/// A page size in inches. The ISO A-series constants are the exact
/// 2^(1/4)m x 2^(-1/4)m geometric progression rather than the rounded
/// millimeter figures printed on the ream.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PaperSize {
    pub width: f64,
    pub height: f64,
}

impl PaperSize {
    pub const fn new(width: f64, height: f64) -> PaperSize {
        PaperSize { width, height }
    }

    /// Swap width and height.
    pub fn flipped(&self) -> PaperSize {
        PaperSize::new(self.height, self.width)
    }

    /// Width-major orientation.
    pub fn landscape(&self) -> PaperSize {
        if self.width >= self.height {
            *self
        } else {
            self.flipped()
        }
    }

    /// Height-major orientation.
    pub fn portrait(&self) -> PaperSize {
        if self.height >= self.width {
            *self
        } else {
            self.flipped()
        }
    }
}

pub const A0: PaperSize = PaperSize::new(46.81917775601264, 33.106158080854904);
pub const A1: PaperSize = PaperSize::new(33.106158080854904, 23.40958887800632);
pub const A2: PaperSize = PaperSize::new(23.40958887800632, 16.553079040427452);
pub const A3: PaperSize = PaperSize::new(16.553079040427452, 11.70479443900316);
pub const A4: PaperSize = PaperSize::new(11.70479443900316, 8.276539520213726);
pub const A5: PaperSize = PaperSize::new(8.276539520213726, 5.85239721950158);
pub const A6: PaperSize = PaperSize::new(5.85239721950158, 4.138269760106863);
pub const A7: PaperSize = PaperSize::new(4.138269760106863, 2.92619860975079);
pub const LETTER: PaperSize = PaperSize::new(11.0, 8.5);
pub const TABLOID: PaperSize = PaperSize::new(11.0, 17.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a_series_halving() {
        // Each size is the previous one cut across the long edge.
        for (big, small) in [(A0, A1), (A1, A2), (A2, A3), (A3, A4), (A4, A5)] {
            assert!((small.width - big.height).abs() < 1e-9);
            assert!((small.height - big.width / 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_orientation() {
        assert_eq!(TABLOID.landscape(), PaperSize::new(17.0, 11.0));
        assert_eq!(LETTER.portrait(), PaperSize::new(8.5, 11.0));
        assert_eq!(A3.landscape(), A3);
    }
}
