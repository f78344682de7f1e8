use crate::{error::RoundError, rng::RandomSource, segments::WheelConfig};

/// Cumulative weights over the wheel, e.g. `[10, 40, 60, 70, 100]` for the default table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawTable {
    cumulative: Vec<u64>,
}

impl DrawTable {
    pub fn from_weights(weights: &[u32]) -> Result<Self, RoundError> {
        let mut acc = 0u64;
        let cumulative: Vec<u64> = weights
            .iter()
            .map(|w| {
                acc += u64::from(*w);
                acc
            })
            .collect();
        if acc == 0 {
            return Err(RoundError::InvalidWheel("segment weights sum to zero".into()));
        }
        Ok(Self { cumulative })
    }

    pub fn from_wheel(wheel: &WheelConfig) -> Result<Self, RoundError> {
        let weights: Vec<u32> = wheel.segments.iter().map(|s| s.weight).collect();
        Self::from_weights(&weights)
    }

    pub fn total(&self) -> u64 {
        // non-empty: from_weights rejects a zero total
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Map a unit float to a segment index: first index whose cumulative weight exceeds `u * total`.
    pub fn pick(&self, u: f64) -> usize {
        let u = if u.is_finite() { u.clamp(0.0, 1.0) } else { 0.0 };
        let x = u * self.total() as f64;
        self.cumulative
            .iter()
            .position(|&c| (c as f64) > x)
            // u == 1.0 lands past the end; zero-weight tail segments are never chosen
            .unwrap_or_else(|| self.last_weighted())
    }

    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> usize {
        self.pick(rng.next_unit())
    }

    fn last_weighted(&self) -> usize {
        let total = self.total();
        self.cumulative
            .iter()
            .position(|&c| c == total)
            .unwrap_or(0)
    }
}
