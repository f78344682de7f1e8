use serde::{Deserialize, Serialize};

use crate::error::RoundError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "multiplier", rename_all = "snake_case")]
pub enum PayoutRule {
    TotalLoss,
    Multiplier(f64),
    Jackpot,
}

impl PayoutRule {
    pub fn is_jackpot(self) -> bool {
        matches!(self, PayoutRule::Jackpot)
    }

    pub fn multiplier(self) -> Option<f64> {
        match self {
            PayoutRule::Multiplier(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WheelSegment {
    pub id: u8,
    pub label: String,
    pub weight: u32, // relative draw probability
    pub payout_rule: PayoutRule,
}

impl WheelSegment {
    pub fn new(id: u8, label: impl Into<String>, weight: u32, payout_rule: PayoutRule) -> Self {
        Self {
            id,
            label: label.into(),
            weight,
            payout_rule,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WheelConfig {
    pub segments: Vec<WheelSegment>,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self::default_five()
    }
}

impl WheelConfig {
    /// The five-slot wheel: 10% rug pull, 30% 1.5x, 20% 2x, 10% jackpot, 30% 1.5x.
    pub fn default_five() -> Self {
        Self {
            segments: vec![
                WheelSegment::new(0, "RUG PULL", 10, PayoutRule::TotalLoss),
                WheelSegment::new(1, "1.5x", 30, PayoutRule::Multiplier(1.5)),
                WheelSegment::new(2, "2x", 20, PayoutRule::Multiplier(2.0)),
                WheelSegment::new(3, "JACKPOT", 10, PayoutRule::Jackpot),
                WheelSegment::new(4, "1.5x", 30, PayoutRule::Multiplier(1.5)),
            ],
        }
    }

    pub fn total_weight(&self) -> u64 {
        self.segments.iter().map(|s| u64::from(s.weight)).sum()
    }

    pub fn get(&self, id: u8) -> Option<&WheelSegment> {
        self.segments.get(usize::from(id)).filter(|s| s.id == id)
    }

    /// Segment ids must match their position so that draw indices and ids agree.
    pub fn validate(&self) -> Result<(), RoundError> {
        if self.segments.is_empty() {
            return Err(RoundError::InvalidWheel("wheel has no segments".into()));
        }
        if self.segments.len() > usize::from(u8::MAX) + 1 {
            return Err(RoundError::InvalidWheel("too many segments".into()));
        }
        for (idx, seg) in self.segments.iter().enumerate() {
            if usize::from(seg.id) != idx {
                return Err(RoundError::InvalidWheel(format!(
                    "segment at position {idx} has id {}",
                    seg.id
                )));
            }
            if let PayoutRule::Multiplier(m) = seg.payout_rule {
                if !m.is_finite() || m < 0.0 {
                    return Err(RoundError::InvalidWheel(format!(
                        "segment {} has invalid multiplier {m}",
                        seg.id
                    )));
                }
            }
        }
        if self.total_weight() == 0 {
            return Err(RoundError::InvalidWheel("segment weights sum to zero".into()));
        }
        Ok(())
    }
}
