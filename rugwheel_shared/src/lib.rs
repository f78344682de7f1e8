use chrono::{DateTime, Utc};
use rugwheel_core::{PayoutFunding, SpinOutcome};
use serde::{Deserialize, Serialize};

/// Preset bet sizes offered next to the amount input.
pub const QUICK_AMOUNTS: [f64; 5] = [0.1, 0.5, 1.0, 5.0, 10.0];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct BetLimits {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for BetLimits {
    fn default() -> Self {
        Self {
            min: 0.01,
            max: 10.0,
            step: 0.01,
        }
    }
}

impl BetLimits {
    /// Snap user input into range. Non-numbers fall back to the minimum.
    pub fn clamp(&self, amount: f64) -> f64 {
        if !amount.is_finite() {
            return self.min;
        }
        let snapped = if self.step > 0.0 {
            (amount / self.step).round() * self.step
        } else {
            amount
        };
        snapped.clamp(self.min, self.max)
    }

    pub fn contains(&self, amount: f64) -> bool {
        (self.min..=self.max).contains(&amount)
    }
}

/// What a rendering collaborator needs to show a resolved spin.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpinReport {
    pub round: u64,
    pub segment_id: u8,
    pub label: String,
    pub multiplier: Option<f64>,
    pub jackpot: bool,
    pub payout: f64,
    pub funding: PayoutFunding,
    pub pot: f64,
    pub bonus_tokens: u64,
}

impl From<&SpinOutcome> for SpinReport {
    fn from(o: &SpinOutcome) -> Self {
        Self {
            round: o.round,
            segment_id: o.segment.id,
            label: o.segment.label.clone(),
            multiplier: o.multiplier(),
            jackpot: o.is_jackpot(),
            payout: o.payout,
            funding: o.funding,
            pot: o.pot_after,
            bonus_tokens: o.bonus_tokens,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RoundLogEntry {
    pub ts: DateTime<Utc>,
    pub round: u64,
    pub segment_id: u8,
    pub label: String,
    pub stake: f64,
    pub payout: f64,
    pub pot_after: f64,
}

impl RoundLogEntry {
    pub fn from_outcome(ts: DateTime<Utc>, o: &SpinOutcome) -> Self {
        Self {
            ts,
            round: o.round,
            segment_id: o.segment.id,
            label: o.segment.label.clone(),
            stake: o.stake,
            payout: o.payout,
            pot_after: o.pot_after,
        }
    }

    pub fn csv_header() -> [&'static str; 7] {
        ["round", "ts", "segment_id", "label", "stake", "payout", "pot_after"]
    }

    pub fn csv_record(&self) -> [String; 7] {
        [
            self.round.to_string(),
            self.ts.to_rfc3339(),
            self.segment_id.to_string(),
            self.label.clone(),
            self.stake.to_string(),
            self.payout.to_string(),
            self.pot_after.to_string(),
        ]
    }
}
