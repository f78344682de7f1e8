use std::collections::VecDeque;

use serde::Serialize;

use crate::engine::{BetReceipt, SpinOutcome};
use crate::segments::PayoutRule;

pub const RECENT_OUTCOMES: usize = 10;

/// Running totals for one session, plus the last few resolved spins (newest first).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionStats {
    pub rounds: u64,
    pub bets: u64,
    pub total_wagered: f64,
    pub total_fees: f64,
    pub total_paid: f64,
    pub rug_pulls: u64,
    pub jackpots: u64,
    pub biggest_payout: f64,
    recent: VecDeque<SpinOutcome>,
}

impl SessionStats {
    pub fn record_bet(&mut self, receipt: &BetReceipt) {
        self.bets += 1;
        self.total_wagered += receipt.amount;
        self.total_fees += receipt.fee;
    }

    pub fn record_spin(&mut self, outcome: &SpinOutcome) {
        self.rounds += 1;
        self.total_paid += outcome.payout;
        match outcome.segment.payout_rule {
            PayoutRule::TotalLoss => self.rug_pulls += 1,
            PayoutRule::Jackpot => self.jackpots += 1,
            PayoutRule::Multiplier(_) => {}
        }
        if outcome.payout > self.biggest_payout {
            self.biggest_payout = outcome.payout;
        }
        self.recent.push_front(outcome.clone());
        self.recent.truncate(RECENT_OUTCOMES);
    }

    pub fn recent(&self) -> impl Iterator<Item = &SpinOutcome> {
        self.recent.iter()
    }

    /// Share of resolved rounds that did not land on a total loss.
    pub fn win_rate(&self) -> f64 {
        if self.rounds == 0 {
            return 0.0;
        }
        (self.rounds - self.rug_pulls) as f64 / self.rounds as f64
    }
}
