use rugwheel_core::{BetReceipt, PayoutFunding, SpinOutcome};

/// Simulated balances for `play`. The engine only reports payouts; this is
/// where they are actually settled. Multiplier wins come out of the house,
/// jackpots out of the pot the engine just emptied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimWallet {
    pub player: f64,
    pub house: f64,
}

impl SimWallet {
    pub fn new(player: f64, house: f64) -> Self {
        Self { player, house }
    }

    pub fn can_afford(&self, amount: f64) -> bool {
        self.player >= amount
    }

    /// A free spin is staked by the house. Fees go to the house either way.
    pub fn debit_bet(&mut self, receipt: &BetReceipt, free_spin: bool) {
        if free_spin {
            self.house -= receipt.amount;
        } else {
            self.player -= receipt.amount;
        }
        self.house += receipt.fee;
    }

    pub fn credit_outcome(&mut self, outcome: &SpinOutcome) {
        self.player += outcome.payout;
        if outcome.funding == PayoutFunding::External {
            self.house -= outcome.payout;
        }
    }
}
