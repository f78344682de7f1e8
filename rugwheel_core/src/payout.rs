use crate::segments::PayoutRule;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FEE_RATE: f64 = 0.05;

/// Where a reported payout has to be paid from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayoutFunding {
    /// Nothing to pay.
    None,
    /// Paid out of the pot, which the engine has already emptied.
    Pot,
    /// Not backed by the pot; the calling system settles it against its own balance.
    External,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Settlement {
    pub payout: f64,
    pub pot_after: f64,
    pub funding: PayoutFunding,
}

/// Split a gross bet into (fee, net). The net share goes to the pot.
pub fn split_fee(amount: f64, fee_rate: f64) -> (f64, f64) {
    let fee = amount * fee_rate;
    (fee, amount - fee)
}

pub fn settle(rule: PayoutRule, stake: f64, pot: f64) -> Settlement {
    match rule {
        PayoutRule::TotalLoss => Settlement {
            payout: 0.0,
            pot_after: pot,
            funding: PayoutFunding::None,
        },
        PayoutRule::Multiplier(m) => {
            let payout = stake * m;
            Settlement {
                payout,
                pot_after: pot,
                funding: if payout > 0.0 {
                    PayoutFunding::External
                } else {
                    PayoutFunding::None
                },
            }
        }
        PayoutRule::Jackpot => Settlement {
            payout: pot,
            pot_after: 0.0,
            funding: PayoutFunding::Pot,
        },
    }
}
