use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::RewardError;

pub const DAILY_TOKENS: u64 = 10;
pub const WEEKLY_TOKENS: u64 = 100;
pub const FIRST_TIME_TOKENS: u64 = 50;
pub const WEEKLY_TARGET: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGrant {
    pub tokens: u64,
    pub free_spins: u32,
}

/// Per-player reward flags for one session. Dates come from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardTracker {
    daily_claimed_on: Option<NaiveDate>,
    weekly_progress: u8,
    first_time_claimed: bool,
    free_spins: u32,
    referred_by: Option<String>,
    first_bet_placed: bool,
}

impl RewardTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weekly_progress(&self) -> u8 {
        self.weekly_progress
    }

    pub fn free_spins(&self) -> u32 {
        self.free_spins
    }

    pub fn daily_available(&self, today: NaiveDate) -> bool {
        self.daily_claimed_on != Some(today)
    }

    pub fn claim_daily(&mut self, today: NaiveDate) -> Result<RewardGrant, RewardError> {
        if !self.daily_available(today) {
            return Err(RewardError::AlreadyClaimed);
        }
        self.daily_claimed_on = Some(today);
        self.weekly_progress = (self.weekly_progress + 1).min(WEEKLY_TARGET);
        Ok(RewardGrant {
            tokens: DAILY_TOKENS,
            free_spins: 0,
        })
    }

    pub fn claim_weekly(&mut self) -> Result<RewardGrant, RewardError> {
        if self.weekly_progress < WEEKLY_TARGET {
            return Err(RewardError::WeeklyIncomplete {
                progress: self.weekly_progress,
            });
        }
        self.weekly_progress = 0;
        Ok(self.grant_spin(WEEKLY_TOKENS))
    }

    pub fn claim_first_time_bonus(&mut self) -> Result<RewardGrant, RewardError> {
        if self.first_time_claimed {
            return Err(RewardError::AlreadyClaimed);
        }
        self.first_time_claimed = true;
        Ok(self.grant_spin(FIRST_TIME_TOKENS))
    }

    /// Take one banked free spin, if any.
    pub fn use_free_spin(&mut self) -> bool {
        if self.free_spins == 0 {
            return false;
        }
        self.free_spins -= 1;
        true
    }

    /// Only the first referrer sticks.
    pub fn set_referrer(&mut self, code: impl Into<String>) {
        if self.referred_by.is_none() && !self.first_bet_placed {
            self.referred_by = Some(code.into());
        }
    }

    /// Call on every bet. On a referred player's first bet, yields the referrer to credit.
    pub fn record_first_bet(&mut self) -> Option<String> {
        if self.first_bet_placed {
            return None;
        }
        self.first_bet_placed = true;
        self.referred_by.clone()
    }

    fn grant_spin(&mut self, tokens: u64) -> RewardGrant {
        self.free_spins += 1;
        RewardGrant {
            tokens,
            free_spins: 1,
        }
    }
}
