use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::{
    draw::DrawTable,
    error::{RoundError, RoundResult},
    payout::{settle, split_fee, PayoutFunding, DEFAULT_FEE_RATE},
    rng::RandomSource,
    segments::{PayoutRule, WheelConfig, WheelSegment},
    stats::SessionStats,
};

pub const DEFAULT_COUNTDOWN_SECS: u32 = 60;
pub const DEFAULT_SETTLE_SECS: u32 = 3;
pub const DEFAULT_JACKPOT_BONUS_TOKENS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Countdown,
    Spinning,
    Settling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParams {
    pub fee_rate: f64,
    pub countdown_secs: u32,
    pub settle_secs: u32,
    pub jackpot_bonus_tokens: u64,
    pub wheel: WheelConfig,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_FEE_RATE,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            settle_secs: DEFAULT_SETTLE_SECS,
            jackpot_bonus_tokens: DEFAULT_JACKPOT_BONUS_TOKENS,
            wheel: WheelConfig::default_five(),
        }
    }
}

impl EngineParams {
    pub fn validate(&self) -> RoundResult<()> {
        self.wheel.validate()?;
        if !(0.0..=1.0).contains(&self.fee_rate) {
            return Err(RoundError::InvalidWheel(format!(
                "fee rate {} outside [0, 1]",
                self.fee_rate
            )));
        }
        if self.countdown_secs == 0 {
            return Err(RoundError::InvalidWheel("countdown must be at least 1s".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundState {
    pub pot: f64,
    pub phase: Phase,
    pub seconds_remaining: u32,
    pub last_outcome: Option<WheelSegment>,
    /// Gross amount bet since the last spin; multipliers apply to this.
    pub round_stake: f64,
    pub round: u64,
}

impl RoundState {
    fn new(pot: f64, countdown_secs: u32) -> Self {
        Self {
            pot,
            phase: Phase::Countdown,
            seconds_remaining: countdown_secs,
            last_outcome: None,
            round_stake: 0.0,
            round: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetReceipt {
    pub amount: f64,
    pub fee: f64,
    pub net: f64,
    /// Pot after the net amount was added.
    pub pot: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub round: u64,
    pub segment: WheelSegment,
    pub payout: f64,
    pub stake: f64,
    pub funding: PayoutFunding,
    pub pot_after: f64,
    pub bonus_tokens: u64,
}

impl SpinOutcome {
    pub fn is_jackpot(&self) -> bool {
        self.segment.payout_rule.is_jackpot()
    }

    pub fn multiplier(&self) -> Option<f64> {
        self.segment.payout_rule.multiplier()
    }
}

/// What happened, handed back to whoever drives the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RoundEvent {
    BetPlaced(BetReceipt),
    SpinStarted { round: u64 },
    SpinResolved(SpinOutcome),
    CountdownStarted { seconds: u32 },
}

impl From<BetReceipt> for RoundEvent {
    fn from(receipt: BetReceipt) -> Self {
        RoundEvent::BetPlaced(receipt)
    }
}

impl From<SpinOutcome> for RoundEvent {
    fn from(outcome: SpinOutcome) -> Self {
        RoundEvent::SpinResolved(outcome)
    }
}

/// Owns one round of the wheel: the pot, the phase machine and the draw.
///
/// Driven from outside: `tick()` once per second, `place_bet` and
/// `start_spin` on user action. Nothing here sleeps or spawns.
pub struct RoundEngine<R> {
    params: EngineParams,
    table: DrawTable,
    state: RoundState,
    stats: SessionStats,
    rng: R,
}

impl<R: RandomSource> RoundEngine<R> {
    pub fn new(params: EngineParams, rng: R) -> RoundResult<Self> {
        Self::with_pot(params, 0.0, rng)
    }

    pub fn with_pot(params: EngineParams, pot: f64, rng: R) -> RoundResult<Self> {
        params.validate()?;
        if !pot.is_finite() || pot < 0.0 {
            return Err(RoundError::InvalidAmount(pot));
        }
        let table = DrawTable::from_wheel(&params.wheel)?;
        let state = RoundState::new(pot, params.countdown_secs);
        Ok(Self {
            params,
            table,
            state,
            stats: SessionStats::default(),
            rng,
        })
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn rng(&self) -> &R {
        &self.rng
    }

    pub fn pot(&self) -> f64 {
        self.state.pot
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn draw_table(&self) -> &DrawTable {
        &self.table
    }

    fn busy(&self) -> RoundError {
        RoundError::RoundBusy {
            phase: self.state.phase,
        }
    }

    pub fn place_bet(&mut self, amount: f64) -> RoundResult<BetReceipt> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(RoundError::InvalidAmount(amount));
        }
        if self.state.phase == Phase::Spinning {
            return Err(self.busy());
        }
        let (fee, net) = split_fee(amount, self.params.fee_rate);
        let next = self.state.pot + net;
        let stake = self.state.round_stake + amount;
        if !next.is_finite() || !stake.is_finite() {
            return Err(RoundError::InvalidAmount(amount));
        }
        self.state.pot = next;
        self.state.round_stake = stake;
        let receipt = BetReceipt {
            amount,
            fee,
            net,
            pot: self.state.pot,
        };
        self.stats.record_bet(&receipt);
        debug!(amount, fee, pot = self.state.pot, "bet placed");
        Ok(receipt)
    }

    /// Manual or automatic spin: `begin_spin` and `resolve_spin` in one call.
    pub fn start_spin(&mut self) -> RoundResult<SpinOutcome> {
        self.begin_spin()?;
        self.resolve_spin()
    }

    /// Enter `Spinning`. Bets are refused until `resolve_spin`.
    pub fn begin_spin(&mut self) -> RoundResult<RoundEvent> {
        if self.state.phase != Phase::Countdown {
            return Err(self.busy());
        }
        self.state.phase = Phase::Spinning;
        debug!(round = self.state.round, "spin started");
        Ok(RoundEvent::SpinStarted {
            round: self.state.round,
        })
    }

    pub fn resolve_spin(&mut self) -> RoundResult<SpinOutcome> {
        if self.state.phase != Phase::Spinning {
            return Err(self.busy());
        }
        let idx = self.table.draw(&mut self.rng);
        let segment = self.params.wheel.segments[idx].clone();
        let stake = self.state.round_stake;
        let settlement = settle(segment.payout_rule, stake, self.state.pot);
        self.state.pot = settlement.pot_after;

        let bonus_tokens = match segment.payout_rule {
            PayoutRule::Jackpot => self.params.jackpot_bonus_tokens,
            _ => 0,
        };
        let outcome = SpinOutcome {
            round: self.state.round,
            segment: segment.clone(),
            payout: settlement.payout,
            stake,
            funding: settlement.funding,
            pot_after: settlement.pot_after,
            bonus_tokens,
        };
        info!(
            round = outcome.round,
            segment = outcome.segment.id,
            label = %outcome.segment.label,
            payout = outcome.payout,
            pot = outcome.pot_after,
            "spin resolved"
        );

        self.state.last_outcome = Some(segment);
        self.state.round_stake = 0.0;
        self.state.round += 1;
        self.stats.record_spin(&outcome);
        self.enter_settling();
        Ok(outcome)
    }

    /// One second of wall clock. Returns an event when the phase changes.
    pub fn tick(&mut self) -> RoundResult<Option<RoundEvent>> {
        match self.state.phase {
            Phase::Countdown => {
                self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
                trace!(remaining = self.state.seconds_remaining, "countdown");
                if self.state.seconds_remaining == 0 {
                    let outcome = self.start_spin()?;
                    return Ok(Some(RoundEvent::SpinResolved(outcome)));
                }
                Ok(None)
            }
            Phase::Settling => {
                self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
                if self.state.seconds_remaining == 0 {
                    self.start_countdown();
                    return Ok(Some(RoundEvent::CountdownStarted {
                        seconds: self.state.seconds_remaining,
                    }));
                }
                Ok(None)
            }
            Phase::Spinning => Err(self.busy()),
        }
    }

    fn enter_settling(&mut self) {
        if self.params.settle_secs == 0 {
            self.start_countdown();
            return;
        }
        self.state.phase = Phase::Settling;
        self.state.seconds_remaining = self.params.settle_secs;
    }

    fn start_countdown(&mut self) {
        self.state.phase = Phase::Countdown;
        self.state.seconds_remaining = self.params.countdown_secs;
        info!(
            round = self.state.round,
            seconds = self.state.seconds_remaining,
            pot = self.state.pot,
            "countdown started"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceSource;

    fn engine(values: Vec<f64>) -> RoundEngine<SequenceSource> {
        RoundEngine::new(EngineParams::default(), SequenceSource::new(values)).unwrap()
    }

    #[test]
    fn new_engine_counts_down_from_sixty() {
        let e = engine(vec![0.5]);
        assert_eq!(e.phase(), Phase::Countdown);
        assert_eq!(e.state().seconds_remaining, 60);
        assert_eq!(e.state().round, 1);
        assert_eq!(e.pot(), 0.0);
    }

    #[test]
    fn rejects_bad_seed_pot_and_params() {
        let neg = RoundEngine::with_pot(EngineParams::default(), -1.0, SequenceSource::constant(0.0));
        assert!(matches!(neg, Err(RoundError::InvalidAmount(_))));

        let params = EngineParams {
            countdown_secs: 0,
            ..EngineParams::default()
        };
        assert!(RoundEngine::new(params, SequenceSource::constant(0.0)).is_err());

        let params = EngineParams {
            fee_rate: 1.5,
            ..EngineParams::default()
        };
        assert!(RoundEngine::new(params, SequenceSource::constant(0.0)).is_err());
    }

    #[test]
    fn invalid_amounts() {
        let mut e = engine(vec![0.5]);
        for bad in [0.0, -0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(e.place_bet(bad), Err(RoundError::InvalidAmount(_))));
        }
        assert_eq!(e.pot(), 0.0);
        assert_eq!(e.stats().bets, 0);
    }

    #[test]
    fn bet_that_overflows_pot_is_rejected() {
        let mut e = engine(vec![0.65]);
        e.place_bet(f64::MAX).unwrap();
        let pot = e.pot();
        assert!(matches!(e.place_bet(f64::MAX), Err(RoundError::InvalidAmount(_))));
        assert_eq!(e.pot(), pot);
        assert_eq!(e.stats().bets, 1);

        let outcome = e.start_spin().unwrap();
        assert!(outcome.payout.is_finite());
        assert_eq!(e.pot(), 0.0);
    }

    #[test]
    fn two_stage_spin_blocks_bets() {
        let mut e = engine(vec![0.5]);
        e.place_bet(1.0).unwrap();
        let started = e.begin_spin().unwrap();
        assert_eq!(started, RoundEvent::SpinStarted { round: 1 });
        assert_eq!(e.phase(), Phase::Spinning);
        let pot = e.pot();
        assert_eq!(
            e.place_bet(1.0),
            Err(RoundError::RoundBusy {
                phase: Phase::Spinning
            })
        );
        assert_eq!(e.pot(), pot);
        assert!(e.start_spin().is_err());
        assert!(e.tick().is_err());

        let outcome = e.resolve_spin().unwrap();
        assert_eq!(outcome.segment.id, 2);
        assert_eq!(outcome.payout, 2.0);
        assert_eq!(e.phase(), Phase::Settling);
        assert!(e.resolve_spin().is_err());
    }

    #[test]
    fn settling_accepts_bets_and_returns_to_countdown() {
        let mut e = engine(vec![0.5]);
        e.start_spin().unwrap();
        assert_eq!(e.phase(), Phase::Settling);
        assert_eq!(e.state().seconds_remaining, 3);
        assert!(e.start_spin().is_err());
        e.place_bet(0.2).unwrap();

        assert_eq!(e.tick().unwrap(), None);
        assert_eq!(e.tick().unwrap(), None);
        assert_eq!(
            e.tick().unwrap(),
            Some(RoundEvent::CountdownStarted { seconds: 60 })
        );
        assert_eq!(e.phase(), Phase::Countdown);
        assert_eq!(e.state().round_stake, 0.2);
    }

    #[test]
    fn zero_settle_goes_straight_to_countdown() {
        let params = EngineParams {
            settle_secs: 0,
            ..EngineParams::default()
        };
        let mut e = RoundEngine::new(params, SequenceSource::constant(0.5)).unwrap();
        e.start_spin().unwrap();
        assert_eq!(e.phase(), Phase::Countdown);
        assert_eq!(e.state().seconds_remaining, 60);
    }

    #[test]
    fn jackpot_reports_bonus_and_stake_resets() {
        let mut e = engine(vec![0.65]);
        e.place_bet(2.0).unwrap();
        let outcome = e.start_spin().unwrap();
        assert!(outcome.is_jackpot());
        assert_eq!(outcome.bonus_tokens, 1000);
        assert_eq!(outcome.stake, 2.0);
        assert_eq!(outcome.funding, PayoutFunding::Pot);
        assert_eq!(e.state().round_stake, 0.0);
        assert_eq!(e.state().round, 2);
        assert_eq!(e.state().last_outcome.as_ref().map(|s| s.id), Some(3));
        assert_eq!(e.stats().jackpots, 1);
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = RoundEvent::CountdownStarted { seconds: 60 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event":"countdown_started","seconds":60}"#);
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let params: EngineParams = serde_json::from_str(r#"{"settle_secs": 8}"#).unwrap();
        assert_eq!(params.settle_secs, 8);
        assert_eq!(params.countdown_secs, 60);
        assert_eq!(params.wheel.segments.len(), 5);
    }
}
