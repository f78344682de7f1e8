use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use rugwheel_core::{
    DrawTable, EngineParams, Phase, ProvablyFairRng, RandSource, RoundEngine, RoundError,
    RoundEvent, SequenceSource, WheelConfig,
};

const EPS: f64 = 1e-9;

// Unit values that land on each default segment: [10, 40, 60, 70, 100].
const RUG_PULL: f64 = 0.05;
const ONE_AND_HALF: f64 = 0.25;
const DOUBLE: f64 = 0.50;
const JACKPOT: f64 = 0.65;

fn forced(pot: f64, unit: f64) -> RoundEngine<SequenceSource> {
    RoundEngine::with_pot(EngineParams::default(), pot, SequenceSource::constant(unit)).unwrap()
}

#[test]
fn bet_then_jackpot_pays_whole_pot() {
    let mut engine = forced(1.2, JACKPOT);
    let receipt = engine.place_bet(0.1).unwrap();
    assert!((receipt.pot - 1.295).abs() < EPS);
    assert!((engine.pot() - 1.295).abs() < EPS);

    let outcome = engine.start_spin().unwrap();
    assert_eq!(outcome.segment.id, 3);
    assert!((outcome.payout - 1.295).abs() < EPS);
    assert_eq!(outcome.pot_after, 0.0);
    assert_eq!(engine.pot(), 0.0);
}

#[test]
fn rug_pull_pays_nothing_and_keeps_pot() {
    let mut engine = forced(1.2, RUG_PULL);
    engine.place_bet(0.5).unwrap();
    let before = engine.pot();
    let outcome = engine.start_spin().unwrap();
    assert_eq!(outcome.segment.id, 0);
    assert_eq!(outcome.payout, 0.0);
    assert_eq!(engine.pot(), before);
}

#[test]
fn one_and_half_on_unit_bet() {
    let mut engine = forced(0.0, ONE_AND_HALF);
    engine.place_bet(1.0).unwrap();
    let before = engine.pot();
    let outcome = engine.start_spin().unwrap();
    assert_eq!(outcome.segment.id, 1);
    assert!((outcome.payout - 1.5).abs() < EPS);
    assert_eq!(outcome.multiplier(), Some(1.5));
    assert_eq!(engine.pot(), before);
}

#[test]
fn double_leaves_pot_alone() {
    let mut engine = forced(3.0, DOUBLE);
    engine.place_bet(0.4).unwrap();
    let before = engine.pot();
    let outcome = engine.start_spin().unwrap();
    assert_eq!(outcome.segment.id, 2);
    assert!((outcome.payout - 0.8).abs() < EPS);
    assert_eq!(engine.pot(), before);
}

#[test]
fn sixty_ticks_spin_exactly_once() {
    let mut engine = forced(0.0, DOUBLE);
    let mut spins = 0;
    for _ in 0..60 {
        if let Some(RoundEvent::SpinResolved(_)) = engine.tick().unwrap() {
            spins += 1;
        }
    }
    assert_eq!(spins, 1);
    assert_eq!(engine.stats().rounds, 1);
    assert_eq!(engine.phase(), Phase::Settling);
}

#[test]
fn full_cycle_returns_to_countdown() {
    let mut engine = forced(0.0, DOUBLE);
    let events: Vec<RoundEvent> = (0..63).filter_map(|_| engine.tick().unwrap()).collect();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], RoundEvent::SpinResolved(_)));
    assert_eq!(events[1], RoundEvent::CountdownStarted { seconds: 60 });
    assert_eq!(engine.state().seconds_remaining, 60);
}

#[test]
fn bet_while_spinning_is_busy() {
    let mut engine = forced(2.0, DOUBLE);
    engine.begin_spin().unwrap();
    let err = engine.place_bet(1.0).unwrap_err();
    assert_eq!(
        err,
        RoundError::RoundBusy {
            phase: Phase::Spinning
        }
    );
    assert_eq!(engine.pot(), 2.0);
}

#[test]
fn weighted_draw_converges() {
    let table = DrawTable::from_wheel(&WheelConfig::default_five()).unwrap();
    let mut rng = RandSource(StdRng::seed_from_u64(0x5eed));
    let n = 100_000;
    let mut counts = [0u32; 5];
    for _ in 0..n {
        counts[table.draw(&mut rng)] += 1;
    }
    let expected = [0.10, 0.30, 0.20, 0.10, 0.30];
    for (count, p) in counts.iter().zip(expected) {
        let freq = *count as f64 / n as f64;
        assert!((freq - p).abs() < 0.01, "freq {freq} vs {p}");
    }
}

#[test]
fn provably_fair_engine_is_reproducible() {
    let run = || {
        let rng = ProvablyFairRng::new("server", "client", 0);
        let mut engine = RoundEngine::new(EngineParams::default(), rng).unwrap();
        (0..20)
            .map(|_| {
                engine.place_bet(0.1).unwrap();
                let out = engine.start_spin().unwrap().segment.id;
                while engine.phase() != Phase::Countdown {
                    engine.tick().unwrap();
                }
                out
            })
            .collect::<Vec<u8>>()
    };
    assert_eq!(run(), run());
}

proptest! {
    #[test]
    fn bet_adds_ninety_five_percent(pot in 0.0f64..1_000.0, amount in 0.0001f64..1_000.0) {
        let mut engine = forced(pot, DOUBLE);
        engine.place_bet(amount).unwrap();
        let expected = pot + amount * 0.95;
        prop_assert!((engine.pot() - expected).abs() <= 1e-9 * expected.max(1.0));
    }

    #[test]
    fn pot_never_negative(bets in proptest::collection::vec(0.001f64..5.0, 0..20), unit in 0.0f64..1.0) {
        let mut engine = forced(0.0, unit);
        for bet in bets {
            engine.place_bet(bet).unwrap();
        }
        engine.start_spin().unwrap();
        prop_assert!(engine.pot() >= 0.0);
    }
}
