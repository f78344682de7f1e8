use rugwheel_core::{EngineParams, ProvablyFairRng, RoundEngine};

fn main() -> Result<(), rugwheel_core::RoundError> {
    // One bet and one manual spin on the default wheel
    let rng = ProvablyFairRng::new("example-server-seed", "example-client-seed", 1);
    let commitment = rng.server_seed_hash_hex();
    let mut engine = RoundEngine::with_pot(EngineParams::default(), 1.2, rng)?;
    let receipt = engine.place_bet(0.1)?;
    let outcome = engine.start_spin()?;
    println!(
        "server_seed_hash={} pot_before={} segment={} payout={} pot_after={}",
        commitment, receipt.pot, outcome.segment.label, outcome.payout, outcome.pot_after
    );
    Ok(())
}
