use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, SeedableRng};
use rugwheel_core::{
    verify_draw, DrawTable, EngineParams, Phase, ProvablyFairRng, RandSource, RandomSource,
    RewardTracker, RoundEngine, RoundEvent,
};
use rugwheel_shared::{BetLimits, RoundLogEntry, SpinReport};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod wallet;

use wallet::SimWallet;

#[derive(Parser)]
#[command(name = "rugwheel-cli", about = "Timer driver and tools for the rug wheel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Engine parameters as JSON, built-in wheel if unset
    #[arg(long, global = true, env = "RUGWHEEL_PARAMS")]
    wheel: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run rounds in real time, one bet per round
    Play {
        #[arg(long, default_value_t = 3)]
        rounds: u64,
        #[arg(long, default_value_t = 0.1)]
        bet: f64,
        /// Length of one engine second
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
        #[arg(long, default_value_t = 0.0)]
        seed_pot: f64,
        #[arg(long, default_value_t = 10.0)]
        balance: f64,
        #[arg(long, env = "RUGWHEEL_SERVER_SEED")]
        server_seed: Option<String>,
        #[arg(long, default_value = "player")]
        client_seed: String,
        #[arg(long)]
        referrer: Option<String>,
        /// Print events as JSON lines on stdout
        #[arg(long)]
        json: bool,
    },
    /// Draw N times and compare frequencies with the configured weights
    Simulate {
        #[arg(long, default_value_t = 100_000)]
        draws: u64,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Recompute a provably-fair draw from revealed seeds
    Verify {
        #[arg(long)]
        server_seed: String,
        #[arg(long)]
        client_seed: String,
        #[arg(long)]
        nonce: u64,
        #[arg(long)]
        segment: u8,
    },
    /// Run rounds without delay and write a CSV round log
    ExportCsv {
        #[arg(long, default_value_t = 100)]
        rounds: u64,
        #[arg(long, default_value_t = 0.1)]
        bet: f64,
        #[arg(long)]
        seed: Option<u64>,
        path: PathBuf,
    },
}

fn load_params(path: Option<&Path>) -> anyhow::Result<EngineParams> {
    let Some(path) = path else {
        return Ok(EngineParams::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading engine params from {}", path.display()))?;
    let params: EngineParams = serde_json::from_str(&raw)
        .with_context(|| format!("parsing engine params in {}", path.display()))?;
    params.validate()?;
    Ok(params)
}

fn seeded(seed: Option<u64>) -> RandSource<StdRng> {
    match seed {
        Some(s) => RandSource(StdRng::seed_from_u64(s)),
        None => RandSource(StdRng::from_os_rng()),
    }
}

/// Same snapping as the bet input: out-of-range amounts land on the limits.
fn normalize_bet(bet: f64) -> f64 {
    BetLimits::default().clamp(bet)
}

fn emit(event: &RoundEvent, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
        return Ok(());
    }
    match event {
        RoundEvent::BetPlaced(r) => info!("bet {} (fee {}), pot now {}", r.amount, r.fee, r.pot),
        RoundEvent::SpinStarted { round } => info!("round {round}: spinning"),
        RoundEvent::SpinResolved(outcome) => {
            let report = SpinReport::from(outcome);
            if report.jackpot {
                info!(
                    "round {}: JACKPOT! won {} + {} bonus tokens",
                    report.round, report.payout, report.bonus_tokens
                );
            } else if let Some(m) = report.multiplier {
                info!("round {}: {}x, won {}", report.round, m, report.payout);
            } else {
                info!("round {}: {}, better luck next time", report.round, report.label);
            }
        }
        RoundEvent::CountdownStarted { seconds } => info!("next spin in {seconds}s"),
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn play(
    params: EngineParams,
    rounds: u64,
    bet: f64,
    tick_ms: u64,
    seed_pot: f64,
    balance: f64,
    rng: Box<dyn RandomSource>,
    referrer: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let bet = normalize_bet(bet);
    let mut engine = RoundEngine::with_pot(params, seed_pot, rng)?;
    let mut wallet = SimWallet::new(balance, 1_000.0);
    let mut rewards = RewardTracker::new();
    if let Some(code) = referrer {
        rewards.set_referrer(code);
    }
    for grant in [
        rewards.claim_first_time_bonus(),
        rewards.claim_daily(Utc::now().date_naive()),
    ]
    .into_iter()
    .flatten()
    {
        info!("reward: {} tokens, {} free spins", grant.tokens, grant.free_spins);
    }

    // First tick one period out, so the opening countdown lasts its full length
    let period = Duration::from_millis(tick_ms.max(1));
    let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut resolved = 0u64;
    let mut bet_placed = false;
    while resolved < rounds {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                warn!("interrupted, stopping");
                break;
            }
        }

        if engine.phase() == Phase::Countdown && !bet_placed {
            let free_spin = rewards.use_free_spin();
            if free_spin || wallet.can_afford(bet) {
                let receipt = engine.place_bet(bet)?;
                wallet.debit_bet(&receipt, free_spin);
                if let Some(code) = rewards.record_first_bet() {
                    info!("referrer {code} credited for first bet");
                }
                emit(&RoundEvent::from(receipt), json)?;
            } else {
                warn!("balance {} too low for bet {bet}, spectating", wallet.player);
            }
            bet_placed = true;
        }

        if let Some(event) = engine.tick()? {
            if let RoundEvent::SpinResolved(outcome) = &event {
                wallet.credit_outcome(outcome);
                resolved += 1;
                bet_placed = false;
            }
            emit(&event, json)?;
        }
    }

    let stats = engine.stats();
    info!(
        rounds = stats.rounds,
        wagered = stats.total_wagered,
        fees = stats.total_fees,
        paid = stats.total_paid,
        jackpots = stats.jackpots,
        pot = engine.pot(),
        player = wallet.player,
        house = wallet.house,
        "session finished"
    );
    Ok(())
}

fn simulate(params: &EngineParams, draws: u64, seed: Option<u64>) -> anyhow::Result<()> {
    let table = DrawTable::from_wheel(&params.wheel)?;
    let mut rng = seeded(seed);
    let mut counts = vec![0u64; table.len()];
    for _ in 0..draws {
        counts[table.draw(&mut rng)] += 1;
    }
    let total = table.total() as f64;
    println!("{:>3} {:<10} {:>9} {:>9}", "id", "label", "expected", "observed");
    for (seg, count) in params.wheel.segments.iter().zip(counts) {
        println!(
            "{:>3} {:<10} {:>8.2}% {:>8.2}%",
            seg.id,
            seg.label,
            seg.weight as f64 / total * 100.0,
            count as f64 / draws.max(1) as f64 * 100.0
        );
    }
    Ok(())
}

fn export_csv(
    params: EngineParams,
    rounds: u64,
    bet: f64,
    seed: Option<u64>,
    path: &Path,
) -> anyhow::Result<()> {
    let bet = normalize_bet(bet);
    let mut engine = RoundEngine::new(params, seeded(seed))?;
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record(RoundLogEntry::csv_header())?;
    for _ in 0..rounds {
        engine.place_bet(bet)?;
        let outcome = engine.start_spin()?;
        wtr.write_record(RoundLogEntry::from_outcome(Utc::now(), &outcome).csv_record())?;
        while engine.phase() != Phase::Countdown {
            engine.tick()?;
        }
    }
    wtr.flush()?;
    println!("Exported {} rounds to {}", rounds, path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let params = load_params(cli.wheel.as_deref())?;

    match cli.command {
        Commands::Play {
            rounds,
            bet,
            tick_ms,
            seed_pot,
            balance,
            server_seed,
            client_seed,
            referrer,
            json,
        } => {
            let rng: Box<dyn RandomSource> = match server_seed {
                Some(seed) => {
                    let rng = ProvablyFairRng::new(seed, client_seed, 0);
                    info!("server seed commitment {}", rng.server_seed_hash_hex());
                    Box::new(rng)
                }
                None => Box::new(seeded(None)),
            };
            play(
                params, rounds, bet, tick_ms, seed_pot, balance, rng, referrer, json,
            )
            .await?;
        }
        Commands::Simulate { draws, seed } => simulate(&params, draws, seed)?,
        Commands::Verify {
            server_seed,
            client_seed,
            nonce,
            segment,
        } => {
            let table = DrawTable::from_wheel(&params.wheel)?;
            let rng = ProvablyFairRng::new(&server_seed, &client_seed, nonce);
            println!("server seed hash: {}", rng.server_seed_hash_hex());
            if !verify_draw(&server_seed, &client_seed, nonce, &table, usize::from(segment)) {
                bail!(
                    "draw mismatch: seeds give segment {}, not {segment}",
                    table.pick(rng.peek_unit())
                );
            }
            println!("verified: nonce {nonce} lands on segment {segment}");
        }
        Commands::ExportCsv {
            rounds,
            bet,
            seed,
            path,
        } => export_csv(params, rounds, bet, seed, &path)?,
    }

    Ok(())
}
