pub mod draw;
pub mod engine;
pub mod error;
pub mod payout;
pub mod rewards;
pub mod rng;
pub mod segments;
pub mod stats;

pub use crate::draw::DrawTable;
pub use crate::engine::{
    BetReceipt, EngineParams, Phase, RoundEngine, RoundEvent, RoundState, SpinOutcome,
};
pub use crate::error::{RewardError, RoundError, RoundResult};
pub use crate::payout::{settle, split_fee, PayoutFunding, Settlement};
pub use crate::rewards::{RewardGrant, RewardTracker};
pub use crate::rng::{
    derive_hash_hex, verify_draw, ProvablyFairRng, RandSource, RandomSource, SequenceSource,
};
pub use crate::segments::{PayoutRule, WheelConfig, WheelSegment};
pub use crate::stats::SessionStats;
