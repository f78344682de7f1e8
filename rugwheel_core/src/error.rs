use crate::engine::Phase;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RoundError {
    #[error("invalid bet amount: {0}")]
    InvalidAmount(f64),
    #[error("round busy: operation not allowed while {phase:?}")]
    RoundBusy { phase: Phase },
    #[error("invalid wheel: {0}")]
    InvalidWheel(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RewardError {
    #[error("reward already claimed")]
    AlreadyClaimed,
    #[error("weekly reward needs 7 daily claims, have {progress}")]
    WeeklyIncomplete { progress: u8 },
}

pub type RoundResult<T> = Result<T, RoundError>;
