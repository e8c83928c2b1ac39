//! Error types for the Arbiter engine.
//!
//! In-domain outcomes (not enough voters, threshold not reached, ...) are not
//! errors; they are carried as [`Reason`](crate::types::Reason) codes inside
//! the result. Only malformed input, bad configuration and arithmetic
//! overflow surface here.
use thiserror::Error;

use crate::content::ContentType;
use crate::types::VoteChoice;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("arithmetic overflow")] Overflow,
    #[error("arithmetic underflow")] Underflow,
    #[error("division by zero")] DivisionByZero,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    #[error("empty amount")] Empty,
    #[error("invalid character {0:?} in amount")] InvalidCharacter(char),
    #[error("too many fractional digits: {digits} > {max}")] TooPrecise { digits: usize, max: usize },
    #[error("amount out of range")] OutOfRange,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("negative vote count for {side:?}: {value}")] NegativeVotes { side: VoteChoice, value: i64 },
    #[error("negative stake for {side:?}: {value}")] NegativeStake { side: VoteChoice, value: i128 },
    #[error("negative mint price reference: {0}")] NegativeMintPrice(i128),
    #[error("no votes cast")] NoVotes,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{content_type}: {field} fractions sum to {sum}, above 1.0")] FractionOverflow { content_type: ContentType, field: &'static str, sum: u128 },
    #[error("{content_type}: {field} = {value} exceeds 1.0")] FractionAboveOne { content_type: ContentType, field: &'static str, value: u128 },
    #[error("min_voters must be at least 1")] ZeroMinVoters,
    #[error("threshold_ratio must be at least 1, got {0}")] ThresholdRatio(u128),
    #[error("config parse: {0}")] Parse(String),
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)] Arithmetic(#[from] ArithmeticError),
    #[error(transparent)] Validation(#[from] ValidationError),
    #[error(transparent)] Config(#[from] ConfigError),
    #[error("encoding: {0}")] Encoding(String),
}
