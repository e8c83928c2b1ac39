//! # arbiter-engine: Hybrid stake-weighted moderation engine.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! - **Decision evaluation**: each side scores the mean of its head-count
//!   share and its stake share; a side wins at twice the other's score.
//! - **Window closure**: undecided items are escalated, forced, or extended
//!   once their deadline passes.
//! - **Payouts**: minority stake is taken in proportion to the margin of
//!   victory and paid to the majority together with the reward pools; XP is
//!   awarded to everyone with the same hybrid weighting.

pub mod closure;
pub mod engine;
pub mod evaluator;
pub mod payout;

pub use closure::close_window;
pub use engine::ModerationEngine;
pub use evaluator::{decide, DecisionParams};
pub use payout::settle;
