//! Scenario and adversarial test suite for Arbiter.
//!
//! This crate contains integration tests that drive the engine through the
//! public trait seams, covering the documented decision scenarios and the
//! conservation and determinism invariants under randomized inputs.

pub mod helpers;
