//! # arbiter-core
//! Foundation types, fixed-point helpers and configuration tables for the
//! Arbiter moderation engine.

pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod fixed;
pub mod traits;
pub mod types;
pub mod validation;
