//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod trade;
pub mod simulator;
pub mod statistics;
pub mod config_validation;
pub mod error;
