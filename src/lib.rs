//! simtrader: single-instrument indicator strategy backtester.
//!
//! Hexagonal architecture: the tick-driven engine and statistics live in
//! [`domain`], port traits in [`ports`], bar sources, configuration and
//! reporting in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
