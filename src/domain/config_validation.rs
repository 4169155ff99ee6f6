//! Configuration validation.
//!
//! Validates every recognised key before a run. Missing keys fall back to the
//! defaults; present keys must parse and be in range.

use crate::domain::error::SimtraderError;
use crate::domain::indicator::BreakoutMode;
use crate::domain::simulator::{
    DEFAULT_BREAKOUT_PCT, DEFAULT_INITIAL_CASH, DEFAULT_LONG_WINDOW, DEFAULT_MAX_TRADES,
    DEFAULT_RISK_PER_TRADE, DEFAULT_RSI_PERIOD, DEFAULT_SHORT_WINDOW, DEFAULT_STOP_LOSS_PCT,
    DEFAULT_VOL_WINDOW,
};
use crate::ports::config_port::ConfigPort;

pub const SIMULATOR_SECTION: &str = "simulator";
pub const INDICATORS_SECTION: &str = "indicators";
pub const GENERATOR_SECTION: &str = "generator";
pub const DATA_SECTION: &str = "data";
pub const REPORT_SECTION: &str = "report";

pub const DEFAULT_START_PRICE: f64 = 100.0;
pub const DEFAULT_VOLATILITY: f64 = 2.0;
pub const DEFAULT_TICKS: i64 = 200;

pub fn validate_simulator_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    validate_initial_cash(config)?;
    validate_risk_per_trade(config)?;
    validate_max_trades(config)?;
    validate_stop_loss(config)?;
    validate_windows(config)?;
    validate_breakout(config)?;
    Ok(())
}

pub fn validate_generator_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let start_price = read_double(config, GENERATOR_SECTION, "start_price", DEFAULT_START_PRICE)?;
    if !start_price.is_finite() || start_price <= 0.0 {
        return Err(SimtraderError::invalid(
            GENERATOR_SECTION,
            "start_price",
            "start_price must be positive",
        ));
    }

    let volatility = read_double(config, GENERATOR_SECTION, "volatility", DEFAULT_VOLATILITY)?;
    if !volatility.is_finite() || volatility < 0.0 {
        return Err(SimtraderError::invalid(
            GENERATOR_SECTION,
            "volatility",
            "volatility must be non-negative",
        ));
    }

    let ticks = read_int(config, GENERATOR_SECTION, "ticks", DEFAULT_TICKS)?;
    if ticks < 0 {
        return Err(SimtraderError::invalid(
            GENERATOR_SECTION,
            "ticks",
            "ticks must be non-negative",
        ));
    }

    if config.has_key(GENERATOR_SECTION, "seed") {
        let seed = read_int(config, GENERATOR_SECTION, "seed", 0)?;
        if seed < 0 {
            return Err(SimtraderError::invalid(
                GENERATOR_SECTION,
                "seed",
                "seed must be non-negative",
            ));
        }
    }
    Ok(())
}

pub fn validate_report_config(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    if let Some(raw) = config
        .get_string(REPORT_SECTION, "show_trade_log")
        .filter(|v| !v.trim().is_empty())
    {
        if parse_bool(&raw).is_none() {
            return Err(SimtraderError::invalid(
                REPORT_SECTION,
                "show_trade_log",
                format!("expected true or false, got '{}'", raw.trim()),
            ));
        }
    }
    Ok(())
}

/// Accepts true/yes/on/1 and false/no/off/0, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let value = read_double(config, SIMULATOR_SECTION, "initial_cash", DEFAULT_INITIAL_CASH)?;
    if !value.is_finite() || value <= 0.0 {
        return Err(SimtraderError::invalid(
            SIMULATOR_SECTION,
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_per_trade(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let value = read_double(
        config,
        SIMULATOR_SECTION,
        "risk_per_trade",
        DEFAULT_RISK_PER_TRADE,
    )?;
    if !(value > 0.0 && value <= 1.0) {
        return Err(SimtraderError::invalid(
            SIMULATOR_SECTION,
            "risk_per_trade",
            "risk_per_trade must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_max_trades(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let value = read_int(
        config,
        SIMULATOR_SECTION,
        "max_trades",
        DEFAULT_MAX_TRADES as i64,
    )?;
    if value < 1 {
        return Err(SimtraderError::invalid(
            SIMULATOR_SECTION,
            "max_trades",
            "max_trades must be at least 1",
        ));
    }
    Ok(())
}

fn validate_stop_loss(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let value = read_double(
        config,
        SIMULATOR_SECTION,
        "stop_loss_pct",
        DEFAULT_STOP_LOSS_PCT,
    )?;
    if !(value > 0.0 && value < 1.0) {
        return Err(SimtraderError::invalid(
            SIMULATOR_SECTION,
            "stop_loss_pct",
            "stop_loss_pct must be in (0, 1)",
        ));
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let windows = [
        ("short_window", DEFAULT_SHORT_WINDOW),
        ("long_window", DEFAULT_LONG_WINDOW),
        ("rsi_period", DEFAULT_RSI_PERIOD),
        ("vol_window", DEFAULT_VOL_WINDOW),
    ];
    for (key, default) in windows {
        let value = read_int(config, INDICATORS_SECTION, key, default as i64)?;
        if value < 1 {
            return Err(SimtraderError::invalid(
                INDICATORS_SECTION,
                key,
                format!("{} must be at least 1", key),
            ));
        }
    }
    Ok(())
}

fn validate_breakout(config: &dyn ConfigPort) -> Result<(), SimtraderError> {
    let pct = read_double(
        config,
        INDICATORS_SECTION,
        "breakout_pct",
        DEFAULT_BREAKOUT_PCT,
    )?;
    if !pct.is_finite() {
        return Err(SimtraderError::invalid(
            INDICATORS_SECTION,
            "breakout_pct",
            "breakout_pct must be finite",
        ));
    }

    if let Some(mode) = config
        .get_string(INDICATORS_SECTION, "breakout_mode")
        .filter(|m| !m.trim().is_empty())
    {
        if BreakoutMode::parse(&mode).is_none() {
            return Err(SimtraderError::invalid(
                INDICATORS_SECTION,
                "breakout_mode",
                format!("unknown breakout_mode '{}', expected inclusive or prior", mode.trim()),
            ));
        }
    }
    Ok(())
}

fn read_double(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SimtraderError> {
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<f64>().map_err(|_| {
            SimtraderError::invalid(section, key, format!("expected a number, got '{}'", raw.trim()))
        }),
        _ => Ok(default),
    }
}

fn read_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, SimtraderError> {
    match config.get_string(section, key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<i64>().map_err(|_| {
            SimtraderError::invalid(
                section,
                key,
                format!("expected an integer, got '{}'", raw.trim()),
            )
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockConfig {
        values: HashMap<(String, String), String>,
    }

    impl MockConfig {
        fn new() -> Self {
            Self {
                values: HashMap::new(),
            }
        }

        fn with(mut self, section: &str, key: &str, value: &str) -> Self {
            self.values
                .insert((section.to_string(), key.to_string()), value.to_string());
            self
        }
    }

    impl ConfigPort for MockConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.values
                .get(&(section.to_string(), key.to_string()))
                .cloned()
        }

        fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }

        fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
            self.get_string(section, key)
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
    }

    fn assert_invalid(result: Result<(), SimtraderError>, expected_key: &str) {
        match result {
            Err(SimtraderError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("Expected ConfigInvalid for {}, got {:?}", expected_key, other),
        }
    }

    #[test]
    fn empty_config_uses_valid_defaults() {
        let config = MockConfig::new();
        assert!(validate_simulator_config(&config).is_ok());
        assert!(validate_generator_config(&config).is_ok());
        assert!(validate_report_config(&config).is_ok());
    }

    #[test]
    fn full_valid_config() {
        let config = MockConfig::new()
            .with("simulator", "initial_cash", "25000")
            .with("simulator", "risk_per_trade", "0.01")
            .with("simulator", "max_trades", "5")
            .with("simulator", "stop_loss_pct", "0.05")
            .with("indicators", "short_window", "5")
            .with("indicators", "long_window", "30")
            .with("indicators", "rsi_period", "10")
            .with("indicators", "vol_window", "8")
            .with("indicators", "breakout_pct", "-0.5")
            .with("indicators", "breakout_mode", "prior")
            .with("generator", "seed", "7");
        assert!(validate_simulator_config(&config).is_ok());
        assert!(validate_generator_config(&config).is_ok());
    }

    #[test]
    fn initial_cash_must_be_positive() {
        let config = MockConfig::new().with("simulator", "initial_cash", "0");
        assert_invalid(validate_simulator_config(&config), "initial_cash");
    }

    #[test]
    fn unparsable_number_is_rejected() {
        let config = MockConfig::new().with("simulator", "initial_cash", "lots");
        assert_invalid(validate_simulator_config(&config), "initial_cash");
    }

    #[test]
    fn risk_per_trade_range() {
        let config = MockConfig::new().with("simulator", "risk_per_trade", "0");
        assert_invalid(validate_simulator_config(&config), "risk_per_trade");
        let config = MockConfig::new().with("simulator", "risk_per_trade", "1.5");
        assert_invalid(validate_simulator_config(&config), "risk_per_trade");
        let config = MockConfig::new().with("simulator", "risk_per_trade", "1");
        assert!(validate_simulator_config(&config).is_ok());
    }

    #[test]
    fn max_trades_at_least_one() {
        let config = MockConfig::new().with("simulator", "max_trades", "0");
        assert_invalid(validate_simulator_config(&config), "max_trades");
        let config = MockConfig::new().with("simulator", "max_trades", "2.5");
        assert_invalid(validate_simulator_config(&config), "max_trades");
    }

    #[test]
    fn stop_loss_range() {
        let config = MockConfig::new().with("simulator", "stop_loss_pct", "0");
        assert_invalid(validate_simulator_config(&config), "stop_loss_pct");
        let config = MockConfig::new().with("simulator", "stop_loss_pct", "1");
        assert_invalid(validate_simulator_config(&config), "stop_loss_pct");
    }

    #[test]
    fn windows_at_least_one() {
        for key in ["short_window", "long_window", "rsi_period", "vol_window"] {
            let config = MockConfig::new().with("indicators", key, "0");
            assert_invalid(validate_simulator_config(&config), key);
        }
    }

    #[test]
    fn breakout_pct_must_be_finite() {
        let config = MockConfig::new().with("indicators", "breakout_pct", "inf");
        assert_invalid(validate_simulator_config(&config), "breakout_pct");
    }

    #[test]
    fn unknown_breakout_mode() {
        let config = MockConfig::new().with("indicators", "breakout_mode", "sideways");
        assert_invalid(validate_simulator_config(&config), "breakout_mode");
    }

    #[test]
    fn generator_ranges() {
        let config = MockConfig::new().with("generator", "start_price", "-1");
        assert_invalid(validate_generator_config(&config), "start_price");
        let config = MockConfig::new().with("generator", "volatility", "-0.1");
        assert_invalid(validate_generator_config(&config), "volatility");
        let config = MockConfig::new().with("generator", "ticks", "-5");
        assert_invalid(validate_generator_config(&config), "ticks");
        let config = MockConfig::new().with("generator", "seed", "-5");
        assert_invalid(validate_generator_config(&config), "seed");
    }

    #[test]
    fn show_trade_log_must_be_boolean() {
        let config = MockConfig::new().with("report", "show_trade_log", "maybe");
        assert_invalid(validate_report_config(&config), "show_trade_log");
        for value in ["true", "No", "ON", "0", " "] {
            let config = MockConfig::new().with("report", "show_trade_log", value);
            assert!(validate_report_config(&config).is_ok(), "{}", value);
        }
    }

    #[test]
    fn blank_value_falls_back_to_default() {
        let config = MockConfig::new().with("simulator", "initial_cash", "  ");
        assert!(validate_simulator_config(&config).is_ok());
    }
}
