//! Configuration validation.
//!
//! Every key is checked before the session or a CLI command builds its
//! domain values from it.

use crate::domain::error::AutolotError;
use crate::ports::config_port::ConfigPort;

pub fn validate_autolot_config(config: &dyn ConfigPort) -> Result<(), AutolotError> {
    validate_risk(config)?;
    validate_lines(config)?;
    validate_symbol(config)?;
    validate_account(config)?;
    validate_market(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> AutolotError {
    AutolotError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn missing(section: &str, key: &str) -> AutolotError {
    AutolotError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

/// Parse an optional numeric key, rejecting present but unparseable values.
pub fn optional_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<f64>, AutolotError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| invalid(section, key, &format!("{key} must be a number"))),
        _ => Ok(None),
    }
}

pub fn required_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<f64, AutolotError> {
    optional_number(config, section, key)?.ok_or_else(|| missing(section, key))
}

fn validate_risk(config: &dyn ConfigPort) -> Result<(), AutolotError> {
    if let Some(value) = optional_number(config, "risk", "risk_percentage")? {
        if value <= 0.0 {
            return Err(invalid(
                "risk",
                "risk_percentage",
                "risk_percentage must be positive",
            ));
        }
    }
    if let Some(value) = optional_number(config, "risk", "slippage_pips")? {
        if value < 0.0 {
            return Err(invalid(
                "risk",
                "slippage_pips",
                "slippage_pips must be non-negative",
            ));
        }
    }
    if let Some(label) = config.get_string("risk", "label") {
        if label.trim().is_empty() {
            return Err(invalid("risk", "label", "label must not be empty"));
        }
    }
    Ok(())
}

fn validate_lines(config: &dyn ConfigPort) -> Result<(), AutolotError> {
    if let Some(value) = optional_number(config, "lines", "volatility_multiplier")? {
        if value <= 0.0 {
            return Err(invalid(
                "lines",
                "volatility_multiplier",
                "volatility_multiplier must be positive",
            ));
        }
    }
    if let Some(value) = optional_number(config, "lines", "fixed_distance_pips")? {
        if value < 1.0 {
            return Err(invalid(
                "lines",
                "fixed_distance_pips",
                "fixed_distance_pips must be at least 1",
            ));
        }
    }

    let min = optional_number(config, "lines", "min_distance_pips")?.unwrap_or(2.0);
    if min <= 0.0 {
        return Err(invalid(
            "lines",
            "min_distance_pips",
            "min_distance_pips must be positive",
        ));
    }
    if let Some(max) = optional_number(config, "lines", "max_distance_pips")? {
        if max <= min {
            return Err(invalid(
                "lines",
                "max_distance_pips",
                "max_distance_pips must exceed min_distance_pips",
            ));
        }
    }
    Ok(())
}

const POSITIVE_SYMBOL_KEYS: [&str; 6] = [
    "pip_size",
    "tick_size",
    "tick_value",
    "lot_size",
    "volume_step",
    "volume_min",
];

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), AutolotError> {
    if config.get_text("symbol", "name").is_none() {
        return Err(missing("symbol", "name"));
    }

    for key in POSITIVE_SYMBOL_KEYS {
        let value = required_number(config, "symbol", key)?;
        if value <= 0.0 {
            return Err(invalid("symbol", key, &format!("{key} must be positive")));
        }
    }

    if let Some(digits) = optional_number(config, "symbol", "digits")? {
        if digits.fract() != 0.0 || !(0.0..=10.0).contains(&digits) {
            return Err(invalid(
                "symbol",
                "digits",
                "digits must be a whole number between 0 and 10",
            ));
        }
    }
    Ok(())
}

fn validate_account(config: &dyn ConfigPort) -> Result<(), AutolotError> {
    let balance = required_number(config, "account", "balance")?;
    if balance < 0.0 {
        return Err(invalid(
            "account",
            "balance",
            "balance must be non-negative",
        ));
    }
    Ok(())
}

fn validate_market(config: &dyn ConfigPort) -> Result<(), AutolotError> {
    let bid = optional_number(config, "market", "bid")?;
    let ask = optional_number(config, "market", "ask")?;

    if let Some(bid) = bid {
        if bid <= 0.0 {
            return Err(invalid("market", "bid", "bid must be positive"));
        }
    }
    match (bid, ask) {
        (Some(bid), Some(ask)) if ask < bid => {
            Err(invalid("market", "ask", "ask must not be below bid"))
        }
        (None, Some(_)) => Err(missing("market", "bid")),
        _ => {
            optional_number(config, "market", "volatility")?;
            Ok(())
        }
    }
}
