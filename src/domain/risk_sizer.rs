//! Risk-based position sizing.
//!
//! Turns a monetary risk budget and a stop distance into a tradable volume
//! that never exceeds the stated risk.

use std::fmt;

use super::error::AutolotError;
use super::side::Side;
use super::symbol::SymbolSpec;

/// User-set risk budget as a percentage of account balance. Always > 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskConfig {
    risk_percentage: f64,
}

impl RiskConfig {
    pub fn new(risk_percentage: f64) -> Result<Self, AutolotError> {
        if !risk_percentage.is_finite() || risk_percentage <= 0.0 {
            return Err(AutolotError::InvalidRisk {
                value: risk_percentage,
            });
        }
        Ok(RiskConfig { risk_percentage })
    }

    pub fn risk_percentage(&self) -> f64 {
        self.risk_percentage
    }

    /// Replace the percentage, leaving the old value in place on rejection.
    pub fn set(&mut self, risk_percentage: f64) -> Result<(), AutolotError> {
        *self = RiskConfig::new(risk_percentage)?;
        Ok(())
    }

    pub fn risk_amount(&self, balance: f64) -> f64 {
        balance * (self.risk_percentage / 100.0)
    }
}

/// Volume in units that loses `risk_amount` if price travels from `entry_price`
/// to `sl_price`, floored to the volume step. Zero when the distance is
/// degenerate or the result is below the symbol's minimum.
pub fn compute_volume(risk_amount: f64, entry_price: f64, sl_price: f64, spec: &SymbolSpec) -> f64 {
    let distance = (entry_price - sl_price).abs();
    if !distance.is_finite() || distance <= spec.tick_size || spec.tick_size <= 0.0 {
        return 0.0;
    }

    let ticks_at_risk = distance / spec.tick_size;
    let risk_per_unit = ticks_at_risk * spec.tick_value;
    if risk_per_unit <= 0.0 {
        return 0.0;
    }

    let raw_volume = risk_amount / risk_per_unit;
    spec.executable_volume(raw_volume)
}

/// Fraction of the computed size requested by an entry action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFraction {
    Full,
    Half,
    Third,
}

impl EntryFraction {
    pub fn value(self) -> f64 {
        match self {
            EntryFraction::Full => 1.0,
            EntryFraction::Half => 0.5,
            EntryFraction::Third => 1.0 / 3.0,
        }
    }
}

impl fmt::Display for EntryFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryFraction::Full => write!(f, "full"),
            EntryFraction::Half => write!(f, "1/2"),
            EntryFraction::Third => write!(f, "1/3"),
        }
    }
}

/// Lot sizes shown on the entry buttons.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct EntryPresets {
    pub full: f64,
    pub half: f64,
    pub third: f64,
}

impl EntryPresets {
    pub fn from_volume(volume_units: f64, spec: &SymbolSpec) -> Self {
        let lots = |fraction: EntryFraction| {
            spec.to_lots(spec.normalize_volume_down(volume_units * fraction.value()))
        };
        EntryPresets {
            full: spec.to_lots(volume_units),
            half: lots(EntryFraction::Half),
            third: lots(EntryFraction::Third),
        }
    }
}

/// Derived sizing snapshot, recomputed on every relevant event.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct CalculationResult {
    pub volume_units: f64,
    pub lot: f64,
    pub risk_amount: f64,
    pub sl_pips: f64,
    pub rr_ratio: Option<f64>,
    pub side: Side,
    pub entry_price: f64,
    pub sl_price: f64,
    pub tp_price: Option<f64>,
    pub presets: EntryPresets,
}

pub fn calculate(
    entry_price: f64,
    sl_price: f64,
    tp_price: Option<f64>,
    risk_amount: f64,
    spec: &SymbolSpec,
) -> CalculationResult {
    let volume_units = compute_volume(risk_amount, entry_price, sl_price, spec);
    let risk_span = (entry_price - sl_price).abs();
    let rr_ratio = match tp_price {
        Some(tp) if risk_span > 0.0 => Some((tp - entry_price).abs() / risk_span),
        _ => None,
    };

    CalculationResult {
        volume_units,
        lot: spec.to_lots(volume_units),
        risk_amount,
        sl_pips: spec.to_pips(risk_span),
        rr_ratio,
        side: Side::of(entry_price, sl_price),
        entry_price,
        sl_price,
        tp_price,
        presets: EntryPresets::from_volume(volume_units, spec),
    }
}
