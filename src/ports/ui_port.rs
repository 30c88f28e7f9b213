//! Outbound UI push port trait.

use crate::domain::error::AutolotError;
use crate::domain::risk_sizer::CalculationResult;
use crate::domain::trade_stats::StatsSnapshot;

/// Body of a `DATA` push.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DataPush {
    pub lot: f64,
    pub risk: f64,
    pub sl_pips: f64,
    pub sl_price: f64,
    pub tp_price: Option<f64>,
    pub rr: Option<f64>,
    pub side: String,
    pub mode: String,
    pub split: bool,
    pub presets: [f64; 3],
}

impl DataPush {
    pub fn new(result: &CalculationResult, mode: &str, split: bool) -> Self {
        DataPush {
            lot: result.lot,
            risk: result.risk_amount,
            sl_pips: result.sl_pips,
            sl_price: result.sl_price,
            tp_price: result.tp_price,
            rr: result.rr_ratio,
            side: result.side.to_string(),
            mode: mode.to_string(),
            split,
            presets: [
                result.presets.full,
                result.presets.half,
                result.presets.third,
            ],
        }
    }
}

pub trait UiPort {
    /// Current bid, already formatted to the symbol's digits.
    fn push_price(&mut self, price: &str) -> Result<(), AutolotError>;

    fn push_data(&mut self, data: &DataPush) -> Result<(), AutolotError>;

    fn push_stats(&mut self, stats: &StatsSnapshot) -> Result<(), AutolotError>;

    fn alert(&mut self, message: &str) -> Result<(), AutolotError>;
}
