//! Closed-trade history port trait.

use crate::domain::error::AutolotError;
use crate::domain::trade_stats::TradeRecord;

pub trait HistoryPort {
    /// Every closed trade the platform knows about, unfiltered.
    fn closed_trades(&self) -> Result<Vec<TradeRecord>, AutolotError>;
}

impl HistoryPort for Vec<TradeRecord> {
    fn closed_trades(&self) -> Result<Vec<TradeRecord>, AutolotError> {
        Ok(self.clone())
    }
}
