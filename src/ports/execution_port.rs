//! Execution gateway port trait.
//!
//! Every call is a synchronous request/response. Adapters over asynchronous
//! brokers block until the answer arrives.

use crate::domain::error::AutolotError;
use crate::domain::order_planner::OrderKind;
use crate::domain::side::Side;

/// Position or resting order identifier assigned by the gateway.
pub type TicketId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub id: TicketId,
    pub symbol: String,
    pub label: String,
    pub side: Side,
    pub volume_units: f64,
}

pub trait ExecutionPort {
    fn submit_market_order(
        &mut self,
        side: Side,
        volume_units: f64,
        label: &str,
        slippage_pips: Option<f64>,
    ) -> Result<TicketId, AutolotError>;

    /// `kind` is `Limit` or `Stop`.
    fn submit_pending_order(
        &mut self,
        side: Side,
        volume_units: f64,
        price: f64,
        label: &str,
        kind: OrderKind,
    ) -> Result<TicketId, AutolotError>;

    fn modify_stop_loss(&mut self, id: TicketId, price: f64) -> Result<(), AutolotError>;

    fn modify_take_profit(&mut self, id: TicketId, price: f64) -> Result<(), AutolotError>;

    fn close_position(&mut self, id: TicketId) -> Result<(), AutolotError>;

    fn open_positions(&self, label: &str, symbol: &str) -> Result<Vec<OpenPosition>, AutolotError>;
}
