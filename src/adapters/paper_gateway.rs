//! Paper execution gateway.
//!
//! Fills market orders instantly and keeps resting orders in a book. Failure
//! modes can be forced to exercise the error paths of a session.

use std::collections::BTreeMap;

use crate::domain::error::AutolotError;
use crate::domain::order_planner::OrderKind;
use crate::domain::side::Side;
use crate::ports::execution_port::{ExecutionPort, OpenPosition, TicketId};

#[derive(Debug, Clone, PartialEq)]
pub struct RestingOrder {
    pub id: TicketId,
    pub side: Side,
    pub kind: OrderKind,
    pub volume_units: f64,
    pub price: f64,
    pub label: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Protection {
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

#[derive(Debug)]
pub struct PaperGateway {
    symbol: String,
    next_id: TicketId,
    positions: BTreeMap<TicketId, OpenPosition>,
    orders: BTreeMap<TicketId, RestingOrder>,
    protection: BTreeMap<TicketId, Protection>,
    reject_reason: Option<String>,
    fail_protection: bool,
}

impl PaperGateway {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            next_id: 1,
            positions: BTreeMap::new(),
            orders: BTreeMap::new(),
            protection: BTreeMap::new(),
            reject_reason: None,
            fail_protection: false,
        }
    }

    /// Refuse every submission with `reason`.
    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject_reason = Some(reason.to_string());
        self
    }

    /// Accept entries but refuse every SL/TP modification.
    pub fn failing_protection(mut self) -> Self {
        self.fail_protection = true;
        self
    }

    pub fn positions(&self) -> impl Iterator<Item = &OpenPosition> {
        self.positions.values()
    }

    pub fn resting_orders(&self) -> impl Iterator<Item = &RestingOrder> {
        self.orders.values()
    }

    pub fn protection(&self, id: TicketId) -> Protection {
        self.protection.get(&id).copied().unwrap_or_default()
    }

    fn check_accepting(&self) -> Result<(), AutolotError> {
        match &self.reject_reason {
            Some(reason) => Err(AutolotError::GatewayRejection {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn issue_id(&mut self) -> TicketId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn protect(
        &mut self,
        id: TicketId,
        update: impl FnOnce(&mut Protection),
    ) -> Result<(), AutolotError> {
        if !self.positions.contains_key(&id) && !self.orders.contains_key(&id) {
            return Err(AutolotError::GatewayRejection {
                reason: format!("unknown ticket {id}"),
            });
        }
        if self.fail_protection {
            return Err(AutolotError::GatewayRejection {
                reason: "protection refused".to_string(),
            });
        }
        update(self.protection.entry(id).or_default());
        Ok(())
    }
}

impl ExecutionPort for PaperGateway {
    fn submit_market_order(
        &mut self,
        side: Side,
        volume_units: f64,
        label: &str,
        slippage_pips: Option<f64>,
    ) -> Result<TicketId, AutolotError> {
        self.check_accepting()?;
        let id = self.issue_id();
        tracing::info!(id, %side, volume = volume_units, ?slippage_pips, "paper fill");
        self.positions.insert(
            id,
            OpenPosition {
                id,
                symbol: self.symbol.clone(),
                label: label.to_string(),
                side,
                volume_units,
            },
        );
        Ok(id)
    }

    fn submit_pending_order(
        &mut self,
        side: Side,
        volume_units: f64,
        price: f64,
        label: &str,
        kind: OrderKind,
    ) -> Result<TicketId, AutolotError> {
        self.check_accepting()?;
        if kind == OrderKind::Market {
            return Err(AutolotError::GatewayRejection {
                reason: "market orders cannot rest".to_string(),
            });
        }
        let id = self.issue_id();
        tracing::info!(id, %side, %kind, volume = volume_units, price, "paper order placed");
        self.orders.insert(
            id,
            RestingOrder {
                id,
                side,
                kind,
                volume_units,
                price,
                label: label.to_string(),
            },
        );
        Ok(id)
    }

    fn modify_stop_loss(&mut self, id: TicketId, price: f64) -> Result<(), AutolotError> {
        self.protect(id, |p| p.stop_loss = Some(price))
    }

    fn modify_take_profit(&mut self, id: TicketId, price: f64) -> Result<(), AutolotError> {
        self.protect(id, |p| p.take_profit = Some(price))
    }

    fn close_position(&mut self, id: TicketId) -> Result<(), AutolotError> {
        match self.positions.remove(&id) {
            Some(_) => {
                self.protection.remove(&id);
                tracing::info!(id, "paper position closed");
                Ok(())
            }
            None => Err(AutolotError::GatewayRejection {
                reason: format!("no open position {id}"),
            }),
        }
    }

    fn open_positions(&self, label: &str, symbol: &str) -> Result<Vec<OpenPosition>, AutolotError> {
        Ok(self
            .positions
            .values()
            .filter(|p| p.label == label && p.symbol == symbol)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_order_opens_position() {
        let mut gw = PaperGateway::new("EURUSD");
        let id = gw
            .submit_market_order(Side::Long, 1000.0, "AutoLotCalc", Some(3.0))
            .unwrap();
        gw.modify_stop_loss(id, 1.1950).unwrap();
        gw.modify_take_profit(id, 1.2100).unwrap();

        let open = gw.open_positions("AutoLotCalc", "EURUSD").unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].side, Side::Long);
        assert_eq!(
            gw.protection(id),
            Protection {
                stop_loss: Some(1.1950),
                take_profit: Some(1.2100)
            }
        );
    }

    #[test]
    fn pending_order_rests_and_is_not_a_position() {
        let mut gw = PaperGateway::new("EURUSD");
        let id = gw
            .submit_pending_order(Side::Short, 500.0, 1.21, "AutoLotCalc", OrderKind::Limit)
            .unwrap();
        assert!(gw.open_positions("AutoLotCalc", "EURUSD").unwrap().is_empty());
        assert_eq!(gw.resting_orders().count(), 1);
        gw.modify_stop_loss(id, 1.22).unwrap();
        assert_eq!(gw.protection(id).stop_loss, Some(1.22));
    }

    #[test]
    fn open_positions_filters_label_and_symbol() {
        let mut gw = PaperGateway::new("EURUSD");
        gw.submit_market_order(Side::Long, 1.0, "AutoLotCalc", None)
            .unwrap();
        gw.submit_market_order(Side::Long, 1.0, "manual", None).unwrap();
        assert_eq!(gw.open_positions("AutoLotCalc", "EURUSD").unwrap().len(), 1);
        assert!(gw.open_positions("AutoLotCalc", "GBPUSD").unwrap().is_empty());
    }

    #[test]
    fn rejecting_gateway_carries_reason() {
        let mut gw = PaperGateway::new("EURUSD").rejecting("market closed");
        let err = gw
            .submit_market_order(Side::Long, 1.0, "AutoLotCalc", None)
            .unwrap_err();
        assert!(matches!(err, AutolotError::GatewayRejection { reason } if reason == "market closed"));
    }

    #[test]
    fn failing_protection_keeps_position_open() {
        let mut gw = PaperGateway::new("EURUSD").failing_protection();
        let id = gw
            .submit_market_order(Side::Long, 1.0, "AutoLotCalc", None)
            .unwrap();
        assert!(gw.modify_stop_loss(id, 1.19).is_err());
        assert_eq!(gw.positions().count(), 1);
    }

    #[test]
    fn close_unknown_position_fails() {
        let mut gw = PaperGateway::new("EURUSD");
        assert!(gw.close_position(42).is_err());
    }
}
