#![allow(dead_code)]

use autolot::adapters::static_market::StaticMarket;
use autolot::domain::error::AutolotError;
use autolot::domain::event::{Event, SubscriptionId, Topic};
use autolot::domain::line_plan::{DistanceConfig, LineKind, LineStyle, PriceLine};
use autolot::domain::order_planner::OrderKind;
use autolot::domain::risk_sizer::RiskConfig;
use autolot::domain::side::Side;
use autolot::domain::symbol::{AccountSnapshot, Quote, SymbolSpec};
use autolot::domain::trade_stats::{StatsSnapshot, TradeRecord};
use autolot::ports::event_port::EventSource;
use autolot::ports::execution_port::{ExecutionPort, OpenPosition, TicketId};
use autolot::ports::history_port::HistoryPort;
use autolot::ports::line_port::LinePort;
use autolot::ports::market_port::MarketPort;
use autolot::ports::ui_port::{DataPush, UiPort};
use autolot::session::{Ports, Session, SessionSettings};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

pub const LABEL: &str = "AutoLotCalc";

#[derive(Debug, Clone, PartialEq)]
pub struct MarketOrder {
    pub side: Side,
    pub volume_units: f64,
    pub label: String,
    pub slippage_pips: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub side: Side,
    pub volume_units: f64,
    pub price: f64,
    pub label: String,
    pub kind: OrderKind,
}

/// Everything the mock ports observed, shared with the test body.
#[derive(Debug, Default)]
pub struct Recorder {
    pub lines: BTreeMap<LineKind, PriceLine>,
    pub upserts: Vec<(LineKind, PriceLine)>,
    pub removals: Vec<LineKind>,

    pub market_orders: Vec<MarketOrder>,
    pub pending_orders: Vec<PendingOrder>,
    pub stop_losses: Vec<(TicketId, f64)>,
    pub take_profits: Vec<(TicketId, f64)>,
    pub closed: Vec<TicketId>,

    pub prices: Vec<String>,
    pub data: Vec<DataPush>,
    pub stats: Vec<StatsSnapshot>,
    pub alerts: Vec<String>,

    pub queue: VecDeque<Event>,
    pub subscribed: Vec<(SubscriptionId, Topic)>,
    pub unsubscribed: Vec<SubscriptionId>,

    pub history: Vec<TradeRecord>,
}

pub type Shared = Rc<RefCell<Recorder>>;

pub struct MockLines(pub Shared);

impl LinePort for MockLines {
    fn upsert(
        &mut self,
        kind: LineKind,
        line: PriceLine,
        _style: LineStyle,
    ) -> Result<(), AutolotError> {
        let mut rec = self.0.borrow_mut();
        rec.lines.insert(kind, line);
        rec.upserts.push((kind, line));
        Ok(())
    }

    fn remove(&mut self, kind: LineKind) -> Result<(), AutolotError> {
        let mut rec = self.0.borrow_mut();
        rec.lines.remove(&kind);
        rec.removals.push(kind);
        Ok(())
    }
}

pub struct MockGateway {
    pub rec: Shared,
    pub reject: Option<String>,
    pub fail_protection: bool,
    pub open: Vec<OpenPosition>,
    pub failing_closes: Vec<TicketId>,
    next_id: TicketId,
}

impl MockGateway {
    pub fn new(rec: Shared) -> Self {
        Self {
            rec,
            reject: None,
            fail_protection: false,
            open: Vec::new(),
            failing_closes: Vec::new(),
            next_id: 1,
        }
    }

    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject = Some(reason.to_string());
        self
    }

    pub fn failing_protection(mut self) -> Self {
        self.fail_protection = true;
        self
    }

    pub fn with_position(mut self, id: TicketId, label: &str, symbol: &str) -> Self {
        self.open.push(OpenPosition {
            id,
            symbol: symbol.to_string(),
            label: label.to_string(),
            side: Side::Long,
            volume_units: 1000.0,
        });
        self
    }

    pub fn failing_close(mut self, id: TicketId) -> Self {
        self.failing_closes.push(id);
        self
    }

    fn accept(&mut self) -> Result<TicketId, AutolotError> {
        if let Some(reason) = &self.reject {
            return Err(AutolotError::GatewayRejection {
                reason: reason.clone(),
            });
        }
        let id = self.next_id;
        self.next_id += 1;
        Ok(id)
    }

    fn protection(&self) -> Result<(), AutolotError> {
        if self.fail_protection {
            Err(AutolotError::GatewayRejection {
                reason: "modification refused".into(),
            })
        } else {
            Ok(())
        }
    }
}

impl ExecutionPort for MockGateway {
    fn submit_market_order(
        &mut self,
        side: Side,
        volume_units: f64,
        label: &str,
        slippage_pips: Option<f64>,
    ) -> Result<TicketId, AutolotError> {
        let id = self.accept()?;
        self.rec.borrow_mut().market_orders.push(MarketOrder {
            side,
            volume_units,
            label: label.to_string(),
            slippage_pips,
        });
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
        let id = self.accept()?;
        self.rec.borrow_mut().pending_orders.push(PendingOrder {
            side,
            volume_units,
            price,
            label: label.to_string(),
            kind,
        });
        Ok(id)
    }

    fn modify_stop_loss(&mut self, id: TicketId, price: f64) -> Result<(), AutolotError> {
        self.protection()?;
        self.rec.borrow_mut().stop_losses.push((id, price));
        Ok(())
    }

    fn modify_take_profit(&mut self, id: TicketId, price: f64) -> Result<(), AutolotError> {
        self.protection()?;
        self.rec.borrow_mut().take_profits.push((id, price));
        Ok(())
    }

    fn close_position(&mut self, id: TicketId) -> Result<(), AutolotError> {
        if self.failing_closes.contains(&id) {
            return Err(AutolotError::GatewayRejection {
                reason: "close refused".into(),
            });
        }
        self.rec.borrow_mut().closed.push(id);
        Ok(())
    }

    fn open_positions(&self, label: &str, symbol: &str) -> Result<Vec<OpenPosition>, AutolotError> {
        Ok(self
            .open
            .iter()
            .filter(|p| p.label == label && p.symbol == symbol)
            .cloned()
            .collect())
    }
}

pub struct MockUi(pub Shared);

impl UiPort for MockUi {
    fn push_price(&mut self, price: &str) -> Result<(), AutolotError> {
        self.0.borrow_mut().prices.push(price.to_string());
        Ok(())
    }

    fn push_data(&mut self, data: &DataPush) -> Result<(), AutolotError> {
        self.0.borrow_mut().data.push(data.clone());
        Ok(())
    }

    fn push_stats(&mut self, stats: &StatsSnapshot) -> Result<(), AutolotError> {
        self.0.borrow_mut().stats.push(*stats);
        Ok(())
    }

    fn alert(&mut self, message: &str) -> Result<(), AutolotError> {
        self.0.borrow_mut().alerts.push(message.to_string());
        Ok(())
    }
}

pub struct MockHistory(pub Shared);

impl HistoryPort for MockHistory {
    fn closed_trades(&self) -> Result<Vec<TradeRecord>, AutolotError> {
        Ok(self.0.borrow().history.clone())
    }
}

/// Delivers queued events on subscribed topics only.
pub struct MockEvents {
    rec: Shared,
    next_id: u64,
}

impl MockEvents {
    pub fn new(rec: Shared) -> Self {
        Self { rec, next_id: 0 }
    }
}

impl EventSource for MockEvents {
    fn subscribe(&mut self, topic: Topic) -> Result<SubscriptionId, AutolotError> {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.rec.borrow_mut().subscribed.push((id, topic));
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), AutolotError> {
        self.rec.borrow_mut().unsubscribed.push(id);
        Ok(())
    }

    fn next_event(&mut self) -> Option<Event> {
        let mut rec = self.rec.borrow_mut();
        while let Some(event) = rec.queue.pop_front() {
            let live = rec
                .subscribed
                .iter()
                .filter(|(id, _)| !rec.unsubscribed.contains(id))
                .any(|(_, topic)| *topic == event.topic());
            if live {
                return Some(event);
            }
        }
        None
    }
}

/// One tick is 0.0001 and worth 1 per unit; volumes step by 1 unit.
pub fn unit_symbol() -> SymbolSpec {
    SymbolSpec {
        name: "EURUSD".into(),
        pip_size: 0.0001,
        tick_size: 0.0001,
        tick_value: 1.0,
        lot_size: 100_000.0,
        volume_step: 1.0,
        volume_min: 1.0,
        digits: 5,
    }
}

pub fn market() -> StaticMarket {
    StaticMarket {
        account: AccountSnapshot {
            balance: 100_000.0,
            asset: "USD".into(),
        },
        symbol: unit_symbol(),
        volatility: None,
        quote: Quote::new(1.2000, 1.2002),
    }
}

/// Seeds SL 50 pips below price, so risk 1000 sizes to 20 units.
pub fn settings() -> SessionSettings {
    SessionSettings {
        label: LABEL.to_string(),
        slippage_pips: Some(3.0),
        distance: DistanceConfig {
            use_volatility: false,
            fixed_distance_pips: 50.0,
            ..DistanceConfig::default()
        },
    }
}

/// Market whose account lookup always fails.
pub struct NoAccount(pub StaticMarket);

impl MarketPort for NoAccount {
    fn account(&self) -> Result<AccountSnapshot, AutolotError> {
        Err(AutolotError::GatewayRejection {
            reason: "account unavailable".into(),
        })
    }

    fn symbol(&self) -> Result<SymbolSpec, AutolotError> {
        self.0.symbol()
    }

    fn volatility(&self) -> Option<f64> {
        self.0.volatility()
    }

    fn quote(&self) -> Result<Quote, AutolotError> {
        self.0.quote()
    }
}

pub fn start_session(gateway: impl FnOnce(Shared) -> MockGateway) -> (Session, Shared) {
    start_session_with(Box::new(market()), gateway)
}

pub fn start_session_with(
    market: Box<dyn MarketPort>,
    gateway: impl FnOnce(Shared) -> MockGateway,
) -> (Session, Shared) {
    let rec: Shared = Rc::new(RefCell::new(Recorder::default()));
    let ports = Ports {
        market,
        lines: Box::new(MockLines(rec.clone())),
        execution: Box::new(gateway(rec.clone())),
        history: Box::new(MockHistory(rec.clone())),
        ui: Box::new(MockUi(rec.clone())),
        events: Box::new(MockEvents::new(rec.clone())),
    };
    let session = Session::start(settings(), RiskConfig::new(1.0).unwrap(), ports).unwrap();
    (session, rec)
}

pub fn default_session() -> (Session, Shared) {
    start_session(MockGateway::new)
}

pub fn trade(profit: f64) -> TradeRecord {
    TradeRecord::new("EURUSD", LABEL, profit)
}
