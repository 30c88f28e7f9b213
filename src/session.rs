//! Event dispatch over the ports.
//!
//! A [`Session`] owns the single [`PlannerState`] and is its only writer.
//! Events are handled one at a time, and every failure degrades to "no
//! instruction" plus an alert. Subscriptions and drawn lines are released by
//! [`Session::stop`], which also runs on drop.

use tracing::{debug, info, warn};

use crate::domain::command::UiCommand;
use crate::domain::error::AutolotError;
use crate::domain::event::{Event, SubscriptionId, Topic};
use crate::domain::line_plan::{
    seed_distance, DistanceConfig, LineChange, LineKind, LineMove, LinePlan,
};
use crate::domain::mode_controller::{MarketContext, Mode, PlannerState};
use crate::domain::order_planner::{self, OrderInstruction, OrderKind, OrderTag};
use crate::domain::risk_sizer::RiskConfig;
use crate::domain::side::Side;
use crate::domain::symbol::{Quote, SymbolSpec};
use crate::domain::trade_stats::{StatsSnapshot, TradeStatsTracker};
use crate::ports::event_port::EventSource;
use crate::ports::execution_port::ExecutionPort;
use crate::ports::history_port::HistoryPort;
use crate::ports::line_port::LinePort;
use crate::ports::market_port::MarketPort;
use crate::ports::ui_port::{DataPush, UiPort};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Stamped on every order and used to attribute closed trades.
    pub label: String,
    pub slippage_pips: Option<f64>,
    pub distance: DistanceConfig,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            label: "AutoLotCalc".to_string(),
            slippage_pips: Some(3.0),
            distance: DistanceConfig::default(),
        }
    }
}

pub struct Ports {
    pub market: Box<dyn MarketPort>,
    pub lines: Box<dyn LinePort>,
    pub execution: Box<dyn ExecutionPort>,
    pub history: Box<dyn HistoryPort>,
    pub ui: Box<dyn UiPort>,
    pub events: Box<dyn EventSource>,
}

pub struct Session {
    settings: SessionSettings,
    ports: Ports,
    state: PlannerState,
    symbol: SymbolSpec,
    quote: Quote,
    stats: TradeStatsTracker,
    /// What the line surface currently shows.
    rendered: LinePlan,
    subscriptions: Vec<SubscriptionId>,
    stopped: bool,
}

impl Session {
    /// Subscribe to every topic, seed the lines, load stats and push the
    /// first snapshot.
    pub fn start(
        settings: SessionSettings,
        risk: RiskConfig,
        ports: Ports,
    ) -> Result<Self, AutolotError> {
        let symbol = ports.market.symbol()?;
        let quote = ports.market.quote()?;
        let stats = TradeStatsTracker::new(&symbol.name, &settings.label);

        let mut session = Session {
            settings,
            ports,
            state: PlannerState::new(risk),
            symbol,
            quote,
            stats,
            rendered: LinePlan::new(),
            subscriptions: Vec::new(),
            stopped: false,
        };

        for topic in Topic::ALL {
            let id = session.ports.events.subscribe(topic)?;
            session.subscriptions.push(id);
        }

        session.reseed();
        session.refresh_stats();
        session.push_price();
        session.recompute_and_push();

        info!(
            symbol = %session.symbol.name,
            label = %session.settings.label,
            risk_pct = session.state.risk.risk_percentage(),
            "session started"
        );
        Ok(session)
    }

    /// Handle events until the source is exhausted. Returns how many ran.
    pub fn run(&mut self) -> usize {
        let mut handled = 0;
        while !self.stopped {
            let Some(event) = self.ports.events.next_event() else {
                break;
            };
            self.handle(event);
            handled += 1;
        }
        handled
    }

    pub fn handle(&mut self, event: Event) {
        if self.stopped {
            return;
        }
        match event {
            Event::Tick(quote) => self.on_tick(quote),
            Event::LinesMoved(moves) => self.on_lines_moved(&moves),
            Event::TradeClosed => self.refresh_stats(),
            Event::Command(cmd) => self.on_command(cmd),
        }
    }

    /// Release every subscription and erase every drawn line. Idempotent.
    pub fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;

        for id in self.subscriptions.drain(..) {
            if let Err(e) = self.ports.events.unsubscribe(id) {
                warn!(id = id.0, error = %e, "unsubscribe failed");
            }
        }
        let drawn: Vec<_> = self.rendered.kinds().collect();
        for kind in drawn {
            if let Err(e) = self.ports.lines.remove(kind) {
                warn!(line = %kind, error = %e, "line removal failed");
            }
        }
        self.rendered.clear();
        info!("session stopped");
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.latest()
    }

    pub fn quote(&self) -> Quote {
        self.quote
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn on_tick(&mut self, quote: Quote) {
        self.quote = quote;
        self.push_price();
        if !self.state.active {
            return;
        }
        if self.state.lines.is_empty() && quote.bid > 0.0 {
            // Started without a price: seed around the first real one.
            self.reseed();
            self.recompute_and_push();
        } else if self.state.mode == Mode::Market {
            self.recompute_and_push();
        }
    }

    fn on_lines_moved(&mut self, moves: &[LineMove]) {
        // The surface already shows the dragged prices.
        for m in moves {
            if let Some(line) = self.rendered.get(m.kind).copied() {
                self.rendered.set(m.kind, m.price, line.interactive);
            }
        }
        if self.state.apply_moves(moves) {
            self.recompute_and_push();
        } else {
            self.sync_lines();
        }
    }

    fn on_command(&mut self, cmd: UiCommand) {
        debug!(?cmd, "ui command");
        match cmd {
            UiCommand::ToggleMode => {
                let mode = self.state.toggle_mode(self.quote.bid);
                info!(%mode, "mode toggled");
                self.recompute_and_push();
            }
            UiCommand::ToggleSplit => {
                if self.state.toggle_split() {
                    info!(split = self.state.split, "split toggled");
                    self.recompute_and_push();
                } else {
                    self.alert("split entry is only available in pending mode");
                }
            }
            UiCommand::Enter(fraction) => {
                info!(%fraction, mode = %self.state.mode, "entry requested");
                self.execute_plan(fraction.value(), None);
            }
            UiCommand::MarketEntry(side) => {
                info!(%side, "market entry requested");
                self.execute_plan(1.0, Some(side));
            }
            UiCommand::Redraw => {
                self.reseed();
                self.recompute_and_push();
            }
            UiCommand::CloseAll => self.close_all(),
            UiCommand::SetRisk(pct) => match self.state.risk.set(pct) {
                Ok(()) => {
                    info!(risk_pct = pct, "risk updated");
                    self.recompute_and_push();
                }
                Err(e) => self.alert(&e.user_message()),
            },
            UiCommand::NudgeStopLoss(direction) => {
                match self
                    .state
                    .nudge_stop_loss(direction, self.quote.bid, self.symbol.pip_size)
                {
                    Ok(sl) => debug!(sl, ?direction, "stop loss nudged"),
                    Err(e) => debug!(error = %e, "nudge skipped"),
                }
                self.recompute_and_push();
            }
            UiCommand::ToggleVisibility => {
                if self.state.active {
                    self.state.hide();
                    info!("lines hidden");
                    self.sync_lines();
                } else {
                    let distance = self.distance();
                    self.state.show(self.quote.bid, distance);
                    info!("lines shown");
                    self.recompute_and_push();
                }
            }
        }
    }

    fn distance(&self) -> f64 {
        seed_distance(
            &self.settings.distance,
            self.ports.market.volatility(),
            self.symbol.pip_size,
        )
    }

    fn reseed(&mut self) {
        if !(self.quote.bid > 0.0) {
            debug!(bid = self.quote.bid, "no price yet, seeding deferred");
            return;
        }
        let distance = self.distance();
        debug!(distance, bid = self.quote.bid, "seeding lines");
        self.state.redraw(self.quote.bid, distance);
    }

    fn balance(&mut self) -> Option<f64> {
        match self.ports.market.account() {
            Ok(account) => Some(account.balance),
            Err(e) => {
                warn!(error = %e, "account snapshot unavailable");
                self.alert(&e.user_message());
                None
            }
        }
    }

    fn recompute_and_push(&mut self) {
        let balance = if self.state.active {
            self.balance()
        } else {
            None
        };
        self.refresh(balance);
    }

    /// Recompute against an already fetched balance, then sync the lines.
    fn refresh(&mut self, balance: Option<f64>) {
        if self.state.active {
            if let Some(balance) = balance {
                let ctx = MarketContext {
                    quote: self.quote,
                    balance,
                    symbol: &self.symbol,
                };
                match self.state.recompute(&ctx) {
                    Ok(result) => {
                        let data = DataPush::new(
                            &result,
                            &self.state.mode.to_string(),
                            self.state.split_active(),
                        );
                        if let Err(e) = self.ports.ui.push_data(&data) {
                            warn!(error = %e, "data push failed");
                        }
                    }
                    Err(AutolotError::MissingPriceLevel { level }) => {
                        debug!(line = %level, "recompute skipped");
                    }
                    Err(e) => self.alert(&e.user_message()),
                }
            }
        }
        self.sync_lines();
    }

    fn sync_lines(&mut self) {
        for change in self.state.lines.changes_since(&self.rendered) {
            match change {
                LineChange::Upsert { kind, line } => {
                    match self.ports.lines.upsert(kind, line, kind.style()) {
                        Ok(()) => self.rendered.set(kind, line.price, line.interactive),
                        Err(e) => warn!(line = %kind, error = %e, "line draw failed"),
                    }
                }
                LineChange::Remove(kind) => match self.ports.lines.remove(kind) {
                    Ok(()) => {
                        self.rendered.remove(kind);
                    }
                    Err(e) => warn!(line = %kind, error = %e, "line removal failed"),
                },
            }
        }
    }

    fn refresh_stats(&mut self) {
        match self.ports.history.closed_trades() {
            Ok(history) => {
                let stats = self.stats.update(&history);
                debug!(
                    trades = stats.total_trades,
                    win_rate = stats.win_rate,
                    ev = stats.expected_value,
                    "stats refreshed"
                );
                if let Err(e) = self.ports.ui.push_stats(&stats) {
                    warn!(error = %e, "stats push failed");
                }
            }
            Err(e) => warn!(error = %e, "trade history unavailable"),
        }
    }

    fn push_price(&mut self) {
        let price = self.symbol.format_price(self.quote.bid);
        if let Err(e) = self.ports.ui.push_price(&price) {
            warn!(error = %e, "price push failed");
        }
    }

    fn alert(&mut self, message: &str) {
        if let Err(e) = self.ports.ui.alert(message) {
            warn!(error = %e, alert = message, "alert push failed");
        }
    }

    /// Plan `fraction` of the sized volume and send it to the gateway.
    ///
    /// `forced` turns the request into an immediate market order that must
    /// agree with the side the lines describe.
    fn execute_plan(&mut self, fraction: f64, forced: Option<Side>) {
        let balance = self.balance();
        self.refresh(balance);
        let Some(balance) = balance else {
            return;
        };

        let market_view;
        let state = match forced {
            Some(_) => {
                let mut view = self.state.clone();
                view.mode = Mode::Market;
                view.split = false;
                market_view = view;
                &market_view
            }
            None => &self.state,
        };

        let ctx = MarketContext {
            quote: self.quote,
            balance,
            symbol: &self.symbol,
        };
        let tag = OrderTag {
            label: self.settings.label.clone(),
            slippage_pips: self.settings.slippage_pips,
        };

        let planned = match (forced, state.side(self.quote)) {
            (Some(wanted), Some(side)) if wanted != side => Err(AutolotError::InvalidCommand {
                message: wanted.to_string().to_uppercase(),
                reason: format!("the lines describe a {side} trade"),
            }),
            _ => order_planner::plan(state, &ctx, fraction, &tag),
        };

        match planned {
            Ok(instructions) => {
                for instruction in instructions {
                    self.submit(&instruction);
                }
            }
            Err(e) => {
                warn!(error = %e, "entry refused");
                self.alert(&e.user_message());
            }
        }
    }

    fn submit(&mut self, instruction: &OrderInstruction) {
        let lots = self.symbol.format_lots(instruction.volume_units);
        let submitted = match (instruction.kind, instruction.price) {
            (OrderKind::Market, _) => self.ports.execution.submit_market_order(
                instruction.side,
                instruction.volume_units,
                &instruction.label,
                instruction.slippage_pips,
            ),
            (kind, Some(price)) => self.ports.execution.submit_pending_order(
                instruction.side,
                instruction.volume_units,
                price,
                &instruction.label,
                kind,
            ),
            (_, None) => Err(AutolotError::MissingPriceLevel {
                level: LineKind::Entry,
            }),
        };

        let id = match submitted {
            Ok(id) => id,
            Err(e) => {
                warn!(side = %instruction.side, kind = %instruction.kind, error = %e, "order rejected");
                self.alert(&e.user_message());
                return;
            }
        };
        info!(
            id,
            side = %instruction.side,
            kind = %instruction.kind,
            volume = instruction.volume_units,
            price = ?instruction.price,
            "order accepted"
        );

        let mut failures = Vec::new();
        match instruction.stop_loss {
            Some(sl) => {
                if let Err(e) = self.ports.execution.modify_stop_loss(id, sl) {
                    failures.push(format!("SL: {e}"));
                }
            }
            None => failures.push("SL: no stop-loss level".to_string()),
        }
        if let Some(tp) = instruction.take_profit {
            if let Err(e) = self.ports.execution.modify_take_profit(id, tp) {
                failures.push(format!("TP: {e}"));
            }
        }

        if failures.is_empty() {
            self.alert(&format!(
                "{} {} {lots} lots accepted (#{id})",
                instruction.side, instruction.kind
            ));
        } else {
            let err = AutolotError::ProtectionAttachmentFailure {
                id: format!("#{id}"),
                reason: failures.join("; "),
            };
            warn!(error = %err, "position left unprotected");
            self.alert(&err.user_message());
        }
    }

    fn close_all(&mut self) {
        let positions = match self
            .ports
            .execution
            .open_positions(&self.settings.label, &self.symbol.name)
        {
            Ok(positions) => positions,
            Err(e) => {
                warn!(error = %e, "position listing failed");
                self.alert(&e.user_message());
                return;
            }
        };

        if positions.is_empty() {
            self.alert("no open positions to close");
            return;
        }

        let mut closed = 0usize;
        let mut failed = Vec::new();
        for position in &positions {
            match self.ports.execution.close_position(position.id) {
                Ok(()) => closed += 1,
                Err(e) => {
                    warn!(id = position.id, error = %e, "close failed");
                    failed.push(format!("#{}", position.id));
                }
            }
        }
        info!(closed, failed = failed.len(), "close all");

        let message = if failed.is_empty() {
            format!("closed {closed} position(s)")
        } else {
            format!(
                "closed {closed} position(s), failed to close {}",
                failed.join(", ")
            )
        };
        self.alert(&message);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}
