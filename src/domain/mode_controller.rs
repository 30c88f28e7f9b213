//! Planner state machine over {Market, Pending} x {split off, split on}.
//!
//! All mutable planning state lives in one [`PlannerState`] value. Transitions
//! only reshape the lines; callers follow every transition with
//! [`PlannerState::recompute`], which is a function of the state and a
//! [`MarketContext`] snapshot.

use std::fmt;

use super::error::AutolotError;
use super::line_plan::{split_levels, LineKind, LineMove, LinePlan, SEED_REWARD_RATIO};
use super::risk_sizer::{calculate, CalculationResult, RiskConfig};
use super::side::Side;
use super::symbol::{Quote, SymbolSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Market,
    Pending,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Market => Mode::Pending,
            Mode::Pending => Mode::Market,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Market => write!(f, "Market"),
            Mode::Pending => write!(f, "Pending"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeDirection {
    Widen,
    Narrow,
}

/// Platform values a recompute reads.
#[derive(Debug, Clone, Copy)]
pub struct MarketContext<'a> {
    pub quote: Quote,
    pub balance: f64,
    pub symbol: &'a SymbolSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerState {
    pub mode: Mode,
    pub split: bool,
    pub active: bool,
    pub lines: LinePlan,
    pub risk: RiskConfig,
    pub last_result: Option<CalculationResult>,
}

impl PlannerState {
    pub fn new(risk: RiskConfig) -> Self {
        PlannerState {
            mode: Mode::Market,
            split: false,
            active: true,
            lines: LinePlan::new(),
            risk,
            last_result: None,
        }
    }

    /// Split entry only applies to pending plans.
    pub fn split_active(&self) -> bool {
        self.mode == Mode::Pending && self.split
    }

    /// Market plans enter at the bid; pending plans at the Entry line,
    /// falling back to the bid when it is absent.
    pub fn entry_price(&self, quote: Quote) -> f64 {
        match self.mode {
            Mode::Market => quote.bid,
            Mode::Pending => self.lines.price(LineKind::Entry).unwrap_or(quote.bid),
        }
    }

    pub fn side(&self, quote: Quote) -> Option<Side> {
        self.lines
            .price(LineKind::StopLoss)
            .map(|sl| Side::of(self.entry_price(quote), sl))
    }

    /// Re-seed every level, discarding manual edits.
    ///
    /// Without a positive bid there is nothing to seed around and the lines
    /// are left as they are.
    pub fn redraw(&mut self, bid: f64, distance: f64) {
        if !self.active || !(bid > 0.0) {
            return;
        }
        self.lines = LinePlan::seeded(self.mode, bid, distance);
    }

    pub fn toggle_mode(&mut self, bid: f64) -> Mode {
        self.mode = self.mode.toggled();
        match self.mode {
            Mode::Pending => {
                if self.active
                    && self.lines.contains(LineKind::StopLoss)
                    && !self.lines.contains(LineKind::Entry)
                {
                    self.lines.set(LineKind::Entry, bid, true);
                }
                self.lines.set_interactive(LineKind::TakeProfit, true);
            }
            Mode::Market => {
                self.lines.remove(LineKind::Entry);
                self.lines.remove(LineKind::EntryShallow);
                self.lines.remove(LineKind::EntryDeep);
                self.lines.set_interactive(LineKind::TakeProfit, false);
            }
        }
        self.mode
    }

    /// Flip the split flag. Ignored outside pending mode.
    pub fn toggle_split(&mut self) -> bool {
        if self.mode != Mode::Pending {
            return false;
        }
        self.split = !self.split;
        true
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.lines.clear();
        self.last_result = None;
    }

    pub fn show(&mut self, bid: f64, distance: f64) {
        self.active = true;
        self.redraw(bid, distance);
    }

    /// Apply reported drags. Returns whether a sizing input moved.
    pub fn apply_moves(&mut self, moves: &[LineMove]) -> bool {
        let mut relevant = false;
        for m in moves {
            if self.lines.move_line(m.kind, m.price) && m.kind.drives_recompute() {
                relevant = true;
            }
        }
        relevant
    }

    /// Move SL one pip. Widening moves it away from the bid.
    pub fn nudge_stop_loss(
        &mut self,
        direction: NudgeDirection,
        bid: f64,
        pip_size: f64,
    ) -> Result<f64, AutolotError> {
        let sl = self
            .lines
            .price(LineKind::StopLoss)
            .ok_or(AutolotError::MissingPriceLevel {
                level: LineKind::StopLoss,
            })?;

        let away = if sl < bid { -pip_size } else { pip_size };
        let moved = match direction {
            NudgeDirection::Widen => sl + away,
            NudgeDirection::Narrow => sl - away,
        };
        self.lines.set(LineKind::StopLoss, moved, true);
        Ok(moved)
    }

    /// Re-derive the dependent levels and the sizing snapshot.
    pub fn recompute(
        &mut self,
        ctx: &MarketContext<'_>,
    ) -> Result<CalculationResult, AutolotError> {
        let sl = self
            .lines
            .price(LineKind::StopLoss)
            .ok_or(AutolotError::MissingPriceLevel {
                level: LineKind::StopLoss,
            })?;
        let entry = self.entry_price(ctx.quote);
        let side = Side::of(entry, sl);

        let tp = match self.mode {
            Mode::Market => {
                let tp = side.project(entry, SEED_REWARD_RATIO * (entry - sl).abs());
                self.lines.set(LineKind::TakeProfit, tp, false);
                Some(tp)
            }
            Mode::Pending => self.lines.price(LineKind::TakeProfit),
        };

        match tp {
            Some(tp) if self.split_active() => {
                let (shallow, deep) = split_levels(side, sl, tp);
                self.lines.set(LineKind::EntryShallow, shallow, false);
                self.lines.set(LineKind::EntryDeep, deep, false);
            }
            _ => {
                self.lines.remove(LineKind::EntryShallow);
                self.lines.remove(LineKind::EntryDeep);
            }
        }

        let risk_amount = self.risk.risk_amount(ctx.balance);
        let result = calculate(entry, sl, tp, risk_amount, ctx.symbol);
        tracing::debug!(
            mode = %self.mode,
            split = self.split,
            side = %result.side,
            volume = result.volume_units,
            "recomputed plan"
        );
        self.last_result = Some(result.clone());
        Ok(result)
    }
}
