//! Turns the current plan into concrete order instructions.

use std::fmt;

use super::error::AutolotError;
use super::line_plan::LineKind;
use super::mode_controller::{MarketContext, Mode, PlannerState};
use super::risk_sizer::compute_volume;
use super::side::Side;
use super::symbol::{Quote, SymbolSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Market,
    Limit,
    Stop,
}

impl OrderKind {
    /// Resting-order type a broker would assign to `price`.
    ///
    /// Buys compare against the ask, sells against the bid. A price on the
    /// favourable side of the market rests as a limit, anything else as a stop.
    pub fn classify(side: Side, price: f64, quote: Quote) -> OrderKind {
        let is_limit = match side {
            Side::Long => price < quote.ask,
            Side::Short => price > quote.bid,
        };
        if is_limit {
            OrderKind::Limit
        } else {
            OrderKind::Stop
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Market => write!(f, "Market"),
            OrderKind::Limit => write!(f, "Limit"),
            OrderKind::Stop => write!(f, "Stop"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OrderInstruction {
    pub side: Side,
    pub kind: OrderKind,
    pub volume_units: f64,
    /// Absent for immediate market orders.
    pub price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub label: String,
    pub slippage_pips: Option<f64>,
}

/// Caller-supplied attributes stamped on every instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTag {
    pub label: String,
    pub slippage_pips: Option<f64>,
}

fn required(state: &PlannerState, level: LineKind) -> Result<f64, AutolotError> {
    state
        .lines
        .price(level)
        .ok_or(AutolotError::MissingPriceLevel { level })
}

fn positive(price: f64) -> Option<f64> {
    (price > 0.0).then_some(price)
}

/// Size `fraction` of the risk-based volume and shape it into orders.
///
/// Market plans yield one immediate order, pending plans one resting order at
/// the entry line, and split plans two resting orders at the shallow and deep
/// levels, each holding half the volume. Split legs that floor below the
/// minimum refuse the whole plan.
pub fn plan(
    state: &PlannerState,
    ctx: &MarketContext<'_>,
    fraction: f64,
    tag: &OrderTag,
) -> Result<Vec<OrderInstruction>, AutolotError> {
    let spec: &SymbolSpec = ctx.symbol;
    let sl = required(state, LineKind::StopLoss)?;
    let tp = required(state, LineKind::TakeProfit)?;
    let entry = state.entry_price(ctx.quote);
    let side = Side::of(entry, sl);

    let risk_amount = state.risk.risk_amount(ctx.balance);
    let base_volume = compute_volume(risk_amount, entry, sl, spec);
    let target_volume = spec.executable_volume(base_volume * fraction);
    if target_volume <= 0.0 {
        return Err(AutolotError::ZeroOrSubMinimumVolume {
            volume: spec.normalize_volume_down(base_volume * fraction),
            minimum: spec.volume_min,
        });
    }

    let instruction = |kind: OrderKind, volume_units: f64, price: Option<f64>| OrderInstruction {
        side,
        kind,
        volume_units,
        price,
        stop_loss: positive(sl),
        take_profit: positive(tp),
        label: tag.label.clone(),
        slippage_pips: if kind == OrderKind::Market {
            tag.slippage_pips
        } else {
            None
        },
    };

    if state.mode == Mode::Market {
        return Ok(vec![instruction(OrderKind::Market, target_volume, None)]);
    }

    if !state.split_active() {
        let kind = OrderKind::classify(side, entry, ctx.quote);
        return Ok(vec![instruction(kind, target_volume, Some(entry))]);
    }

    let shallow = required(state, LineKind::EntryShallow)?;
    let deep = required(state, LineKind::EntryDeep)?;
    let leg_volume = spec.executable_volume(target_volume / 2.0);

    // Both legs share one volume, so a leg below the minimum drops both.
    if leg_volume <= 0.0 {
        return Err(AutolotError::ZeroOrSubMinimumVolume {
            volume: spec.normalize_volume_down(target_volume / 2.0),
            minimum: spec.volume_min,
        });
    }

    Ok([shallow, deep]
        .into_iter()
        .map(|price| {
            let kind = OrderKind::classify(side, price, ctx.quote);
            instruction(kind, leg_volume, Some(price))
        })
        .collect())
}
