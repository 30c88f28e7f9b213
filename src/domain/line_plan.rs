//! Chart price levels and their derivation.
//!
//! A [`LinePlan`] owns every named level the trader sees. Seeding places the
//! levels from a volatility reading or a fixed pip distance; split levels are
//! derived from the SL-TP span.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::mode_controller::Mode;
use super::side::Side;

/// Reward:risk ratio used for seeded and auto-followed take profits.
pub const SEED_REWARD_RATIO: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LineKind {
    StopLoss,
    TakeProfit,
    Entry,
    EntryShallow,
    EntryDeep,
}

impl LineKind {
    pub const ALL: [LineKind; 5] = [
        LineKind::StopLoss,
        LineKind::TakeProfit,
        LineKind::Entry,
        LineKind::EntryShallow,
        LineKind::EntryDeep,
    ];

    pub fn style(self) -> LineStyle {
        let (color, pattern) = match self {
            LineKind::StopLoss => (LineColor::Red, LinePattern::Solid),
            LineKind::TakeProfit => (LineColor::Blue, LinePattern::Solid),
            LineKind::Entry => (LineColor::Gold, LinePattern::Solid),
            LineKind::EntryShallow => (LineColor::LimeGreen, LinePattern::Dotted),
            LineKind::EntryDeep => (LineColor::DarkGreen, LinePattern::Dotted),
        };
        LineStyle { color, pattern }
    }

    /// Lines whose movement changes the sizing inputs.
    pub fn drives_recompute(self) -> bool {
        matches!(
            self,
            LineKind::StopLoss | LineKind::TakeProfit | LineKind::Entry
        )
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LineKind::StopLoss => "SL",
            LineKind::TakeProfit => "TP",
            LineKind::Entry => "Entry",
            LineKind::EntryShallow => "EntryShallow",
            LineKind::EntryDeep => "EntryDeep",
        };
        write!(f, "{name}")
    }
}

impl FromStr for LineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SL" => Ok(LineKind::StopLoss),
            "TP" => Ok(LineKind::TakeProfit),
            "ENTRY" => Ok(LineKind::Entry),
            "SHALLOW" | "ENTRYSHALLOW" => Ok(LineKind::EntryShallow),
            "DEEP" | "ENTRYDEEP" => Ok(LineKind::EntryDeep),
            other => Err(format!("unknown line {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineColor {
    Red,
    Blue,
    Gold,
    LimeGreen,
    DarkGreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePattern {
    Solid,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStyle {
    pub color: LineColor,
    pub pattern: LinePattern,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLine {
    pub price: f64,
    pub interactive: bool,
}

/// A level reported as moved by the line surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMove {
    pub kind: LineKind,
    pub price: f64,
}

/// Instruction for the line surface.
#[derive(Debug, Clone, PartialEq)]
pub enum LineChange {
    Upsert { kind: LineKind, line: PriceLine },
    Remove(LineKind),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinePlan {
    lines: BTreeMap<LineKind, PriceLine>,
}

impl LinePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh levels around `price`, discarding any manual edits.
    ///
    /// SL is always seeded below price; dragging it above flips the scenario.
    pub fn seeded(mode: Mode, price: f64, distance: f64) -> Self {
        let mut plan = LinePlan::new();
        plan.set(LineKind::StopLoss, price - distance, true);
        let tp = price + SEED_REWARD_RATIO * distance;
        match mode {
            Mode::Market => plan.set(LineKind::TakeProfit, tp, false),
            Mode::Pending => {
                plan.set(LineKind::TakeProfit, tp, true);
                plan.set(LineKind::Entry, price, true);
            }
        }
        plan
    }

    pub fn get(&self, kind: LineKind) -> Option<&PriceLine> {
        self.lines.get(&kind)
    }

    pub fn price(&self, kind: LineKind) -> Option<f64> {
        self.lines.get(&kind).map(|l| l.price)
    }

    pub fn contains(&self, kind: LineKind) -> bool {
        self.lines.contains_key(&kind)
    }

    pub fn set(&mut self, kind: LineKind, price: f64, interactive: bool) {
        self.lines.insert(kind, PriceLine { price, interactive });
    }

    pub fn set_interactive(&mut self, kind: LineKind, interactive: bool) {
        if let Some(line) = self.lines.get_mut(&kind) {
            line.interactive = interactive;
        }
    }

    pub fn remove(&mut self, kind: LineKind) -> Option<PriceLine> {
        self.lines.remove(&kind)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = LineKind> + '_ {
        self.lines.keys().copied()
    }

    /// Apply a user drag. Only existing interactive lines accept a new price.
    pub fn move_line(&mut self, kind: LineKind, price: f64) -> bool {
        match self.lines.get_mut(&kind) {
            Some(line) if line.interactive && price.is_finite() => {
                line.price = price;
                true
            }
            _ => false,
        }
    }

    /// Changes that turn `previous` (what the surface shows) into `self`.
    pub fn changes_since(&self, previous: &LinePlan) -> Vec<LineChange> {
        let mut changes = Vec::new();
        for kind in LineKind::ALL {
            match (self.lines.get(&kind), previous.lines.get(&kind)) {
                (Some(line), Some(old)) if line == old => {}
                (Some(line), _) => changes.push(LineChange::Upsert { kind, line: *line }),
                (None, Some(_)) => changes.push(LineChange::Remove(kind)),
                (None, None) => {}
            }
        }
        changes
    }
}

/// How the seed distance between price and SL is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceConfig {
    pub use_volatility: bool,
    pub volatility_multiplier: f64,
    pub fixed_distance_pips: f64,
    pub min_distance_pips: f64,
    pub max_distance_pips: Option<f64>,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        DistanceConfig {
            use_volatility: true,
            volatility_multiplier: 2.0,
            fixed_distance_pips: 20.0,
            min_distance_pips: 2.0,
            max_distance_pips: None,
        }
    }
}

/// Seed distance in price units.
///
/// Falls back to the fixed pip distance when no usable volatility reading
/// exists, then clamps to `[min, max]` pips.
pub fn seed_distance(config: &DistanceConfig, volatility: Option<f64>, pip_size: f64) -> f64 {
    let reading = volatility.filter(|v| v.is_finite() && *v > 0.0);
    let raw = match reading {
        Some(v) if config.use_volatility => v * config.volatility_multiplier,
        _ => config.fixed_distance_pips * pip_size,
    };

    let floor = config.min_distance_pips * pip_size;
    let mut distance = raw.max(floor);
    if let Some(max_pips) = config.max_distance_pips {
        distance = distance.min(max_pips * pip_size);
    }
    distance
}

/// Shallow and deep split entry levels, measured from SL toward TP.
pub fn split_levels(side: Side, sl: f64, tp: f64) -> (f64, f64) {
    let total = (tp - sl).abs();
    let shallow = side.project(sl, total / 2.0);
    let deep = side.project(sl, total / 4.0);
    (shallow, deep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const PIP: f64 = 0.0001;

    #[test]
    fn market_seed_has_auto_follow_tp() {
        let plan = LinePlan::seeded(Mode::Market, 1.2000, 0.0050);
        assert_relative_eq!(plan.price(LineKind::StopLoss).unwrap(), 1.1950, epsilon = 1e-12);
        assert_relative_eq!(plan.price(LineKind::TakeProfit).unwrap(), 1.2100, epsilon = 1e-12);
        assert!(!plan.get(LineKind::TakeProfit).unwrap().interactive);
        assert!(!plan.contains(LineKind::Entry));
    }

    #[test]
    fn pending_seed_adds_entry_and_interactive_tp() {
        let plan = LinePlan::seeded(Mode::Pending, 1.2000, 0.0050);
        assert!(plan.get(LineKind::TakeProfit).unwrap().interactive);
        assert_relative_eq!(plan.price(LineKind::Entry).unwrap(), 1.2000, epsilon = 1e-12);
        assert!(plan.get(LineKind::Entry).unwrap().interactive);
    }

    #[test]
    fn move_ignores_non_interactive_and_missing() {
        let mut plan = LinePlan::seeded(Mode::Market, 1.2000, 0.0050);
        assert!(!plan.move_line(LineKind::TakeProfit, 1.3));
        assert!(!plan.move_line(LineKind::Entry, 1.3));
        assert!(plan.move_line(LineKind::StopLoss, 1.21));
        assert_relative_eq!(plan.price(LineKind::StopLoss).unwrap(), 1.21, epsilon = 1e-12);
    }

    #[test]
    fn changes_since_reports_only_differences() {
        let old = LinePlan::seeded(Mode::Pending, 1.2000, 0.0050);
        let mut new = old.clone();
        new.move_line(LineKind::StopLoss, 1.1900);
        new.remove(LineKind::Entry);

        let changes = new.changes_since(&old);
        assert_eq!(changes.len(), 2);
        assert!(changes.contains(&LineChange::Upsert {
            kind: LineKind::StopLoss,
            line: PriceLine {
                price: 1.1900,
                interactive: true
            }
        }));
        assert!(changes.contains(&LineChange::Remove(LineKind::Entry)));
    }

    #[test]
    fn changes_since_empty_creates_everything() {
        let plan = LinePlan::seeded(Mode::Pending, 1.2, 0.005);
        assert_eq!(plan.changes_since(&LinePlan::new()).len(), 3);
        assert!(plan.changes_since(&plan).is_empty());
    }

    #[test]
    fn seed_distance_uses_volatility() {
        let cfg = DistanceConfig::default();
        assert_relative_eq!(seed_distance(&cfg, Some(0.0010), PIP), 0.0020, epsilon = 1e-12);
    }

    #[test]
    fn seed_distance_clamps_tiny_volatility() {
        let cfg = DistanceConfig::default();
        assert_relative_eq!(seed_distance(&cfg, Some(0.000001), PIP), 0.0002, epsilon = 1e-12);
    }

    #[test]
    fn seed_distance_falls_back_to_fixed() {
        let cfg = DistanceConfig::default();
        assert_relative_eq!(seed_distance(&cfg, None, PIP), 0.0020, epsilon = 1e-12);
        assert_relative_eq!(seed_distance(&cfg, Some(f64::NAN), PIP), 0.0020, epsilon = 1e-12);

        let cfg = DistanceConfig {
            use_volatility: false,
            ..DistanceConfig::default()
        };
        assert_relative_eq!(seed_distance(&cfg, Some(0.05), PIP), 0.0020, epsilon = 1e-12);
    }

    #[test]
    fn seed_distance_respects_cap() {
        let cfg = DistanceConfig {
            max_distance_pips: Some(200.0),
            ..DistanceConfig::default()
        };
        assert_relative_eq!(seed_distance(&cfg, Some(0.5), PIP), 0.0200, epsilon = 1e-12);
    }

    #[test]
    fn split_levels_long() {
        let (shallow, deep) = split_levels(Side::Long, 1.1950, 1.2100);
        assert_relative_eq!(shallow, 1.2025, epsilon = 1e-12);
        assert_relative_eq!(deep, 1.19875, epsilon = 1e-12);
    }

    #[test]
    fn split_levels_short() {
        let (shallow, deep) = split_levels(Side::Short, 1.2100, 1.1950);
        assert_relative_eq!(shallow, 1.2025, epsilon = 1e-12);
        assert_relative_eq!(deep, 1.20625, epsilon = 1e-12);
    }

    #[test]
    fn line_kind_parses_script_names() {
        assert_eq!("sl".parse::<LineKind>().unwrap(), LineKind::StopLoss);
        assert_eq!("Entry".parse::<LineKind>().unwrap(), LineKind::Entry);
        assert!("foo".parse::<LineKind>().is_err());
    }
}
