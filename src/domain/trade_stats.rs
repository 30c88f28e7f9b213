//! Win rate and expected value over closed trades attributed to this tool.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub symbol: String,
    pub label: String,
    pub net_profit: f64,
    pub closed_at: Option<NaiveDate>,
}

impl TradeRecord {
    pub fn new(symbol: &str, label: &str, net_profit: f64) -> Self {
        TradeRecord {
            symbol: symbol.to_string(),
            label: label.to_string(),
            net_profit,
            closed_at: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct StatsSnapshot {
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    /// Percentage in `[0, 100]`.
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub expected_value: f64,
}

impl StatsSnapshot {
    /// Scan `history` for trades on `symbol` carrying `label`.
    ///
    /// Break-even trades count as losses. The result does not depend on
    /// the order of `history`.
    pub fn compute<'a, I>(history: I, symbol: &str, label: &str) -> Self
    where
        I: IntoIterator<Item = &'a TradeRecord>,
    {
        let mut wins = 0usize;
        let mut losses = 0usize;
        let mut total_wins = 0.0_f64;
        let mut total_losses = 0.0_f64;

        for trade in history
            .into_iter()
            .filter(|t| t.symbol == symbol && t.label == label)
        {
            if trade.net_profit > 0.0 {
                wins += 1;
                total_wins += trade.net_profit;
            } else {
                losses += 1;
                total_losses += trade.net_profit;
            }
        }

        let total_trades = wins + losses;
        if total_trades == 0 {
            return StatsSnapshot::default();
        }

        let win_fraction = wins as f64 / total_trades as f64;
        let avg_win = if wins > 0 {
            total_wins / wins as f64
        } else {
            0.0
        };
        let avg_loss = if losses > 0 {
            (total_losses / losses as f64).abs()
        } else {
            0.0
        };

        StatsSnapshot {
            total_trades,
            wins,
            losses,
            win_rate: win_fraction * 100.0,
            avg_win,
            avg_loss,
            expected_value: win_fraction * avg_win - (1.0 - win_fraction) * avg_loss,
        }
    }
}

/// Keeps the latest snapshot for one symbol/label pair.
///
/// Every update rescans the full history it is given.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeStatsTracker {
    symbol: String,
    label: String,
    latest: StatsSnapshot,
}

impl TradeStatsTracker {
    pub fn new(symbol: &str, label: &str) -> Self {
        TradeStatsTracker {
            symbol: symbol.to_string(),
            label: label.to_string(),
            latest: StatsSnapshot::default(),
        }
    }

    pub fn update<'a, I>(&mut self, history: I) -> StatsSnapshot
    where
        I: IntoIterator<Item = &'a TradeRecord>,
    {
        self.latest = StatsSnapshot::compute(history, &self.symbol, &self.label);
        self.latest
    }

    pub fn latest(&self) -> StatsSnapshot {
        self.latest
    }
}
