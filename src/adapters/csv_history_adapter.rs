//! CSV closed-trade history adapter.
//!
//! Expects a header row with `symbol,label,net_profit` and an optional
//! `closed_at` column in `YYYY-MM-DD` form. The file is re-read on every
//! query so trades appended by the platform are picked up.

use crate::domain::error::AutolotError;
use crate::domain::trade_stats::TradeRecord;
use crate::ports::history_port::HistoryPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvHistoryAdapter {
    path: PathBuf,
}

struct Columns {
    symbol: usize,
    label: usize,
    net_profit: usize,
    closed_at: Option<usize>,
}

impl CsvHistoryAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn columns(headers: &csv::StringRecord) -> Result<Columns, AutolotError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let required = |name: &str| {
            find(name).ok_or_else(|| AutolotError::History {
                reason: format!("missing {name} column"),
            })
        };
        Ok(Columns {
            symbol: required("symbol")?,
            label: required("label")?,
            net_profit: required("net_profit")?,
            closed_at: find("closed_at"),
        })
    }
}

impl HistoryPort for CsvHistoryAdapter {
    fn closed_trades(&self) -> Result<Vec<TradeRecord>, AutolotError> {
        let content = fs::read_to_string(&self.path).map_err(|e| AutolotError::History {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| AutolotError::History {
            reason: format!("CSV header error: {}", e),
        })?;
        let cols = Self::columns(headers)?;

        let mut trades = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| AutolotError::History {
                reason: format!("CSV parse error: {}", e),
            })?;
            let line = row + 2;

            let field = |idx: usize, name: &str| {
                record.get(idx).ok_or_else(|| AutolotError::History {
                    reason: format!("line {line}: missing {name} value"),
                })
            };

            let net_profit: f64 =
                field(cols.net_profit, "net_profit")?
                    .parse()
                    .map_err(|e| AutolotError::History {
                        reason: format!("line {line}: invalid net_profit value: {}", e),
                    })?;

            let closed_at = match cols.closed_at.and_then(|idx| record.get(idx)) {
                Some(s) if !s.is_empty() => Some(
                    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                        AutolotError::History {
                            reason: format!("line {line}: invalid closed_at format: {}", e),
                        }
                    })?,
                ),
                _ => None,
            };

            trades.push(TradeRecord {
                symbol: field(cols.symbol, "symbol")?.to_string(),
                label: field(cols.label, "label")?.to_string(),
                net_profit,
                closed_at,
            });
        }

        Ok(trades)
    }
}
