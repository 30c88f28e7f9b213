//! Writes UI pushes as `CMD:VALUE` lines.

use std::io::{self, Write};

use crate::domain::error::AutolotError;
use crate::domain::trade_stats::StatsSnapshot;
use crate::ports::ui_port::{DataPush, UiPort};

pub struct ConsoleUi<W: Write> {
    out: W,
}

impl ConsoleUi<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleUi<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn send(&mut self, cmd: &str, value: &str) -> Result<(), AutolotError> {
        writeln!(self.out, "{cmd}:{value}")?;
        Ok(())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AutolotError> {
    serde_json::to_string(value).map_err(|e| AutolotError::Io(io::Error::other(e)))
}

#[derive(serde::Serialize)]
struct StatsPush {
    win_rate: f64,
    ev: f64,
    trades: usize,
}

impl<W: Write> UiPort for ConsoleUi<W> {
    fn push_price(&mut self, price: &str) -> Result<(), AutolotError> {
        self.send("PRICE", price)
    }

    fn push_data(&mut self, data: &DataPush) -> Result<(), AutolotError> {
        let json = to_json(data)?;
        self.send("DATA", &json)
    }

    fn push_stats(&mut self, stats: &StatsSnapshot) -> Result<(), AutolotError> {
        let json = to_json(&StatsPush {
            win_rate: stats.win_rate,
            ev: stats.expected_value,
            trades: stats.total_trades,
        })?;
        self.send("STATS", &json)
    }

    fn alert(&mut self, message: &str) -> Result<(), AutolotError> {
        self.send("ALERT", message)
    }
}
