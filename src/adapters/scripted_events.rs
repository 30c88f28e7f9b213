//! Event source over a text script, one event per line.
//!
//! ```text
//! # comment
//! TICK:1.20010,1.20022
//! MOVE:SL=1.1950,TP=1.2100
//! CLOSED
//! MODE
//! ENTRY:HALF
//! ```
//!
//! Any line that is not `TICK`, `MOVE` or `CLOSED` is parsed as a UI command.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::Path;

use crate::domain::command::UiCommand;
use crate::domain::error::AutolotError;
use crate::domain::event::{Event, SubscriptionId, Topic};
use crate::domain::line_plan::{LineKind, LineMove};
use crate::domain::symbol::Quote;
use crate::ports::event_port::EventSource;

#[derive(Debug, Default)]
pub struct ScriptedEvents {
    queue: VecDeque<Event>,
    subscriptions: BTreeMap<SubscriptionId, Topic>,
    next_id: u64,
}

fn script_error(line_no: usize, line: &str, reason: impl Into<String>) -> AutolotError {
    AutolotError::InvalidCommand {
        message: format!("line {line_no}: {line}"),
        reason: reason.into(),
    }
}

fn parse_price(raw: &str, line_no: usize, line: &str) -> Result<f64, AutolotError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| script_error(line_no, line, format!("'{}' is not a price", raw.trim())))
}

fn parse_line(line_no: usize, line: &str) -> Result<Event, AutolotError> {
    let (name, value) = match line.split_once(':') {
        Some((name, value)) => (name.trim().to_uppercase(), Some(value)),
        None => (line.trim().to_uppercase(), None),
    };

    match (name.as_str(), value) {
        ("TICK", Some(value)) => {
            let (bid, ask) = match value.split_once(',') {
                Some((bid, ask)) => (bid, Some(ask)),
                None => (value, None),
            };
            let bid = parse_price(bid, line_no, line)?;
            let ask = match ask {
                Some(ask) => parse_price(ask, line_no, line)?,
                None => bid,
            };
            Ok(Event::Tick(Quote::new(bid, ask)))
        }
        ("MOVE", Some(value)) => {
            let moves = value
                .split(',')
                .map(|pair| -> Result<LineMove, AutolotError> {
                    let (kind, price) = pair
                        .split_once('=')
                        .ok_or_else(|| script_error(line_no, line, "expected LINE=PRICE"))?;
                    let kind: LineKind = kind
                        .parse()
                        .map_err(|reason: String| script_error(line_no, line, reason))?;
                    Ok(LineMove {
                        kind,
                        price: parse_price(price, line_no, line)?,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Event::LinesMoved(moves))
        }
        ("TICK" | "MOVE", None) => Err(script_error(line_no, line, "missing value")),
        ("CLOSED", None) => Ok(Event::TradeClosed),
        _ => line
            .parse::<UiCommand>()
            .map(Event::Command)
            .map_err(|e| script_error(line_no, line, e.to_string())),
    }
}

impl ScriptedEvents {
    pub fn from_script(script: &str) -> Result<Self, AutolotError> {
        let mut queue = VecDeque::new();
        for (idx, raw) in script.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            queue.push_back(parse_line(idx + 1, line)?);
        }
        Ok(Self {
            queue,
            ..Self::default()
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AutolotError> {
        let script = fs::read_to_string(path)?;
        Self::from_script(&script)
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    fn subscribed(&self, topic: Topic) -> bool {
        self.subscriptions.values().any(|t| *t == topic)
    }
}

impl EventSource for ScriptedEvents {
    fn subscribe(&mut self, topic: Topic) -> Result<SubscriptionId, AutolotError> {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.insert(id, topic);
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), AutolotError> {
        if self.subscriptions.remove(&id).is_none() {
            tracing::warn!(id = id.0, "unsubscribe of unknown subscription");
        }
        Ok(())
    }

    /// Events on topics nobody listens to are dropped.
    fn next_event(&mut self) -> Option<Event> {
        while let Some(event) = self.queue.pop_front() {
            if self.subscribed(event.topic()) {
                return Some(event);
            }
        }
        None
    }
}
