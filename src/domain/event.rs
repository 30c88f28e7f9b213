//! Notifications delivered to a running session.

use super::command::UiCommand;
use super::line_plan::LineMove;
use super::symbol::Quote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    Tick,
    LinesMoved,
    TradeClosed,
    UiCommand,
}

impl Topic {
    pub const ALL: [Topic; 4] = [
        Topic::Tick,
        Topic::LinesMoved,
        Topic::TradeClosed,
        Topic::UiCommand,
    ];
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Tick(Quote),
    LinesMoved(Vec<LineMove>),
    TradeClosed,
    Command(UiCommand),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Tick(_) => Topic::Tick,
            Event::LinesMoved(_) => Topic::LinesMoved,
            Event::TradeClosed => Topic::TradeClosed,
            Event::Command(_) => Topic::UiCommand,
        }
    }
}

/// Handle returned by a subscription, released exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);
