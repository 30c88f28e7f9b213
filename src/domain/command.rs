//! Inbound UI commands, parsed from `CMD[:VALUE]` messages.

use std::str::FromStr;

use super::error::AutolotError;
use super::mode_controller::NudgeDirection;
use super::risk_sizer::EntryFraction;
use super::side::Side;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiCommand {
    ToggleMode,
    ToggleSplit,
    /// Enter with a fraction of the computed size in the current mode.
    Enter(EntryFraction),
    /// Full-size market entry, refused when the lines point the other way.
    MarketEntry(Side),
    Redraw,
    CloseAll,
    SetRisk(f64),
    NudgeStopLoss(NudgeDirection),
    ToggleVisibility,
}

fn invalid(message: &str, reason: impl Into<String>) -> AutolotError {
    AutolotError::InvalidCommand {
        message: message.to_string(),
        reason: reason.into(),
    }
}

impl FromStr for UiCommand {
    type Err = AutolotError;

    fn from_str(message: &str) -> Result<Self, Self::Err> {
        let trimmed = message.trim();
        let (name, value) = match trimmed.split_once(':') {
            Some((name, value)) => (name.trim(), Some(value.trim())),
            None => (trimmed, None),
        };
        let name = name.to_uppercase();

        let no_value = |cmd: UiCommand| match value {
            None => Ok(cmd),
            Some(_) => Err(invalid(message, format!("{name} takes no value"))),
        };

        match name.as_str() {
            "MODE" => no_value(UiCommand::ToggleMode),
            "SPLIT" => no_value(UiCommand::ToggleSplit),
            "BUY" => no_value(UiCommand::MarketEntry(Side::Long)),
            "SELL" => no_value(UiCommand::MarketEntry(Side::Short)),
            "REDRAW" => no_value(UiCommand::Redraw),
            "CLOSE" => no_value(UiCommand::CloseAll),
            "TOGGLE_UI" => no_value(UiCommand::ToggleVisibility),
            "ENTRY" => {
                let fraction = match value.map(str::to_uppercase).as_deref() {
                    Some("FULL") => EntryFraction::Full,
                    Some("HALF") => EntryFraction::Half,
                    Some("THIRD") => EntryFraction::Third,
                    _ => return Err(invalid(message, "expected FULL, HALF or THIRD")),
                };
                Ok(UiCommand::Enter(fraction))
            }
            "RISK" => {
                let raw = value.ok_or_else(|| invalid(message, "missing percentage"))?;
                let pct: f64 = raw
                    .parse()
                    .map_err(|_| invalid(message, format!("'{raw}' is not a number")))?;
                Ok(UiCommand::SetRisk(pct))
            }
            "ADJUST_SL" => match value.map(str::to_uppercase).as_deref() {
                Some("PLUS") => Ok(UiCommand::NudgeStopLoss(NudgeDirection::Widen)),
                Some("MINUS") => Ok(UiCommand::NudgeStopLoss(NudgeDirection::Narrow)),
                _ => Err(invalid(message, "expected PLUS or MINUS")),
            },
            "" => Err(invalid(message, "empty command")),
            other => Err(invalid(message, format!("unknown command {other}"))),
        }
    }
}
