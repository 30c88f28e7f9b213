//! Trade direction.
//!
//! Every directional decision (TP auto-follow, split level placement, order
//! side and resting-order classification) goes through [`Side::of`].

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Entry above the stop loss is a long scenario, anything else is short.
    pub fn of(entry: f64, stop_loss: f64) -> Side {
        if entry > stop_loss {
            Side::Long
        } else {
            Side::Short
        }
    }

    pub fn is_long(self) -> bool {
        self == Side::Long
    }

    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }

    /// Move `distance` away from `from` in the profitable direction.
    pub fn project(self, from: f64, distance: f64) -> f64 {
        from + self.sign() * distance
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "Buy"),
            Side::Short => write!(f, "Sell"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn entry_above_stop_is_long() {
        assert_eq!(Side::of(1.2000, 1.1950), Side::Long);
    }

    #[test]
    fn entry_below_stop_is_short() {
        assert_eq!(Side::of(1.1950, 1.2000), Side::Short);
    }

    #[test]
    fn equal_prices_fall_to_short() {
        assert_eq!(Side::of(1.2, 1.2), Side::Short);
    }

    #[test]
    fn project_follows_sign() {
        assert_relative_eq!(Side::Long.project(1.2000, 0.0100), 1.2100, epsilon = 1e-12);
        assert_relative_eq!(Side::Short.project(1.2000, 0.0100), 1.1900, epsilon = 1e-12);
    }

    #[test]
    fn display_uses_trade_verbs() {
        assert_eq!(Side::Long.to_string(), "Buy");
        assert_eq!(Side::Short.to_string(), "Sell");
        assert_eq!(Side::Long.opposite(), Side::Short);
    }
}
