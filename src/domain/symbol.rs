//! Symbol metadata, account snapshot and quotes supplied by the platform.

/// Tolerance applied before flooring so that `0.3 / 0.1` counts as three steps.
const STEP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSpec {
    pub name: String,
    pub pip_size: f64,
    pub tick_size: f64,
    pub tick_value: f64,
    pub lot_size: f64,
    pub volume_step: f64,
    pub volume_min: f64,
    pub digits: usize,
}

impl SymbolSpec {
    /// Floor a raw unit volume to the nearest multiple of `volume_step`.
    pub fn normalize_volume_down(&self, units: f64) -> f64 {
        if !units.is_finite() || units <= 0.0 {
            return 0.0;
        }
        if self.volume_step <= 0.0 {
            return units;
        }
        let steps = (units / self.volume_step + STEP_EPSILON).floor();
        steps * self.volume_step
    }

    /// Floor to the volume step and reject anything below `volume_min`.
    ///
    /// Returns 0 for an unexecutable size rather than a sub-minimum order.
    pub fn executable_volume(&self, units: f64) -> f64 {
        let normalized = self.normalize_volume_down(units);
        if normalized < self.volume_min {
            0.0
        } else {
            normalized
        }
    }

    pub fn to_lots(&self, units: f64) -> f64 {
        if self.lot_size > 0.0 {
            units / self.lot_size
        } else {
            units
        }
    }

    pub fn to_pips(&self, distance: f64) -> f64 {
        if self.pip_size > 0.0 {
            distance / self.pip_size
        } else {
            0.0
        }
    }

    pub fn format_price(&self, price: f64) -> String {
        format!("{:.*}", self.digits, price)
    }

    /// Decimals needed to show one volume step in lots.
    pub fn lot_decimals(&self) -> usize {
        let step = self.to_lots(self.volume_step);
        if !(step > 0.0) || !step.is_finite() {
            return 2;
        }
        let mut scaled = step;
        let mut decimals = 0;
        while decimals < 8 && (scaled - scaled.round()).abs() > 1e-9 * scaled.max(1.0) {
            scaled *= 10.0;
            decimals += 1;
        }
        decimals
    }

    pub fn format_lots(&self, units: f64) -> String {
        format!("{:.*}", self.lot_decimals(), self.to_lots(units))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    pub balance: f64,
    pub asset: String,
}

/// Current best bid/ask pushed by the price feed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
}

impl Quote {
    pub fn new(bid: f64, ask: f64) -> Self {
        Quote { bid, ask }
    }

    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn eurusd() -> SymbolSpec {
        SymbolSpec {
            name: "EURUSD".into(),
            pip_size: 0.0001,
            tick_size: 0.00001,
            tick_value: 1.0,
            lot_size: 100_000.0,
            volume_step: 1000.0,
            volume_min: 1000.0,
            digits: 5,
        }
    }

    #[test]
    fn normalize_floors_to_step() {
        let spec = eurusd();
        assert_relative_eq!(spec.normalize_volume_down(12_999.0), 12_000.0);
        assert_relative_eq!(spec.normalize_volume_down(13_000.0), 13_000.0);
    }

    #[test]
    fn normalize_tolerates_float_noise() {
        let mut spec = eurusd();
        spec.volume_step = 0.1;
        assert_relative_eq!(spec.normalize_volume_down(0.3), 0.30000000000000004);
    }

    #[test]
    fn lots_shown_at_step_precision() {
        let mut spec = eurusd();
        assert_eq!(spec.lot_decimals(), 2);
        assert_eq!(spec.format_lots(13_000.0), "0.13");

        spec.volume_step = 1.0;
        assert_eq!(spec.lot_decimals(), 5);
        assert_eq!(spec.format_lots(20.0), "0.00020");

        spec.lot_size = 1.0;
        spec.volume_step = 0.01;
        assert_eq!(spec.format_lots(0.08), "0.08");
    }

    #[test]
    fn normalize_rejects_non_finite() {
        let spec = eurusd();
        assert_eq!(spec.normalize_volume_down(f64::NAN), 0.0);
        assert_eq!(spec.normalize_volume_down(f64::INFINITY), 0.0);
        assert_eq!(spec.normalize_volume_down(-5.0), 0.0);
    }

    #[test]
    fn executable_volume_drops_sub_minimum() {
        let spec = eurusd();
        assert_eq!(spec.executable_volume(999.0), 0.0);
        assert_relative_eq!(spec.executable_volume(1500.0), 1000.0);
    }

    #[test]
    fn lots_and_pips() {
        let spec = eurusd();
        assert_relative_eq!(spec.to_lots(20_000.0), 0.2);
        assert_relative_eq!(spec.to_pips(0.0050), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn price_formats_to_digits() {
        let spec = eurusd();
        assert_eq!(spec.format_price(1.2), "1.20000");
    }

    #[test]
    fn quote_spread() {
        let q = Quote::new(1.2000, 1.2002);
        assert_relative_eq!(q.spread(), 0.0002, epsilon = 1e-12);
    }
}
