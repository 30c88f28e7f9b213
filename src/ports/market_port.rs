//! Account and symbol metadata port trait.

use crate::domain::error::AutolotError;
use crate::domain::symbol::{AccountSnapshot, Quote, SymbolSpec};

pub trait MarketPort {
    fn account(&self) -> Result<AccountSnapshot, AutolotError>;

    fn symbol(&self) -> Result<SymbolSpec, AutolotError>;

    /// Latest reading of the platform's volatility measure, if it has one.
    fn volatility(&self) -> Option<f64>;

    /// Quote used before the first tick arrives.
    fn quote(&self) -> Result<Quote, AutolotError>;
}
