//! Fixed account and symbol metadata, typically read from the config file.

use crate::domain::config_validation::{optional_number, required_number};
use crate::domain::error::AutolotError;
use crate::domain::symbol::{AccountSnapshot, Quote, SymbolSpec};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_port::MarketPort;

#[derive(Debug, Clone, PartialEq)]
pub struct StaticMarket {
    pub account: AccountSnapshot,
    pub symbol: SymbolSpec,
    pub volatility: Option<f64>,
    pub quote: Quote,
}

pub fn build_symbol_spec(config: &dyn ConfigPort) -> Result<SymbolSpec, AutolotError> {
    let name = config
        .get_text("symbol", "name")
        .ok_or_else(|| AutolotError::ConfigMissing {
            section: "symbol".into(),
            key: "name".into(),
        })?;

    Ok(SymbolSpec {
        name,
        pip_size: required_number(config, "symbol", "pip_size")?,
        tick_size: required_number(config, "symbol", "tick_size")?,
        tick_value: required_number(config, "symbol", "tick_value")?,
        lot_size: required_number(config, "symbol", "lot_size")?,
        volume_step: required_number(config, "symbol", "volume_step")?,
        volume_min: required_number(config, "symbol", "volume_min")?,
        digits: config.get_int("symbol", "digits", 5).clamp(0, 10) as usize,
    })
}

pub fn build_account(config: &dyn ConfigPort) -> Result<AccountSnapshot, AutolotError> {
    Ok(AccountSnapshot {
        balance: required_number(config, "account", "balance")?,
        asset: config
            .get_text("account", "asset")
            .unwrap_or_else(|| "USD".to_string()),
    })
}

impl StaticMarket {
    /// Without a configured bid the quote sits at zero until the first tick.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, AutolotError> {
        let bid = optional_number(config, "market", "bid")?.unwrap_or(0.0);
        let ask = optional_number(config, "market", "ask")?.unwrap_or(bid);

        Ok(Self {
            account: build_account(config)?,
            symbol: build_symbol_spec(config)?,
            volatility: optional_number(config, "market", "volatility")?,
            quote: Quote::new(bid, ask),
        })
    }
}

impl MarketPort for StaticMarket {
    fn account(&self) -> Result<AccountSnapshot, AutolotError> {
        Ok(self.account.clone())
    }

    fn symbol(&self) -> Result<SymbolSpec, AutolotError> {
        Ok(self.symbol.clone())
    }

    fn volatility(&self) -> Option<f64> {
        self.volatility
    }

    fn quote(&self) -> Result<Quote, AutolotError> {
        Ok(self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const CONFIG: &str = r#"
[symbol]
name = EURUSD
pip_size = 0.0001
tick_size = 0.00001
tick_value = 0.1
lot_size = 100000
volume_step = 1000
volume_min = 1000

[account]
balance = 5000

[market]
bid = 1.08500
ask = 1.08512
volatility = 0.0011
"#;

    #[test]
    fn builds_from_config() {
        let config = FileConfigAdapter::from_string(CONFIG).unwrap();
        let market = StaticMarket::from_config(&config).unwrap();

        assert_eq!(market.symbol.name, "EURUSD");
        assert_eq!(market.symbol.digits, 5);
        assert_eq!(market.symbol.volume_step, 1000.0);
        assert_eq!(market.account.balance, 5000.0);
        assert_eq!(market.account.asset, "USD");
        assert_eq!(market.volatility(), Some(0.0011));
        assert_eq!(market.quote().unwrap(), Quote::new(1.085, 1.08512));
    }

    #[test]
    fn ask_defaults_to_bid() {
        let config =
            FileConfigAdapter::from_string(&CONFIG.replace("ask = 1.08512\n", "")).unwrap();
        let market = StaticMarket::from_config(&config).unwrap();
        assert_eq!(market.quote.ask, market.quote.bid);
    }

    #[test]
    fn missing_symbol_field_is_reported() {
        let config =
            FileConfigAdapter::from_string(&CONFIG.replace("lot_size = 100000\n", "")).unwrap();
        let err = StaticMarket::from_config(&config).unwrap_err();
        assert!(matches!(err, AutolotError::ConfigMissing { key, .. } if key == "lot_size"));
    }
}
