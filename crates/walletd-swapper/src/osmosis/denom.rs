//! Ticker to Osmosis denomination mapping

use super::constants::{IBC_ATOM_DENOM, IBC_USDC_DENOM, OSMO_DENOM};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Denominations of the tickers the venue trades, as they exist on Osmosis
#[derive(Debug, Clone)]
pub struct SymbolDenomMapping {
    by_symbol: HashMap<&'static str, &'static str>,
}

impl SymbolDenomMapping {
    fn build() -> Self {
        let by_symbol = [
            ("ATOM", IBC_ATOM_DENOM),
            ("OSMO", OSMO_DENOM),
            ("USDC", IBC_USDC_DENOM),
        ]
        .into_iter()
        .collect();
        Self { by_symbol }
    }

    /// Denomination for a ticker; tickers are matched case-sensitively
    pub fn denom(&self, symbol: &str) -> Option<&'static str> {
        self.by_symbol.get(symbol).copied()
    }

    /// Ticker for a denomination
    pub fn symbol(&self, denom: &str) -> Option<&'static str> {
        self.by_symbol
            .iter()
            .find_map(|(symbol, d)| (*d == denom).then_some(*symbol))
    }
}

static SYMBOL_DENOMS: Lazy<SymbolDenomMapping> = Lazy::new(SymbolDenomMapping::build);

/// Process-wide mapping
pub fn symbol_denom_mapping() -> &'static SymbolDenomMapping {
    &SYMBOL_DENOMS
}

/// Shorthand for `symbol_denom_mapping().denom(symbol)`
pub fn denom_for_symbol(symbol: &str) -> Option<&'static str> {
    symbol_denom_mapping().denom(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbols() {
        assert_eq!(denom_for_symbol("OSMO"), Some("uosmo"));
        assert_eq!(denom_for_symbol("ATOM"), Some(IBC_ATOM_DENOM));
        assert_eq!(denom_for_symbol("USDC"), Some(IBC_USDC_DENOM));
    }

    #[test]
    fn test_unknown_symbol() {
        assert_eq!(denom_for_symbol("BTC"), None);
        assert_eq!(denom_for_symbol("atom"), None);
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(symbol_denom_mapping().symbol("uosmo"), Some("OSMO"));
        assert_eq!(symbol_denom_mapping().symbol("uatom"), None);
    }
}
