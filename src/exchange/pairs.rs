use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{BTreeMap, BTreeSet};

use super::PairRules;
use crate::error::TradeError;
use crate::types::PriceKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairConfig {
    pub pair: String,
    pub base_currency: String,  // e.g. "btc"
    pub quote_currency: String, // e.g. "cny"
    pub price_precision: u32,
    pub amount_precision: u32,
}

impl PairConfig {
    /// Builds a config from a `base_quote` pair name.
    pub fn new(
        pair: &str,
        price_precision: u32,
        amount_precision: u32,
    ) -> Result<Self, TradeError> {
        let pair = pair.to_ascii_lowercase();
        let (base, quote) = pair
            .split_once('_')
            .filter(|(b, q)| !b.is_empty() && !q.is_empty())
            .ok_or_else(|| {
                TradeError::config(format!("pair {:?} is not of the form base_quote", pair))
            })?;

        Ok(Self {
            base_currency: base.to_string(),
            quote_currency: quote.to_string(),
            pair,
            price_precision,
            amount_precision,
        })
    }

    pub fn precision(&self, kind: PriceKind) -> u32 {
        match kind {
            PriceKind::Price => self.price_precision,
            PriceKind::Amount => self.amount_precision,
        }
    }
}

/// Table of tradable pairs and their decimal precision.
#[derive(Debug, Clone, Default)]
pub struct PairTable {
    pairs: BTreeMap<String, PairConfig>,
}

impl PairTable {
    pub fn new(configs: impl IntoIterator<Item = PairConfig>) -> Self {
        Self {
            pairs: configs.into_iter().map(|c| (c.pair.clone(), c)).collect(),
        }
    }

    /// The exchange's classic pairs.
    pub fn bter() -> Self {
        const PAIRS: &[(&str, u32, u32)] = &[
            ("btc_cny", 2, 4),
            ("ltc_cny", 2, 4),
            ("ltc_btc", 6, 4),
            ("nmc_btc", 6, 4),
            ("ppc_btc", 6, 4),
            ("ppc_cny", 3, 4),
            ("ftc_btc", 8, 3),
            ("ftc_cny", 4, 3),
            ("xpm_btc", 6, 4),
            ("trc_btc", 8, 3),
            ("qrk_btc", 8, 3),
            ("wdc_btc", 8, 3),
            ("yac_cny", 5, 2),
        ];

        Self {
            pairs: PAIRS
                .iter()
                .map(|&(pair, price, amount)| {
                    let (base, quote) = pair.split_once('_').unwrap_or((pair, ""));
                    let config = PairConfig {
                        pair: pair.to_string(),
                        base_currency: base.to_string(),
                        quote_currency: quote.to_string(),
                        price_precision: price,
                        amount_precision: amount,
                    };
                    (config.pair.clone(), config)
                })
                .collect(),
        }
    }

    pub fn get(&self, pair: &str) -> Option<&PairConfig> {
        self.pairs.get(pair)
    }

    /// Every base and quote currency in the table, sorted.
    pub fn currencies(&self) -> Vec<String> {
        self.pairs
            .values()
            .flat_map(|c| [c.base_currency.clone(), c.quote_currency.clone()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl PairRules for PairTable {
    fn validate_pair(&self, pair: &str) -> Result<(), TradeError> {
        if self.pairs.contains_key(pair) {
            Ok(())
        } else {
            Err(TradeError::config(format!("Unrecognized pair: {:?}", pair)))
        }
    }

    fn format_amount(
        &self,
        value: Decimal,
        pair: &str,
        kind: PriceKind,
    ) -> Result<String, TradeError> {
        let config = self
            .get(pair)
            .ok_or_else(|| TradeError::config(format!("Unrecognized pair: {:?}", pair)))?;
        if value.is_sign_negative() && !value.is_zero() {
            return Err(TradeError::config(format!("negative {:?} for {}: {}", kind, pair, value)));
        }

        let digits = config.precision(kind);
        let mut truncated = value.round_dp_with_strategy(digits, RoundingStrategy::ToZero);
        truncated.rescale(digits);
        Ok(truncated.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_validate_pair() {
        let table = PairTable::bter();
        assert!(table.validate_pair("btc_cny").is_ok());
        assert!(matches!(
            table.validate_pair("doge_usd"),
            Err(TradeError::Configuration(_))
        ));
    }

    #[test]
    fn test_format_uses_field_precision() {
        let table = PairTable::bter();
        assert_eq!(table.format_amount(dec("100"), "btc_cny", PriceKind::Price).unwrap(), "100.00");
        assert_eq!(table.format_amount(dec("2"), "btc_cny", PriceKind::Amount).unwrap(), "2.0000");
        assert_eq!(
            table.format_amount(dec("0.123456789"), "ltc_btc", PriceKind::Price).unwrap(),
            "0.123456"
        );
    }

    #[test]
    fn test_format_truncates() {
        let table = PairTable::bter();
        assert_eq!(table.format_amount(dec("1.999"), "btc_cny", PriceKind::Price).unwrap(), "1.99");
    }

    #[test]
    fn test_format_rejects_negative_and_unknown() {
        let table = PairTable::bter();
        assert!(table.format_amount(dec("-1"), "btc_cny", PriceKind::Amount).is_err());
        assert!(table.format_amount(dec("1"), "abc_xyz", PriceKind::Amount).is_err());
    }

    #[test]
    fn test_pair_config_new() {
        let config = PairConfig::new("BTC_USD", 2, 3).unwrap();
        assert_eq!(config.pair, "btc_usd");
        assert_eq!(config.base_currency, "btc");
        assert_eq!(config.quote_currency, "usd");
        assert!(PairConfig::new("btcusd", 2, 3).is_err());
    }

    #[test]
    fn test_currencies() {
        let table = PairTable::new(vec![
            PairConfig::new("btc_usd", 2, 4).unwrap(),
            PairConfig::new("ltc_btc", 6, 4).unwrap(),
        ]);
        assert_eq!(table.currencies(), vec!["btc", "ltc", "usd"]);
    }
}
