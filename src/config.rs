use dotenv::dotenv;
use std::env;
use std::time::Duration;

use crate::exchange::bter::API_BASE_URL;
use crate::exchange::PairTable;

pub struct Config {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub timeout: Duration,
    pub currencies: Vec<String>,
}

impl Config {
    /// Reads `BTER_*` variables, after loading `.env` if present.
    pub fn new() -> Self {
        dotenv().ok();

        let timeout_secs = env::var("BTER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let currencies = env::var("BTER_CURRENCIES")
            .ok()
            .map(|list| parse_currency_list(&list))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| PairTable::bter().currencies());

        Self {
            api_key: env::var("BTER_API_KEY").unwrap_or_default(),
            api_secret: env::var("BTER_API_SECRET").unwrap_or_default(),
            base_url: env::var("BTER_API_URL").unwrap_or_else(|_| API_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            currencies,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_currency_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_currency_list() {
        assert_eq!(parse_currency_list("BTC, usd,,Ltc "), vec!["btc", "usd", "ltc"]);
        assert!(parse_currency_list(" , ").is_empty());
    }
}
