pub mod order;

use log::info;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::error::TradeError;
use crate::exchange::signing::Params;
use crate::exchange::{
    IncreasingNonce, NonceProvider, PairRules, PairTable, SecretStore, SignedClient, Transport,
};
use crate::types::{
    decimal_from_value, order_id_from_value, Balance, Balances, OrderSide, PriceKind,
};

pub use order::{OrderItem, OrderRef};

/// Error text the exchange returns when an order filled before it could be cancelled.
pub const ALREADY_FILLED_ERROR: &str =
    "Error: Your order got bought up before you were able to cancel";

/// Client for the private trading endpoints, bound to one API key.
pub struct TradeApi {
    signer: SignedClient,
    rules: Arc<dyn PairRules>,
    currencies: Vec<String>,
}

impl TradeApi {
    /// Looks up the secret for `key` once and binds the client to it.
    ///
    /// The supported currency set defaults to the currencies of
    /// [`PairTable::bter`]; override it with [`TradeApi::with_currencies`].
    pub fn new(
        key: impl Into<String>,
        keys: &dyn SecretStore,
        transport: Arc<dyn Transport>,
        rules: Arc<dyn PairRules>,
    ) -> Result<Self, TradeError> {
        let key = key.into();
        let secret = keys.get_secret(&key)?;

        Ok(Self {
            signer: SignedClient::new(key, secret, Arc::new(IncreasingNonce::new()), transport),
            rules,
            currencies: PairTable::bter().currencies(),
        })
    }

    pub fn with_currencies<I, S>(mut self, currencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.currencies = currencies
            .into_iter()
            .map(|c| c.as_ref().to_lowercase())
            .collect();
        self
    }

    /// Shares a nonce source, e.g. between several clients using the same key.
    pub fn with_nonce(mut self, nonce: Arc<dyn NonceProvider>) -> Self {
        self.signer.set_nonce(nonce);
        self
    }

    pub fn key(&self) -> &str {
        self.signer.key()
    }

    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    /// Available and locked balances, with every supported currency present.
    pub async fn get_funds(&self) -> Result<Balances, TradeError> {
        let info = self.signer.post("getfunds", Params::new(), &[]).await?;

        let mut balances: Balances = self
            .currencies
            .iter()
            .map(|c| (c.clone(), Balance::default()))
            .collect();

        for (currency, value) in funds_map(&info, "available_funds")? {
            balances.entry(currency.to_lowercase()).or_default().available =
                funds_amount(currency, value)?;
        }
        for (currency, value) in funds_map(&info, "locked_funds")? {
            balances.entry(currency.to_lowercase()).or_default().locked =
                funds_amount(currency, value)?;
        }

        Ok(balances)
    }

    pub async fn get_order_status<'a>(
        &self,
        order: impl Into<OrderRef<'a>>,
    ) -> Result<OrderItem, TradeError> {
        let order_id = order.into().order_id();
        let mut params = Params::new();
        params.insert("order_id".to_string(), order_id.to_string());

        let info = self.signer.post("getorder", params, &[]).await?;
        OrderItem::from_response(order_id, &info)
    }

    /// Places a limit order.
    ///
    /// `trade_type` accepts `buy`/`sell` in any case and the `bid`/`ask`
    /// aliases. With `update_delay` set, waits that long and returns the result
    /// of a single status query instead of the local placeholder.
    pub async fn place_order(
        &self,
        pair: &str,
        trade_type: &str,
        rate: Decimal,
        amount: Decimal,
        update_delay: Option<Duration>,
    ) -> Result<OrderItem, TradeError> {
        self.rules.validate_pair(pair)?;
        let side = OrderSide::from_str(trade_type)?;

        let rate_text = self.rules.format_amount(rate, pair, PriceKind::Price)?;
        let amount_text = self.rules.format_amount(amount, pair, PriceKind::Amount)?;
        let placed_rate = formatted_decimal(&rate_text)?;
        let placed_amount = formatted_decimal(&amount_text)?;

        let mut params = Params::new();
        params.insert("pair".to_string(), pair.to_string());
        params.insert("type".to_string(), side.as_wire().to_string());
        params.insert("rate".to_string(), rate_text);
        params.insert("amount".to_string(), amount_text);

        let info = self.signer.post("placeorder", params, &[]).await?;
        let order_id = order_id_from_value(info.get("order_id"))?;
        info!(
            "placed {} order {} on {}: {} @ {}",
            side, order_id, pair, placed_amount, placed_rate
        );

        let order = OrderItem::placed(order_id, pair, side, placed_rate, placed_amount, Utc::now());

        match update_delay {
            Some(delay) => {
                tokio::time::sleep(delay).await;
                self.get_order_status(order.order_id()).await
            }
            None => Ok(order),
        }
    }

    /// Cancels an order and returns the exchange's message.
    ///
    /// With `ignore_completed_order_error`, an order that filled before the
    /// cancel arrived yields [`ALREADY_FILLED_ERROR`] as the message instead
    /// of an error.
    pub async fn cancel_order<'a>(
        &self,
        order: impl Into<OrderRef<'a>>,
        ignore_completed_order_error: bool,
    ) -> Result<Option<String>, TradeError> {
        let order_id = order.into().order_id();
        let mut params = Params::new();
        params.insert("order_id".to_string(), order_id.to_string());

        let ignored: &[&str] = if ignore_completed_order_error {
            &[ALREADY_FILLED_ERROR]
        } else {
            &[]
        };
        let info = self.signer.post("cancelorder", params, ignored).await?;

        let message = ["msg", "message"]
            .iter()
            .find_map(|field| info.get(*field))
            .and_then(Value::as_str)
            .map(str::to_string);
        info!("cancel order {}: {}", order_id, message.as_deref().unwrap_or("-"));
        Ok(message)
    }
}

// An absent map counts as empty; the exchange also sends `[]` for an empty one.
fn funds_map<'a>(
    info: &'a Map<String, Value>,
    field: &str,
) -> Result<Box<dyn Iterator<Item = (&'a String, &'a Value)> + 'a>, TradeError> {
    match info.get(field) {
        None | Some(Value::Null) => Ok(Box::new(std::iter::empty())),
        Some(Value::Array(items)) if items.is_empty() => Ok(Box::new(std::iter::empty())),
        Some(Value::Object(map)) => Ok(Box::new(map.iter())),
        Some(other) => Err(TradeError::malformed(format!(
            "`{}` is not an object: {}",
            field, other
        ))),
    }
}

fn funds_amount(currency: &str, value: &Value) -> Result<Decimal, TradeError> {
    decimal_from_value(value).ok_or_else(|| {
        TradeError::malformed(format!("balance for {} is not a decimal: {}", currency, value))
    })
}

fn formatted_decimal(text: &str) -> Result<Decimal, TradeError> {
    Decimal::from_str(text)
        .map_err(|e| TradeError::config(format!("formatter produced {:?}: {}", text, e)))
}
