use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::TradeError;
use crate::types::{decimal_field, OrderSide};

/// Point-in-time view of an order.
///
/// Returned by [`TradeApi::place_order`](super::TradeApi::place_order) and
/// [`TradeApi::get_order_status`](super::TradeApi::get_order_status). A newer
/// view supersedes this one; nothing here is ever updated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    order_id: u64,
    status: Option<String>,
    pair: String,
    side: OrderSide,
    rate: Decimal,
    amount: Decimal,
    initial_rate: Decimal,
    initial_amount: Decimal,
    placed_at: Option<DateTime<Utc>>,
}

impl OrderItem {
    /// Hydrates from a `getorder` envelope. `order` must be an object.
    pub fn from_response(order_id: u64, info: &Map<String, Value>) -> Result<Self, TradeError> {
        let order = match info.get("order") {
            Some(Value::Object(order)) => order,
            Some(other) => {
                return Err(TradeError::malformed(format!(
                    "`order` is not an object: {}",
                    other
                )))
            }
            None => return Err(TradeError::malformed("missing field `order`")),
        };

        let status = match order.get("status") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                return Err(TradeError::malformed("missing field `status`"))
            }
            Some(other) => other.to_string(),
        };
        let pair = order
            .get("pair")
            .and_then(Value::as_str)
            .ok_or_else(|| TradeError::malformed("missing field `pair`"))?
            .to_string();
        let side = order
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| TradeError::malformed("missing field `type`"))?
            .parse::<OrderSide>()
            .map_err(|e| TradeError::malformed(e.to_string()))?;

        Ok(Self {
            order_id,
            status: Some(status),
            pair,
            side,
            rate: decimal_field(order, "rate")?,
            amount: decimal_field(order, "amount")?,
            initial_rate: decimal_field(order, "initial_rate")?,
            initial_amount: decimal_field(order, "initial_amount")?,
            placed_at: None,
        })
    }

    /// A just-placed order the server has not yet reported on.
    pub fn placed(
        order_id: u64,
        pair: impl Into<String>,
        side: OrderSide,
        rate: Decimal,
        amount: Decimal,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            status: None,
            pair: pair.into(),
            side,
            rate,
            amount,
            initial_rate: rate,
            initial_amount: amount,
            placed_at: Some(placed_at),
        }
    }

    pub fn order_id(&self) -> u64 {
        self.order_id
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn initial_rate(&self) -> Decimal {
        self.initial_rate
    }

    pub fn initial_amount(&self) -> Decimal {
        self.initial_amount
    }

    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.placed_at
    }
}

/// An order given either by id or by a previously returned entity.
#[derive(Debug, Clone, Copy)]
pub enum OrderRef<'a> {
    ById(u64),
    ByEntity(&'a OrderItem),
}

impl OrderRef<'_> {
    pub fn order_id(&self) -> u64 {
        match self {
            OrderRef::ById(id) => *id,
            OrderRef::ByEntity(order) => order.order_id,
        }
    }
}

impl From<u64> for OrderRef<'_> {
    fn from(id: u64) -> Self {
        OrderRef::ById(id)
    }
}

impl<'a> From<&'a OrderItem> for OrderRef<'a> {
    fn from(order: &'a OrderItem) -> Self {
        OrderRef::ByEntity(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(order: Value) -> Map<String, Value> {
        json!({"result": "true", "order": order})
            .as_object()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_from_response() {
        let info = envelope(json!({
            "id": "15088",
            "status": "cancelled",
            "pair": "btc_cny",
            "type": "sell",
            "rate": "811.00",
            "amount": "0.39901357",
            "initial_rate": 811,
            "initial_amount": "1"
        }));

        let order = OrderItem::from_response(15088, &info).unwrap();
        assert_eq!(order.order_id(), 15088);
        assert_eq!(order.status(), Some("cancelled"));
        assert_eq!(order.pair(), "btc_cny");
        assert_eq!(order.side(), OrderSide::Sell);
        assert_eq!(order.rate(), Decimal::new(81100, 2));
        assert_eq!(order.amount(), Decimal::new(39901357, 8));
        assert_eq!(order.initial_rate(), Decimal::new(811, 0));
        assert_eq!(order.initial_amount(), Decimal::ONE);
        assert_eq!(order.placed_at(), None);
    }

    #[test]
    fn test_numeric_fields_keep_every_digit() {
        let text = r#"{
            "result": true,
            "order": {
                "status": "open",
                "pair": "ltc_btc",
                "type": "buy",
                "rate": 0.12345678901234567891,
                "amount": 12345678.123456789012,
                "initial_rate": 0.12345678901234567891,
                "initial_amount": 12345678.123456789012
            }
        }"#;
        let info: Map<String, Value> = serde_json::from_str(text).unwrap();

        let order = OrderItem::from_response(3, &info).unwrap();
        assert_eq!(order.rate().to_string(), "0.12345678901234567891");
        assert_eq!(order.amount().to_string(), "12345678.123456789012");
        assert_eq!(order.initial_rate(), order.rate());
    }

    #[test]
    fn test_non_object_order_is_malformed() {
        for bad in [json!("open"), json!([1, 2, 3]), json!(null)] {
            let info = envelope(bad);
            assert!(matches!(
                OrderItem::from_response(1, &info),
                Err(TradeError::MalformedResponse(_))
            ));
        }
        let missing = json!({"result": true}).as_object().unwrap().clone();
        assert!(OrderItem::from_response(1, &missing).is_err());
    }

    #[test]
    fn test_missing_decimal_is_malformed() {
        let info = envelope(json!({
            "status": "open",
            "pair": "btc_cny",
            "type": "buy",
            "rate": "100",
            "amount": "2",
            "initial_rate": "100"
        }));
        assert!(matches!(
            OrderItem::from_response(1, &info),
            Err(TradeError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_placed() {
        let now = Utc::now();
        let rate = Decimal::new(100, 0);
        let amount = Decimal::new(2, 0);
        let order = OrderItem::placed(9, "btc_cny", OrderSide::Buy, rate, amount, now);
        assert_eq!(order.status(), None);
        assert_eq!(order.initial_rate(), order.rate());
        assert_eq!(order.initial_amount(), order.amount());
        assert_eq!(order.placed_at(), Some(now));
    }

    #[test]
    fn test_order_ref() {
        let one = Decimal::ONE;
        let order = OrderItem::placed(5, "btc_cny", OrderSide::Sell, one, one, Utc::now());
        assert_eq!(OrderRef::from(5u64).order_id(), 5);
        assert_eq!(OrderRef::from(&order).order_id(), 5);
    }
}
