use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TradeError;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl OrderSide {
    /// Wire form sent in the `type` parameter.
    pub fn as_wire(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `buy`/`sell` in any case, plus the `bid`/`ask` aliases.
impl FromStr for OrderSide {
    type Err = TradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" | "bid" => Ok(OrderSide::Buy),
            "sell" | "ask" => Ok(OrderSide::Sell),
            _ => Err(TradeError::config(format!("Unrecognized trade type: {:?}", s))),
        }
    }
}

/// Which precision rule a formatted value follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceKind {
    Price,
    Amount,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balance {
    pub available: Decimal,
    pub locked: Decimal,
}

/// Lowercase currency code to balance.
pub type Balances = BTreeMap<String, Balance>;

/// Parses a decimal out of a JSON string or number without going through `f64`.
pub(crate) fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

pub(crate) fn decimal_field(obj: &Map<String, Value>, field: &str) -> Result<Decimal, TradeError> {
    let value = obj
        .get(field)
        .ok_or_else(|| TradeError::malformed(format!("missing field `{}`", field)))?;
    decimal_from_value(value).ok_or_else(|| {
        TradeError::malformed(format!("field `{}` is not a decimal: {}", field, value))
    })
}

/// Order ids arrive either as JSON numbers or numeric strings.
pub(crate) fn order_id_from_value(value: Option<&Value>) -> Result<u64, TradeError> {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| TradeError::malformed(format!("order id is not an integer: {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| TradeError::malformed(format!("order id is not an integer: {:?}", s))),
        Some(other) => Err(TradeError::malformed(format!(
            "order id has unexpected type: {}",
            other
        ))),
        None => Err(TradeError::malformed("missing field `order_id`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_side_aliases() {
        assert_eq!("bid".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("ASK".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert_eq!("Buy".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("sell".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert!(matches!(
            "hold".parse::<OrderSide>(),
            Err(TradeError::Configuration(_))
        ));
    }

    #[test]
    fn test_decimal_from_value() {
        assert_eq!(decimal_from_value(&json!("1.50")), Some(Decimal::new(150, 2)));
        assert_eq!(decimal_from_value(&json!(2)), Some(Decimal::new(2, 0)));
        assert_eq!(decimal_from_value(&json!(0.1)), Some(Decimal::new(1, 1)));
        assert_eq!(decimal_from_value(&json!("abc")), None);
        let parsed: Value = serde_json::from_str("98765.4321098765432109").unwrap();
        assert_eq!(
            decimal_from_value(&parsed).map(|d| d.to_string()).as_deref(),
            Some("98765.4321098765432109")
        );
        assert_eq!(decimal_from_value(&json!(null)), None);
    }

    #[test]
    fn test_order_id_from_value() {
        assert_eq!(order_id_from_value(Some(&json!(42))).unwrap(), 42);
        assert_eq!(order_id_from_value(Some(&json!("17"))).unwrap(), 17);
        assert!(order_id_from_value(Some(&json!(-3))).is_err());
        assert!(order_id_from_value(Some(&json!([1]))).is_err());
        assert!(order_id_from_value(None).is_err());
    }
}
