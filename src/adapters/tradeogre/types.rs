//! TradeOgre API payloads

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::ports::{Balance, Balances, PricePoint, SENTINEL_KEY};

/// `GET /ticker/{market}`
#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    pub price: Decimal,
    #[serde(default)]
    pub initialprice: Option<Decimal>,
    #[serde(default)]
    pub high: Option<Decimal>,
    #[serde(default)]
    pub low: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<Decimal>,
    #[serde(default)]
    pub bid: Option<Decimal>,
    #[serde(default)]
    pub ask: Option<Decimal>,
}

/// One element of `GET /history/{market}`
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    /// Unix seconds
    pub date: i64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub quantity: Option<Decimal>,
}

impl From<HistoryEntry> for PricePoint {
    fn from(entry: HistoryEntry) -> Self {
        PricePoint::new(entry.date, entry.price)
    }
}

/// `POST /order/buy|sell` success body
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub bnewbalavail: Option<String>,
    #[serde(default)]
    pub snewbalavail: Option<String>,
}

/// Error message carried by a `{"success": false, ...}` body, if any
pub fn rejection(value: &Value) -> Option<String> {
    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request unsuccessful");
        return Some(message.to_string());
    }
    None
}

/// Parse a balances payload.
///
/// Accepts both `{"success":true,"balances":{"TRX":"1.0"}}` and a flat
/// mapping of currency -> `{"balance":..,"available":..}` that carries the
/// `success` flag as a sibling key.
pub fn parse_balances(value: &Value) -> Result<Balances, String> {
    let map = value
        .get("balances")
        .and_then(Value::as_object)
        .or_else(|| value.as_object())
        .ok_or_else(|| format!("unexpected balances payload: {}", value))?;

    let mut balances = Balances::new();
    for (currency, entry) in map {
        if currency == SENTINEL_KEY {
            continue;
        }
        let (balance, available) = match entry {
            Value::Object(fields) => {
                let balance = fields.get("balance").and_then(decimal_from_value);
                let available = fields.get("available").and_then(decimal_from_value);
                match (balance, available) {
                    (Some(b), Some(a)) => (b, a),
                    (Some(b), None) => (b, b),
                    (None, Some(a)) => (a, a),
                    (None, None) => return Err(format!("no amounts for {}", currency)),
                }
            }
            Value::String(_) | Value::Number(_) => {
                let amount = decimal_from_value(entry)
                    .ok_or_else(|| format!("invalid amount for {}: {}", currency, entry))?;
                (amount, amount)
            }
            _ => continue,
        };
        balances.insert(Balance {
            currency: currency.clone(),
            balance,
            available,
        });
    }
    Ok(balances)
}

fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        _ => None,
    }
}
