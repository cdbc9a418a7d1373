//! Account, position and P&L payload views.
//!
//! The relay core never looks inside payloads; these types exist for the
//! renderers that consume them. Every numeric field the relay may omit is an
//! `Option` so a missing value stays distinguishable from zero.
//!
//! - [`AccountInfo`] - `account_info` payload
//! - [`Position`] - one element of the `positions` payload
//! - [`PnlSnapshot`] - `pnl` payload

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Account identifier, sent by the relay either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccountId {
    /// Numeric identifier.
    Number(i64),
    /// Textual identifier.
    Text(String),
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Account summary delivered as the `account_info` payload.
///
/// ```
/// use vigil_core::account::AccountInfo;
///
/// let info: AccountInfo = serde_json::from_str(
///     r#"{"id": 42, "name": "DEMO1234", "status": true}"#,
/// ).unwrap();
/// assert!(info.status);
/// assert_eq!(info.id.to_string(), "42");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Account identifier.
    pub id: AccountId,
    /// Account display name.
    pub name: String,
    /// Whether the account is active. Accepts any truthy JSON value.
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub status: bool,
    /// Owning user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Account type (e.g. `Customer`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    /// Whether trading is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trading_enabled: Option<bool>,
    /// Whether margin is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_enabled: Option<bool>,
    /// Cash balance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_balance: Option<Decimal>,
}

/// One open position delivered inside the `positions` payload array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Contract symbol.
    #[serde(default)]
    pub symbol: String,
    /// Net position size (signed).
    #[serde(default)]
    pub net_pos: Option<Decimal>,
    /// Average entry price.
    #[serde(default)]
    pub entry_price: Option<Decimal>,
    /// Last market price.
    #[serde(default)]
    pub market_price: Option<Decimal>,
    /// Open profit/loss.
    #[serde(default)]
    pub pnl: Option<Decimal>,
    /// Contract id on the trading platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<i64>,
    /// Platform timestamp of the last update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Position {
    /// Returns true if the position is flat or its size is unknown.
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.net_pos.is_none_or(|n| n.is_zero())
    }
}

/// Profit and loss snapshot delivered as the `pnl` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnlSnapshot {
    /// Net P&L.
    #[serde(default)]
    pub net_pnl: Option<Decimal>,
    /// Realized P&L.
    #[serde(default)]
    pub realized_pnl: Option<Decimal>,
    /// Unrealized P&L.
    #[serde(default)]
    pub unrealized_pnl: Option<Decimal>,
    /// Account the snapshot belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
}

/// Evaluates a JSON value the way a browser would in a boolean context.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn deserialize_truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_account_info_accepts_string_id_and_truthy_status() {
        let info: AccountInfo =
            serde_json::from_value(json!({"id": "A-1", "name": "Main", "status": 1})).unwrap();
        assert_eq!(info.id, AccountId::Text("A-1".to_string()));
        assert!(info.status);

        let info: AccountInfo =
            serde_json::from_value(json!({"id": 7, "name": "Main", "status": ""})).unwrap();
        assert_eq!(info.id, AccountId::Number(7));
        assert!(!info.status);
    }

    #[test]
    fn test_account_info_missing_status_is_inactive() {
        let info: AccountInfo = serde_json::from_value(json!({"id": 7, "name": "Main"})).unwrap();
        assert!(!info.status);
    }

    #[test]
    fn test_position_with_missing_numbers() {
        let position: Position =
            serde_json::from_value(json!({"symbol": "NQ", "netPos": -1})).unwrap();
        assert_eq!(position.net_pos, Some(dec!(-1)));
        assert_eq!(position.entry_price, None);
        assert_eq!(position.pnl, None);
        assert!(!position.is_flat());
    }

    #[test]
    fn test_positions_array() {
        let positions: Vec<Position> = serde_json::from_value(json!([
            {"symbol": "ES", "netPos": 2, "entryPrice": 4500, "marketPrice": 4510, "pnl": 20}
        ]))
        .unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].pnl, Some(dec!(20)));
        assert_eq!(positions[0].entry_price, Some(dec!(4500)));
    }

    #[test]
    fn test_pnl_snapshot_fractional_values() {
        let pnl: PnlSnapshot = serde_json::from_value(
            json!({"netPnl": 150.25, "realizedPnl": 100, "unrealizedPnl": 50.25}),
        )
        .unwrap();
        assert_eq!(pnl.net_pnl, Some(dec!(150.25)));
        assert_eq!(pnl.realized_pnl, Some(dec!(100)));
        assert_eq!(pnl.unrealized_pnl, Some(dec!(50.25)));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!(0.5)));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!({})));
        assert!(!is_truthy(&json!(false)));
    }
}
