//! Open attribute bags for entities and flows
//!
//! Entities and flows carry a few typed fields (label, technology, protocol,
//! authentication) plus an ordered map of everything else the editor put on
//! them. Values stay as JSON so that an export/import cycle returns them
//! untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Property map for the open part of entity and flow attributes
pub type PropertyMap = IndexMap<String, Value>;

/// A flag is set only by JSON `true` or the exact string "yes".
pub fn is_truthy_flag(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::Bool(true))) || matches!(value, Some(Value::String(s)) if s == "yes")
}

/// Parse a 1..=5 rating from an integer, float or numeric string.
///
/// Anything else, including values outside the range, yields `None`.
pub fn rating_1_to_5(value: Option<&Value>) -> Option<u8> {
    let n = match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64))?,
        Value::String(s) => parse_leading_int(s)?,
        _ => return None,
    };
    (1..=5).contains(&n).then_some(n as u8)
}

// Mirrors integer parsing that accepts "3", " 4 " and "2.7" but not "abc".
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Render a scalar attribute as text. Strings are returned as-is, numbers and
/// booleans are stringified, everything else is treated as absent.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize an optional text field without rejecting numbers or booleans.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flags() {
        assert!(is_truthy_flag(Some(&json!(true))));
        assert!(is_truthy_flag(Some(&json!("yes"))));
        assert!(!is_truthy_flag(Some(&json!(false))));
        assert!(!is_truthy_flag(Some(&json!("true"))));
        assert!(!is_truthy_flag(Some(&json!(" YES "))));
        assert!(!is_truthy_flag(Some(&json!("no"))));
        assert!(!is_truthy_flag(Some(&json!(1))));
        assert!(!is_truthy_flag(None));
    }

    #[test]
    fn test_ratings() {
        assert_eq!(rating_1_to_5(Some(&json!(3))), Some(3));
        assert_eq!(rating_1_to_5(Some(&json!("4"))), Some(4));
        assert_eq!(rating_1_to_5(Some(&json!("2.9"))), Some(2));
        assert_eq!(rating_1_to_5(Some(&json!(5.5))), Some(5));
        assert_eq!(rating_1_to_5(Some(&json!(0))), None);
        assert_eq!(rating_1_to_5(Some(&json!(9))), None);
        assert_eq!(rating_1_to_5(Some(&json!("high"))), None);
        assert_eq!(rating_1_to_5(None), None);
    }

    #[test]
    fn test_value_as_text() {
        assert_eq!(value_as_text(&json!("UART")), Some("UART".to_string()));
        assert_eq!(value_as_text(&json!(12)), Some("12".to_string()));
        assert_eq!(value_as_text(&json!(null)), None);
        assert_eq!(value_as_text(&json!({"a": 1})), None);
    }
}
