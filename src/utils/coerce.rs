//! Field normalization shared by every link parser.
//!
//! Sources encode numbers as strings and booleans as `"tls"`, `"1"` or real
//! JSON booleans. Each canonical field goes through exactly one of these.

use serde_json::Value;

/// Parse a port from a JSON number or a numeric string. `0` is rejected.
pub fn to_port(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Value::String(s) => str_to_port(s),
        _ => None,
    }
    .filter(|port| *port != 0)
}

/// Parse a port from its textual form. `0` is rejected.
pub fn str_to_port(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok().filter(|port| *port != 0)
}

/// Parse a small unsigned integer such as `alterId`; absent or empty is `0`.
pub fn to_u16(value: &Value) -> Option<u16> {
    match value {
        Value::Null => Some(0),
        Value::Number(n) => n.as_u64().and_then(|v| u16::try_from(v).ok()),
        Value::String(s) if s.trim().is_empty() => Some(0),
        Value::String(s) => s.trim().parse::<u16>().ok(),
        _ => None,
    }
}

/// Normalize a JSON flag to a boolean.
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_u64().is_some_and(|v| v != 0),
        Value::String(s) => str_to_bool(s),
        _ => false,
    }
}

/// Normalize a textual flag: any non-empty value other than `none`, `false`
/// and `0` is true.
pub fn str_to_bool(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || value.eq_ignore_ascii_case("none")
        || value.eq_ignore_ascii_case("false")
        || value == "0")
}

/// String content of a JSON field, numbers rendered as text, empty when absent.
pub fn to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_port_from_string_or_number() {
        assert_eq!(to_port(&json!("8443")), Some(8443));
        assert_eq!(to_port(&json!(443)), Some(443));
        assert_eq!(to_port(&json!(" 80 ")), Some(80));
        assert_eq!(to_port(&json!("0")), None);
        assert_eq!(to_port(&json!(70000)), None);
        assert_eq!(to_port(&json!("https")), None);
        assert_eq!(to_port(&Value::Null), None);
    }

    #[test]
    fn test_alter_id_defaults_to_zero() {
        assert_eq!(to_u16(&Value::Null), Some(0));
        assert_eq!(to_u16(&json!("")), Some(0));
        assert_eq!(to_u16(&json!("64")), Some(64));
        assert_eq!(to_u16(&json!(2)), Some(2));
        assert_eq!(to_u16(&json!("x")), None);
    }

    #[test]
    fn test_bool_normalization() {
        assert!(to_bool(&json!("tls")));
        assert!(to_bool(&json!(true)));
        assert!(to_bool(&json!("1")));
        assert!(to_bool(&json!(1)));
        assert!(!to_bool(&json!("")));
        assert!(!to_bool(&json!("none")));
        assert!(!to_bool(&json!(false)));
        assert!(!to_bool(&json!("false")));
        assert!(!to_bool(&Value::Null));
    }
}
