//! Lenient accessors for vendor JSON fields whose type drifts between
//! number and string across API versions.

use serde_json::Value;

pub fn number_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn int_field(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_field_accepts_both_shapes() {
        assert_eq!(number_field(&json!(4.5)), Some(4.5));
        assert_eq!(number_field(&json!("4.5")), Some(4.5));
        assert_eq!(number_field(&json!(" 120 ")), Some(120.0));
        assert_eq!(number_field(&json!(null)), None);
        assert_eq!(number_field(&json!({"total": 1})), None);
    }

    #[test]
    fn test_int_field_accepts_both_shapes() {
        assert_eq!(int_field(&json!(4)), Some(4));
        assert_eq!(int_field(&json!("4")), Some(4));
        assert_eq!(int_field(&json!("x")), None);
    }
}
