//! Emitted metric events (Druid HTTP emitter, JSON).
//!
//! The emitter posts a JSON array of flat objects. Only `metric`, `service`,
//! `host` and `value` have fixed meaning; every other field is a candidate
//! dimension value. Fields are loosely typed, so accessors stringify instead of
//! failing.

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::error::{BridgeError, Result};

/// One emitted event, kept as the raw JSON object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct EmittedRecord {
    fields: Map<String, Value>,
}

impl EmittedRecord {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Metric name, e.g. `query/time`.
    pub fn metric(&self) -> String {
        self.field("metric")
    }

    /// Emitting service, e.g. `druid/broker`.
    pub fn service(&self) -> String {
        self.field("service")
    }

    /// Host token, `address` or `address:port`.
    pub fn host(&self) -> String {
        self.field("host")
    }

    /// Numeric value. Numbers and numeric strings parse; anything else is `None`.
    pub fn value(&self) -> Option<f64> {
        match self.fields.get("value")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Whether the field is present and not `null`.
    pub fn has(&self, name: &str) -> bool {
        !matches!(self.fields.get(name), None | Some(Value::Null))
    }

    /// Field value as a label string. Missing and `null` fields map to `""`.
    pub fn field(&self, name: &str) -> String {
        match self.fields.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(Value::Number(n)) => number_label(n),
            Some(other) => other.to_string(),
        }
    }
}

/// Integers print as-is; floats print in shortest form, so `7.0` is `"7"`.
fn number_label(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Decode a full emitter batch. A body that is not a JSON array of objects is
/// rejected as a whole; `null` decodes to an empty batch.
pub fn decode_batch(body: &[u8]) -> Result<Vec<EmittedRecord>> {
    let batch: Option<Vec<EmittedRecord>> = serde_json::from_slice(body)
        .map_err(|e| BridgeError::BadRequest(format!("decode batch failed: {e}")))?;
    Ok(batch.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> EmittedRecord {
        match v {
            Value::Object(m) => EmittedRecord::from_map(m),
            _ => EmittedRecord::default(),
        }
    }

    #[test]
    fn value_accepts_numbers_and_numeric_strings() {
        assert_eq!(record(json!({"value": 3})).value(), Some(3.0));
        assert_eq!(record(json!({"value": "42.5"})).value(), Some(42.5));
        assert_eq!(record(json!({"value": "n/a"})).value(), None);
        assert_eq!(record(json!({"value": true})).value(), None);
        assert_eq!(record(json!({})).value(), None);
    }

    #[test]
    fn fields_stringify_loosely() {
        let r = record(json!({
            "dataSource": "wiki",
            "priority": 0,
            "vectorized": false,
            "taskId": null,
            "segments": ["a", "b"]
        }));
        assert_eq!(r.field("dataSource"), "wiki");
        assert_eq!(r.field("priority"), "0");
        assert_eq!(r.field("vectorized"), "false");
        assert_eq!(r.field("taskId"), "");
        assert_eq!(r.field("missing"), "");
        assert_eq!(r.field("segments"), r#"["a","b"]"#);
        assert!(!r.has("taskId"));
        assert!(r.has("priority"));
    }

    #[test]
    fn whole_floats_drop_the_fraction() {
        let r = record(json!({"ratio": 7.0, "load": 0.25, "big": 12345678901u64, "neg": -3}));
        assert_eq!(r.field("ratio"), "7");
        assert_eq!(r.field("load"), "0.25");
        assert_eq!(r.field("big"), "12345678901");
        assert_eq!(r.field("neg"), "-3");
    }

    #[test]
    fn null_body_is_empty_batch() {
        assert!(decode_batch(b"null").unwrap().is_empty());
    }
}
