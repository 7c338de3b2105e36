//! Firestore REST JSON representation.
//!
//! Firestore wraps each field in a one-key object naming its type, e.g.
//! `{"stringValue": "Alice"}`. Integers travel as decimal strings.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Document, FieldValue, Fields, StoreError};

/// A typed Firestore value. Exactly one field is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null_value: Option<()>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integer_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_value: Option<String>,
}

/// A document as returned by `GET` or `runQuery`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

/// One element of a `runQuery` response stream.
#[derive(Debug, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub document: Option<WireDocument>,
}

/// Google API error envelope.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

impl From<&FieldValue> for Value {
    fn from(value: &FieldValue) -> Self {
        match value {
            FieldValue::Null => Self {
                null_value: Some(()),
                ..Self::default()
            },
            FieldValue::Boolean(b) => Self {
                boolean_value: Some(*b),
                ..Self::default()
            },
            FieldValue::Integer(i) => Self {
                integer_value: Some(i.to_string()),
                ..Self::default()
            },
            FieldValue::Double(d) => Self {
                double_value: Some(*d),
                ..Self::default()
            },
            FieldValue::String(s) => Self {
                string_value: Some(s.clone()),
                ..Self::default()
            },
            FieldValue::Timestamp(t) => Self {
                timestamp_value: Some(t.to_rfc3339_opts(SecondsFormat::Micros, true)),
                ..Self::default()
            },
        }
    }
}

impl Value {
    /// Convert to a [`FieldValue`].
    ///
    /// Returns `Ok(None)` for values the site never writes (maps, arrays,
    /// references, nulls), which deserialize with every field unset.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Malformed` if an integer or timestamp fails to
    /// parse.
    pub fn into_field(self) -> Result<Option<FieldValue>, StoreError> {
        if let Some(s) = self.string_value {
            return Ok(Some(FieldValue::String(s)));
        }
        if let Some(b) = self.boolean_value {
            return Ok(Some(FieldValue::Boolean(b)));
        }
        if let Some(t) = self.timestamp_value {
            let parsed = DateTime::parse_from_rfc3339(&t)
                .map_err(|e| StoreError::Malformed(format!("bad timestamp {t:?}: {e}")))?;
            return Ok(Some(FieldValue::Timestamp(parsed.with_timezone(&Utc))));
        }
        if let Some(i) = self.integer_value {
            let parsed = i
                .parse()
                .map_err(|e| StoreError::Malformed(format!("bad integer {i:?}: {e}")))?;
            return Ok(Some(FieldValue::Integer(parsed)));
        }
        Ok(self.double_value.map(FieldValue::Double))
    }
}

/// Encode a field map for a write request body.
#[must_use]
pub fn encode_fields(fields: &Fields) -> BTreeMap<String, Value> {
    fields
        .iter()
        .map(|(name, value)| (name.clone(), Value::from(value)))
        .collect()
}

/// Decode a wire document into a [`Document`].
///
/// The ID is the last segment of the resource name. Fields of types the
/// site never reads are skipped.
///
/// # Errors
///
/// Returns `StoreError::Malformed` if the document has no name or a known
/// value fails to parse.
pub fn decode_document(doc: WireDocument) -> Result<Document, StoreError> {
    let name = doc
        .name
        .ok_or_else(|| StoreError::Malformed("document without name".to_string()))?;
    let id = name
        .rsplit('/')
        .next()
        .map(|segment| {
            urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |s| s.into_owned())
        })
        .unwrap_or_default();

    let mut fields = Fields::new();
    for (key, value) in doc.fields {
        match value.into_field()? {
            Some(v) => {
                fields.insert(key, v);
            }
            None => tracing::debug!(field = %key, "Skipping field of unsupported type"),
        }
    }

    Ok(Document { id, fields })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_encode_shapes() {
        let mut fields = Fields::new();
        fields.insert("name".into(), FieldValue::String("Alice".into()));
        fields.insert("read".into(), FieldValue::Boolean(false));
        fields.insert("count".into(), FieldValue::Integer(42));
        fields.insert(
            "timestamp".into(),
            FieldValue::Timestamp(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        );

        let json = serde_json::to_value(encode_fields(&fields)).unwrap();
        assert_eq!(json["name"], serde_json::json!({"stringValue": "Alice"}));
        assert_eq!(json["read"], serde_json::json!({"booleanValue": false}));
        assert_eq!(json["count"], serde_json::json!({"integerValue": "42"}));
        assert_eq!(
            json["timestamp"],
            serde_json::json!({"timestampValue": "2024-05-01T12:00:00.000000Z"})
        );
    }

    #[test]
    fn test_decode_document() {
        let raw = serde_json::json!({
            "name": "projects/p/databases/(default)/documents/contributions/Alice_Smith-2",
            "fields": {
                "name": {"stringValue": "Alice Smith"},
                "read": {"booleanValue": true},
                "timestamp": {"timestampValue": "2024-05-01T12:00:00.123456Z"},
                "tags": {"arrayValue": {"values": []}}
            },
            "createTime": "2024-05-01T12:00:00.123456Z"
        });
        let doc = decode_document(serde_json::from_value(raw).unwrap()).unwrap();

        assert_eq!(doc.id, "Alice_Smith-2");
        assert_eq!(doc.get("name").and_then(FieldValue::as_str), Some("Alice Smith"));
        assert_eq!(doc.get("read").and_then(FieldValue::as_bool), Some(true));
        assert!(doc.get("timestamp").and_then(FieldValue::as_timestamp).is_some());
        assert!(doc.get("tags").is_none());
    }

    #[test]
    fn test_decode_percent_encoded_id() {
        let raw = serde_json::json!({
            "name": "projects/p/databases/(default)/documents/admins/a%40b.com",
        });
        let doc = decode_document(serde_json::from_value(raw).unwrap()).unwrap();
        assert_eq!(doc.id, "a@b.com");
    }

    #[test]
    fn test_decode_bad_integer() {
        let value = Value {
            integer_value: Some("abc".into()),
            ..Value::default()
        };
        assert!(matches!(value.into_field(), Err(StoreError::Malformed(_))));
    }
}
