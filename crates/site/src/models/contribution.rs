//! Visitor contribution types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use patron_core::is_name_separator;

use crate::store::{Document, FieldValue, Fields};

/// Document field names.
pub mod fields {
    pub const NAME: &str = "name";
    pub const CONTACT: &str = "contact";
    pub const DAY: &str = "day";
    pub const TIME: &str = "time";
    pub const AMOUNT: &str = "amount";
    pub const TIMESTAMP: &str = "timestamp";
    pub const READ: &str = "read";
}

/// Raw submission body.
///
/// Every field is optional at this layer so that a missing field becomes a
/// validation error rather than a JSON rejection. Numbers are accepted and
/// kept as their decimal text.
#[derive(Debug, Default, Deserialize)]
pub struct ContributionForm {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub contact: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub day: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub amount: Option<String>,
}

fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A submission that passed the presence checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContribution {
    pub name: String,
    pub contact: String,
    pub day: String,
    pub time: String,
    pub amount: String,
}

impl NewContribution {
    /// Accept a form only if all five fields are present and not blank.
    ///
    /// Returns the name of the first offending field otherwise. Values are
    /// kept exactly as submitted.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing or blank field.
    pub fn from_form(form: ContributionForm) -> Result<Self, &'static str> {
        fn required(value: Option<String>, field: &'static str) -> Result<String, &'static str> {
            value
                .filter(|v| !v.trim_matches(is_name_separator).is_empty())
                .ok_or(field)
        }

        Ok(Self {
            name: required(form.name, fields::NAME)?,
            contact: required(form.contact, fields::CONTACT)?,
            day: required(form.day, fields::DAY)?,
            time: required(form.time, fields::TIME)?,
            amount: required(form.amount, fields::AMOUNT)?,
        })
    }

    /// Fields to persist, stamped with the creation time. `read` is left
    /// unset.
    #[must_use]
    pub fn into_fields(self, timestamp: DateTime<Utc>) -> Fields {
        Fields::from([
            (fields::NAME.to_string(), FieldValue::String(self.name)),
            (fields::CONTACT.to_string(), FieldValue::String(self.contact)),
            (fields::DAY.to_string(), FieldValue::String(self.day)),
            (fields::TIME.to_string(), FieldValue::String(self.time)),
            (fields::AMOUNT.to_string(), FieldValue::String(self.amount)),
            (
                fields::TIMESTAMP.to_string(),
                FieldValue::Timestamp(timestamp),
            ),
        ])
    }
}

/// A stored contribution as shown to admins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub day: String,
    pub time: String,
    pub amount: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub read: bool,
}

impl Contribution {
    /// Build from a stored document. Missing text fields read as empty and a
    /// missing `read` as false.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let text = |field: &str| {
            doc.get(field)
                .map(|value| match value {
                    FieldValue::String(s) => s.clone(),
                    FieldValue::Integer(i) => i.to_string(),
                    FieldValue::Double(d) => d.to_string(),
                    _ => String::new(),
                })
                .unwrap_or_default()
        };

        Self {
            id: doc.id.clone(),
            name: text(fields::NAME),
            contact: text(fields::CONTACT),
            day: text(fields::DAY),
            time: text(fields::TIME),
            amount: text(fields::AMOUNT),
            timestamp: doc.get(fields::TIMESTAMP).and_then(FieldValue::as_timestamp),
            read: doc
                .get(fields::READ)
                .and_then(FieldValue::as_bool)
                .unwrap_or(false),
        }
    }

    /// Creation time formatted for display.
    #[must_use]
    pub fn submitted_at(&self) -> String {
        self.timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn form(json: serde_json::Value) -> ContributionForm {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_complete_form_is_accepted() {
        let c = NewContribution::from_form(form(serde_json::json!({
            "name": "Alice",
            "contact": "alice@example.com",
            "day": "Saturday",
            "time": "18:00",
            "amount": "25"
        })))
        .unwrap();
        assert_eq!(c.name, "Alice");
        assert_eq!(c.amount, "25");
    }

    #[test]
    fn test_numeric_amount_is_kept_as_text() {
        let c = NewContribution::from_form(form(serde_json::json!({
            "name": "Alice",
            "contact": "x",
            "day": "Sat",
            "time": "18:00",
            "amount": 25
        })))
        .unwrap();
        assert_eq!(c.amount, "25");
    }

    #[test]
    fn test_missing_or_blank_field_is_rejected() {
        let missing = form(serde_json::json!({
            "name": "Alice", "contact": "x", "day": "Sat", "time": "18:00"
        }));
        assert_eq!(NewContribution::from_form(missing), Err(fields::AMOUNT));

        let blank = form(serde_json::json!({
            "name": "   ", "contact": "x", "day": "Sat", "time": "18:00", "amount": "1"
        }));
        assert_eq!(NewContribution::from_form(blank), Err(fields::NAME));

        let bom_only = form(serde_json::json!({
            "name": "Alice", "contact": "x", "day": "\u{feff} ", "time": "18:00", "amount": "1"
        }));
        assert_eq!(NewContribution::from_form(bom_only), Err(fields::DAY));

        let wrong_type = form(serde_json::json!({
            "name": "Alice", "contact": true, "day": "Sat", "time": "18:00", "amount": "1"
        }));
        assert_eq!(NewContribution::from_form(wrong_type), Err(fields::CONTACT));
    }

    #[test]
    fn test_into_fields_leaves_read_unset() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let stored = NewContribution {
            name: "Alice".into(),
            contact: "x".into(),
            day: "Sat".into(),
            time: "18:00".into(),
            amount: "1".into(),
        }
        .into_fields(at);

        assert_eq!(stored.len(), 6);
        assert!(!stored.contains_key(fields::READ));
        assert_eq!(
            stored.get(fields::TIMESTAMP),
            Some(&FieldValue::Timestamp(at))
        );
    }

    #[test]
    fn test_from_document_defaults() {
        let doc = Document {
            id: "Alice".into(),
            fields: Fields::from([("name".to_string(), FieldValue::String("Alice".into()))]),
        };
        let c = Contribution::from_document(&doc);

        assert_eq!(c.id, "Alice");
        assert_eq!(c.name, "Alice");
        assert_eq!(c.contact, "");
        assert!(!c.read);
        assert!(c.timestamp.is_none());
        assert_eq!(c.submitted_at(), "");
    }
}
