//! Form payloads and the validation functions that turn them into
//! write-ready drafts.
//!
//! Every form keeps the raw submitted strings so that a rejected
//! submission can be echoed back unchanged next to its field errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

pub mod category;
pub mod event;
pub mod participant;

pub use category::{CategoryDraft, CategoryForm};
pub use event::{EventChoices, EventDraft, EventForm};
pub use participant::{ParticipantDraft, ParticipantForm};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_DATE: &str = "Enter a valid date.";
pub const INVALID_TIME: &str = "Enter a valid time.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Field name to human-readable message. The first message recorded for
/// a field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A JSON scalar as submitted for a text field.
#[derive(Deserialize)]
#[serde(untagged, expecting = "a string, number or boolean")]
enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Text(text) => text,
            Scalar::Number(number) => number.to_string(),
            Scalar::Flag(flag) => flag.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged, expecting = "a string or a list of strings")]
enum OneOrMany {
    One(Scalar),
    Many(Vec<Option<Scalar>>),
}

/// Reads any JSON scalar as form text; `null` reads as blank. Type
/// mistakes then surface as field errors from `clean` rather than as a
/// rejected body.
pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

/// Reads a multi-choice field. A single value counts as a one-element
/// list, and a blank single value or `null` as no selection.
pub(crate) fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => {
            let value = String::from(value);
            if value.trim().is_empty() {
                Vec::new()
            } else {
                vec![value]
            }
        }
        Some(OneOrMany::Many(values)) => values
            .into_iter()
            .map(|value| value.map(String::from).unwrap_or_default())
            .collect(),
    };
    Ok(values)
}

/// Trims a required text field, recording [`REQUIRED`] when blank.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        None
    } else {
        Some(value.to_string())
    }
}

/// Trims an optional text field; blank becomes `None`.
pub(crate) fn optional_text(raw: &str) -> Option<String> {
    let value = raw.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_field_is_kept() {
        let mut errors = FieldErrors::new();
        errors.add("name", "first");
        errors.add("name", "second");
        assert_eq!(errors.get("name"), Some("first"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn serializes_as_flat_map() {
        let mut errors = FieldErrors::new();
        errors.add("email", INVALID_EMAIL);
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "email": INVALID_EMAIL }));
    }

    #[test]
    fn blank_text_handling() {
        let mut errors = FieldErrors::new();
        assert_eq!(required_text(&mut errors, "name", "   "), None);
        assert_eq!(errors.get("name"), Some(REQUIRED));
        assert_eq!(optional_text("  \n"), None);
        assert_eq!(optional_text(" Hall B "), Some("Hall B".to_string()));
    }

    #[derive(Debug, Deserialize)]
    struct Loose {
        #[serde(default, deserialize_with = "lenient_text")]
        text: String,
        #[serde(default, deserialize_with = "lenient_list")]
        list: Vec<String>,
    }

    fn loose(value: serde_json::Value) -> Result<Loose, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn scalars_read_as_text() {
        assert_eq!(loose(serde_json::json!({ "text": 5 })).unwrap().text, "5");
        assert_eq!(loose(serde_json::json!({ "text": true })).unwrap().text, "true");
        assert_eq!(loose(serde_json::json!({ "text": null })).unwrap().text, "");
        assert!(loose(serde_json::json!({ "text": { "nested": 1 } })).is_err());
    }

    #[test]
    fn single_value_reads_as_one_element_list() {
        let parsed = loose(serde_json::json!({ "list": "abc" })).unwrap();
        assert_eq!(parsed.list, vec!["abc".to_string()]);

        assert!(loose(serde_json::json!({ "list": "  " })).unwrap().list.is_empty());
        assert!(loose(serde_json::json!({ "list": null })).unwrap().list.is_empty());

        let parsed = loose(serde_json::json!({ "list": ["a", 7] })).unwrap();
        assert_eq!(parsed.list, vec!["a".to_string(), "7".to_string()]);
    }
}
