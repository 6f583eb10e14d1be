//! Structured agenda record.
//!
//! The model is asked for an object with `meeting_title`, `date`, `location`,
//! `supervisors`, `all_section_titles` and `social_services_items`, but nothing
//! enforces that shape. Accessors here are for reporting only and treat every
//! field as optional.

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Key under which an unparseable model reply is stored.
pub const RAW_RESPONSE_KEY: &str = "raw_llm_response";

/// Result of structuring one document.
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredRecord {
    /// The model's reply parsed as JSON.
    Parsed(Value),
    /// The model's reply verbatim, when it was not valid JSON.
    Raw(String),
}

impl StructuredRecord {
    /// Parse a model reply, degrading to [`StructuredRecord::Raw`] on malformed JSON.
    pub fn from_model_reply(reply: &str) -> Self {
        match serde_json::from_str::<Value>(reply) {
            Ok(value) => Self::Parsed(value),
            Err(_) => Self::Raw(reply.to_string()),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// JSON value as written to disk.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Parsed(value) => value.clone(),
            Self::Raw(text) => {
                let mut map = serde_json::Map::new();
                map.insert(RAW_RESPONSE_KEY.to_string(), Value::String(text.clone()));
                Value::Object(map)
            }
        }
    }

    /// Pretty-printed JSON with two-space indentation and no trailing newline.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn field(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Parsed(Value::Object(map)) => map.get(key),
            _ => None,
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    pub fn meeting_title(&self) -> Option<&str> {
        self.str_field("meeting_title")
    }

    pub fn date(&self) -> Option<&str> {
        self.str_field("date")
    }

    pub fn location(&self) -> Option<&str> {
        self.str_field("location")
    }

    /// Section titles that are strings; other entries are ignored.
    pub fn section_titles(&self) -> Vec<&str> {
        self.field("all_section_titles")
            .and_then(Value::as_array)
            .map(|titles| titles.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn supervisor_count(&self) -> usize {
        self.array_len("supervisors")
    }

    pub fn social_services_count(&self) -> usize {
        self.array_len("social_services_items")
    }

    fn array_len(&self, key: &str) -> usize {
        self.field(key)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

impl Serialize for StructuredRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Parsed(value) => value.serialize(serializer),
            Self::Raw(text) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(RAW_RESPONSE_KEY, text)?;
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const AGENDA_REPLY: &str = r#"{
  "meeting_title": "Board of Supervisors Regular Meeting",
  "date": "January 5, 2024",
  "location": "Board Chambers",
  "supervisors": [
    {"name": "A. Rivera", "district": "1"},
    {"name": "B. Chen", "district": "2"}
  ],
  "all_section_titles": ["Consent Calendar", "Social Services", 7],
  "social_services_items": [
    {"item_number": "12", "title_or_summary": "Homeless shelter contract", "districts": "All", "type": "Consent"}
  ]
}"#;

    #[test]
    fn test_parsed_record_accessors() {
        let record = StructuredRecord::from_model_reply(AGENDA_REPLY);
        assert!(!record.is_degraded());
        assert_eq!(
            record.meeting_title(),
            Some("Board of Supervisors Regular Meeting")
        );
        assert_eq!(record.date(), Some("January 5, 2024"));
        assert_eq!(record.location(), Some("Board Chambers"));
        assert_eq!(record.supervisor_count(), 2);
        assert_eq!(record.section_titles(), vec!["Consent Calendar", "Social Services"]);
        assert_eq!(record.social_services_count(), 1);
    }

    #[test]
    fn test_commentary_degrades_to_raw() {
        let reply = "Here is the JSON you asked for:\n{\"date\": \"2024-01-05\"}";
        let record = StructuredRecord::from_model_reply(reply);
        assert!(record.is_degraded());
        assert_eq!(record.to_value(), json!({ "raw_llm_response": reply }));
        assert_eq!(record.meeting_title(), None);
        assert!(record.section_titles().is_empty());
    }

    #[test]
    fn test_raw_record_pretty_json() {
        let record = StructuredRecord::Raw("Sorry, I can't process this.".to_string());
        assert_eq!(
            record.to_pretty_json().unwrap(),
            "{\n  \"raw_llm_response\": \"Sorry, I can't process this.\"\n}"
        );
    }

    #[test]
    fn test_key_order_is_preserved() {
        let record = StructuredRecord::from_model_reply(r#"{"zeta": 1, "alpha": {"b": 2, "a": 1}}"#);
        assert_eq!(
            record.to_pretty_json().unwrap(),
            "{\n  \"zeta\": 1,\n  \"alpha\": {\n    \"b\": 2,\n    \"a\": 1\n  }\n}"
        );
    }

    #[test]
    fn test_numbers_are_written_as_received() {
        let record = StructuredRecord::from_model_reply(
            r#"{"item_number": 123456789012345678901234567890, "x": 0.10000000000000000555, "n": 1.50}"#,
        );
        assert_eq!(
            record.to_pretty_json().unwrap(),
            "{\n  \"item_number\": 123456789012345678901234567890,\n  \"x\": 0.10000000000000000555,\n  \"n\": 1.50\n}"
        );
    }

    #[test]
    fn test_non_object_json_is_kept() {
        let record = StructuredRecord::from_model_reply("[1, 2, 3]");
        assert_eq!(record, StructuredRecord::Parsed(json!([1, 2, 3])));
        assert_eq!(record.social_services_count(), 0);
    }

    #[test]
    fn test_mistyped_fields_are_tolerated() {
        let record = StructuredRecord::from_model_reply(
            r#"{"meeting_title": 42, "supervisors": "none", "social_services_items": null}"#,
        );
        assert_eq!(record.meeting_title(), None);
        assert_eq!(record.supervisor_count(), 0);
        assert_eq!(record.social_services_count(), 0);
    }

    #[test]
    fn test_serialize_matches_to_value() {
        for record in [
            StructuredRecord::from_model_reply(AGENDA_REPLY),
            StructuredRecord::Raw("not json".to_string()),
        ] {
            assert_eq!(serde_json::to_value(&record).unwrap(), record.to_value());
        }
    }
}
