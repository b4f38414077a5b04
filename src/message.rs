use serde::{Deserialize, Serialize};

/// A fetched mail message as handed to us by whatever retrieved it.
/// Every textual field is optional; downstream code treats absent fields
/// as empty strings and never fails on them.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageRecord {
    pub id: Option<String>,
    pub thread_id: Option<String>,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub snippet: Option<String>,
    pub body: Option<String>,
    pub labels: Vec<String>,
}

impl MessageRecord {
    /// Subject, snippet and body joined with single spaces, skipping
    /// fields that are absent or empty.
    pub fn combined_text(&self) -> String {
        let mut parts = Vec::new();

        if let Some(subject) = self.subject.as_deref() {
            if !subject.is_empty() {
                parts.push(subject);
            }
        }
        if let Some(snippet) = self.snippet.as_deref() {
            if !snippet.is_empty() {
                parts.push(snippet);
            }
        }
        if let Some(body) = self.body.as_deref() {
            if !body.is_empty() {
                parts.push(body);
            }
        }

        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_text_joins_present_fields() {
        let record = MessageRecord {
            subject: Some("Order update".to_string()),
            snippet: Some("your order".to_string()),
            body: Some("has shipped".to_string()),
            ..Default::default()
        };
        assert_eq!(record.combined_text(), "Order update your order has shipped");
    }

    #[test]
    fn test_combined_text_skips_missing_fields() {
        let record = MessageRecord {
            subject: Some("Order update".to_string()),
            snippet: None,
            body: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(record.combined_text(), "Order update");

        let empty = MessageRecord::default();
        assert_eq!(empty.combined_text(), "");
    }

    #[test]
    fn test_deserializes_with_missing_fields() {
        let record: MessageRecord =
            serde_json::from_str(r#"{"subject": "hello"}"#).unwrap();
        assert_eq!(record.subject.as_deref(), Some("hello"));
        assert!(record.body.is_none());
        assert!(record.labels.is_empty());
    }
}
