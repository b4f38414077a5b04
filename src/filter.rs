use crate::message::MessageRecord;

use anyhow::bail;
use chrono::{DateTime, NaiveDate};

/// Raw filter bounds as supplied at the boundary (CLI flags, menu input).
#[derive(Debug, Default, Clone)]
pub struct FilterOptions {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub subject_contains: Option<String>,
    pub from_contains: Option<String>,
    pub body_contains: Option<String>,
}

impl FilterOptions {
    /// Render a provider-style query string for search capabilities that
    /// accept one (`after:`/`before:`/`from:`/`subject:` plus bare text).
    pub fn build_query(&self) -> String {
        let mut parts = Vec::new();

        if let Some(date_from) = &self.date_from {
            parts.push(format!("after:{date_from}"));
        }
        if let Some(date_to) = &self.date_to {
            parts.push(format!("before:{date_to}"));
        }
        if let Some(from) = &self.from_contains {
            parts.push(format!("from:{from}"));
        }
        if let Some(subject) = &self.subject_contains {
            parts.push(format!("subject:{subject}"));
        }
        if let Some(body) = &self.body_contains {
            parts.push(body.clone());
        }

        parts.join(" ")
    }
}

/// Validated filter. Construction rejects malformed date bounds; applying
/// the filter never fails.
pub struct RecordFilter {
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    subject_contains: Option<String>,
    from_contains: Option<String>,
    body_contains: Option<String>,
}

impl RecordFilter {
    pub fn new(options: &FilterOptions) -> anyhow::Result<Self> {
        Ok(RecordFilter {
            date_from: options
                .date_from
                .as_deref()
                .map(parse_date_bound)
                .transpose()?,
            date_to: options
                .date_to
                .as_deref()
                .map(parse_date_bound)
                .transpose()?,
            subject_contains: options.subject_contains.as_ref().map(|s| s.to_lowercase()),
            from_contains: options.from_contains.as_ref().map(|s| s.to_lowercase()),
            body_contains: options.body_contains.as_ref().map(|s| s.to_lowercase()),
        })
    }

    /// Keep matching records, preserving input order.
    pub fn apply(&self, records: &[MessageRecord]) -> Vec<MessageRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }

    fn matches(&self, record: &MessageRecord) -> bool {
        if self.date_from.is_some() || self.date_to.is_some() {
            // A record whose date cannot be parsed falls outside any bound.
            match parse_message_date(record.date.as_deref().unwrap_or("")) {
                Some(date) => {
                    if let Some(from) = self.date_from {
                        if date < from {
                            return false;
                        }
                    }
                    if let Some(to) = self.date_to {
                        if date > to {
                            return false;
                        }
                    }
                }
                None => return false,
            }
        }

        if let Some(needle) = &self.subject_contains {
            let subject = record.subject.as_deref().unwrap_or("").to_lowercase();
            if !subject.contains(needle) {
                return false;
            }
        }
        if let Some(needle) = &self.from_contains {
            let from = record.from.as_deref().unwrap_or("").to_lowercase();
            if !from.contains(needle) {
                return false;
            }
        }
        if let Some(needle) = &self.body_contains {
            let body = record.body.as_deref().unwrap_or("").to_lowercase();
            if !body.contains(needle) {
                return false;
            }
        }

        true
    }
}

fn parse_date_bound(value: &str) -> anyhow::Result<NaiveDate> {
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }
    bail!("Invalid date '{value}': expected YYYY-MM-DD or DD/MM/YYYY");
}

/// Best-effort parse of a message Date header. RFC 2822 first, then a
/// plain date. None when nothing fits.
fn parse_message_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        return None;
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(value) {
        return Some(datetime.date_naive());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(subject: &str, date: &str) -> MessageRecord {
        MessageRecord {
            subject: Some(subject.to_string()),
            date: Some(date.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_date_bound_accepts_both_formats() {
        assert_eq!(
            parse_date_bound("2024-03-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(
            parse_date_bound("05/03/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }

    #[test]
    fn test_malformed_date_bound_is_rejected() {
        let options = FilterOptions {
            date_from: Some("March 5th".to_string()),
            ..Default::default()
        };
        assert!(RecordFilter::new(&options).is_err());
    }

    #[test]
    fn test_date_range_filtering() {
        let records = vec![
            dated("early", "Mon, 1 Jan 2024 10:00:00 +0000"),
            dated("inside", "Thu, 15 Feb 2024 10:00:00 +0000"),
            dated("late", "Fri, 1 Mar 2024 10:00:00 +0000"),
        ];

        let options = FilterOptions {
            date_from: Some("2024-02-01".to_string()),
            date_to: Some("2024-02-28".to_string()),
            ..Default::default()
        };
        let filter = RecordFilter::new(&options).unwrap();

        let kept = filter.apply(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].subject.as_deref(), Some("inside"));
    }

    #[test]
    fn test_unparsable_date_is_excluded_by_date_bounds() {
        let records = vec![dated("odd", "sometime last week")];

        let options = FilterOptions {
            date_from: Some("2024-01-01".to_string()),
            ..Default::default()
        };
        let filter = RecordFilter::new(&options).unwrap();
        assert!(filter.apply(&records).is_empty());

        // Without date bounds the same record passes.
        let filter = RecordFilter::new(&FilterOptions::default()).unwrap();
        assert_eq!(filter.apply(&records).len(), 1);
    }

    #[test]
    fn test_text_filters_are_case_insensitive() {
        let records = vec![
            MessageRecord {
                subject: Some("Order Confirmation".to_string()),
                from: Some("shop@Example.com".to_string()),
                body: Some("Thanks for SHOPPING".to_string()),
                ..Default::default()
            },
            MessageRecord {
                subject: Some("Newsletter".to_string()),
                ..Default::default()
            },
        ];

        let options = FilterOptions {
            subject_contains: Some("order".to_string()),
            from_contains: Some("example.com".to_string()),
            body_contains: Some("shopping".to_string()),
            ..Default::default()
        };
        let filter = RecordFilter::new(&options).unwrap();

        let kept = filter.apply(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].subject.as_deref(), Some("Order Confirmation"));
    }

    #[test]
    fn test_build_query() {
        let options = FilterOptions {
            date_from: Some("2024-01-01".to_string()),
            date_to: Some("2024-02-01".to_string()),
            from_contains: Some("shop.example".to_string()),
            subject_contains: Some("order".to_string()),
            body_contains: Some("12345".to_string()),
        };
        assert_eq!(
            options.build_query(),
            "after:2024-01-01 before:2024-02-01 from:shop.example subject:order 12345"
        );

        assert_eq!(FilterOptions::default().build_query(), "");
    }
}
