use crate::message::MessageRecord;
use crate::reconciler::MessageSearch;

use anyhow::Context;

/// File-backed mail store. Stands in for a remote mailbox binding: the
/// reconciler only sees the `MessageSearch` capability.
pub struct MailStore {
    records: Vec<MessageRecord>,
}

impl MailStore {
    pub fn new(records: Vec<MessageRecord>) -> Self {
        MailStore { records }
    }

    /// Load a JSON array of message records.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read mail store: {path}"))?;
        let records: Vec<MessageRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse mail store: {path}"))?;

        log::info!("loaded {} messages from {path}", records.len());
        Ok(MailStore::new(records))
    }

    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MessageSearch for MailStore {
    /// Case-insensitive substring match against the fields the classifier
    /// reads, plus the sender. Store order preserved, capped at
    /// `max_results`.
    fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<MessageRecord>> {
        let needle = query.to_lowercase();

        let hits: Vec<MessageRecord> = self
            .records
            .iter()
            .filter(|record| {
                [
                    record.subject.as_deref(),
                    record.snippet.as_deref(),
                    record.body.as_deref(),
                    record.from.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .take(max_results)
            .cloned()
            .collect();

        log::debug!("query '{query}' matched {} messages", hits.len());
        Ok(hits)
    }
}
