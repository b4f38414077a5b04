use crate::config::KeywordConfig;
use crate::message::MessageRecord;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageStatus {
    Complete,
    Error,
    PackageSuccess,
    PackageFailed,
    Unknown,
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageStatus::Complete => "COMPLETE",
            MessageStatus::Error => "ERROR",
            MessageStatus::PackageSuccess => "PACKAGE_SUCCESS",
            MessageStatus::PackageFailed => "PACKAGE_FAILED",
            MessageStatus::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub status: MessageStatus,
    /// Heuristic score in [0.0, 1.0], not a calibrated probability.
    pub confidence: f64,
    /// Which configured keywords appear at least once, for display only;
    /// the decision uses occurrence counts, not these lists.
    pub matched_complete: Vec<String>,
    pub matched_error: Vec<String>,
    pub order_number: Option<String>,
    /// Pass-through slot read by the reconciler. The classifier never
    /// fills it in.
    pub quantity: Option<String>,
}

/// A record paired with its classification, in the order analyzed.
#[derive(Debug, Clone)]
pub struct AnalyzedMessage {
    pub record: MessageRecord,
    pub result: ClassificationResult,
}

/// Per-status counts over one analyzed batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub complete: usize,
    pub error: usize,
    pub package_success: usize,
    pub package_failed: usize,
    pub unknown: usize,
    pub total: usize,
}

impl StatusSummary {
    /// Messages signalling a good outcome, generic or package-level.
    pub fn delivered_total(&self) -> usize {
        self.complete + self.package_success
    }

    pub fn failed_total(&self) -> usize {
        self.error + self.package_failed
    }
}

/// Extraction cascade, most specific label first, bare digit run last.
/// The overlap between the `order`-labelled patterns is intentional:
/// evaluation order is the tie-breaker on ambiguous text, so a pattern
/// must not be collapsed into its neighbours even when they accept the
/// same strings.
const ORDER_NUMBER_PATTERNS: [&str; 7] = [
    r"order\s*number\s*([0-9]+)",
    r"order\s*#?\s*:?\s*([0-9]+)",
    r"order\s*number\s*:?\s*([0-9]+)",
    r"order\s*id\s*:?\s*([0-9]+)",
    r"#([0-9]+)",
    r"order\s*([0-9]+)",
    r"([0-9]{10,})",
];

pub struct ContentClassifier {
    keywords: KeywordConfig,
    order_patterns: Vec<Regex>,
}

impl ContentClassifier {
    pub fn new(keywords: KeywordConfig) -> anyhow::Result<Self> {
        // Compile the cascade up front so classification itself stays total.
        let mut order_patterns = Vec::with_capacity(ORDER_NUMBER_PATTERNS.len());
        for pattern in ORDER_NUMBER_PATTERNS {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| anyhow::anyhow!("Invalid order pattern '{}': {}", pattern, e))?;
            order_patterns.push(regex);
        }

        Ok(ContentClassifier {
            keywords,
            order_patterns,
        })
    }

    /// Classify one record. Total over arbitrary and missing fields.
    pub fn classify(&self, record: &MessageRecord) -> ClassificationResult {
        let content = record.combined_text();
        let content_lower = content.to_lowercase();

        let (status, confidence) = self.score(record, &content_lower);
        let (matched_complete, matched_error) = self.matched_keywords(&content_lower);

        ClassificationResult {
            status,
            confidence,
            matched_complete,
            matched_error,
            order_number: self.extract_order_number(record),
            quantity: None,
        }
    }

    fn score(&self, record: &MessageRecord, content_lower: &str) -> (MessageStatus, f64) {
        let subject = record.subject.as_deref().unwrap_or("").to_lowercase();
        log::debug!("classifying subject: {subject}");

        // Subject phrases decide outright; body content never overrides them.
        for phrase in &self.keywords.package_success {
            if subject.contains(&phrase.to_lowercase()) {
                log::debug!("subject matched package-success phrase '{phrase}'");
                return (MessageStatus::PackageSuccess, 1.0);
            }
        }
        for phrase in &self.keywords.package_failed {
            if subject.contains(&phrase.to_lowercase()) {
                log::debug!("subject matched package-failed phrase '{phrase}'");
                return (MessageStatus::PackageFailed, 1.0);
            }
        }

        let complete_count = count_keywords(content_lower, &self.keywords.complete);
        let error_count = count_keywords(content_lower, &self.keywords.error);

        if complete_count > 0 && error_count == 0 {
            (
                MessageStatus::Complete,
                (complete_count as f64 * 0.3).min(1.0),
            )
        } else if error_count > 0 && complete_count == 0 {
            (MessageStatus::Error, (error_count as f64 * 0.3).min(1.0))
        } else if complete_count > 0 && error_count > 0 {
            // Mixed signals: the larger count wins, ties go to Complete.
            if complete_count >= error_count {
                (
                    MessageStatus::Complete,
                    (complete_count as f64 * 0.2).min(0.8),
                )
            } else {
                (MessageStatus::Error, (error_count as f64 * 0.2).min(0.8))
            }
        } else {
            (MessageStatus::Unknown, 0.0)
        }
    }

    /// First capture of the first cascade pattern that matches anywhere in
    /// the combined text. None when nothing matches.
    pub fn extract_order_number(&self, record: &MessageRecord) -> Option<String> {
        let content = record.combined_text();

        for regex in &self.order_patterns {
            if let Some(captures) = regex.captures(&content) {
                if let Some(group) = captures.get(1) {
                    return Some(group.as_str().to_string());
                }
            }
        }

        None
    }

    /// Replace either generic keyword list wholesale; `None` keeps the
    /// current list. Takes effect for classify calls issued afterwards.
    /// Requires exclusive access, so it cannot race an in-flight classify.
    pub fn update_keywords(&mut self, complete: Option<Vec<String>>, error: Option<Vec<String>>) {
        if let Some(complete) = complete {
            self.keywords.complete = complete;
        }
        if let Some(error) = error {
            self.keywords.error = error;
        }
    }

    fn matched_keywords(&self, content_lower: &str) -> (Vec<String>, Vec<String>) {
        let matched_complete = self
            .keywords
            .complete
            .iter()
            .filter(|keyword| content_lower.contains(&keyword.to_lowercase()))
            .cloned()
            .collect();
        let matched_error = self
            .keywords
            .error
            .iter()
            .filter(|keyword| content_lower.contains(&keyword.to_lowercase()))
            .cloned()
            .collect();
        (matched_complete, matched_error)
    }

    /// Classify a batch, preserving input order.
    pub fn analyze(&self, records: Vec<MessageRecord>) -> Vec<AnalyzedMessage> {
        records
            .into_iter()
            .map(|record| {
                let result = self.classify(&record);
                AnalyzedMessage { record, result }
            })
            .collect()
    }

    pub fn status_summary(messages: &[AnalyzedMessage]) -> StatusSummary {
        let mut summary = StatusSummary {
            total: messages.len(),
            ..Default::default()
        };

        for message in messages {
            match message.result.status {
                MessageStatus::Complete => summary.complete += 1,
                MessageStatus::Error => summary.error += 1,
                MessageStatus::PackageSuccess => summary.package_success += 1,
                MessageStatus::PackageFailed => summary.package_failed += 1,
                MessageStatus::Unknown => summary.unknown += 1,
            }
        }

        summary
    }

    pub fn filter_by_status(
        messages: &[AnalyzedMessage],
        status: MessageStatus,
    ) -> Vec<&AnalyzedMessage> {
        messages
            .iter()
            .filter(|message| message.result.status == status)
            .collect()
    }
}

/// Non-overlapping occurrence counts summed across the keyword list.
/// Empty keywords contribute nothing.
fn count_keywords(content_lower: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .map(|keyword| {
            let keyword = keyword.to_lowercase();
            if keyword.is_empty() {
                0
            } else {
                content_lower.matches(keyword.as_str()).count()
            }
        })
        .sum()
}
