pub mod classifier;
pub mod config;
pub mod filter;
pub mod mailbox;
pub mod message;
pub mod reconciler;
pub mod report;

pub use classifier::{
    AnalyzedMessage, ClassificationResult, ContentClassifier, MessageStatus, StatusSummary,
};
pub use config::{Config, KeywordConfig};
pub use filter::{FilterOptions, RecordFilter};
pub use mailbox::MailStore;
pub use message::MessageRecord;
pub use reconciler::{
    MessageSearch, OrderOutcome, OrderReconciler, OrderStatus, ReconciliationReport,
};
