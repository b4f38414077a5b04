use crate::classifier::{ContentClassifier, MessageStatus};
use crate::message::MessageRecord;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Injected search capability. One call per order number; a failing call
/// must be recoverable by the caller.
pub trait MessageSearch {
    fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<MessageRecord>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Success,
    Failed,
    NotFound,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Success => "SUCCESS",
            OrderStatus::Failed => "FAILED",
            OrderStatus::NotFound => "NOT_FOUND",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderOutcome {
    pub order_number: String,
    pub status: OrderStatus,
    pub quantity: Option<String>,
}

/// One outcome per input order number, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub outcomes: Vec<OrderOutcome>,
}

impl ReconciliationReport {
    pub fn count(&self, status: OrderStatus) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .count()
    }

    pub fn outcomes_with(&self, status: OrderStatus) -> Vec<&OrderOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.status == status)
            .collect()
    }

    /// Sum of the quantities recorded for a status. Absent and non-numeric
    /// quantities are skipped.
    pub fn quantity_total(&self, status: OrderStatus) -> i64 {
        self.outcomes_with(status)
            .iter()
            .filter_map(|outcome| outcome.quantity.as_deref())
            .filter_map(|quantity| quantity.trim().parse::<i64>().ok())
            .sum()
    }

    pub fn has_quantities(&self, status: OrderStatus) -> bool {
        self.outcomes_with(status)
            .iter()
            .any(|outcome| outcome.quantity.is_some())
    }
}

pub struct OrderReconciler {
    max_results: usize,
}

impl OrderReconciler {
    pub fn new(max_results: usize) -> Self {
        OrderReconciler { max_results }
    }

    /// Drive every order number through search and classification,
    /// strictly sequentially and in input order. The report carries
    /// exactly one outcome per input, even when individual searches fail.
    pub fn reconcile(
        &self,
        order_numbers: &[String],
        search: &dyn MessageSearch,
        classifier: &ContentClassifier,
    ) -> ReconciliationReport {
        let total = order_numbers.len();
        let mut outcomes = Vec::with_capacity(total);

        for (index, order_number) in order_numbers.iter().enumerate() {
            log::info!("[{}/{total}] searching order {order_number}", index + 1);

            let candidates = match search.search(order_number, self.max_results) {
                Ok(candidates) => candidates,
                Err(e) => {
                    // A failed lookup must not sink the batch.
                    log::warn!("search failed for order {order_number}: {e}");
                    Vec::new()
                }
            };

            let outcome = resolve_order(order_number, &candidates, classifier);
            log::info!("order {order_number}: {}", outcome.status);
            outcomes.push(outcome);
        }

        ReconciliationReport { outcomes }
    }
}

/// First candidate carrying a package status is authoritative; later
/// candidates are ignored. No authoritative candidate means NOT_FOUND.
fn resolve_order(
    order_number: &str,
    candidates: &[MessageRecord],
    classifier: &ContentClassifier,
) -> OrderOutcome {
    for record in candidates {
        let result = classifier.classify(record);
        match result.status {
            MessageStatus::PackageSuccess => {
                return OrderOutcome {
                    order_number: order_number.to_string(),
                    status: OrderStatus::Success,
                    quantity: result.quantity,
                };
            }
            MessageStatus::PackageFailed => {
                return OrderOutcome {
                    order_number: order_number.to_string(),
                    status: OrderStatus::Failed,
                    quantity: result.quantity,
                };
            }
            _ => {}
        }
    }

    OrderOutcome {
        order_number: order_number.to_string(),
        status: OrderStatus::NotFound,
        quantity: None,
    }
}
