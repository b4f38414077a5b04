use crate::classifier::AnalyzedMessage;
use crate::reconciler::{OrderStatus, ReconciliationReport};

use anyhow::Context;

/// Read an order number input file: one identifier per line, blank lines
/// ignored, no quoting.
pub fn read_order_numbers(path: &str) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read order number file: {path}"))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Render the reconciliation report. The layout is fixed and the body
/// carries no timestamps, so identical inputs render byte-identically.
pub fn render_reconciliation(report: &ReconciliationReport) -> String {
    let mut out = String::new();

    out.push_str("ORDER SEARCH RESULTS\n");
    out.push_str("==================================================\n");

    for status in [
        OrderStatus::Success,
        OrderStatus::Failed,
        OrderStatus::NotFound,
    ] {
        out.push('\n');
        out.push_str(&format!("{status}:\n"));
        out.push_str("--------------------\n");

        let outcomes = report.outcomes_with(status);
        if outcomes.is_empty() {
            out.push_str("(none)\n");
            continue;
        }

        for outcome in &outcomes {
            match outcome.quantity.as_deref() {
                Some(quantity) => {
                    out.push_str(&format!(
                        "{} - quantity: {}\n",
                        outcome.order_number, quantity
                    ));
                }
                None => out.push_str(&format!("{}\n", outcome.order_number)),
            }
        }

        if report.has_quantities(status) {
            out.push_str(&format!(
                "Total {status} quantity: {}\n",
                report.quantity_total(status)
            ));
        }
    }

    out.push('\n');
    out.push_str("Totals:\n");
    for status in [
        OrderStatus::Success,
        OrderStatus::Failed,
        OrderStatus::NotFound,
    ] {
        out.push_str(&format!("- {status}: {} orders\n", report.count(status)));
    }

    out
}

pub fn write_reconciliation(report: &ReconciliationReport, path: &str) -> anyhow::Result<()> {
    std::fs::write(path, render_reconciliation(report))
        .with_context(|| format!("Failed to write report file: {path}"))?;
    log::info!("report written to {path}");
    Ok(())
}

/// Render an analyzed batch for export: one numbered entry per message
/// with its classification details.
pub fn render_analysis(messages: &[AnalyzedMessage]) -> String {
    let mut out = String::new();

    out.push_str("MESSAGE ANALYSIS RESULTS\n");
    out.push_str("==================================================\n\n");

    for (index, message) in messages.iter().enumerate() {
        let record = &message.record;
        let result = &message.result;

        out.push_str(&format!(
            "{}. {}\n",
            index + 1,
            record.subject.as_deref().unwrap_or("(no subject)")
        ));
        out.push_str(&format!(
            "   From: {}\n",
            record.from.as_deref().unwrap_or("(unknown)")
        ));
        out.push_str(&format!(
            "   Date: {}\n",
            record.date.as_deref().unwrap_or("(unknown)")
        ));
        out.push_str(&format!("   Status: {}\n", result.status));

        if let Some(order_number) = result.order_number.as_deref() {
            out.push_str(&format!("   Order number: {order_number}\n"));
        }
        if !result.matched_complete.is_empty() {
            out.push_str(&format!(
                "   Complete keywords: {}\n",
                result.matched_complete.join(", ")
            ));
        }
        if !result.matched_error.is_empty() {
            out.push_str(&format!(
                "   Error keywords: {}\n",
                result.matched_error.join(", ")
            ));
        }

        out.push('\n');
    }

    out
}

pub fn write_analysis(messages: &[AnalyzedMessage], path: &str) -> anyhow::Result<()> {
    std::fs::write(path, render_analysis(messages))
        .with_context(|| format!("Failed to write analysis file: {path}"))?;
    log::info!("analysis written to {path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciler::OrderOutcome;
    use std::io::Write;

    fn outcome(order: &str, status: OrderStatus, quantity: Option<&str>) -> OrderOutcome {
        OrderOutcome {
            order_number: order.to_string(),
            status,
            quantity: quantity.map(String::from),
        }
    }

    #[test]
    fn test_read_order_numbers_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order_numbers.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "100001\n\n  \n100002\n 100003 \n").unwrap();

        let numbers = read_order_numbers(path.to_str().unwrap()).unwrap();
        assert_eq!(numbers, vec!["100001", "100002", "100003"]);
    }

    #[test]
    fn test_read_order_numbers_missing_file_is_error() {
        assert!(read_order_numbers("/nonexistent/order_numbers.txt").is_err());
    }

    #[test]
    fn test_render_sections_and_totals() {
        let report = ReconciliationReport {
            outcomes: vec![
                outcome("A", OrderStatus::Success, Some("4")),
                outcome("B", OrderStatus::Success, None),
                outcome("C", OrderStatus::Failed, None),
                outcome("D", OrderStatus::NotFound, None),
            ],
        };

        let rendered = render_reconciliation(&report);
        assert!(rendered.contains("SUCCESS:\n"));
        assert!(rendered.contains("A - quantity: 4\n"));
        assert!(rendered.contains("Total SUCCESS quantity: 4\n"));
        // No quantities in FAILED, so no quantity total line for it.
        assert!(!rendered.contains("Total FAILED quantity"));
        assert!(rendered.contains("- SUCCESS: 2 orders\n"));
        assert!(rendered.contains("- FAILED: 1 orders\n"));
        assert!(rendered.contains("- NOT_FOUND: 1 orders\n"));
    }

    #[test]
    fn test_render_empty_sections() {
        let report = ReconciliationReport::default();
        let rendered = render_reconciliation(&report);
        assert!(rendered.contains("SUCCESS:\n--------------------\n(none)\n"));
        assert!(rendered.contains("- NOT_FOUND: 0 orders\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = ReconciliationReport {
            outcomes: vec![
                outcome("A", OrderStatus::Success, Some("1")),
                outcome("B", OrderStatus::NotFound, None),
            ],
        };
        assert_eq!(render_reconciliation(&report), render_reconciliation(&report));
    }

    #[test]
    fn test_render_analysis_includes_classification_details() {
        use crate::classifier::ContentClassifier;
        use crate::config::KeywordConfig;
        use crate::message::MessageRecord;

        let classifier = ContentClassifier::new(KeywordConfig::default()).unwrap();
        let analyzed = classifier.analyze(vec![MessageRecord {
            subject: Some("Your package has arrived".to_string()),
            from: Some("courier@shop.example".to_string()),
            body: Some("Order Number 00474270370383".to_string()),
            ..Default::default()
        }]);

        let rendered = render_analysis(&analyzed);
        assert!(rendered.contains("1. Your package has arrived\n"));
        assert!(rendered.contains("   From: courier@shop.example\n"));
        assert!(rendered.contains("   Status: PACKAGE_SUCCESS\n"));
        assert!(rendered.contains("   Order number: 00474270370383\n"));

        // Absent fields render placeholders instead of failing.
        let bare = classifier.analyze(vec![MessageRecord::default()]);
        let rendered = render_analysis(&bare);
        assert!(rendered.contains("1. (no subject)\n"));
        assert!(rendered.contains("   Status: UNKNOWN\n"));
    }

    #[test]
    fn test_write_reconciliation_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        let report = ReconciliationReport {
            outcomes: vec![outcome("A", OrderStatus::Success, None)],
        };

        write_reconciliation(&report, path.to_str().unwrap()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_reconciliation(&report));
    }
}
