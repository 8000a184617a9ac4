//! Batch-level reporting aggregates

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::alert::{AlertSeverity, AlertTag};
use crate::types::transaction::EnrichedTransaction;

/// Counts and sums computed over a fully scored batch, consumed by the
/// caller's reporting and export layers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScreeningSummary {
    pub total_transactions: usize,

    /// Rows with at least one alert tag
    pub alerted_transactions: usize,

    /// Row count per severity, for the severities that occur
    pub by_severity: BTreeMap<AlertSeverity, usize>,

    /// Sum of amounts over alerted rows
    pub alerted_amount: f64,

    /// Occurrences per tag. A row with three tags contributes three counts.
    pub by_tag: BTreeMap<AlertTag, usize>,
}

/// Aggregate a scored batch. Pure and side-effect free.
pub fn summarize(rows: &[EnrichedTransaction]) -> ScreeningSummary {
    let mut summary = ScreeningSummary {
        total_transactions: rows.len(),
        ..ScreeningSummary::default()
    };

    for row in rows {
        *summary.by_severity.entry(row.severity).or_insert(0) += 1;

        if row.has_alerts() {
            summary.alerted_transactions += 1;
            summary.alerted_amount += row.transaction.amount.unwrap_or(0.0);
            for &tag in &row.alerts {
                *summary.by_tag.entry(tag).or_insert(0) += 1;
            }
        }
    }

    summary
}
