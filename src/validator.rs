//! Schema and data quality validation for the input record sets

use serde::Serialize;
use tracing::{error, info, warn};

use crate::types::client::Client;
use crate::types::transaction::Transaction;

/// Outcome of validating the two input tables.
///
/// Blocking errors (missing mandatory columns) halt the pipeline before
/// enrichment. Warnings count per-row data quality findings; the affected
/// rows stay in the batch so downstream consumers can decide policy.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub transactions_valid: bool,
    pub clients_valid: bool,
    /// Blocking schema errors
    pub errors: Vec<String>,
    /// Non-blocking data quality findings
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether the run must stop before enrichment.
    pub fn is_blocking(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Validate both input tables against their mandatory columns and count
/// data quality anomalies.
///
/// With statically-typed rows, a mandatory column is absent when every row
/// of a non-empty table carries no value for it; per-row gaps are counted
/// warnings.
pub fn validate(transactions: &[Transaction], clients: &[Client]) -> ValidationReport {
    let mut report = ValidationReport {
        transactions_valid: true,
        clients_valid: true,
        errors: Vec::new(),
        warnings: Vec::new(),
    };

    check_transaction_columns(transactions, &mut report);
    check_client_columns(clients, &mut report);
    collect_quality_warnings(transactions, clients, &mut report);

    for message in &report.errors {
        error!(%message, "Schema validation error");
    }
    for message in &report.warnings {
        warn!(%message, "Data quality warning");
    }
    if !report.is_blocking() {
        info!(
            transactions = transactions.len(),
            clients = clients.len(),
            warnings = report.warnings.len(),
            "Input tables validated"
        );
    }

    report
}

fn check_transaction_columns(transactions: &[Transaction], report: &mut ValidationReport) {
    let missing: Vec<&str> = [
        (
            "transaction_id",
            column_missing(transactions, |t| t.transaction_id.is_none()),
        ),
        (
            "client_id",
            column_missing(transactions, |t| t.client_id.is_none()),
        ),
        ("amount", column_missing(transactions, |t| t.amount.is_none())),
        (
            "beneficiary_country",
            column_missing(transactions, |t| t.beneficiary_country.is_none()),
        ),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    if !missing.is_empty() {
        report.transactions_valid = false;
        report.errors.push(format!(
            "transactions: missing mandatory columns [{}]",
            missing.join(", ")
        ));
    }
}

fn check_client_columns(clients: &[Client], report: &mut ValidationReport) {
    let missing: Vec<&str> = [
        ("client_id", column_missing(clients, |c| c.client_id.is_none())),
        ("risk_tier", column_missing(clients, |c| c.risk_tier.is_none())),
        ("is_pep", column_missing(clients, |c| c.is_pep.is_none())),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    if !missing.is_empty() {
        report.clients_valid = false;
        report.errors.push(format!(
            "clients: missing mandatory columns [{}]",
            missing.join(", ")
        ));
    }
}

fn collect_quality_warnings(
    transactions: &[Transaction],
    clients: &[Client],
    report: &mut ValidationReport,
) {
    let missing_tx_ids = transactions
        .iter()
        .filter(|t| t.transaction_id.is_none())
        .count();
    if report.transactions_valid && missing_tx_ids > 0 {
        report
            .warnings
            .push(format!("{missing_tx_ids} transactions without transaction_id"));
    }

    let missing_client_refs = transactions.iter().filter(|t| t.client_id.is_none()).count();
    if report.transactions_valid && missing_client_refs > 0 {
        report
            .warnings
            .push(format!("{missing_client_refs} transactions without client_id"));
    }

    let negative_amounts = transactions
        .iter()
        .filter(|t| matches!(t.amount, Some(a) if a < 0.0))
        .count();
    if negative_amounts > 0 {
        report
            .warnings
            .push(format!("{negative_amounts} transactions with negative amount"));
    }

    let unusable_dates = transactions.iter().filter(|t| t.date.is_none()).count();
    if unusable_dates > 0 {
        report.warnings.push(format!(
            "{unusable_dates} transactions without a usable date"
        ));
    }

    let missing_client_ids = clients.iter().filter(|c| c.client_id.is_none()).count();
    if report.clients_valid && missing_client_ids > 0 {
        report
            .warnings
            .push(format!("{missing_client_ids} clients without client_id"));
    }
}

// A mandatory column is treated as absent when a non-empty table has no
// value for it in any row.
fn column_missing<T>(rows: &[T], is_none: impl Fn(&T) -> bool) -> bool {
    !rows.is_empty() && rows.iter().all(is_none)
}

/// Drop duplicate transaction ids ahead of enrichment, first occurrence
/// wins. Rows without an id cannot be keyed and are all kept.
pub fn dedupe_transactions(transactions: Vec<Transaction>) -> (Vec<Transaction>, usize) {
    let mut seen = std::collections::HashSet::new();
    let initial = transactions.len();

    let kept: Vec<Transaction> = transactions
        .into_iter()
        .filter(|tx| match tx.transaction_id.as_deref() {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect();

    let removed = initial - kept.len();
    if removed > 0 {
        info!(removed, "Duplicate transaction ids dropped");
    }
    (kept, removed)
}
