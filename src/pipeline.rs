//! End-to-end screening pipeline over an in-memory batch

use anyhow::{bail, Result};
use serde::Serialize;
use tracing::info;

use crate::config::ScreeningConfig;
use crate::enricher::{self, EnrichmentReport};
use crate::rules::RuleEngine;
use crate::summary::{self, ScreeningSummary};
use crate::types::alert::Alert;
use crate::types::client::Client;
use crate::types::transaction::{EnrichedTransaction, Transaction};
use crate::validator::{self, ValidationReport};

/// Everything a screening run hands back to the orchestrating caller, which
/// owns export and formatting.
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningOutput {
    /// One scored row per surviving input transaction
    pub rows: Vec<EnrichedTransaction>,

    /// Alert records for flagged rows, most severe first, ties broken by
    /// score descending
    pub alerts: Vec<Alert>,

    pub summary: ScreeningSummary,

    pub validation: ValidationReport,

    pub enrichment: EnrichmentReport,
}

/// Synchronous batch pipeline: validate, dedupe, enrich, score, classify,
/// summarize.
///
/// A run is a pure function of the two input tables and the configuration;
/// nothing persists across invocations.
pub struct ScreeningPipeline {
    engine: RuleEngine,
}

impl ScreeningPipeline {
    pub fn new(config: ScreeningConfig) -> Self {
        Self {
            engine: RuleEngine::new(config),
        }
    }

    pub fn config(&self) -> &ScreeningConfig {
        self.engine.config()
    }

    /// Screen a batch of transactions against the client registry.
    ///
    /// Fails only on blocking schema errors; every per-row anomaly is
    /// reported through the returned output instead.
    pub fn run(
        &self,
        transactions: Vec<Transaction>,
        clients: Vec<Client>,
    ) -> Result<ScreeningOutput> {
        let validation = validator::validate(&transactions, &clients);
        if validation.is_blocking() {
            bail!("Schema validation failed: {}", validation.errors.join("; "));
        }

        let (transactions, _removed) = validator::dedupe_transactions(transactions);
        let (mut rows, enrichment) = enricher::enrich(transactions, &clients);

        self.engine.apply_all(&mut rows);

        let summary = summary::summarize(&rows);

        let mut alerts: Vec<Alert> = rows
            .iter()
            .filter(|row| row.has_alerts())
            .map(Alert::from_row)
            .collect();
        alerts.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(b.risk_score.cmp(&a.risk_score))
        });

        info!(
            total = summary.total_transactions,
            alerted = summary.alerted_transactions,
            "Screening run complete"
        );

        Ok(ScreeningOutput {
            rows,
            alerts,
            summary,
            validation,
            enrichment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::alert::{AlertSeverity, AlertTag};
    use crate::types::client::RiskTier;
    use chrono::NaiveDate;

    fn clients() -> Vec<Client> {
        vec![
            Client::new("CLT-001", RiskTier::Low, false),
            Client::new("CLT-002", RiskTier::High, true),
        ]
    }

    fn pipeline() -> ScreeningPipeline {
        ScreeningPipeline::new(ScreeningConfig::default())
    }

    #[test]
    fn test_blocking_validation_halts_run() {
        // No transaction carries a beneficiary country: blocking.
        let transactions = vec![
            Transaction::new("TXN-1", "CLT-001", 100.0),
            Transaction::new("TXN-2", "CLT-001", 200.0),
        ];

        let result = pipeline().run(transactions, clients());
        let error = result.unwrap_err().to_string();
        assert!(error.contains("Schema validation failed"));
        assert!(error.contains("beneficiary_country"));
    }

    #[test]
    fn test_full_run() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let transactions = vec![
            // Clean retail payment
            Transaction::new("TXN-1", "CLT-001", 250.0)
                .with_date(day)
                .with_beneficiary_country("FR"),
            // High risk PEP client, huge transfer to a sanctioned country
            Transaction::new("TXN-2", "CLT-002", 150_000.0)
                .with_date(day)
                .with_beneficiary_country("RU"),
            // Duplicate id, dropped before enrichment
            Transaction::new("TXN-2", "CLT-002", 1.0)
                .with_date(day)
                .with_beneficiary_country("FR"),
            // Unknown client, above the regulatory threshold
            Transaction::new("TXN-3", "CLT-999", 12_000.0)
                .with_date(day)
                .with_beneficiary_country("DE"),
        ];

        let output = pipeline().run(transactions, clients()).unwrap();

        assert_eq!(output.rows.len(), 3);
        assert_eq!(output.summary.total_transactions, 3);
        assert_eq!(output.summary.alerted_transactions, 2);
        assert_eq!(output.enrichment.matched, 2);

        let critical = &output.rows[1];
        assert_eq!(critical.risk_score, 245);
        assert_eq!(critical.severity, AlertSeverity::Critical);

        let unknown = &output.rows[2];
        assert_eq!(unknown.risk_tier, RiskTier::Unknown);
        assert!(!unknown.is_pep);
        assert_eq!(unknown.risk_score, 30);
        assert_eq!(unknown.severity, AlertSeverity::Medium);

        // Alerts come back most severe first.
        assert_eq!(output.alerts.len(), 2);
        assert_eq!(output.alerts[0].transaction_id.as_deref(), Some("TXN-2"));
        assert_eq!(output.alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(output.alerts[1].transaction_id.as_deref(), Some("TXN-3"));
    }

    #[test]
    fn test_alerts_sorted_by_severity_then_score() {
        let transactions = vec![
            Transaction::new("TXN-1", "CLT-001", 12_000.0).with_beneficiary_country("FR"),
            Transaction::new("TXN-2", "CLT-001", 500.0).with_beneficiary_country("RU"),
            Transaction::new("TXN-3", "CLT-001", 150_000.0).with_beneficiary_country("IR"),
        ];

        let output = pipeline().run(transactions, clients()).unwrap();

        let ids: Vec<&str> = output
            .alerts
            .iter()
            .filter_map(|a| a.transaction_id.as_deref())
            .collect();
        // TXN-3 scores 170, TXN-2 scores 100 (both Critical), TXN-1 scores
        // 30 (Medium).
        assert_eq!(ids, vec!["TXN-3", "TXN-2", "TXN-1"]);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let make_batch = || {
            vec![
                Transaction::new("TXN-1", "CLT-002", 9_000.0)
                    .with_date(day)
                    .with_beneficiary_country("FR"),
                Transaction::new("TXN-2", "CLT-002", 8_000.0)
                    .with_date(day)
                    .with_beneficiary_country("FR"),
            ]
        };

        let pipeline = pipeline();
        let first = pipeline.run(make_batch(), clients()).unwrap();
        let second = pipeline.run(make_batch(), clients()).unwrap();

        let scores = |out: &ScreeningOutput| -> Vec<u32> {
            out.rows.iter().map(|r| r.risk_score).collect()
        };
        assert_eq!(scores(&first), scores(&second));
        // Same-day structuring pair plus high risk PEP client on each row.
        assert!(first.rows[0].has_tag(AlertTag::StructuringSuspicion));
        assert_eq!(first.rows[0].risk_score, 35 + 25 + 50);
    }

    #[test]
    fn test_negative_amount_passes_through() {
        let transactions =
            vec![Transaction::new("TXN-1", "CLT-001", -500.0).with_beneficiary_country("FR")];

        let output = pipeline().run(transactions, clients()).unwrap();
        assert_eq!(output.rows.len(), 1);
        assert_eq!(output.rows[0].transaction.amount, Some(-500.0));
        assert!(!output.rows[0].has_alerts());
        assert!(output
            .validation
            .warnings
            .iter()
            .any(|w| w.contains("negative amount")));
    }
}
