//! Ordered battery of independent risk detectors

use tracing::{debug, info};

use crate::config::ScreeningConfig;
use crate::rules::structuring;
use crate::types::alert::{AlertSeverity, AlertTag};
use crate::types::client::RiskTier;
use crate::types::transaction::EnrichedTransaction;

/// Applies the configured detectors to an enriched batch and classifies
/// every row.
///
/// Detectors are independent: any subset may fire for a row, and the final
/// score is the sum of the fired weights whatever the execution order. Only
/// the order of the appended tags follows the execution order, a cosmetic
/// non-determinism of the text form.
pub struct RuleEngine {
    config: ScreeningConfig,
}

impl RuleEngine {
    pub fn new(config: ScreeningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Run every detector over the batch, then classify each row.
    ///
    /// Engine-populated fields are reset at entry, so applying the engine
    /// to an already scored batch yields the same result instead of double
    /// counting.
    pub fn apply_all(&self, rows: &mut [EnrichedTransaction]) {
        for row in rows.iter_mut() {
            row.alerts.clear();
            row.risk_score = 0;
            row.severity = AlertSeverity::Low;
        }

        self.apply_regulatory_threshold(rows);
        self.apply_client_risk(rows);
        self.apply_pep(rows);
        self.apply_sanctioned_country(rows);
        self.apply_exceptional_amount(rows);
        self.apply_structuring(rows);
        self.classify(rows);

        let alerted = rows.iter().filter(|r| r.has_alerts()).count();
        info!(rows = rows.len(), alerted, "Compliance rules applied");
    }

    fn flag(&self, row: &mut EnrichedTransaction, tag: AlertTag) {
        row.alerts.push(tag);
        row.risk_score += self.config.weight(tag);
    }

    fn apply_regulatory_threshold(&self, rows: &mut [EnrichedTransaction]) {
        let threshold = self.config.thresholds.regulatory;
        let mut fired = 0usize;
        for row in rows.iter_mut() {
            if matches!(row.transaction.amount, Some(a) if a > threshold) {
                self.flag(row, AlertTag::RegulatoryThreshold);
                fired += 1;
            }
        }
        if fired > 0 {
            debug!(fired, threshold, "Amounts above the regulatory threshold");
        }
    }

    fn apply_client_risk(&self, rows: &mut [EnrichedTransaction]) {
        let mut fired = 0usize;
        for row in rows.iter_mut() {
            if row.risk_tier == RiskTier::High {
                self.flag(row, AlertTag::HighRiskClient);
                fired += 1;
            }
        }
        if fired > 0 {
            debug!(fired, "Transactions of high risk clients");
        }
    }

    fn apply_pep(&self, rows: &mut [EnrichedTransaction]) {
        let mut fired = 0usize;
        for row in rows.iter_mut() {
            if row.is_pep {
                self.flag(row, AlertTag::PepClient);
                fired += 1;
            }
        }
        if fired > 0 {
            debug!(fired, "Transactions of PEP clients");
        }
    }

    fn apply_sanctioned_country(&self, rows: &mut [EnrichedTransaction]) {
        let mut fired = 0usize;
        for row in rows.iter_mut() {
            let sanctioned = row
                .transaction
                .beneficiary_country
                .as_deref()
                .is_some_and(|country| self.config.is_sanctioned(country));
            if sanctioned {
                self.flag(row, AlertTag::SanctionedCountry);
                fired += 1;
            }
        }
        if fired > 0 {
            debug!(fired, "Transfers towards sanctioned countries");
        }
    }

    fn apply_exceptional_amount(&self, rows: &mut [EnrichedTransaction]) {
        let threshold = self.config.thresholds.exceptional;
        let mut fired = 0usize;
        for row in rows.iter_mut() {
            if matches!(row.transaction.amount, Some(a) if a > threshold) {
                self.flag(row, AlertTag::ExceptionalAmount);
                fired += 1;
            }
        }
        if fired > 0 {
            debug!(fired, threshold, "Exceptional amounts");
        }
    }

    fn apply_structuring(&self, rows: &mut [EnrichedTransaction]) {
        let flagged = structuring::detect(rows, &self.config);
        if !flagged.is_empty() {
            debug!(fired = flagged.len(), "Structuring suspicions");
        }
        for idx in flagged {
            self.flag(&mut rows[idx], AlertTag::StructuringSuspicion);
        }
    }

    fn classify(&self, rows: &mut [EnrichedTransaction]) {
        for row in rows.iter_mut() {
            row.severity = AlertSeverity::from_score(row.risk_score);
        }
    }
}
