//! Alert tags, severities and the alert record emitted for flagged rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::transaction::EnrichedTransaction;

/// Regulatory alert tag appended by a detector.
///
/// Serialized with the wire codes expected by compliance exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertTag {
    /// Amount above the regulatory reporting threshold
    #[serde(rename = "SEUIL_REGLEMENTAIRE")]
    RegulatoryThreshold,

    /// Ordering client is in the High risk tier
    #[serde(rename = "CLIENT_RISQUE_ELEVE")]
    HighRiskClient,

    /// Ordering client is a politically exposed person
    #[serde(rename = "CLIENT_PEP")]
    PepClient,

    /// Beneficiary country is under sanctions
    #[serde(rename = "PAYS_SANCTIONNE")]
    SanctionedCountry,

    /// Amount above the exceptional-amount threshold
    #[serde(rename = "MONTANT_EXCEPTIONNEL")]
    ExceptionalAmount,

    /// Same-day split payments collectively above the reporting threshold
    #[serde(rename = "SUSPICION_STRUCTURING")]
    StructuringSuspicion,
}

impl AlertTag {
    pub const ALL: [AlertTag; 6] = [
        AlertTag::RegulatoryThreshold,
        AlertTag::HighRiskClient,
        AlertTag::PepClient,
        AlertTag::SanctionedCountry,
        AlertTag::ExceptionalAmount,
        AlertTag::StructuringSuspicion,
    ];

    /// Wire code used in exports and configuration files.
    pub fn code(self) -> &'static str {
        match self {
            AlertTag::RegulatoryThreshold => "SEUIL_REGLEMENTAIRE",
            AlertTag::HighRiskClient => "CLIENT_RISQUE_ELEVE",
            AlertTag::PepClient => "CLIENT_PEP",
            AlertTag::SanctionedCountry => "PAYS_SANCTIONNE",
            AlertTag::ExceptionalAmount => "MONTANT_EXCEPTIONNEL",
            AlertTag::StructuringSuspicion => "SUSPICION_STRUCTURING",
        }
    }

    /// Built-in score weight, used when the configuration omits the tag.
    pub fn default_weight(self) -> u32 {
        match self {
            AlertTag::RegulatoryThreshold => 30,
            AlertTag::HighRiskClient => 25,
            AlertTag::PepClient => 50,
            AlertTag::SanctionedCountry => 100,
            AlertTag::ExceptionalAmount => 40,
            AlertTag::StructuringSuspicion => 35,
        }
    }
}

impl std::fmt::Display for AlertTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Alert severity derived from the accumulated risk score.
///
/// The derived `Ord` follows declaration order, so `Critical` sorts above
/// `High` when prioritizing alerts.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    /// Map an accumulated score to a severity over fixed half-open
    /// thresholds. Boundary values land in the higher bucket: exactly 100
    /// is `Critical`, exactly 70 is `High`.
    pub fn from_score(score: u32) -> Self {
        if score >= 100 {
            AlertSeverity::Critical
        } else if score >= 70 {
            AlertSeverity::High
        } else if score >= 30 {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }
}

/// Alert record emitted for a row that triggered at least one detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Unique alert identifier
    pub alert_id: String,

    /// Associated transaction id, when the row carried one
    pub transaction_id: Option<String>,

    pub client_id: Option<String>,

    pub amount: Option<f64>,

    pub beneficiary_country: Option<String>,

    /// Tags of the detectors that fired
    pub tags: Vec<AlertTag>,

    /// Accumulated risk score
    pub risk_score: u32,

    pub severity: AlertSeverity,

    /// Alert generation timestamp
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    /// Build the alert record for a flagged row.
    pub fn from_row(row: &EnrichedTransaction) -> Self {
        Self {
            alert_id: uuid::Uuid::new_v4().to_string(),
            transaction_id: row.transaction.transaction_id.clone(),
            client_id: row.transaction.client_id.clone(),
            amount: row.transaction.amount,
            beneficiary_country: row.transaction.beneficiary_country.clone(),
            tags: row.alerts.clone(),
            risk_score: row.risk_score,
            severity: row.severity,
            raised_at: Utc::now(),
        }
    }
}
