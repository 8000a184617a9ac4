//! Transaction data structures for compliance screening

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::types::alert::{AlertSeverity, AlertTag};
use crate::types::client::{ClientSegment, RiskTier};

/// A raw bank transaction as handed over by the upstream loader.
///
/// Loader-supplied fields are `Option` so that incomplete rows survive
/// deserialization: missing identifiers and anomalous values are reported by
/// the schema validator, never silently dropped. The loader maps dates it
/// cannot parse to `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique within a batch; duplicates are removed before enrichment,
    /// first occurrence wins.
    #[serde(alias = "Transaction_ID")]
    pub transaction_id: Option<String>,

    /// Value date
    #[serde(alias = "Date", default)]
    pub date: Option<NaiveDate>,

    /// Booking time
    #[serde(alias = "Heure", default)]
    pub time: Option<NaiveTime>,

    /// Ordering client; may reference a client absent from the registry
    #[serde(alias = "Client_ID")]
    pub client_id: Option<String>,

    #[serde(alias = "Type_Operation", default)]
    pub operation_type: Option<String>,

    /// Amount in the transaction currency. Negative amounts are kept and
    /// surface as data quality warnings.
    #[serde(alias = "Montant")]
    pub amount: Option<f64>,

    #[serde(alias = "Devise", default)]
    pub currency: Option<String>,

    /// Beneficiary account reference
    #[serde(alias = "Beneficiaire", alias = "Bénéficiaire", default)]
    pub beneficiary: Option<String>,

    #[serde(alias = "Pays_Beneficiaire", alias = "Pays_Bénéficiaire")]
    pub beneficiary_country: Option<String>,

    #[serde(alias = "Canal", default)]
    pub channel: Option<String>,
}

impl Transaction {
    /// Create a transaction with the fields the detectors read.
    pub fn new(transaction_id: &str, client_id: &str, amount: f64) -> Self {
        Self {
            transaction_id: Some(transaction_id.to_string()),
            date: None,
            time: None,
            client_id: Some(client_id.to_string()),
            operation_type: None,
            amount: Some(amount),
            currency: None,
            beneficiary: None,
            beneficiary_country: None,
            channel: None,
        }
    }

    /// Set the value date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the booking time.
    pub fn with_time(mut self, time: NaiveTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Set the beneficiary country code.
    pub fn with_beneficiary_country(mut self, country: &str) -> Self {
        self.beneficiary_country = Some(country.to_string());
        self
    }
}

/// A transaction joined with the risk attributes of its client and extended
/// with the fields the rule engine populates.
///
/// Join misses yield the safe defaults `RiskTier::Unknown` and
/// `is_pep == false` rather than nulls, so downstream threshold logic never
/// has to re-check client attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,

    /// Risk tier of the matched client, `Unknown` when the join missed
    pub risk_tier: RiskTier,

    /// PEP flag of the matched client, `false` when the join missed
    pub is_pep: bool,

    /// Country of the matched client
    pub client_country: Option<String>,

    pub client_segment: Option<ClientSegment>,

    /// Tags appended by the detectors that fired, in execution order
    pub alerts: Vec<AlertTag>,

    /// Sum of the weights of every detector that fired
    pub risk_score: u32,

    pub severity: AlertSeverity,
}

impl EnrichedTransaction {
    /// Wrap a transaction with the enrichment defaults of an unmatched
    /// client and pristine engine fields.
    pub fn unmatched(transaction: Transaction) -> Self {
        Self {
            transaction,
            risk_tier: RiskTier::Unknown,
            is_pep: false,
            client_country: None,
            client_segment: None,
            alerts: Vec::new(),
            risk_score: 0,
            severity: AlertSeverity::Low,
        }
    }

    /// Whether at least one detector fired for this row.
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    pub fn has_tag(&self, tag: AlertTag) -> bool {
        self.alerts.contains(&tag)
    }

    /// Semicolon-joined tag codes, the text form used by reporting exports.
    /// Tags are text only at this boundary; everywhere else they stay typed.
    pub fn joined_alerts(&self) -> String {
        self.alerts
            .iter()
            .map(|tag| tag.code())
            .collect::<Vec<_>>()
            .join(";")
    }
}
