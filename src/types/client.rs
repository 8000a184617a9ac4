//! Client registry data structures

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Client risk tier from the registry.
///
/// `Unknown` is the sentinel produced by enrichment when a transaction
/// references a client that is not in the registry; registry rows themselves
/// only carry the three graded tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    #[serde(alias = "Faible")]
    Low,
    #[serde(alias = "Moyen")]
    Medium,
    #[serde(alias = "Élevé", alias = "Eleve")]
    High,
    #[default]
    #[serde(alias = "Inconnu")]
    Unknown,
}

impl RiskTier {
    /// Numeric risk weight, a pure function of the tier.
    pub fn weight(self) -> u32 {
        match self {
            RiskTier::Low => 1,
            RiskTier::Medium => 2,
            RiskTier::High => 3,
            RiskTier::Unknown => 0,
        }
    }
}

/// Commercial segment of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientSegment {
    #[serde(alias = "Comptant")]
    Retail,
    #[serde(alias = "Privilege")]
    Premium,
    #[serde(alias = "Entreprise")]
    Corporate,
    #[serde(alias = "Institutionnel")]
    Institutional,
    #[serde(alias = "Digital")]
    Digital,
}

/// A client row from the risk registry.
///
/// Loader-supplied fields are `Option` so that incomplete rows survive
/// deserialization and are reported by the schema validator instead of
/// being dropped. The registry is loaded once per batch run and never
/// mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    #[serde(alias = "Client_ID")]
    pub client_id: Option<String>,

    /// Display name
    #[serde(alias = "Nom", default)]
    pub name: Option<String>,

    /// Country of residence (ISO code)
    #[serde(alias = "Pays", default)]
    pub country: Option<String>,

    #[serde(alias = "Niveau_Risque", default)]
    pub risk_tier: Option<RiskTier>,

    #[serde(alias = "Date_Inscription", default)]
    pub registration_date: Option<NaiveDate>,

    #[serde(alias = "Segment", default)]
    pub segment: Option<ClientSegment>,

    /// Annual turnover, non-negative
    #[serde(alias = "Encours_Annuel", default)]
    pub annual_turnover: Option<f64>,

    #[serde(alias = "Industrie", default)]
    pub industry: Option<String>,

    /// Politically exposed person flag. Accepts the registry's
    /// `Oui`/`Non` text form as well as a plain boolean.
    #[serde(alias = "Est_PEP", default, deserialize_with = "de_yes_no")]
    pub is_pep: Option<bool>,
}

impl Client {
    /// Create a client with the fields the detectors read.
    pub fn new(client_id: &str, risk_tier: RiskTier, is_pep: bool) -> Self {
        Self {
            client_id: Some(client_id.to_string()),
            name: None,
            country: None,
            risk_tier: Some(risk_tier),
            registration_date: None,
            segment: None,
            annual_turnover: None,
            industry: None,
            is_pep: Some(is_pep),
        }
    }

    /// Numeric risk weight derived from the tier; 0 when the tier is absent.
    pub fn risk_weight(&self) -> u32 {
        self.risk_tier.map_or(0, RiskTier::weight)
    }
}

/// Deserialize a PEP flag given either as a boolean or as the registry's
/// `Oui`/`Non` (or `Yes`/`No`) text. Unrecognized text maps to `None` and
/// is left to the validator.
fn de_yes_no<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YesNo {
        Flag(bool),
        Text(String),
    }

    Ok(match Option::<YesNo>::deserialize(deserializer)? {
        None => None,
        Some(YesNo::Flag(flag)) => Some(flag),
        Some(YesNo::Text(text)) => match text.trim() {
            "Oui" | "oui" | "Yes" | "yes" | "true" => Some(true),
            "Non" | "non" | "No" | "no" | "false" => Some(false),
            _ => None,
        },
    })
}
