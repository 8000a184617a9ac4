//! Compliance Screening Pipeline Library
//!
//! Screens batches of bank transactions against a client risk registry and
//! surfaces anti-money-laundering alerts: enrichment, a battery of
//! independent risk detectors, score-based severity classification and
//! reporting aggregates.

pub mod config;
pub mod enricher;
pub mod pipeline;
pub mod rules;
pub mod summary;
pub mod types;
pub mod validator;

pub use config::ScreeningConfig;
pub use enricher::EnrichmentReport;
pub use pipeline::{ScreeningOutput, ScreeningPipeline};
pub use rules::RuleEngine;
pub use summary::ScreeningSummary;
pub use types::{
    alert::{Alert, AlertSeverity, AlertTag},
    client::{Client, ClientSegment, RiskTier},
    transaction::{EnrichedTransaction, Transaction},
};
pub use validator::ValidationReport;
