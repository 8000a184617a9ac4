//! Type definitions for the compliance screening pipeline

pub mod alert;
pub mod client;
pub mod transaction;

pub use alert::{Alert, AlertSeverity, AlertTag};
pub use client::{Client, ClientSegment, RiskTier};
pub use transaction::{EnrichedTransaction, Transaction};
