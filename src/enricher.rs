//! Left join of transactions onto the client risk registry

use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::types::client::Client;
use crate::types::transaction::{EnrichedTransaction, Transaction};

/// Join statistics, reported for observability. The match rate is a signal,
/// not a correctness gate: a batch full of unknown clients still screens.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EnrichmentReport {
    pub total: usize,
    pub matched: usize,
}

impl EnrichmentReport {
    /// Fraction of transactions with a resolvable client. An empty batch
    /// reports full coverage.
    pub fn match_rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.matched as f64 / self.total as f64
        }
    }
}

/// Produce one enriched row per transaction via a left join on client id.
///
/// Unmatched transactions keep the safe defaults (`Unknown` tier, non-PEP);
/// an unmatched client does not mean low risk, but it must never crash
/// downstream threshold logic.
pub fn enrich(
    transactions: Vec<Transaction>,
    clients: &[Client],
) -> (Vec<EnrichedTransaction>, EnrichmentReport) {
    // First registry row wins on duplicate client ids, symmetric with
    // transaction dedup.
    let mut index: HashMap<&str, &Client> = HashMap::with_capacity(clients.len());
    for client in clients {
        if let Some(id) = client.client_id.as_deref() {
            index.entry(id).or_insert(client);
        }
    }

    let mut report = EnrichmentReport {
        total: transactions.len(),
        matched: 0,
    };

    let rows: Vec<EnrichedTransaction> = transactions
        .into_iter()
        .map(|tx| {
            let client = tx.client_id.as_deref().and_then(|id| index.get(id).copied());
            match client {
                Some(client) => {
                    report.matched += 1;
                    let mut row = EnrichedTransaction::unmatched(tx);
                    row.risk_tier = client.risk_tier.unwrap_or_default();
                    row.is_pep = client.is_pep.unwrap_or(false);
                    row.client_country = client.country.clone();
                    row.client_segment = client.segment;
                    row
                }
                None => EnrichedTransaction::unmatched(tx),
            }
        })
        .collect();

    info!(
        matched = report.matched,
        total = report.total,
        match_rate = format!("{:.1}%", report.match_rate() * 100.0),
        "Transactions enriched"
    );

    (rows, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::client::RiskTier;

    #[test]
    fn test_matched_client_attributes_joined() {
        let mut client = Client::new("CLT-1", RiskTier::High, true);
        client.country = Some("DE".to_string());
        let clients = vec![client];

        let (rows, report) = enrich(vec![Transaction::new("TXN-1", "CLT-1", 100.0)], &clients);

        assert_eq!(report.matched, 1);
        assert_eq!(rows[0].risk_tier, RiskTier::High);
        assert!(rows[0].is_pep);
        assert_eq!(rows[0].client_country.as_deref(), Some("DE"));
    }

    #[test]
    fn test_unmatched_client_gets_safe_defaults() {
        let clients = vec![Client::new("CLT-1", RiskTier::Low, false)];

        let (rows, report) = enrich(
            vec![Transaction::new("TXN-1", "CLT-UNKNOWN", 100.0)],
            &clients,
        );

        assert_eq!(report.matched, 0);
        assert_eq!(rows[0].risk_tier, RiskTier::Unknown);
        assert!(!rows[0].is_pep);
        assert!(rows[0].client_country.is_none());
    }

    #[test]
    fn test_transaction_without_client_id() {
        let tx = Transaction {
            client_id: None,
            ..Transaction::new("TXN-1", "", 100.0)
        };

        let (rows, report) = enrich(vec![tx], &[]);
        assert_eq!(report.matched, 0);
        assert_eq!(rows[0].risk_tier, RiskTier::Unknown);
    }

    #[test]
    fn test_match_rate() {
        let clients = vec![Client::new("CLT-1", RiskTier::Low, false)];
        let transactions = vec![
            Transaction::new("TXN-1", "CLT-1", 1.0),
            Transaction::new("TXN-2", "CLT-1", 2.0),
            Transaction::new("TXN-3", "CLT-MISSING", 3.0),
            Transaction::new("TXN-4", "CLT-MISSING", 4.0),
        ];

        let (_, report) = enrich(transactions, &clients);
        assert_eq!(report.total, 4);
        assert_eq!(report.matched, 2);
        assert!((report.match_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_batch_match_rate() {
        let (rows, report) = enrich(Vec::new(), &[]);
        assert!(rows.is_empty());
        assert_eq!(report.match_rate(), 1.0);
    }

    #[test]
    fn test_first_registry_row_wins_on_duplicate_ids() {
        let clients = vec![
            Client::new("CLT-1", RiskTier::Low, false),
            Client::new("CLT-1", RiskTier::High, true),
        ];

        let (rows, _) = enrich(vec![Transaction::new("TXN-1", "CLT-1", 1.0)], &clients);
        assert_eq!(rows[0].risk_tier, RiskTier::Low);
        assert!(!rows[0].is_pep);
    }
}
