//! Same-day split payment (structuring) detection
//!
//! Flags clusters of below-threshold payments booked by one client on one
//! calendar day whose combined amount crosses the regulatory reporting
//! threshold, a classic evasion pattern. Grouping is strictly per calendar
//! day: a cluster spread across midnight is out of scope.

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

use crate::config::ScreeningConfig;
use crate::types::transaction::{EnrichedTransaction, Transaction};

/// Calendar day a transaction belongs to for grouping purposes. The booking
/// time is ignored; rows without a usable date belong to no group.
pub fn grouping_day(tx: &Transaction) -> Option<NaiveDate> {
    tx.date
}

/// Return the indices of every row taking part in a structuring pattern,
/// sorted ascending.
///
/// A pattern is a same-client, same-day set of at least two payments, each
/// strictly below the structuring ceiling, whose sum strictly exceeds the
/// regulatory reporting threshold. The whole qualifying subset is flagged,
/// not the group. Rows without a client id or usable date never take part
/// in a pattern but stay in the batch.
pub fn detect(rows: &[EnrichedTransaction], config: &ScreeningConfig) -> Vec<usize> {
    let ceiling = config.thresholds.structuring;
    let reporting = config.thresholds.regulatory;

    let mut groups: HashMap<(&str, NaiveDate), Vec<usize>> = HashMap::new();
    for (idx, row) in rows.iter().enumerate() {
        let Some(client) = row.transaction.client_id.as_deref() else {
            continue;
        };
        let Some(day) = grouping_day(&row.transaction) else {
            continue;
        };
        groups.entry((client, day)).or_default().push(idx);
    }

    let mut flagged = Vec::new();
    for ((client, day), members) in &groups {
        let below: Vec<usize> = members
            .iter()
            .copied()
            .filter(|&i| matches!(rows[i].transaction.amount, Some(a) if a < ceiling))
            .collect();

        if below.len() < 2 {
            continue;
        }

        let total: f64 = below
            .iter()
            .filter_map(|&i| rows[i].transaction.amount)
            .sum();

        if total > reporting {
            debug!(
                client = %client,
                day = %day,
                payments = below.len(),
                total,
                "Structuring pattern detected"
            );
            flagged.extend(below);
        }
    }

    flagged.sort_unstable();
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn row(id: &str, client: &str, amount: f64, date: NaiveDate) -> EnrichedTransaction {
        EnrichedTransaction::unmatched(Transaction::new(id, client, amount).with_date(date))
    }

    #[test]
    fn test_grouping_day_ignores_time() {
        let morning = Transaction::new("TXN-1", "CLT-1", 100.0)
            .with_date(day(12))
            .with_time(NaiveTime::from_hms_opt(8, 5, 0).unwrap());
        let evening = Transaction::new("TXN-2", "CLT-1", 100.0)
            .with_date(day(12))
            .with_time(NaiveTime::from_hms_opt(23, 55, 0).unwrap());

        assert_eq!(grouping_day(&morning), grouping_day(&evening));
        assert_eq!(grouping_day(&morning), Some(day(12)));
    }

    #[test]
    fn test_split_payments_flagged() {
        // Four same-day payments under the 9500 ceiling summing to 16000,
        // above the 10000 reporting threshold: all four are flagged.
        let rows = vec![
            row("TXN-1", "CLT-1", 4_000.0, day(10)),
            row("TXN-2", "CLT-1", 4_000.0, day(10)),
            row("TXN-3", "CLT-1", 4_000.0, day(10)),
            row("TXN-4", "CLT-1", 4_000.0, day(10)),
        ];

        let flagged = detect(&rows, &ScreeningConfig::default());
        assert_eq!(flagged, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_sum_must_exceed_reporting_threshold() {
        // 4000 + 4500 = 8500 stays under 10000; the 12000 payment is above
        // the ceiling and never part of the qualifying subset.
        let rows = vec![
            row("TXN-1", "CLT-1", 4_000.0, day(10)),
            row("TXN-2", "CLT-1", 4_500.0, day(10)),
            row("TXN-3", "CLT-1", 12_000.0, day(10)),
        ];

        let flagged = detect(&rows, &ScreeningConfig::default());
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_sum_exactly_at_threshold_not_flagged() {
        let rows = vec![
            row("TXN-1", "CLT-1", 5_000.0, day(10)),
            row("TXN-2", "CLT-1", 5_000.0, day(10)),
        ];

        let flagged = detect(&rows, &ScreeningConfig::default());
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_single_qualifying_payment_not_flagged() {
        // One payment below the ceiling plus large ones above it: the
        // qualifying subset has a single row and is never a pattern.
        let rows = vec![
            row("TXN-1", "CLT-1", 9_000.0, day(10)),
            row("TXN-2", "CLT-1", 20_000.0, day(10)),
            row("TXN-3", "CLT-1", 30_000.0, day(10)),
        ];

        let flagged = detect(&rows, &ScreeningConfig::default());
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_only_qualifying_subset_flagged() {
        let rows = vec![
            row("TXN-1", "CLT-1", 6_000.0, day(10)),
            row("TXN-2", "CLT-1", 6_000.0, day(10)),
            row("TXN-3", "CLT-1", 50_000.0, day(10)),
        ];

        let flagged = detect(&rows, &ScreeningConfig::default());
        // The above-ceiling payment belongs to the group but not to the
        // flagged subset.
        assert_eq!(flagged, vec![0, 1]);
    }

    #[test]
    fn test_cross_day_split_not_flagged() {
        let rows = vec![
            row("TXN-1", "CLT-1", 6_000.0, day(10)),
            row("TXN-2", "CLT-1", 6_000.0, day(11)),
        ];

        let flagged = detect(&rows, &ScreeningConfig::default());
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_distinct_clients_not_grouped() {
        let rows = vec![
            row("TXN-1", "CLT-1", 6_000.0, day(10)),
            row("TXN-2", "CLT-2", 6_000.0, day(10)),
        ];

        let flagged = detect(&rows, &ScreeningConfig::default());
        assert!(flagged.is_empty());
    }

    #[test]
    fn test_rows_without_date_excluded_but_retained() {
        let undated = EnrichedTransaction::unmatched(Transaction::new("TXN-3", "CLT-1", 6_000.0));
        let rows = vec![
            row("TXN-1", "CLT-1", 6_000.0, day(10)),
            row("TXN-2", "CLT-1", 6_000.0, day(10)),
            undated,
        ];

        let flagged = detect(&rows, &ScreeningConfig::default());
        // The undated row never joins a group; the dated pair still forms a
        // pattern on its own.
        assert_eq!(flagged, vec![0, 1]);
        assert_eq!(rows.len(), 3);
    }
}
