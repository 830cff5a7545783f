/// History ledger: append-only record of every applied choice.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::schema::metric::{MetricDeltas, MetricKey, MetricVector};

/// One applied choice with the metric state on either side of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub choice_id: String,
    pub label: String,
    pub deltas: MetricDeltas,
    pub before: MetricVector,
    pub after: MetricVector,
}

/// A metric's signed cumulative delta across the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BiasShift {
    pub key: MetricKey,
    pub total: f64,
}

/// Ordered, append-only sequence of history entries. Entries cannot be
/// modified once appended; the only removal is `clear`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Rank metrics by the absolute size of their cumulative signed delta.
    ///
    /// Only metrics that appear in at least one entry's delta map are
    /// ranked. Ties keep the order in which each metric was first seen,
    /// walking entries oldest first and each delta map in source order.
    pub fn summarize_bias(&self, top_n: usize) -> Vec<BiasShift> {
        let mut sums = [0.0_f64; MetricKey::COUNT];
        let mut first_seen: Vec<MetricKey> = Vec::with_capacity(MetricKey::COUNT);

        for entry in &self.entries {
            for (key, delta) in entry.deltas.iter() {
                if !first_seen.contains(&key) {
                    first_seen.push(key);
                }
                sums[key.index()] += delta;
            }
        }

        let mut shifts: Vec<BiasShift> = first_seen
            .into_iter()
            .map(|key| BiasShift {
                key,
                total: sums[key.index()],
            })
            .collect();

        // sort_by is stable, which gives the first-seen tie-break.
        shifts.sort_by(|a, b| b.total.abs().total_cmp(&a.total.abs()));
        shifts.truncate(top_n);
        shifts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(deltas: MetricDeltas) -> HistoryEntry {
        HistoryEntry {
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            choice_id: "c".to_string(),
            label: "C".to_string(),
            deltas,
            before: MetricVector::new(),
            after: MetricVector::new(),
        }
    }

    #[test]
    fn empty_ledger_has_no_bias() {
        let ledger = HistoryLedger::new();
        assert!(ledger.summarize_bias(3).is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let mut ledger = HistoryLedger::new();
        let mut first = entry(MetricDeltas::new());
        first.choice_id = "first".to_string();
        let mut second = entry(MetricDeltas::new());
        second.choice_id = "second".to_string();
        ledger.append(first);
        ledger.append(second);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.entries()[0].choice_id, "first");
        assert_eq!(ledger.last().unwrap().choice_id, "second");
    }

    #[test]
    fn bias_ranks_by_absolute_sum() {
        let mut ledger = HistoryLedger::new();
        ledger.append(entry(
            MetricDeltas::new()
                .with(MetricKey::Trust, 0.1)
                .with(MetricKey::Privacy, -0.2),
        ));
        ledger.append(entry(
            MetricDeltas::new()
                .with(MetricKey::Privacy, -0.2)
                .with(MetricKey::Fairness, 0.25),
        ));

        let bias = ledger.summarize_bias(3);
        let keys: Vec<MetricKey> = bias.iter().map(|b| b.key).collect();
        assert_eq!(
            keys,
            vec![MetricKey::Privacy, MetricKey::Fairness, MetricKey::Trust]
        );
        assert!((bias[0].total + 0.4).abs() < 1e-9);
        assert!((bias[1].total - 0.25).abs() < 1e-9);
    }

    #[test]
    fn bias_truncates_to_top_n() {
        let mut ledger = HistoryLedger::new();
        ledger.append(entry(
            MetricDeltas::new()
                .with(MetricKey::Trust, 0.1)
                .with(MetricKey::Safety, 0.2)
                .with(MetricKey::Wellbeing, 0.3),
        ));
        let bias = ledger.summarize_bias(1);
        assert_eq!(bias.len(), 1);
        assert_eq!(bias[0].key, MetricKey::Wellbeing);
    }

    #[test]
    fn bias_ties_keep_first_seen_order() {
        let mut ledger = HistoryLedger::new();
        ledger.append(entry(MetricDeltas::new().with(MetricKey::Loneliness, 0.1)));
        ledger.append(entry(
            MetricDeltas::new()
                .with(MetricKey::Privacy, -0.1)
                .with(MetricKey::Loneliness, 0.0),
        ));
        let keys: Vec<MetricKey> = ledger.summarize_bias(5).iter().map(|b| b.key).collect();
        assert_eq!(keys, vec![MetricKey::Loneliness, MetricKey::Privacy]);
    }

    #[test]
    fn opposing_deltas_cancel() {
        let mut ledger = HistoryLedger::new();
        ledger.append(entry(MetricDeltas::new().with(MetricKey::Trust, 0.2)));
        ledger.append(entry(MetricDeltas::new().with(MetricKey::Trust, -0.2)));
        ledger.append(entry(MetricDeltas::new().with(MetricKey::Safety, 0.05)));
        let bias = ledger.summarize_bias(2);
        assert_eq!(bias[0].key, MetricKey::Safety);
        assert_eq!(bias[1].key, MetricKey::Trust);
        assert!(bias[1].total.abs() < 1e-9);
    }

    #[test]
    fn clear_empties() {
        let mut ledger = HistoryLedger::new();
        ledger.append(entry(MetricDeltas::new()));
        ledger.clear();
        assert!(ledger.is_empty());
    }
}
