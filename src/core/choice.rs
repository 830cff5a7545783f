/// Choice engine: applies a choice's deltas to the live metric vector.

use chrono::{DateTime, Utc};

use crate::core::ledger::{HistoryEntry, HistoryLedger};
use crate::schema::metric::{MetricKey, MetricVector};
use crate::schema::scenario::Choice;

/// Apply `choice` to `metrics` in place and record the transition.
///
/// Every schema metric is shifted by the choice's delta (0 when absent) and
/// clamped to `[0, 1]`. The new entry is appended to `ledger` and a
/// reference to it is returned.
pub fn apply_choice<'l>(
    metrics: &mut MetricVector,
    choice: &Choice,
    ledger: &'l mut HistoryLedger,
) -> &'l HistoryEntry {
    apply_choice_at(metrics, choice, ledger, Utc::now())
}

/// Same as [`apply_choice`] with an explicit timestamp.
pub fn apply_choice_at<'l>(
    metrics: &mut MetricVector,
    choice: &Choice,
    ledger: &'l mut HistoryLedger,
    timestamp: DateTime<Utc>,
) -> &'l HistoryEntry {
    let before = *metrics;
    for key in MetricKey::ALL {
        metrics.shift(key, choice.deltas.get(key));
    }
    let after = *metrics;

    tracing::debug!(
        choice = %choice.id,
        changed = choice.deltas.len(),
        "applied choice"
    );

    ledger.append(HistoryEntry {
        timestamp,
        choice_id: choice.id.clone(),
        label: choice.label.clone(),
        deltas: choice.deltas.clone(),
        before,
        after,
    });
    let recorded = ledger.len() - 1;
    &ledger.entries()[recorded]
}
