//! Self-healing normalization of stored charts.
//!
//! Stored charts are matched to the authoritative week layout by position:
//! row `i` of the stored document donates its day values to row `i` of the
//! layout, and the label is always replaced by the authoritative one. If a
//! layout revision changes the number or boundaries of weeks, values stay at
//! their old row index rather than following their dates.

use log::debug;

use crate::models::{ChartDocument, ChartKey, StoredChart, WeekBucket};

/// Outcome of reconciling a stored chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Chart in the authoritative shape, carrying every salvageable stored value.
    pub normalized: ChartDocument,
    /// True when `normalized` differs structurally from what was stored
    /// (or nothing was stored), i.e. it needs to be written back.
    pub changed: bool,
}

/// Reconcile `stored` against the `authoritative` layout for `key`.
pub fn reconcile(
    key: ChartKey,
    stored: Option<&StoredChart>,
    authoritative: &[WeekBucket],
) -> Reconciled {
    let Some(stored) = stored else {
        return Reconciled {
            normalized: ChartDocument::new(key, authoritative.to_vec()),
            changed: true,
        };
    };

    let weeks: Vec<WeekBucket> = authoritative
        .iter()
        .enumerate()
        .map(|(i, auth)| {
            let src = stored.weeks.get(i);
            let mut bucket = WeekBucket::empty(auth.range.clone());
            for (j, cell) in bucket.days.iter_mut().enumerate() {
                if let Some(value) = src.and_then(|w| w.day(j)) {
                    *cell = value.to_string();
                }
            }
            bucket
        })
        .collect();

    let changed = stored.weeks.len() != authoritative.len()
        || stored
            .weeks
            .iter()
            .zip(authoritative)
            .any(|(s, a)| s.range_label() != Some(a.range.as_str()) || !s.has_well_formed_days());

    if changed {
        debug!(
            "chart {} needs normalization: stored {} weeks, layout has {}",
            key,
            stored.weeks.len(),
            authoritative.len()
        );
    }

    Reconciled {
        normalized: ChartDocument::new(key, weeks),
        changed,
    }
}
