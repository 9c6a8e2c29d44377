//! Fixed milestone ladder.

use crate::error::Result;
use crate::storage::{DateFilter, TimeStore};

/// Hour thresholds that earn a milestone, ascending.
pub const MILESTONES: [u32; 7] = [100, 500, 1000, 2500, 5000, 7500, 10000];

/// Thresholds at or below `total_hours`.
pub fn milestones_reached(total_hours: f64) -> impl Iterator<Item = u32> {
    MILESTONES
        .into_iter()
        .take_while(move |threshold| total_hours >= f64::from(*threshold))
}

/// The first threshold not yet reached, if any.
pub fn next_milestone(total_hours: f64) -> Option<u32> {
    MILESTONES
        .into_iter()
        .find(|threshold| total_hours < f64::from(*threshold))
}

/// Record every reached threshold the activity does not have yet.
///
/// Returns the thresholds inserted by this call. Calling it again without
/// new hours inserts nothing.
pub fn record_milestones<S: TimeStore + ?Sized>(store: &S, activity_id: i64) -> Result<Vec<u32>> {
    let total = store.sum_hours(activity_id, DateFilter::All)?;
    let mut inserted = Vec::new();
    for threshold in milestones_reached(total) {
        if store.milestone_exists(activity_id, threshold)? {
            continue;
        }
        store.insert_milestone(activity_id, threshold)?;
        tracing::info!(activity_id, threshold, total, "milestone reached");
        inserted.push(threshold);
    }
    Ok(inserted)
}

/// [`record_milestones`] for a caller whose entry is already committed.
///
/// The entry must not be written again, so a failure here is logged and
/// yields no thresholds. The next commit for the activity records them.
pub(crate) fn record_milestones_after_commit<S: TimeStore + ?Sized>(
    store: &S,
    activity_id: i64,
) -> Vec<u32> {
    record_milestones(store, activity_id).unwrap_or_else(|err| {
        tracing::warn!(activity_id, error = %err, "milestone check failed after commit");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, NewActivity};

    #[test]
    fn ladder_is_inclusive() {
        assert_eq!(milestones_reached(99.9).count(), 0);
        assert_eq!(milestones_reached(100.0).collect::<Vec<_>>(), vec![100]);
        assert_eq!(
            milestones_reached(2600.0).collect::<Vec<_>>(),
            vec![100, 500, 1000, 2500]
        );
        assert_eq!(milestones_reached(20_000.0).count(), MILESTONES.len());
    }

    #[test]
    fn next_threshold() {
        assert_eq!(next_milestone(0.0), Some(100));
        assert_eq!(next_milestone(100.0), Some(500));
        assert_eq!(next_milestone(10_000.0), None);
    }

    #[test]
    fn crossing_records_once() {
        let db = Database::open_memory().unwrap();
        let id = db.create_activity(NewActivity::named("Guitar")).unwrap();
        db.insert_time_entry(id, 95.0, chrono::Local::now().naive_local(), None)
            .unwrap();
        assert!(record_milestones(&db, id).unwrap().is_empty());

        db.insert_time_entry(id, 10.0, chrono::Local::now().naive_local(), None)
            .unwrap();
        assert_eq!(record_milestones(&db, id).unwrap(), vec![100]);
        assert!(record_milestones(&db, id).unwrap().is_empty());
        assert_eq!(db.list_milestones(id).unwrap().len(), 1);
    }

    #[test]
    fn one_big_entry_records_every_threshold() {
        let db = Database::open_memory().unwrap();
        let id = db.create_activity(NewActivity::named("Running")).unwrap();
        let outcome = db.add_time_entry(id, 1200.0, None, None).unwrap();
        assert_eq!(outcome.milestones, vec![100, 500, 1000]);
    }
}
