use std::cmp::Ordering;

use chrono::{DateTime, Utc};

/// Records that carry optional creation and modification instants
///
/// Older documents predate the timestamp fields, so either may be absent.
pub trait Timestamped {
    /// Instant the record was created, if known
    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Instant of the last modification, absent until the first update
    fn updated_at(&self) -> Option<DateTime<Utc>>;

    /// Instant used for display ordering: last update, falling back to creation
    fn effective_instant(&self) -> Option<DateTime<Utc>> {
        self.updated_at().or_else(|| self.created_at())
    }
}

impl<T: Timestamped + ?Sized> Timestamped for &T {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        (**self).created_at()
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        (**self).updated_at()
    }
}

/// Compare two records so the most recently active one comes first
///
/// A record with any timestamp always sorts before one with none, whichever
/// side of the comparison it is on. Two undated records compare equal.
pub fn compare_recent_first<A, B>(a: &A, b: &B) -> Ordering
where
    A: Timestamped + ?Sized,
    B: Timestamped + ?Sized,
{
    match (a.effective_instant(), b.effective_instant()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Order records newest activity first, undated records last
///
/// Returns a new vector. The sort is stable, so ties and undated records keep
/// their input order.
pub fn order_by_recent_activity<T, I>(records: I) -> Vec<T>
where
    T: Timestamped,
    I: IntoIterator<Item = T>,
{
    let mut ordered: Vec<T> = records.into_iter().collect();
    ordered.sort_by(compare_recent_first);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct Record {
        id: u32,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    }

    impl Timestamped for Record {
        fn created_at(&self) -> Option<DateTime<Utc>> {
            self.created_at
        }

        fn updated_at(&self) -> Option<DateTime<Utc>> {
            self.updated_at
        }
    }

    fn at(secs: i64) -> Option<DateTime<Utc>> {
        Some(Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn record(id: u32, created_at: Option<DateTime<Utc>>, updated_at: Option<DateTime<Utc>>) -> Record {
        Record {
            id,
            created_at,
            updated_at,
        }
    }

    fn ids(records: &[Record]) -> Vec<u32> {
        records.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_updated_beats_created_beats_undated() {
        let records = vec![
            record(3, None, None),
            record(2, at(1_000), None),
            record(1, None, at(2_000)),
        ];

        let ordered = order_by_recent_activity(records);
        assert_eq!(ids(&ordered), vec![1, 2, 3]);
    }

    #[test]
    fn test_dated_sorts_first_from_either_side() {
        let dated = record(1, None, at(10));
        let undated = record(2, None, None);

        assert_eq!(compare_recent_first(&dated, &undated), Ordering::Less);
        assert_eq!(compare_recent_first(&undated, &dated), Ordering::Greater);

        let ordered = order_by_recent_activity(vec![undated.clone(), dated.clone()]);
        assert_eq!(ordered, vec![dated, undated]);
    }

    #[test]
    fn test_undated_records_sink_below_old_records() {
        // An undated record must not land between dated ones or above the
        // oldest of them.
        let records = vec![
            record(1, None, None),
            record(2, at(5), None),
            record(3, None, None),
            record(4, at(1), None),
            record(5, at(9), None),
        ];

        let ordered = order_by_recent_activity(records);
        assert_eq!(ids(&ordered), vec![5, 2, 4, 1, 3]);
    }

    #[test]
    fn test_update_overrides_older_creation() {
        // Created long ago but edited recently: ranks by the edit
        let edited = record(1, at(1), at(500));
        let fresh = record(2, at(300), None);

        let ordered = order_by_recent_activity(vec![fresh, edited]);
        assert_eq!(ids(&ordered), vec![1, 2]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![
            record(1, at(7), None),
            record(2, None, at(7)),
            record(3, at(7), None),
        ];

        let ordered = order_by_recent_activity(records);
        assert_eq!(ids(&ordered), vec![1, 2, 3]);
    }

    #[test]
    fn test_ordering_is_idempotent() {
        let records = vec![
            record(1, at(3), None),
            record(2, None, None),
            record(3, at(1), at(8)),
            record(4, at(5), None),
            record(5, None, None),
        ];

        let once = order_by_recent_activity(records);
        let twice = order_by_recent_activity(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        let ordered: Vec<Record> = order_by_recent_activity(Vec::new());
        assert!(ordered.is_empty());
    }

    #[test]
    fn test_orders_borrowed_records() {
        let records = vec![record(1, at(1), None), record(2, at(2), None)];
        let ordered = order_by_recent_activity(records.iter());

        assert_eq!(ordered[0].id, 2);
        assert_eq!(ordered[1].id, 1);
        // Input is untouched
        assert_eq!(ids(&records), vec![1, 2]);
    }

    #[test]
    fn test_effective_instant_fallback() {
        assert_eq!(record(1, at(1), at(2)).effective_instant(), at(2));
        assert_eq!(record(1, at(1), None).effective_instant(), at(1));
        assert_eq!(record(1, None, None).effective_instant(), None);
    }
}
