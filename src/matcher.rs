//! Key matching tolerant of SNIT/NORMAL transposition.
//!
//! Operators sometimes type the two identifiers in swapped order; a record
//! with lot `A` and pair `{10, 20}` must be found by both `(A, 10, 20)` and
//! `(A, 20, 10)`, otherwise the same animal would be recorded twice.

use crate::record::Record;

/// Position of the first record (in store order) with `lot` and the pair
/// `{id_a, id_b}` in either order.
#[must_use]
pub fn find(records: &[Record], lot: &str, id_a: i64, id_b: i64) -> Option<usize> {
    records.iter().position(|r| r.matches(lot, id_a, id_b))
}

/// Like [`find`], returning the record itself.
#[must_use]
pub fn find_record<'a>(records: &'a [Record], lot: &str, id_a: i64, id_b: i64) -> Option<&'a Record> {
    find(records, lot, id_a, id_b).map(|idx| &records[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn herd() -> Vec<Record> {
        vec![
            Record::new("A", 10, 20),
            Record::new("B", 10, 20),
            Record::new("A", 10, 30),
        ]
    }

    #[test]
    fn test_exact_and_transposed_match_same_record() {
        let records = herd();
        assert_eq!(find(&records, "A", 10, 20), Some(0));
        assert_eq!(find(&records, "A", 20, 10), Some(0));
        assert_eq!(find(&records, "B", 20, 10), Some(1));
    }

    #[test]
    fn test_no_match() {
        let records = herd();
        assert_eq!(find(&records, "C", 10, 20), None);
        assert_eq!(find(&records, "A", 20, 30), None);
        assert_eq!(find(&[], "A", 10, 20), None);
    }

    #[test]
    fn test_first_match_wins_on_duplicates() {
        let records = vec![Record::new("A", 1, 2), Record::new("A", 2, 1)];
        assert_eq!(find(&records, "A", 2, 1), Some(0));
        assert_eq!(find_record(&records, "A", 2, 1).map(Record::id_a), Some(1));
    }

    proptest! {
        /// Property: swapping the identifiers never changes the result
        #[test]
        fn prop_find_is_transposition_invariant(
            keys in prop::collection::vec(("[AB]", 0i64..20, 0i64..20), 0..30),
            lot in "[AB]",
            a in 0i64..20,
            b in 0i64..20,
        ) {
            let records: Vec<Record> = keys
                .into_iter()
                .map(|(lot, x, y)| Record::new(lot, x, y))
                .collect();
            prop_assert_eq!(find(&records, &lot, a, b), find(&records, &lot, b, a));
        }
    }
}
