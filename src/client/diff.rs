//! # List Diff
//!
//! Decides whether a freshly fetched list differs from the one on screen.
//! Comparison is field-wise structural equality over the ordered records;
//! any difference in length, order or field values counts as a change.
//! There is no merging: the fetched list either replaces the current one
//! wholesale or is dropped.

/// Whether `fetched` differs from `current`
pub fn lists_differ<T: PartialEq>(current: &[T], fetched: &[T]) -> bool {
    current != fetched
}

/// Replace `current` with `fetched` if they differ.
///
/// Returns `true` when a replacement happened.
pub fn replace_if_changed<T: PartialEq>(current: &mut Vec<T>, fetched: Vec<T>) -> bool {
    if lists_differ(current, &fetched) {
        *current = fetched;
        true
    } else {
        false
    }
}
