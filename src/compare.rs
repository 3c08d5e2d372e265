//! Total order over composite keys.

use std::cmp::Ordering;

use crate::{classify::ClassifiedValue, key::CompositeKey};

/// Compares two components. Same-variant values compare by content; mixed
/// variants fall back to `Date < LanguageTagged < PlainText`. This is the
/// only definition of the order; `Ord for ClassifiedValue` delegates here.
pub fn compare_values(left: &ClassifiedValue, right: &ClassifiedValue) -> Ordering {
    match (left, right) {
        (ClassifiedValue::Date(a), ClassifiedValue::Date(b)) => a.cmp(b),
        (
            ClassifiedValue::LanguageTagged { rank: ra, text: ta },
            ClassifiedValue::LanguageTagged { rank: rb, text: tb },
        ) => ra.cmp(rb).then_with(|| ta.cmp(tb)),
        (ClassifiedValue::PlainText(a), ClassifiedValue::PlainText(b)) => a.cmp(b),
        _ => left.precedence().cmp(&right.precedence()),
    }
}

/// Lexicographic comparison: the first unequal component decides.
pub fn compare_keys(left: &CompositeKey, right: &CompositeKey) -> Ordering {
    debug_assert_eq!(left.len(), right.len(), "composite keys differ in arity");
    left.components()
        .iter()
        .zip(right.components())
        .map(|(l, r)| compare_values(l, r))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Applies the reverse flag to the whole composite comparison.
pub fn directed(ordering: Ordering, reverse: bool) -> Ordering {
    if reverse { ordering.reverse() } else { ordering }
}

pub fn compare_directed(left: &CompositeKey, right: &CompositeKey, reverse: bool) -> Ordering {
    directed(compare_keys(left, right), reverse)
}
