use std::cmp::Ordering;

use crate::firestore::api::{
    DocumentSnapshot, FieldFilter, FilterOperator, OrderBy, OrderDirection, Query,
};
use crate::firestore::value::{ArrayValue, FirestoreValue, ValueKind};

/// Filters, orders and limits candidate documents the way the backend would.
///
/// Documents lacking the ordering field are excluded, and ties (or the whole
/// result when there is no ordering) fall back to document key order.
pub(crate) fn apply_query_to_documents(
    documents: Vec<DocumentSnapshot>,
    query: &Query,
) -> Vec<DocumentSnapshot> {
    let mut filtered: Vec<DocumentSnapshot> = documents
        .into_iter()
        .filter(|snapshot| query.matches_collection(snapshot.key()))
        .filter(|snapshot| document_satisfies_filters(snapshot, query.filters()))
        .filter(|snapshot| match query.order_by_clause() {
            Some(order) => snapshot.get(order.field()).is_some(),
            None => true,
        })
        .collect();

    filtered.sort_by(|left, right| compare_snapshots(left, right, query.order_by_clause()));

    if let Some(limit) = query.limit_value() {
        filtered.truncate(limit as usize);
    }

    filtered
}

fn document_satisfies_filters(snapshot: &DocumentSnapshot, filters: &[FieldFilter]) -> bool {
    filters
        .iter()
        .all(|filter| match snapshot.get(filter.field()) {
            Some(value) => evaluate_filter(filter, value),
            None => false,
        })
}

fn evaluate_filter(filter: &FieldFilter, value: &FirestoreValue) -> bool {
    match filter.operator() {
        FilterOperator::Equal => values_equal(value, filter.value()),
        FilterOperator::NotEqual => !value.is_null() && !values_equal(value, filter.value()),
        FilterOperator::LessThan => compare_values(value, filter.value()) == Some(Ordering::Less),
        FilterOperator::LessThanOrEqual => matches!(
            compare_values(value, filter.value()),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::GreaterThan => {
            compare_values(value, filter.value()) == Some(Ordering::Greater)
        }
        FilterOperator::GreaterThanOrEqual => matches!(
            compare_values(value, filter.value()),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::ArrayContains => match value.kind() {
            ValueKind::Array(array) => array_contains(array, filter.value()),
            _ => false,
        },
        FilterOperator::ArrayContainsAny => match (value.kind(), filter.value().kind()) {
            (ValueKind::Array(array), ValueKind::Array(needles)) => needles
                .values()
                .iter()
                .any(|needle| array_contains(array, needle)),
            _ => false,
        },
        FilterOperator::In => match filter.value().kind() {
            ValueKind::Array(values) => array_contains(values, value),
            _ => false,
        },
        FilterOperator::NotIn => match filter.value().kind() {
            ValueKind::Array(values) => !value.is_null() && !array_contains(values, value),
            _ => false,
        },
    }
}

fn array_contains(array: &ArrayValue, needle: &FirestoreValue) -> bool {
    array
        .values()
        .iter()
        .any(|candidate| values_equal(candidate, needle))
}

/// Equality with integer/double cross-comparison (`1 == 1.0`).
fn values_equal(left: &FirestoreValue, right: &FirestoreValue) -> bool {
    match (left.kind(), right.kind()) {
        (ValueKind::Integer(_), ValueKind::Double(_))
        | (ValueKind::Double(_), ValueKind::Integer(_)) => {
            compare_values(left, right) == Some(Ordering::Equal)
        }
        _ => left == right,
    }
}

/// Ordering between two values of the same type class; `None` across classes
/// and for NaN, which satisfies no range comparison.
fn compare_values(left: &FirestoreValue, right: &FirestoreValue) -> Option<Ordering> {
    match (left.kind(), right.kind()) {
        (ValueKind::Null, ValueKind::Null) => Some(Ordering::Equal),
        (ValueKind::Boolean(a), ValueKind::Boolean(b)) => Some(a.cmp(b)),
        (ValueKind::String(a), ValueKind::String(b)) => Some(a.cmp(b)),
        _ if is_nan(left) || is_nan(right) => None,
        _ => compare_numbers(left, right),
    }
}

fn is_nan(value: &FirestoreValue) -> bool {
    matches!(value.kind(), ValueKind::Double(double) if double.is_nan())
}

/// Total order over integers and doubles: NaN first, then numeric value.
fn compare_numbers(left: &FirestoreValue, right: &FirestoreValue) -> Option<Ordering> {
    match (left.kind(), right.kind()) {
        (ValueKind::Integer(a), ValueKind::Integer(b)) => Some(a.cmp(b)),
        (ValueKind::Double(a), ValueKind::Double(b)) => Some(compare_doubles(*a, *b)),
        (ValueKind::Integer(a), ValueKind::Double(b)) => Some(compare_integer_double(*a, *b)),
        (ValueKind::Double(a), ValueKind::Integer(b)) => {
            Some(compare_integer_double(*b, *a).reverse())
        }
        _ => None,
    }
}

fn compare_doubles(left: f64, right: f64) -> Ordering {
    match (left.is_nan(), right.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        // -0.0 and 0.0 compare equal here.
        (false, false) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
    }
}

fn compare_integer_double(integer: i64, double: f64) -> Ordering {
    if double.is_nan() {
        return Ordering::Greater;
    }
    match compare_doubles(integer as f64, double) {
        // The rounded integer met the double; it is integral and, below
        // 2^63, exactly representable as i64.
        Ordering::Equal if double >= 9_223_372_036_854_775_808.0 => Ordering::Less,
        Ordering::Equal => integer.cmp(&(double as i64)),
        ordering => ordering,
    }
}

fn type_rank(value: &FirestoreValue) -> u8 {
    match value.kind() {
        ValueKind::Null => 0,
        ValueKind::Boolean(_) => 1,
        ValueKind::Integer(_) | ValueKind::Double(_) => 2,
        ValueKind::String(_) => 3,
        ValueKind::Array(_) => 4,
        ValueKind::Map(_) => 5,
    }
}

/// Total order used for sorting: type class first, then value.
fn sort_values(left: &FirestoreValue, right: &FirestoreValue) -> Ordering {
    type_rank(left).cmp(&type_rank(right)).then_with(|| {
        let within_class = if type_rank(left) == 2 {
            compare_numbers(left, right)
        } else {
            compare_values(left, right)
        };
        within_class.unwrap_or(Ordering::Equal)
    })
}

fn compare_snapshots(
    left: &DocumentSnapshot,
    right: &DocumentSnapshot,
    order_by: Option<&OrderBy>,
) -> Ordering {
    let by_field = order_by.map_or(Ordering::Equal, |order| {
        let ordering = match (left.get(order.field()), right.get(order.field())) {
            (Some(l), Some(r)) => sort_values(l, r),
            _ => Ordering::Equal,
        };
        match order.direction() {
            OrderDirection::Ascending => ordering,
            OrderDirection::Descending => ordering.reverse(),
        }
    });
    by_field.then_with(|| left.key().cmp(right.key()))
}
