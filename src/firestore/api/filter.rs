use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::firestore::constants::MAX_DISJUNCTION_SIZE;
use crate::firestore::error::{invalid_input, FirestoreError, FirestoreResult};
use crate::firestore::model::FieldPath;
use crate::firestore::value::FirestoreValue;

/// Comparison applied by a field filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FilterOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    ArrayContains,
    ArrayContainsAny,
    In,
    NotIn,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "==",
            FilterOperator::NotEqual => "!=",
            FilterOperator::LessThan => "<",
            FilterOperator::LessThanOrEqual => "<=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterThanOrEqual => ">=",
            FilterOperator::ArrayContains => "array-contains",
            FilterOperator::ArrayContainsAny => "array-contains-any",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not-in",
        }
    }

    /// Whether the operator compares against a sequence rather than a scalar.
    pub fn takes_sequence(&self) -> bool {
        matches!(
            self,
            FilterOperator::ArrayContainsAny | FilterOperator::In | FilterOperator::NotIn
        )
    }
}

impl Display for FilterOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = FirestoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "==" | "=" => Ok(FilterOperator::Equal),
            "!=" => Ok(FilterOperator::NotEqual),
            "<" => Ok(FilterOperator::LessThan),
            "<=" => Ok(FilterOperator::LessThanOrEqual),
            ">" => Ok(FilterOperator::GreaterThan),
            ">=" => Ok(FilterOperator::GreaterThanOrEqual),
            "array-contains" => Ok(FilterOperator::ArrayContains),
            "array-contains-any" => Ok(FilterOperator::ArrayContainsAny),
            "in" => Ok(FilterOperator::In),
            "not-in" => Ok(FilterOperator::NotIn),
            other => Err(invalid_input(format!(
                "Unsupported filter operator '{other}'"
            ))),
        }
    }
}

impl TryFrom<String> for FilterOperator {
    type Error = FirestoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilterOperator> for String {
    fn from(value: FilterOperator) -> Self {
        value.as_str().to_owned()
    }
}

/// A single comparable scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
}

impl From<&ScalarValue> for FirestoreValue {
    fn from(value: &ScalarValue) -> Self {
        match value {
            ScalarValue::Boolean(flag) => FirestoreValue::from_bool(*flag),
            ScalarValue::Integer(integer) => FirestoreValue::from_integer(*integer),
            ScalarValue::Double(double) => FirestoreValue::from_double(*double),
            ScalarValue::String(text) => FirestoreValue::from_string(text.clone()),
        }
    }
}

/// Right-hand side of a filter: either one scalar or a sequence of scalars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(ScalarValue),
    Sequence(Vec<ScalarValue>),
}

impl FilterValue {
    fn shape(&self) -> &'static str {
        match self {
            FilterValue::Scalar(_) => "a single value",
            FilterValue::Sequence(_) => "a list of values",
        }
    }
}

impl From<&FilterValue> for FirestoreValue {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Scalar(scalar) => scalar.into(),
            FilterValue::Sequence(items) => {
                FirestoreValue::from_array(items.iter().map(FirestoreValue::from).collect())
            }
        }
    }
}

macro_rules! impl_scalar_filter_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ScalarValue {
                fn from(value: $ty) -> Self {
                    ScalarValue::$variant(value.into())
                }
            }

            impl From<$ty> for FilterValue {
                fn from(value: $ty) -> Self {
                    FilterValue::Scalar(value.into())
                }
            }
        )*
    };
}

impl_scalar_filter_value!(
    bool => Boolean,
    i32 => Integer,
    i64 => Integer,
    f64 => Double,
    &str => String,
    String => String,
);

impl<T> From<Vec<T>> for FilterValue
where
    T: Into<ScalarValue>,
{
    fn from(values: Vec<T>) -> Self {
        FilterValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

/// Caller-facing filter description: `{"field": "population", "op": ">", "value": 100000}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    #[serde(alias = "operator")]
    pub op: FilterOperator,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOperator, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Parses a filter description from JSON.
    pub fn from_json(value: &serde_json::Value) -> FirestoreResult<Self> {
        Filter::deserialize(value)
            .map_err(|err| invalid_input(format!("Malformed filter {value}: {err}")))
    }

    /// Validates the filter and produces the predicate clause a query applies.
    pub fn translate(&self) -> FirestoreResult<FieldFilter> {
        let field = FieldPath::from_dot_separated(&self.field)?;

        match (&self.value, self.op.takes_sequence()) {
            (FilterValue::Scalar(_), false) => {}
            (FilterValue::Sequence(items), true) => {
                if items.is_empty() {
                    return Err(invalid_input(format!(
                        "Filter '{}' on '{}' requires a non-empty list",
                        self.op, self.field
                    )));
                }
                if items.len() > MAX_DISJUNCTION_SIZE {
                    return Err(invalid_input(format!(
                        "Filter '{}' on '{}' supports at most {MAX_DISJUNCTION_SIZE} elements",
                        self.op, self.field
                    )));
                }
            }
            (value, _) => {
                return Err(invalid_input(format!(
                    "Filter '{}' on '{}' cannot compare against {}",
                    self.op,
                    self.field,
                    value.shape()
                )));
            }
        }

        Ok(FieldFilter {
            field,
            operator: self.op,
            value: FirestoreValue::from(&self.value),
        })
    }
}

/// A validated predicate clause: field path, operator and comparison value.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldFilter {
    field: FieldPath,
    operator: FilterOperator,
    value: FirestoreValue,
}

impl FieldFilter {
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> &FirestoreValue {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_operators_translate_to_one_clause() {
        for op in [
            FilterOperator::Equal,
            FilterOperator::NotEqual,
            FilterOperator::LessThan,
            FilterOperator::LessThanOrEqual,
            FilterOperator::GreaterThan,
            FilterOperator::GreaterThanOrEqual,
            FilterOperator::ArrayContains,
        ] {
            let clause = Filter::new("population", op, 1000).translate().unwrap();
            assert_eq!(clause.operator(), op);
            assert_eq!(clause.value(), &FirestoreValue::from_integer(1000));
        }
    }

    #[test]
    fn sequence_operators_require_lists() {
        for op in [
            FilterOperator::In,
            FilterOperator::NotIn,
            FilterOperator::ArrayContainsAny,
        ] {
            let err = Filter::new("state", op, "CA").translate().unwrap_err();
            assert_eq!(err.code_str(), "firestore/invalid-argument");

            let clause = Filter::new("state", op, vec!["CA", "WA"]).translate().unwrap();
            assert_eq!(
                clause.value(),
                &FirestoreValue::from_array(vec!["CA".into(), "WA".into()])
            );
        }
    }

    #[test]
    fn scalar_operators_reject_lists() {
        let err = Filter::new("regions", FilterOperator::ArrayContains, vec!["west"])
            .translate()
            .unwrap_err();
        assert!(err.message().contains("a list of values"));
    }

    #[test]
    fn rejects_empty_and_oversized_lists() {
        let empty: Vec<i64> = Vec::new();
        assert!(Filter::new("n", FilterOperator::In, empty).translate().is_err());
        let too_many: Vec<i64> = (0..=MAX_DISJUNCTION_SIZE as i64).collect();
        assert!(Filter::new("n", FilterOperator::In, too_many).translate().is_err());
    }

    #[test]
    fn field_path_is_not_truncated_at_spaces() {
        let clause = Filter::new("home town", FilterOperator::Equal, "Springfield")
            .translate()
            .unwrap();
        assert_eq!(clause.field().canonical_string(), "home town");
    }

    #[test]
    fn parses_json_descriptions() {
        let filter = Filter::from_json(&json!({
            "field": "capital",
            "operator": "=",
            "value": true
        }))
        .unwrap();
        assert_eq!(filter.op, FilterOperator::Equal);
        assert_eq!(filter.value, FilterValue::Scalar(ScalarValue::Boolean(true)));

        let filter =
            Filter::from_json(&json!({"field": "area", "op": "<", "value": 12.5})).unwrap();
        assert_eq!(filter.value, FilterValue::Scalar(ScalarValue::Double(12.5)));
    }

    #[test]
    fn unknown_operator_is_an_input_error() {
        let err = Filter::from_json(&json!({"field": "a", "op": "~=", "value": 1})).unwrap_err();
        assert_eq!(err.code_str(), "firestore/invalid-argument");
        assert!(err.message().contains("~="));
    }

    #[test]
    fn operator_serializes_to_symbol() {
        let filter = Filter::new("tags", FilterOperator::ArrayContainsAny, vec!["a"]);
        let encoded = serde_json::to_value(&filter).unwrap();
        assert_eq!(encoded, json!({"field": "tags", "op": "array-contains-any", "value": ["a"]}));
    }
}
