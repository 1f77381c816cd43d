use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::firestore::error::{invalid_input, FirestoreResult};
use crate::firestore::value::{FirestoreValue, MapValue, ValueKind};

impl From<&Value> for FirestoreValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FirestoreValue::null(),
            Value::Bool(flag) => FirestoreValue::from_bool(*flag),
            Value::Number(number) => match number.as_i64() {
                Some(integer) => FirestoreValue::from_integer(integer),
                // u64 values above i64::MAX and fractional numbers both land here.
                None => FirestoreValue::from_double(number.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(text) => FirestoreValue::from_string(text.clone()),
            Value::Array(items) => {
                FirestoreValue::from_array(items.iter().map(FirestoreValue::from).collect())
            }
            Value::Object(object) => FirestoreValue::from_map(
                object
                    .iter()
                    .map(|(key, value)| (key.clone(), FirestoreValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for FirestoreValue {
    fn from(value: Value) -> Self {
        FirestoreValue::from(&value)
    }
}

impl FirestoreValue {
    /// Renders the value as JSON. Non-finite doubles become `null`.
    pub fn to_json(&self) -> Value {
        match self.kind() {
            ValueKind::Null => Value::Null,
            ValueKind::Boolean(flag) => Value::Bool(*flag),
            ValueKind::Integer(integer) => Value::Number(Number::from(*integer)),
            ValueKind::Double(double) => Number::from_f64(*double)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ValueKind::String(text) => Value::String(text.clone()),
            ValueKind::Array(array) => {
                Value::Array(array.values().iter().map(FirestoreValue::to_json).collect())
            }
            ValueKind::Map(map) => document_to_json(map),
        }
    }
}

/// Converts a JSON object into document fields.
pub fn document_from_json(value: &Value) -> FirestoreResult<MapValue> {
    match value {
        Value::Object(object) => Ok(object
            .iter()
            .map(|(key, value)| (key.clone(), FirestoreValue::from(value)))
            .collect()),
        other => Err(invalid_input(format!(
            "Document data must be a JSON object, found {}",
            json_type_name(other)
        ))),
    }
}

pub fn document_to_json(map: &MapValue) -> Value {
    let mut object = Map::new();
    for (key, value) in map.fields() {
        object.insert(key.clone(), value.to_json());
    }
    Value::Object(object)
}

impl Serialize for MapValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        document_to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MapValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        document_from_json(&value).map_err(|err| D::Error::custom(err.message()))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
