use std::collections::BTreeMap;

use crate::firestore::value::FirestoreValue;

/// Field map of a document or of a nested map value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapValue {
    fields: BTreeMap<String, FirestoreValue>,
}

impl MapValue {
    pub fn new(fields: BTreeMap<String, FirestoreValue>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &BTreeMap<String, FirestoreValue> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&FirestoreValue> {
        self.fields.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> BTreeMap<String, FirestoreValue> {
        self.fields
    }

    /// Overwrites every top-level field present in `other`, keeping the rest.
    pub fn merge(&mut self, other: MapValue) {
        self.fields.extend(other.fields);
    }
}

impl From<BTreeMap<String, FirestoreValue>> for MapValue {
    fn from(fields: BTreeMap<String, FirestoreValue>) -> Self {
        Self::new(fields)
    }
}

impl<K> FromIterator<(K, FirestoreValue)> for MapValue
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, FirestoreValue)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_map_entries() {
        let mut map = BTreeMap::new();
        map.insert("foo".to_string(), FirestoreValue::from_integer(1));
        let value = MapValue::new(map.clone());
        assert_eq!(value.fields().get("foo"), map.get("foo"));
    }

    #[test]
    fn merge_keeps_untouched_fields() {
        let mut base: MapValue = [
            ("name", FirestoreValue::from_string("SF")),
            ("population", FirestoreValue::from_integer(860_000)),
        ]
        .into_iter()
        .collect();
        base.merge([("population", FirestoreValue::from_integer(870_000))].into_iter().collect());

        assert_eq!(base.get("name"), Some(&FirestoreValue::from_string("SF")));
        assert_eq!(
            base.get("population"),
            Some(&FirestoreValue::from_integer(870_000))
        );
    }
}
