use serde::{Deserialize, Serialize};

use crate::firestore::error::{invalid_input, FirestoreResult};
use crate::firestore::model::{DocumentKey, FieldPath, IntoFieldPath, ResourcePath};

use super::filter::{FieldFilter, Filter, FilterOperator, FilterValue};
use super::snapshot::DocumentSnapshot;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderBy {
    field: FieldPath,
    direction: OrderDirection,
}

impl OrderBy {
    pub fn field(&self) -> &FieldPath {
        &self.field
    }

    pub fn direction(&self) -> OrderDirection {
        self.direction
    }
}

/// A query over one collection: conjunctive filters, at most one ordering
/// field and at most one limit.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    collection_path: ResourcePath,
    filters: Vec<FieldFilter>,
    order_by: Option<OrderBy>,
    limit: Option<u32>,
}

impl Query {
    pub fn new(collection: &str) -> FirestoreResult<Self> {
        Ok(Self {
            collection_path: ResourcePath::collection(collection)?,
            filters: Vec::new(),
            order_by: None,
            limit: None,
        })
    }

    /// Returns the full resource path to the targeted collection.
    pub fn collection_path(&self) -> &ResourcePath {
        &self.collection_path
    }

    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    pub fn order_by_clause(&self) -> Option<&OrderBy> {
        self.order_by.as_ref()
    }

    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    /// Adds a translated filter clause.
    pub fn filter(mut self, filter: &Filter) -> FirestoreResult<Self> {
        self.filters.push(filter.translate()?);
        Ok(self)
    }

    pub fn where_field(
        self,
        field: impl Into<String>,
        op: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> FirestoreResult<Self> {
        self.filter(&Filter::new(field, op, value))
    }

    /// Sets the single ordering field. A second call is rejected.
    pub fn order_by(
        mut self,
        field: impl IntoFieldPath,
        direction: OrderDirection,
    ) -> FirestoreResult<Self> {
        if self.order_by.is_some() {
            return Err(invalid_input(
                "Queries support a single order_by field",
            ));
        }
        self.order_by = Some(OrderBy {
            field: field.into_field_path()?,
            direction,
        });
        Ok(self)
    }

    /// Caps the number of results. Zero or negative values mean no limit.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = u32::try_from(limit).ok().filter(|limit| *limit > 0);
        self
    }

    pub(crate) fn matches_collection(&self, key: &DocumentKey) -> bool {
        key.collection_path() == self.collection_path
    }
}

/// Serializable query description as supplied by a host layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub collection: String,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default, alias = "orderBy")]
    pub order_by: Option<String>,
    #[serde(default)]
    pub direction: OrderDirection,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl QuerySpec {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_order_by(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by = Some(field.into());
        self.direction = direction;
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn from_json(value: &serde_json::Value) -> FirestoreResult<Self> {
        QuerySpec::deserialize(value)
            .map_err(|err| invalid_input(format!("Malformed query: {err}")))
    }

    /// Builds the query, failing on the first invalid filter.
    pub fn to_query(&self) -> FirestoreResult<Query> {
        let mut query = Query::new(&self.collection)?;
        for filter in &self.filters {
            query = query.filter(filter)?;
        }
        if let Some(field) = &self.order_by {
            query = query.order_by(field.as_str(), self.direction)?;
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        Ok(query)
    }
}

/// Documents returned by a query, in result order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuerySnapshot {
    documents: Vec<DocumentSnapshot>,
}

impl QuerySnapshot {
    pub fn new(documents: Vec<DocumentSnapshot>) -> Self {
        Self { documents }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn into_documents(self) -> Vec<DocumentSnapshot> {
        self.documents
    }
}
