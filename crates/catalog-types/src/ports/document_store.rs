use std::cmp::Ordering;

use async_trait::async_trait;
use serde_json::Value;

/// Schema-free record; every stored document carries a string `id` field.
pub type Document = Value;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("db error: {0}")]
    DbError(String),

    #[error("document {id} already exists in {collection}")]
    Duplicate { collection: String, id: String },

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("unsupported query: {0}")]
    Query(String),
}

pub fn document_id(doc: &Document) -> Result<&str, StoreError> {
    doc.get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Malformed("document has no string `id`".into()))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Top-level field equals a scalar.
    Eq { field: String, value: Value },
    /// Array field holds the scalar as one of its elements.
    Contains { field: String, value: Value },
    /// Array-of-records field holds an element whose `key` equals the scalar.
    ElemMatch {
        field: String,
        key: String,
        value: Value,
    },
}

/// Conjunction of filters; the empty query matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn contains(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Contains {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn elem_match(mut self, field: &str, key: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::ElemMatch {
            field: field.into(),
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(doc))
    }
}

impl Filter {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq { field, value } => doc.get(field).is_some_and(|v| scalar_eq(v, value)),
            Filter::Contains { field, value } => doc
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.iter().any(|v| scalar_eq(v, value))),
            Filter::ElemMatch { field, key, value } => doc
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| {
                    items
                        .iter()
                        .any(|item| item.get(key).is_some_and(|v| scalar_eq(v, value)))
                }),
        }
    }
}

fn scalar_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    pub fn ascending(field: &str) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(field: &str) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    /// Orders documents by the sort field; missing fields sort first.
    pub fn compare(&self, a: &Document, b: &Document) -> Ordering {
        let ord = compare_values(a.get(&self.field), b.get(&self.field));
        match self.direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(Value::Bool(_)) => 3,
            Some(Value::Array(_)) | Some(Value::Object(_)) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<Sort>,
    pub skip: u64,
    /// `None` returns every match after `skip`.
    pub limit: Option<u64>,
}

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Fails with [`StoreError::Duplicate`] when the id is taken.
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError>;
    async fn find_by_id(&self, collection: &str, id: &str)
        -> Result<Option<Document>, StoreError>;
    async fn find(
        &self,
        collection: &str,
        query: &Query,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;
    /// Replaces the stored document with the same id; `false` if it is gone.
    async fn save(&self, collection: &str, doc: Document) -> Result<bool, StoreError>;
    /// Number of documents removed, 0 or 1.
    async fn delete_one(&self, collection: &str, id: &str) -> Result<u64, StoreError>;
}
