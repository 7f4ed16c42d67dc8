use catalog_types::domain::listing::{OrderListOptions, ProductListOptions};
use catalog_types::ports::document_store::{Document, FindOptions, Query, Sort, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// `limit` documents after `offset`, by ascending id.
///
/// Ids are generated in creation order, so this pages through records
/// oldest first.
pub fn id_page(offset: u64, limit: u64) -> FindOptions {
    FindOptions {
        sort: Some(Sort::ascending("id")),
        skip: offset,
        limit: Some(limit),
    }
}

pub fn product_query(options: &ProductListOptions) -> Query {
    match &options.tag {
        Some(tag) => Query::all().elem_match("tags", "title", tag.as_str()),
        None => Query::all(),
    }
}

pub fn order_query(options: &OrderListOptions) -> Query {
    let mut query = Query::all();
    if let Some(status) = options.status {
        query = query.eq("status", status.as_str());
    }
    if let Some(product_id) = &options.product_id {
        query = query.contains("products", product_id.as_str());
    }
    query
}

pub(crate) fn to_document<T: Serialize>(record: &T) -> Result<Document, StoreError> {
    serde_json::to_value(record).map_err(|e| StoreError::Malformed(e.to_string()))
}

pub(crate) fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T, StoreError> {
    serde_json::from_value(doc).map_err(|e| StoreError::Malformed(e.to_string()))
}

pub(crate) fn from_documents<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>, StoreError> {
    docs.into_iter().map(from_document).collect()
}
