use std::sync::Arc;

use catalog_types::domain::listing::ProductListOptions;
use catalog_types::domain::product::{DeleteAck, Product, ProductDraft, ProductPatch, COLLECTION};
use catalog_types::ports::document_store::DocumentStore;
use tracing::instrument;

use super::query::{from_document, from_documents, id_page, product_query, to_document};
use crate::errors::AppError;

pub struct ProductRepository<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> Clone for ProductRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".into())
}

impl<S: DocumentStore> ProductRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, draft))]
    pub async fn create(&self, draft: ProductDraft) -> Result<Product, AppError> {
        let product = draft.validate()?;
        self.store.insert(COLLECTION, to_document(&product)?).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, options: &ProductListOptions) -> Result<Vec<Product>, AppError> {
        let docs = self
            .store
            .find(
                COLLECTION,
                &product_query(options),
                &id_page(options.offset, options.limit),
            )
            .await?;
        tracing::debug!(count = docs.len(), "products listed");
        Ok(from_documents(docs)?)
    }

    /// `None` when no product has this id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Product>, AppError> {
        let doc = self.store.find_by_id(COLLECTION, id).await?;
        Ok(doc.map(from_document).transpose()?)
    }

    /// Read-modify-write with no version check: concurrent updates of the
    /// same product can overwrite each other.
    #[instrument(skip(self, patches))]
    pub async fn update(&self, id: &str, patches: Vec<ProductPatch>) -> Result<Product, AppError> {
        let mut product = self.get(id).await?.ok_or_else(not_found)?;
        product.apply(patches);
        if !self.store.save(COLLECTION, to_document(&product)?).await? {
            return Err(not_found());
        }
        tracing::info!(product_id = %id, "product updated");
        Ok(product)
    }

    /// Hard delete; removing an unknown id reports a zero count.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> Result<DeleteAck, AppError> {
        let deleted_count = self.store.delete_one(COLLECTION, id).await?;
        tracing::info!(product_id = %id, deleted_count, "product removed");
        Ok(DeleteAck {
            acknowledged: true,
            deleted_count,
        })
    }
}
