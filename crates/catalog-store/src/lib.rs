#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a store feature: `memory` or `sqlite`.");

use catalog_types::ports::document_store::{
    Document, DocumentStore, FindOptions, Query, StoreError,
};

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://catalog.db";

/// Store backend picked at startup.
pub enum Store {
    #[cfg(feature = "memory")]
    Memory(memory::InMemoryStore),
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteStore),
}

pub async fn build_store(url: Option<&str>) -> anyhow::Result<Store> {
    Store::build_store(url).await
}

impl Store {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build_store(url: Option<&str>) -> anyhow::Result<Self> {
        if let Some(url) = url {
            tracing::warn!(url, "sqlite support not compiled in; using in-memory store");
        }
        Ok(Self::Memory(memory::InMemoryStore::new()))
    }

    #[cfg(all(feature = "sqlite", not(feature = "memory")))]
    pub async fn build_store(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or(DEFAULT_DATABASE_URL);
        Ok(Self::Sqlite(sqlite::SqliteStore::new(url).await?))
    }

    // Both backends compiled in: a database URL selects sqlite.
    #[cfg(all(feature = "sqlite", feature = "memory"))]
    pub async fn build_store(database_url: Option<&str>) -> anyhow::Result<Self> {
        match database_url {
            Some(url) => Ok(Self::Sqlite(sqlite::SqliteStore::new(url).await?)),
            None => Ok(Self::Memory(memory::InMemoryStore::new())),
        }
    }

    pub fn backend(&self) -> &'static str {
        match self {
            #[cfg(feature = "memory")]
            Self::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => "sqlite",
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            #[cfg(feature = "memory")]
            Store::Memory($store) => $call,
            #[cfg(feature = "sqlite")]
            Store::Sqlite($store) => $call,
        }
    };
}

#[async_trait::async_trait]
impl DocumentStore for Store {
    async fn insert(&self, collection: &str, doc: Document) -> Result<Document, StoreError> {
        dispatch!(self, s => s.insert(collection, doc).await)
    }

    async fn find_by_id(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        dispatch!(self, s => s.find_by_id(collection, id).await)
    }

    async fn find(
        &self,
        collection: &str,
        query: &Query,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        dispatch!(self, s => s.find(collection, query, options).await)
    }

    async fn save(&self, collection: &str, doc: Document) -> Result<bool, StoreError> {
        dispatch!(self, s => s.save(collection, doc).await)
    }

    async fn delete_one(&self, collection: &str, id: &str) -> Result<u64, StoreError> {
        dispatch!(self, s => s.delete_one(collection, id).await)
    }
}
