pub mod checkout;
pub mod order_repository;
pub mod product_repository;
pub mod query;

use std::sync::Arc;

use catalog_types::ports::document_store::DocumentStore;

use checkout::Checkout;
use order_repository::OrderRepository;
use product_repository::ProductRepository;

/// Repositories and checkout wired to one shared store.
pub struct Catalog<S: DocumentStore> {
    pub products: ProductRepository<S>,
    pub orders: OrderRepository<S>,
    pub checkout: Checkout<S>,
}

impl<S: DocumentStore> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self::with_store(Arc::new(store))
    }

    pub fn with_store(store: Arc<S>) -> Self {
        let products = ProductRepository::new(Arc::clone(&store));
        let orders = OrderRepository::new(store);
        let checkout = Checkout::new(products.clone(), orders.clone());
        Self {
            products,
            orders,
            checkout,
        }
    }
}
