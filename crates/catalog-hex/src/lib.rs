//! catalog-hex: product/order repositories over a document store, plus the inbound HTTP adapter.

pub mod config;
pub mod errors;

pub mod application;

pub use catalog_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
