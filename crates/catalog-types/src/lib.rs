//! catalog-types: domain records and the document-store port shared by every crate.

pub mod domain;
pub mod ports;
