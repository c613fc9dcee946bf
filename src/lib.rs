//! Motoshop Store is the record-keeping core of a motorcycle repair shop.
//!
//! Three collections (customers, motorcycles and service orders) are kept as one
//! JSON array each under a single key of a durable string key-value store. Every
//! mutation is a whole-collection read-modify-write.
//!
//! ## Core Components
//! - [`engine`]: The key-value backend (in-memory with atomic file persistence).
//! - [`model`]: Entities and their persisted JSON shape.
//! - [`repository`]: Generic CRUD over one collection, with stable ids.
//! - [`resolver`]: Soft references from service orders to customers and motorcycles.
//! - [`stats`]: Dashboard aggregation.
//! - [`codegen`]: Sequential motorcycle codes.
//! - [`validation`]: Field rules and input masks applied before a save.
//! - [`sdk`]: The [`sdk::Shop`] facade and store initialization.

pub mod codegen;
pub mod engine;
pub mod model;
pub mod repository;
pub mod resolver;
pub mod sdk;
pub mod stats;
pub mod validation;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use validation::ValidationError;

/// Errors returned by the store and the layers built on it.
#[derive(Error, Debug)]
pub enum Error {
    /// A position was outside the current bounds of a collection.
    #[error("position {position} not found in {collection} (len {len})")]
    PositionNotFound {
        collection: &'static str,
        position: usize,
        len: usize,
    },
    /// No record with the given id exists in the collection.
    #[error("record {id} not found in {collection}")]
    RecordNotFound { collection: &'static str, id: Uuid },
    /// One or more field rules failed. Nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The stored value for a collection is not a JSON array of the expected shape.
    #[error("malformed data in {collection}: {source}")]
    Parse {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during JSON serialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True for both position and id lookups that missed.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::PositionNotFound { .. } | Error::RecordNotFound { .. })
    }
}

/// A specialized Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Defines basic read operations for the store.
#[async_trait]
pub trait KVReader: Send + Sync {
    /// Retrieves the raw value stored under `key`, or `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;
}

/// Defines basic write and delete operations for the store.
#[async_trait]
pub trait KVWriter: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;
    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Allows discovering which keys are present.
#[async_trait]
pub trait KeyEnumeration: Send + Sync {
    /// Lists every key currently stored.
    async fn keys(&self) -> Result<Vec<String>>;
}

/// The durable string-keyed store every collection is persisted through.
pub trait KeyValueStore: KVReader + KVWriter + KeyEnumeration {}

impl<T: KVReader + KVWriter + KeyEnumeration> KeyValueStore for T {}
