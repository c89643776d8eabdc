//! Persistence gateway over the document store.
//!
//! The store connection is opened lazily on first use and then shared for
//! the rest of the process; see [`Database::acquire`].

mod surreal;
pub mod traits;

pub use surreal::{Database, DbConfig};
pub use traits::{PropertyStore, UserStore};

/// Errors raised by the persistence gateway
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not connect to the document store: {0}")]
    Connect(#[source] surrealdb::Error),

    #[error("document store query failed: {0}")]
    Query(#[from] surrealdb::Error),

    #[error("document store returned no record for {table}:{id}")]
    NotReturned { table: &'static str, id: String },
}
