//! Storage module for the API.
//!
//! Provides the append-only diagram log and its SQLite backend.

pub mod error;
pub mod traits;

// Storage backend implementations
pub mod sqlite;

pub use error::StorageError;
pub use sqlite::SqliteDiagramLog;
pub use traits::DiagramLog;
