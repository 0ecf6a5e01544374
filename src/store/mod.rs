//! Persistence layer — profile and turn-log storage.

mod libsql_backend;
mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::ProfileStore;
