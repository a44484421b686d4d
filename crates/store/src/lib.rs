//! `defensebot-store`: SQLite-backed directories and defense history.
//!
//! One database file holds the professor and location directories, the
//! student roster and every saved defense record. History rows are only
//! ever written after a draft has been reconciled.

mod error;
mod schema;
pub mod seed;
mod store;

pub use error::StoreError;
pub use seed::ImportReport;
pub use store::Store;
