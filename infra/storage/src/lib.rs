//! An embedded, file-backed JSON document store.
//!
//! Records are grouped into collections and stored one document per file at
//! `<root>/<collection>/<resource>`. There is no server, no index and no query
//! language; the filesystem is the database.
//!
//! # Core Features
//!
//! - **Location Guard**: the database root is refused when it is the filesystem root, the
//!   user's home directory or a shallow path directly beneath it.
//! - **Atomic Writes**: records are staged in `<resource>.tmp`, flushed with `fsync` and renamed
//!   into place, so a reader never observes a partially written record.
//! - **Per-Key Locking**: writers to the same collection are serialized through a lazily built
//!   lock registry; unrelated collections proceed in parallel.
//! - **Pluggable Diagnostics**: every database carries its own [`Sink`], so two stores in one
//!   process can report to different places.
//! - **Self-Healing**: stale `*.tmp` leftovers of interrupted writes can be purged on connect.
//!
//! # Architectural Overview
//!
//! 1.  **[`Driver`]**: the thread-safe, cheaply cloneable handle and entry point.
//! 2.  **[`DriverBuilder`]**: a type-safe fluent builder; [`Options`] is its plain-struct twin.
//! 3.  **[`StoreError`]**: one error enum for every failure, with optional context.
//!
//! # Examples
//!
//! ```rust
//! use quire_storage::{Driver, Sink, StoreError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StoreError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let db = Driver::builder().root(&root).sink(Sink::silent()).connect().await?;
//!
//!     db.write("users", "alice", &serde_json::json!({ "age": 31 })).await?;
//!     db.write("users", "bob", &serde_json::json!({ "age": 27 })).await?;
//!
//!     let alice: serde_json::Value = db.read("users", "alice").await?;
//!     assert_eq!(alice["age"], 31);
//!
//!     let users = db.read_all_map("users").await?;
//!     assert_eq!(users.keys().map(String::as_str).collect::<Vec<_>>(), ["alice", "bob"]);
//!
//!     db.delete_all("users").await?;
//!     assert!(db.read_all("users").await.unwrap_err().is_not_found());
//!     Ok(())
//! }
//! ```

mod atomic;
mod builder;
mod codec;
mod driver;
mod error;
mod locks;
mod maintenance;
mod reader;
mod scanner;
mod security;

pub use builder::{DriverBuilder, NoRoot, Options, WithRoot};
pub use driver::{Driver, DriverInner};
pub use error::{StoreError, StoreErrorExt};
pub use maintenance::PurgeReport;
pub use quire_logger::Sink;
