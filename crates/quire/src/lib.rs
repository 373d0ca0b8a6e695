//! Facade crate for the `Quire` document store.
//! Re-exports the storage driver and the diagnostic sinks it reports through.
//! Keep this crate thin: it should compose other crates, not implement storage logic.
//!
//! ## Usage
//! - Open a database with [`Driver::builder`] (or [`Driver::new`] with [`Options`]).
//! - Give it a [`Sink`] to decide where its diagnostics go; the default is the console at `INFO`.
//! - With the `logger` feature, [`logger::Logger`] installs a process-wide subscriber that
//!   [`Sink::global`] forwards to.
//!
//! ```rust
//! use quire::{Driver, Sink, StoreError};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), StoreError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let db = Driver::builder()
//!     .root(tmp.path().join("school"))
//!     .sink(Sink::silent())
//!     .connect()
//!     .await?;
//!
//! db.write("fish", "onefish", &serde_json::json!({ "type": "one" })).await?;
//! assert_eq!(db.list("fish").await?, ["onefish"]);
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "logger")]
pub use quire_logger as logger;
pub use quire_storage::{
    Driver, DriverBuilder, NoRoot, Options, PurgeReport, Sink, StoreError, StoreErrorExt, WithRoot,
};

/// Build-time enabled features (by Cargo feature).
pub const ENABLED: &[&str] = &[
    #[cfg(feature = "logger")]
    "logger",
];

#[must_use]
pub fn is_enabled(name: &str) -> bool {
    ENABLED.contains(&name)
}
