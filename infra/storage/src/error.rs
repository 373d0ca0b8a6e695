use std::borrow::Cow;
use std::path::PathBuf;

/// A specialized [`StoreError`] enum of this crate.
///
/// Filesystem variants carry the offending path; variants that refer to a
/// record carry the collection and resource names as supplied by the caller.
#[quire_derive::quire_error]
pub enum StoreError {
    #[error("Unsafe database location {}{}", .path.display(), format_context(.context))]
    UnsafeLocation { path: PathBuf, context: Option<Cow<'static, str>> },

    #[error("Failed to create directory {}{}: {source}", .path.display(), format_context(.context))]
    DirectoryCreateFailed {
        path: PathBuf,
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Missing collection{}", format_context(.context))]
    MissingCollection { context: Option<Cow<'static, str>> },

    #[error("Missing resource{}", format_context(.context))]
    MissingResource { context: Option<Cow<'static, str>> },

    #[error("Invalid name '{name}'{}", format_context(.context))]
    InvalidName { name: String, context: Option<Cow<'static, str>> },

    #[error("Record {collection}/{resource} not found{}", format_context(.context))]
    NotFound { collection: String, resource: String, context: Option<Cow<'static, str>> },

    #[error("Collection {collection} not found{}", format_context(.context))]
    CollectionNotFound { collection: String, context: Option<Cow<'static, str>> },

    #[error("Serialization failed{}: {source}", format_context(.context))]
    SerializationFailed { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Failed to decode {}{}: {source}", .path.display(), format_context(.context))]
    DecodeFailed { path: PathBuf, source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Write failed for {}{}: {source}", .path.display(), format_context(.context))]
    WriteFailed { path: PathBuf, source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error(
        "Rename failed {} -> {}{}: {source}",
        .from.display(),
        .to.display(),
        format_context(.context)
    )]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Read failed for {}{}: {source}", .path.display(), format_context(.context))]
    ReadFailed { path: PathBuf, source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Remove failed for {}{}: {source}", .path.display(), format_context(.context))]
    RemoveFailed { path: PathBuf, source: std::io::Error, context: Option<Cow<'static, str>> },
}

impl StoreError {
    /// `true` for the "record or collection does not exist" family.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::CollectionNotFound { .. })
    }
}
