#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the `quire` infrastructure crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! quire-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<ErrorName>Ext` trait that adds `.context()`
///   to `Result<T, ErrorName>`, filling the variant's `context` field.
/// * **Conversions**: Implements `From<Source>` (and `.context()` on `Result<T, Source>`) for
///   a variant wrapping a source error, but only when that source type is wrapped by exactly
///   one variant and the variant has no fields besides `source` and `context`. Variants that
///   share a source type (for instance several `std::io::Error` variants carrying the
///   offending path) must be constructed explicitly.
/// * **Formatting**: Emits a private `format_context` helper for use in `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with **named-field** variants only.
/// 2. Variants with a source must include `context: Option<Cow<'static, str>>`.
/// 3. The source field is either named `source` or marked `#[source]`/`#[from]`.
///
/// # Example
///
/// ```rust,ignore
/// use quire_derive::quire_error;
/// use std::borrow::Cow;
/// use std::path::PathBuf;
///
/// #[quire_error]
/// pub enum DiskError {
///     #[error("Read failed for {}{}: {source}", .path.display(), format_context(.context))]
///     Read { path: PathBuf, source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Encoding failed{}: {source}", format_context(.context))]
///     Encode { source: serde_json::Error, context: Option<Cow<'static, str>> },
/// }
///
/// fn encode(v: &serde_json::Value) -> Result<Vec<u8>, DiskError> {
///     serde_json::to_vec(v).context("Encoding manifest")
/// }
/// ```
#[proc_macro_attribute]
pub fn quire_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
