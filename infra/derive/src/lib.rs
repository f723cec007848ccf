#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the LMS workspace: error enums, feature slices
//! and Axum/`OpenAPI` glue.
//!
//! The examples below are `ignore`d because a proc-macro crate cannot use its own
//! macros in doctests; the integration tests under `tests/` exercise them instead.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Defines a request/response model for the HTTP surface.
///
/// * Adds `Debug`, `Serialize` and `Deserialize` when they are not derived already.
/// * Adds `utoipa::ToSchema` behind the consumer's `server` feature.
/// * Applies `#[serde(rename_all = "camelCase")]` unless `rename_all = "..."` is given.
///
/// ```rust,ignore
/// #[lms_derive::api_model(rename_all = "snake_case")]
/// pub struct NonceResponse {
///     pub nonce: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Bridges an Axum handler with `utoipa::path` documentation.
///
/// Accepts the usual `utoipa::path` arguments (`get`, `post`, `path = "..."`,
/// `responses(...)`, `tag = "..."`).
///
/// ```rust,ignore
/// #[lms_derive::api_handler(get, path = "/health", responses((status = OK)), tag = "System")]
/// pub async fn health_handler() -> &'static str {
///     "up"
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into a workspace error type.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` (skipped for traits already derived).
/// * `<Name>Ext` with `.context(...)` for `Result<T, Name>` and, for every variant
///   with a `source` field, for `Result<T, SourceError>`.
/// * `From<SourceError>` for variants with a `source` field.
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A module-private `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// Variants use named fields. Variants carrying a `source` must also carry
/// `context: Option<Cow<'static, str>>`. Only one `lms_error` enum per module.
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[lms_derive::lms_error]
/// pub enum StoreError {
///     #[error("IO error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, StoreError> {
///     std::fs::read_to_string(path).context("Reading enrollment snapshot")
/// }
/// ```
#[proc_macro_attribute]
pub fn lms_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Turns a struct into a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` is a cheap `Arc` wrapper
/// that derefs to it and implements `lms_kernel::domain::registry::FeatureSlice`.
///
/// ```rust,ignore
/// #[lms_derive::lms_slice]
/// #[derive(Debug)]
/// pub struct Enrollment {
///     pub store: std::sync::Arc<dyn EnrollmentStore>,
/// }
///
/// let slice = Enrollment::new(EnrollmentInner { store });
/// ```
#[proc_macro_attribute]
pub fn lms_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
