extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod http_error;

/// Derive macro for mapping error variants to an HTTP status and a public error message
///
/// Annotate each variant with `#[http_error(...)]`, which takes one or two arguments:
/// - status code (required): a `StatusCode` constant (`BAD_REQUEST`) or a number (`400`)
/// - public message (optional): a string literal with basic interpolation
///
/// Tuple variants interpolate by index (`"column {0}"`), struct variants by field
/// name (`"sender {sender}"`). Without a message the `Display` impl is used, so the
/// message argument is only needed when the text shown to HTTP clients should differ
/// from what gets logged.
///
/// The derive generates `http_code()` and `http_message()`. Variants without the
/// attribute are a compile error, since every error leaving a handler needs a status.
///
/// ### Example
///
/// ```rust,ignore
/// #[derive(Debug, thiserror::Error, photomail::HttpError)]
/// enum Error {
///     #[error("spreadsheet could not be read: {0}")]
///     #[http_error(BAD_REQUEST)]
///     InvalidSpreadsheet(String),
///
///     #[error("relay rejected login for {sender}: {detail}")]
///     #[http_error(401, "invalid email credentials for {sender}")]
///     Rejected { sender: String, detail: String },
///
///     #[error("internal error: {0:?}")]
///     #[http_error(INTERNAL_SERVER_ERROR, "an internal server error occurred")]
///     Internal(#[from] anyhow::Error),
/// }
/// ```
#[proc_macro_derive(HttpError, attributes(http_error))]
pub fn http_error_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    http_error::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
