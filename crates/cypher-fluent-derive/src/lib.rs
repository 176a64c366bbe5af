//! Derive macros for cypher-fluent
//!
//! Provides `#[derive(Projection)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod projection;

/// Derive `ProjectionShape` for a struct, so it can be used with `return_projection::<T>()`.
///
/// Each field becomes one `expr AS alias` item, in declaration order. Rows are mapped onto the
/// fields positionally and then deserialized with serde by alias, so every alias must be a key
/// serde reads for its field. The derive checks this against the `#[serde(...)]` attributes and
/// fails to compile on a mismatch.
///
/// # Example
///
/// ```ignore
/// use cypher_fluent::Projection;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Projection)]
/// #[serde(rename_all = "PascalCase")]
/// #[cypher(rename_all = "PascalCase")]
/// struct Friendship {
///     #[cypher(ident = "other")]
///     friend: Node<Person>,
///     #[cypher(expr = "type(r)")]
///     kind: String,
///     since: i64,
/// }
/// // RETURN other AS Friend, type(r) AS Kind, since AS Since
/// ```
///
/// # Attributes
///
/// - `#[cypher(ident = "x")]` - Project a bound identifier (defaults to the field name)
/// - `#[cypher(expr = "...")]` - Project a raw Cypher expression
/// - `#[cypher(rename = "Alias")]` - Override the output alias. Needs a matching
///   `#[serde(rename = "Alias")]` (or `alias`) on the same field.
/// - `#[cypher(rename_all = "...")]` on the struct - `PascalCase`, `camelCase`, `snake_case` or
///   `SCREAMING_SNAKE_CASE` aliases. Needs the same `#[serde(rename_all = "...")]` unless each
///   field is renamed for serde individually.
#[proc_macro_derive(Projection, attributes(cypher))]
pub fn derive_projection(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    projection::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
