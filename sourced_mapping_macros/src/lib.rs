mod entity;

use proc_macro::TokenStream;

/// Derive macro for `sourced_mapping::Entity`.
///
/// # Usage
///
/// ```ignore
/// #[derive(Entity)]
/// #[entity(collection = "people")]
/// struct Person {
///     #[entity(id, rename = "_id")]
///     id: i32,
///     #[entity(rename = "nm")]
///     names: Vec<String>,
///     #[entity(skip)]
///     cached_total: usize,
/// }
/// ```
///
/// Struct attributes:
/// - `collection = "..."`: defaults to the snake_case struct name plus `s`.
///
/// Field attributes:
/// - `id`: marks the key property. Defaults to the field named `id`.
/// - `rename = "..."`: stored field name for this property.
/// - `skip`: not stored; filled with `Default::default()` on read.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    entity::expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
