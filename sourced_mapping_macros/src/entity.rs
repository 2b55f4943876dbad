use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type};

struct EntityField {
    ident: Ident,
    ty: Type,
    rename: Option<String>,
    is_id: bool,
    skip: bool,
}

pub fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity derive does not support generic structs",
        ));
    }

    let collection = extract_collection(&input)?;
    let mut fields = extract_fields(&input)?;
    let key = mark_key(name, &mut fields)?;

    let accessors = format_ident!("{}Accessors", name);
    let stored: Vec<_> = fields.iter().filter(|field| !field.skip).collect();
    let skipped: Vec<_> = fields.iter().filter(|field| field.skip).map(|field| &field.ident).collect();

    let idents: Vec<_> = stored.iter().map(|field| &field.ident).collect();
    let types: Vec<_> = stored.iter().map(|field| &field.ty).collect();
    let property_names: Vec<_> = stored
        .iter()
        .map(|field| field.ident.unraw().to_string())
        .collect();
    let infos = stored.iter().zip(&property_names).map(|(field, property)| {
        let ty = &field.ty;
        let rename = field.rename.as_ref().map(|rename| quote!(.renamed(#rename)));
        let key = field.is_id.then(|| quote!(.key()));
        quote! {
            ::sourced_mapping::PropertyInfo::of::<#ty>(#property) #rename #key
        }
    });

    let expanded = quote! {
        #[doc(hidden)]
        #vis struct #accessors {
            #( #idents: ::sourced_mapping::Accessor<#types>, )*
        }

        impl ::sourced_mapping::Entity for #name {
            const COLLECTION: &'static str = #collection;
            type Accessors = #accessors;

            fn properties() -> ::std::vec::Vec<::sourced_mapping::PropertyInfo> {
                ::std::vec![ #( #infos ),* ]
            }

            fn bind(
                binder: &mut ::sourced_mapping::Binder<'_>,
            ) -> ::std::result::Result<Self::Accessors, ::sourced_mapping::BindError> {
                ::std::result::Result::Ok(#accessors {
                    #( #idents: binder.bind::<#types>(#property_names)?, )*
                })
            }

            fn materialize(
                accessors: &Self::Accessors,
                doc: &dyn ::sourced_mapping::DocumentView,
            ) -> ::std::result::Result<Self, ::sourced_mapping::ConversionError> {
                ::std::result::Result::Ok(#name {
                    #( #idents: accessors.#idents.read(doc)?, )*
                    #( #skipped: ::std::default::Default::default(), )*
                })
            }

            fn write(&self, accessors: &Self::Accessors, doc: &mut ::sourced_mapping::Document) {
                #( accessors.#idents.write(&self.#idents, doc); )*
            }

            fn key_value(&self) -> ::sourced_mapping::Value {
                ::sourced_mapping::Bind::to_value(&self.#key)
            }
        }
    };

    Ok(expanded)
}

fn extract_collection(input: &DeriveInput) -> syn::Result<String> {
    let mut collection = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported entity attribute, expected `collection`"))
            }
        })?;
    }

    // Default: snake_case struct name + "s"
    Ok(collection.unwrap_or_else(|| format!("{}s", to_snake_case(&input.ident.to_string()))))
}

fn extract_fields(input: &DeriveInput) -> syn::Result<Vec<EntityField>> {
    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Entity derive requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Entity derive only supports structs",
            ))
        }
    };

    let mut fields = Vec::with_capacity(named.len());
    for field in named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let mut parsed = EntityField {
            ident,
            ty: field.ty.clone(),
            rename: None,
            is_id: false,
            skip: false,
        };

        for attr in &field.attrs {
            if !attr.path().is_ident("entity") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    parsed.is_id = true;
                } else if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    parsed.rename = Some(value.value());
                } else {
                    return Err(meta.error("unsupported entity attribute, expected `id`, `rename` or `skip`"));
                }
                Ok(())
            })?;
        }

        if parsed.skip && (parsed.is_id || parsed.rename.is_some()) {
            return Err(syn::Error::new_spanned(
                &parsed.ident,
                "a skipped field cannot be the key or be renamed",
            ));
        }
        fields.push(parsed);
    }
    Ok(fields)
}

/// Pick the key field: the one marked `#[entity(id)]`, else the field named `id`.
fn mark_key(name: &Ident, fields: &mut [EntityField]) -> syn::Result<Ident> {
    let mut marked = fields.iter().filter(|field| field.is_id);
    if let Some(first) = marked.next() {
        if let Some(second) = marked.next() {
            return Err(syn::Error::new_spanned(
                &second.ident,
                format!("`{}` is already marked as the key", first.ident),
            ));
        }
        return Ok(first.ident.clone());
    }

    match fields
        .iter_mut()
        .find(|field| !field.skip && field.ident.unraw() == "id")
    {
        Some(field) => {
            field.is_id = true;
            Ok(field.ident.clone())
        }
        None => Err(syn::Error::new_spanned(
            name,
            "Entity derive: no field marked with #[entity(id)] and no field named `id`",
        )),
    }
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
