//! Derive macro for inject-graph
//!
//! `#[derive(Injectable)]` writes the `Injectable::describe` body from
//! attributes, so a type never lists its injectable fields by hand.
//!
//! # Example
//!
//! ```rust,ignore
//! use inject_graph::{Injectable, Shared};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Clone, Default, Injectable)]
//! #[inject(implements(Greeter))]
//! struct HelloService {
//!     #[inject]
//!     tokens: Option<Shared<dyn TokenService>>,
//!     #[inject(name = "hello.url")]
//!     url: Option<String>,
//!     // Not injected
//!     greetings: u64,
//! }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Field, Fields, LitStr, Path, Token, Type, parse_macro_input};

/// Derive `inject_graph::Injectable`.
///
/// # Attributes
///
/// - `#[inject]` on a field: inject any provider of the field's type. The
///   field must be an `Option<T>`.
/// - `#[inject(name = "...")]` on a field: inject only providers with that
///   name (case-insensitive).
/// - `#[inject(implements(TraitA, TraitB))]` on the struct: the type's handle
///   can be viewed as `Shared<dyn TraitA>` and `Shared<dyn TraitB>`.
///
/// Fields without `#[inject]` are left alone by the graph.
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields: Vec<&Field> = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.iter().collect(),
            Fields::Unit => Vec::new(),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Injectable can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Injectable can only be derived for structs",
            ));
        }
    };

    let mut declarations = Vec::new();
    for field in fields {
        let Some(lookup) = find_inject_attr(&field.attrs)? else {
            continue;
        };
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if extract_option_inner_type(&field.ty).is_none() {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "Fields marked with #[inject] must have type Option<T>",
            ));
        }

        let field_name = ident.to_string();
        declarations.push(quote! {
            descriptor.named_field(
                #field_name,
                #lookup,
                |s| &s.#ident,
                |s| &mut s.#ident,
            );
        });
    }

    let implements = find_implements(&input.attrs)?
        .into_iter()
        .map(|interface| {
            quote! {
                descriptor.implements::<dyn #interface>(
                    |s| s as ::inject_graph::Shared<dyn #interface>,
                );
            }
        });

    Ok(quote! {
        impl #impl_generics ::inject_graph::Injectable for #name #ty_generics #where_clause {
            fn describe(descriptor: &mut ::inject_graph::Descriptor<Self>) {
                let _ = &descriptor;
                #(#declarations)*
                #(#implements)*
            }
        }
    })
}

/// Lookup name of a field marked `#[inject]`; `None` when unmarked.
fn find_inject_attr(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    for attr in attrs {
        if !attr.path().is_ident("inject") {
            continue;
        }

        if attr.meta.require_path_only().is_ok() {
            return Ok(Some(String::new()));
        }

        let mut lookup = String::new();
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                lookup = value.value();
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"`"))
            }
        })?;
        return Ok(Some(lookup));
    }
    Ok(None)
}

/// Traits listed in `#[inject(implements(...))]` on the struct.
fn find_implements(attrs: &[Attribute]) -> syn::Result<Vec<Path>> {
    let mut interfaces = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("inject") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("implements") {
                let content;
                syn::parenthesized!(content in meta.input);
                let listed = Punctuated::<Path, Token![,]>::parse_terminated(&content)?;
                interfaces.extend(listed);
                Ok(())
            } else {
                Err(meta.error("expected `implements(...)`"))
            }
        })?;
    }
    Ok(interfaces)
}

/// Extract T from Option<T>
fn extract_option_inner_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
