//! Procedural macros for the docaccess project.
//!
//! This crate provides compile-time code generation for the docaccess framework.
//! Use it through the `docaccess` crate, which re-exports the derives.

#[allow(unused_extern_crates)]
extern crate self as docaccess_macros;

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Error, Field, Fields, Type};

/// Implements `docaccess::storable::Storable` by delegating to a `StorableInfo` field.
///
/// The field is the one marked `#[storable]`, or otherwise the only field whose type is
/// named `StorableInfo`.
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Storable)]
/// pub struct Organization {
///     pub name: String,
///     #[serde(default)]
///     pub info: StorableInfo,
/// }
/// ```
#[proc_macro_derive(Storable, attributes(storable))]
pub fn derive_storable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand_storable(input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand_storable(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => return Err(Error::new_spanned(&input.ident, "Storable can only be derived for structs")),
    };

    let member = match fields {
        Fields::Named(named) => {
            let field = info_field(named.named.iter().collect(), input.ident.span())?;
            let ident = field.ident.clone();
            quote! { #ident }
        }
        Fields::Unnamed(unnamed) => {
            let fields: Vec<&Field> = unnamed.unnamed.iter().collect();
            let field = info_field(fields.clone(), input.ident.span())?;
            let index = syn::Index::from(
                fields
                    .iter()
                    .position(|f| std::ptr::eq(*f, field))
                    .unwrap_or_default(),
            );
            quote! { #index }
        }
        Fields::Unit => {
            return Err(Error::new_spanned(&input.ident, "Storable requires a StorableInfo field"));
        }
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::docaccess::storable::Storable for #name #ty_generics #where_clause {
            fn storable_info(&self) -> &::docaccess::storable::StorableInfo {
                &self.#member
            }

            fn storable_info_mut(&mut self) -> &mut ::docaccess::storable::StorableInfo {
                &mut self.#member
            }
        }
    })
}

/// Picks the `#[storable]` field, falling back to the single `StorableInfo`-typed field.
fn info_field(fields: Vec<&Field>, span: Span) -> syn::Result<&Field> {
    let marked: Vec<&Field> = fields
        .iter()
        .copied()
        .filter(|f| f.attrs.iter().any(|a| a.path().is_ident("storable")))
        .collect();

    match marked.as_slice() {
        [field] => return Ok(*field),
        [_, second, ..] => {
            return Err(Error::new_spanned(second, "only one field may be marked #[storable]"));
        }
        [] => {}
    }

    let typed: Vec<&Field> = fields
        .iter()
        .copied()
        .filter(|f| is_storable_info(&f.ty))
        .collect();

    match typed.as_slice() {
        [field] => Ok(*field),
        [] => Err(Error::new(span, "no StorableInfo field found; mark one with #[storable]")),
        _ => Err(Error::new(span, "several StorableInfo fields found; mark one with #[storable]")),
    }
}

fn is_storable_info(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "StorableInfo"),
        _ => false,
    }
}
