use proc_macro::TokenStream;
use quote::quote;

use syn::punctuated::Punctuated;
use syn::spanned::Spanned as _;
use syn::{Attribute, Data, DeriveInput, Error, ItemTrait, Meta, Token, Type};

const EXPORT_ATTR: &str = "export";
const SINGLETON_ATTR: &str = "singleton";
const IMPORT_ATTR: &str = "import";
const IMPORT_MANY_ATTR: &str = "import_many";
const EMBED_ATTR: &str = "embed";

fn require_interface(ty: &Type) -> Result<(), Error> {
    match ty {
        Type::TraitObject(_) => Ok(()),
        Type::Paren(inner) => require_interface(&inner.elem),
        _ => Err(Error::new(
            ty.span(),
            format!("`{}` is not an interface", quote!(#ty)),
        )),
    }
}

fn parse_exports(attrs: &[Attribute]) -> Result<Vec<Type>, Error> {
    let mut exports = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident(EXPORT_ATTR) {
            continue;
        }
        let types =
            attr.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?;
        for ty in types {
            require_interface(&ty)?;
            exports.push(ty);
        }
    }
    Ok(exports)
}

fn has_flag(attrs: &[Attribute], name: &str) -> Result<bool, Error> {
    for attr in attrs {
        if attr.path().is_ident(name) {
            attr.meta.require_path_only()?;
            return Ok(true);
        }
    }
    Ok(false)
}

enum FieldAttr {
    Import(Option<Type>),
    ImportMany(Option<Type>),
    Embed,
}

fn parse_capability(attr: &Attribute) -> Result<Option<Type>, Error> {
    match &attr.meta {
        Meta::Path(_) => Ok(None),
        Meta::List(list) => {
            let ty = syn::parse2::<Type>(list.tokens.clone())?;
            require_interface(&ty)?;
            Ok(Some(ty))
        }
        Meta::NameValue(v) => Err(Error::new(
            v.span(),
            "expected `#[import]` or `#[import(dyn Interface)]`",
        )),
    }
}

fn parse_field_attr(attrs: &[Attribute]) -> Result<Option<FieldAttr>, Error> {
    let mut found = None;
    for attr in attrs {
        let parsed = if attr.path().is_ident(IMPORT_ATTR) {
            FieldAttr::Import(parse_capability(attr)?)
        } else if attr.path().is_ident(IMPORT_MANY_ATTR) {
            FieldAttr::ImportMany(parse_capability(attr)?)
        } else if attr.path().is_ident(EMBED_ATTR) {
            attr.meta.require_path_only()?;
            FieldAttr::Embed
        } else {
            continue;
        };
        if found.is_some() {
            return Err(Error::new(
                attr.span(),
                format!(
                    "only one of #[{IMPORT_ATTR}], #[{IMPORT_MANY_ATTR}] or #[{EMBED_ATTR}] is allowed per field"
                ),
            ));
        }
        found = Some(parsed);
    }
    Ok(found)
}

/// Derive macro for the Component trait
#[proc_macro_derive(Component, attributes(export, singleton, import, import_many, embed))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match handle_derive_component(input) {
        Ok(v) => v.into(),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn handle_derive_component(input: DeriveInput) -> Result<proc_macro2::TokenStream, Error> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(s) => &s.fields,
        _ => return Err(Error::new(name.span(), "Only structs are supported")),
    };

    let mut stmts = Vec::new();
    if has_flag(&input.attrs, SINGLETON_ATTR)? {
        stmts.push(quote! { .singleton() });
    }
    for ty in parse_exports(&input.attrs)? {
        stmts.push(quote! {
            .export::<#ty>(|this: ::std::sync::Arc<Self>| -> ::std::sync::Arc<#ty> { this })
        });
    }

    match fields {
        syn::Fields::Named(fields) => {
            for field in &fields.named {
                let field_ident = field.ident.as_ref().unwrap();
                let field_name = field_ident.to_string();
                let stmt = match parse_field_attr(&field.attrs)? {
                    Some(FieldAttr::Import(None)) => quote! {
                        .import(#field_name, |this| &this.#field_ident)
                    },
                    Some(FieldAttr::Import(Some(ty))) => quote! {
                        .import_as(
                            #field_name,
                            ::junction::Key::interface::<#ty>(),
                            |this| &this.#field_ident,
                        )
                    },
                    Some(FieldAttr::ImportMany(None)) => quote! {
                        .import_many(#field_name, |this| &this.#field_ident)
                    },
                    Some(FieldAttr::ImportMany(Some(ty))) => quote! {
                        .import_many_as(
                            #field_name,
                            ::junction::Key::interface::<#ty>(),
                            |this| &this.#field_ident,
                        )
                    },
                    Some(FieldAttr::Embed) => quote! {
                        .embed(#field_name, |this| &this.#field_ident)
                    },
                    None => continue,
                };
                stmts.push(stmt);
            }
        }
        syn::Fields::Unnamed(_) => {
            return Err(Error::new(name.span(), "Tuple structs are not supported"));
        }
        syn::Fields::Unit => {}
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::junction::Component for #name #ty_generics #where_clause {
            fn descriptor() -> ::junction::Descriptor<Self> {
                ::junction::Descriptor::<Self>::new()
                    #(#stmts)*
            }
        }
    })
}

/// Attribute macro marking a trait as a capability
#[proc_macro_attribute]
pub fn interface(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return TokenStream::from(
            Error::new(
                proc_macro2::Span::call_site(),
                "#[interface] does not take arguments",
            )
            .to_compile_error(),
        );
    }
    if let Ok(item_trait) = syn::parse::<ItemTrait>(item) {
        return handle_interface(item_trait);
    }
    TokenStream::from(
        Error::new(
            proc_macro2::Span::call_site(),
            "#[interface] can only be applied to traits",
        )
        .to_compile_error(),
    )
}

fn handle_interface(input: ItemTrait) -> TokenStream {
    if !input.generics.params.is_empty() {
        return TokenStream::from(
            Error::new(input.generics.span(), "Generic traits are not supported")
                .to_compile_error(),
        );
    }
    let name = &input.ident;
    quote! {
        #input

        impl ::junction::Interface for dyn #name {}
    }
    .into()
}
