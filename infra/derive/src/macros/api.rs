use super::derived_trait_names;
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::{ItemFn, ItemStruct, LitStr, Meta};

/// Expands `#[api_model]`: serde derives, camelCase field names and an `OpenAPI`
/// schema when the consuming crate builds with its `server` feature.
pub fn expand_api_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let rename_all = match parse_rename_all(args) {
        Ok(value) => value.unwrap_or_else(|| LitStr::new("camelCase", proc_macro2::Span::call_site())),
        Err(err) => return err,
    };

    let derives = derived_trait_names(&input.attrs);
    let mut missing = Vec::new();
    if !derives.contains("Debug") {
        missing.push(quote! { Debug });
    }
    if !derives.contains("Serialize") {
        missing.push(quote! { ::serde::Serialize });
    }
    if !derives.contains("Deserialize") {
        missing.push(quote! { ::serde::Deserialize });
    }
    let derive_attr = if missing.is_empty() {
        quote! {}
    } else {
        quote! { #[derive(#(#missing),*)] }
    };
    let schema_attr = if derives.contains("ToSchema") {
        quote! {}
    } else {
        quote! { #[cfg_attr(feature = "server", derive(::utoipa::ToSchema))] }
    };

    quote! {
        #derive_attr
        #schema_attr
        #[serde(rename_all = #rename_all)]
        #input
    }
}

/// Expands `#[api_handler]`: forwards the arguments to `utoipa::path` under the
/// `server` feature and silences `unused_async` for thin Axum handlers.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[cfg_attr(feature = "server", ::utoipa::path(#args))]
        #vis #sig #block
    }
}

fn parse_rename_all(args: TokenStream) -> Result<Option<LitStr>, TokenStream> {
    let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
    let metas = parser.parse2(args).map_err(|err| err.to_compile_error())?;

    let mut rename_all = None;
    for meta in metas {
        let Meta::NameValue(nv) = meta else {
            return Err(syn::Error::new_spanned(meta, "expected `rename_all = \"...\"`")
                .to_compile_error());
        };
        if !nv.path.is_ident("rename_all") {
            return Err(syn::Error::new_spanned(nv.path, "unsupported argument; expected rename_all")
                .to_compile_error());
        }
        if rename_all.is_some() {
            return Err(syn::Error::new_spanned(&nv, "duplicate rename_all").to_compile_error());
        }
        let syn::Expr::Lit(syn::ExprLit { lit: syn::Lit::Str(lit), .. }) = &nv.value else {
            return Err(syn::Error::new_spanned(&nv.value, "rename_all must be a string literal")
                .to_compile_error());
        };
        rename_all = Some(lit.clone());
    }

    Ok(rename_all)
}
