use super::derived_traits;
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{Error, Expr, ExprLit, ItemFn, ItemStruct, Lit, LitStr, MetaNameValue, Token};

#[derive(Default)]
struct ModelOptions {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

impl ModelOptions {
    fn parse(args: TokenStream) -> syn::Result<Self> {
        let metas = Punctuated::<MetaNameValue, Token![,]>::parse_terminated.parse2(args)?;
        let mut options = Self::default();

        for meta in metas {
            let Expr::Lit(ExprLit { lit, .. }) = &meta.value else {
                return Err(Error::new_spanned(&meta.value, "expected a literal value"));
            };

            match (meta.path.get_ident().map(ToString::to_string).as_deref(), lit) {
                (Some("rename_all"), Lit::Str(value)) => options.rename_all = Some(value.clone()),
                (Some("deny_unknown_fields"), Lit::Bool(value)) => {
                    options.deny_unknown_fields = value.value;
                },
                (Some("rename_all" | "deny_unknown_fields"), other) => {
                    return Err(Error::new_spanned(other, "unexpected literal type"));
                },
                _ => {
                    return Err(Error::new_spanned(
                        &meta.path,
                        "unsupported argument; expected rename_all or deny_unknown_fields",
                    ));
                },
            }
        }

        Ok(options)
    }
}

/// Expands `#[api_model]`: serde + `OpenAPI` derives plus the requested serde policy.
pub fn expand_model(args: TokenStream, input: ItemStruct) -> TokenStream {
    let options = match ModelOptions::parse(args) {
        Ok(options) => options,
        Err(err) => return err.to_compile_error(),
    };

    let present = derived_traits(&input.attrs);
    let missing = [
        ("Debug", quote! { Debug }),
        ("Serialize", quote! { ::serde::Serialize }),
        ("Deserialize", quote! { ::serde::Deserialize }),
        ("ToSchema", quote! { ::utoipa::ToSchema }),
    ]
    .into_iter()
    .filter(|(name, _)| !present.contains(*name))
    .map(|(_, tokens)| tokens)
    .collect::<Vec<_>>();

    let derive = if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } };
    let rename = options.rename_all.map(|value| quote! { #[serde(rename_all = #value)] });
    let deny = options.deny_unknown_fields.then(|| quote! { #[serde(deny_unknown_fields)] });

    quote! {
        #derive
        #rename
        #deny
        #input
    }
}

/// Expands `#[api_handler]`: registers the handler with `utoipa::path`.
pub fn expand_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    quote! {
        #[::utoipa::path(#args)]
        #[allow(clippy::unused_async)]
        #input
    }
}
