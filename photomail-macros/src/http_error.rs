use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Expr, Fields, Lit, Token, Variant};

struct HttpAttr {
    code: TokenStream,
    message: Option<String>,
}

pub(crate) fn expand(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new(
            input.span(),
            "HttpError can only be derived for enums",
        ));
    };

    let mut code_arms = Vec::new();
    let mut message_arms = Vec::new();
    for variant in &data_enum.variants {
        let attr = parse_variant_attr(variant)?;
        let ident = &variant.ident;
        let code = &attr.code;

        match &variant.fields {
            Fields::Unit => {
                code_arms.push(quote! { Self::#ident => #code, });
                let message = match &attr.message {
                    Some(msg) => quote! { #msg.to_string() },
                    None => quote! { self.to_string() },
                };
                message_arms.push(quote! { Self::#ident => #message, });
            }
            Fields::Unnamed(fields) => {
                code_arms.push(quote! { Self::#ident(..) => #code, });
                let bindings: Vec<_> = (0..fields.unnamed.len())
                    .map(|i| format_ident!("__field_{}", i))
                    .collect();
                let message = match &attr.message {
                    Some(msg) => {
                        let msg = index_placeholders(msg);
                        quote! { format!(#msg) }
                    }
                    None => quote! { self.to_string() },
                };
                message_arms.push(quote! {
                    #[allow(unused_variables)]
                    Self::#ident(#(#bindings),*) => #message,
                });
            }
            Fields::Named(fields) => {
                code_arms.push(quote! { Self::#ident { .. } => #code, });
                let message = match &attr.message {
                    Some(msg) => {
                        // format! rejects named arguments the string never mentions
                        let placeholders = named_placeholders(msg);
                        let names: Vec<_> = fields
                            .named
                            .iter()
                            .filter_map(|f| f.ident.as_ref())
                            .filter(|name| placeholders.iter().any(|p| name == &p))
                            .collect();
                        quote! {
                            Self::#ident { #(#names,)* .. } => format!(#msg, #(#names = #names),*),
                        }
                    }
                    None => quote! { Self::#ident { .. } => self.to_string(), },
                };
                message_arms.push(message);
            }
        }
    }

    Ok(quote! {
        impl #name {
            /// HTTP status this error is reported with.
            pub fn http_code(&self) -> http::StatusCode {
                match self {
                    #(#code_arms)*
                }
            }

            /// Message safe to return to HTTP clients.
            pub fn http_message(&self) -> String {
                match self {
                    #(#message_arms)*
                }
            }
        }
    })
}

fn parse_variant_attr(variant: &Variant) -> syn::Result<HttpAttr> {
    let attr = variant
        .attrs
        .iter()
        .find(|a| a.path().is_ident("http_error"))
        .ok_or_else(|| {
            syn::Error::new(
                variant.ident.span(),
                "missing #[http_error(...)] attribute on variant",
            )
        })?;

    let args = attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)?;
    let mut args = args.into_iter();

    let code = match args.next() {
        Some(Expr::Path(path)) => {
            let code = &path.path;
            quote! { http::StatusCode::#code }
        }
        Some(Expr::Lit(lit)) => match &lit.lit {
            Lit::Int(int) => {
                let code = int.base10_parse::<u16>()?;
                if !(100..=999).contains(&code) {
                    return Err(syn::Error::new(int.span(), "status code out of range"));
                }
                quote! {
                    match http::StatusCode::from_u16(#code) {
                        Ok(code) => code,
                        Err(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
                    }
                }
            }
            other => return Err(syn::Error::new(other.span(), "expected a status code")),
        },
        Some(other) => return Err(syn::Error::new(other.span(), "expected a status code")),
        None => return Err(syn::Error::new(attr.span(), "expected a status code")),
    };

    let message = match args.next() {
        Some(Expr::Lit(lit)) => match &lit.lit {
            Lit::Str(s) => Some(s.value()),
            other => return Err(syn::Error::new(other.span(), "expected a string literal")),
        },
        Some(other) => return Err(syn::Error::new(other.span(), "expected a string literal")),
        None => None,
    };

    if let Some(extra) = args.next() {
        return Err(syn::Error::new(extra.span(), "unexpected argument"));
    }

    Ok(HttpAttr { code, message })
}

/// Rewrites positional placeholders (`{0}`, `{1:?}`) to the names bound in the match arm.
fn index_placeholders(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        result.push(c);
        if c == '{' {
            if chars.peek() == Some(&'{') {
                // escaped brace
                if let Some(next) = chars.next() {
                    result.push(next);
                }
                continue;
            }
            if chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                result.push_str("__field_");
            }
        }
    }

    result
}

/// Names referenced by `{name}` or `{name:fmt}` placeholders, skipping escaped braces.
fn named_placeholders(input: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
            }
            '{' => {
                let mut name = String::new();
                for c in chars.by_ref() {
                    if c == '}' || c == ':' {
                        break;
                    }
                    name.push(c);
                }
                let name = name.trim().to_string();
                if name.starts_with(|c: char| c.is_alphabetic() || c == '_') && !names.contains(&name) {
                    names.push(name);
                }
            }
            _ => {}
        }
    }

    names
}
