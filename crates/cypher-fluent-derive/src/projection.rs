//! Projection derive macro implementation

use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Data, DeriveInput, Expr, ExprLit, Fields, Lit, Meta, Result, Token};

/// Source expression of one projected field.
enum Source {
    Ident(String),
    Expr(String),
}

struct FieldAttrs {
    source: Option<Source>,
    rename: Option<String>,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Projection can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Projection can only be derived for structs",
            ));
        }
    };

    let rename_all = parse_rename_all(&input)?;
    let serde_keys = SerdeKeys::of_container(&input.attrs);

    let mut field_calls = Vec::new();
    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_field_attrs(field)?;
        let rust_name = field_ident.unraw().to_string();

        let alias = match (&attrs.rename, rename_all) {
            (Some(rename), _) => rename.clone(),
            (None, Some(rule)) => rule.apply(&rust_name),
            (None, None) => rust_name.clone(),
        };

        // Rows are decoded by alias, so serde must read the field under the same key.
        if let Some(keys) = serde_keys.field_keys(field, &rust_name)
            && !keys.contains(&alias)
        {
            return Err(syn::Error::new_spanned(
                field,
                format!(
                    "projection alias `{alias}` does not match serde key `{}`; \
                     add `#[serde(rename = \"{alias}\")]` to this field",
                    keys[0]
                ),
            ));
        }

        let expr = match attrs.source {
            Some(Source::Expr(text)) => quote! { ::cypher_fluent::ProjectionExpr::raw(#text) },
            Some(Source::Ident(ident)) => quote! { ::cypher_fluent::ident(#ident) },
            None => quote! { ::cypher_fluent::ident(#rust_name) },
        };

        field_calls.push(quote! {
            .field(#alias, #expr)
        });
    }

    Ok(quote! {
        impl #impl_generics ::cypher_fluent::ProjectionShape for #name #ty_generics #where_clause {
            fn projection() -> ::cypher_fluent::projection::Projection {
                ::cypher_fluent::projection::Projection::new()
                    #(#field_calls)*
            }
        }
    })
}

#[derive(Clone, Copy)]
enum RenameRule {
    PascalCase,
    CamelCase,
    SnakeCase,
    ScreamingSnakeCase,
}

impl RenameRule {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "PascalCase" => Some(Self::PascalCase),
            "camelCase" => Some(Self::CamelCase),
            "snake_case" => Some(Self::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Some(Self::ScreamingSnakeCase),
            _ => None,
        }
    }

    fn apply(self, name: &str) -> String {
        match self {
            Self::PascalCase => name.to_upper_camel_case(),
            Self::CamelCase => name.to_lower_camel_case(),
            Self::SnakeCase => name.to_snake_case(),
            Self::ScreamingSnakeCase => name.to_shouty_snake_case(),
        }
    }
}

fn string_value(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Str(s), ..
        }) => Some(s.value()),
        _ => None,
    }
}

fn cypher_metas(attrs: &[syn::Attribute]) -> Result<Vec<Meta>> {
    let mut metas = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("cypher") {
            continue;
        }
        let nested = attr.parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)?;
        metas.extend(nested);
    }
    Ok(metas)
}

/// All `#[serde(...)]` entries, or `None` if any of them is not plain meta syntax.
fn serde_metas(attrs: &[syn::Attribute]) -> Option<Vec<Meta>> {
    let mut metas = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        let nested = attr
            .parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
            .ok()?;
        metas.extend(nested);
    }
    Some(metas)
}

/// The deserialize-side value of `key = "x"` or `key(deserialize = "x")`.
fn serde_value(meta: &Meta, key: &str) -> Option<String> {
    if !meta.path().is_ident(key) {
        return None;
    }
    match meta {
        Meta::NameValue(nv) => string_value(&nv.value),
        Meta::List(list) => list
            .parse_args_with(Punctuated::<Meta, Token![,]>::parse_terminated)
            .ok()?
            .into_iter()
            .find_map(|m| match m {
                Meta::NameValue(nv) if nv.path.is_ident("deserialize") => string_value(&nv.value),
                _ => None,
            }),
        Meta::Path(_) => None,
    }
}

/// serde's own field-case conversions.
#[derive(Clone, Copy)]
enum SerdeCase {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl SerdeCase {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "lowercase" => Some(Self::Lower),
            "UPPERCASE" => Some(Self::Upper),
            "PascalCase" => Some(Self::Pascal),
            "camelCase" => Some(Self::Camel),
            "snake_case" => Some(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Some(Self::ScreamingSnake),
            "kebab-case" => Some(Self::Kebab),
            "SCREAMING-KEBAB-CASE" => Some(Self::ScreamingKebab),
            _ => None,
        }
    }

    fn apply(self, field: &str) -> String {
        match self {
            Self::Lower | Self::Snake => field.to_string(),
            Self::Upper | Self::ScreamingSnake => field.to_ascii_uppercase(),
            Self::Pascal => {
                let mut out = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        out.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
            Self::Camel => {
                let pascal = Self::Pascal.apply(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            Self::Kebab => field.replace('_', "-"),
            Self::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

/// How serde names the fields of a container.
enum SerdeKeys {
    Verbatim,
    Renamed(SerdeCase),
    /// Attributes the derive cannot follow; no check is made.
    Opaque,
}

impl SerdeKeys {
    fn of_container(attrs: &[syn::Attribute]) -> Self {
        let Some(metas) = serde_metas(attrs) else {
            return Self::Opaque;
        };
        for meta in &metas {
            if !meta.path().is_ident("rename_all") {
                continue;
            }
            return match serde_value(meta, "rename_all") {
                Some(value) => SerdeCase::parse(&value).map_or(Self::Opaque, Self::Renamed),
                // serialize-only rule
                None if matches!(meta, Meta::List(_)) => Self::Verbatim,
                None => Self::Opaque,
            };
        }
        Self::Verbatim
    }

    /// Keys serde accepts for `field`, primary key first.
    fn field_keys(&self, field: &syn::Field, rust_name: &str) -> Option<Vec<String>> {
        let primary = match self {
            Self::Verbatim => rust_name.to_string(),
            Self::Renamed(case) => case.apply(rust_name),
            Self::Opaque => return None,
        };
        let metas = serde_metas(&field.attrs)?;
        if metas.iter().any(|m| {
            ["flatten", "skip", "skip_deserializing"]
                .iter()
                .any(|key| m.path().is_ident(key))
        }) {
            return None;
        }

        let mut keys = vec![primary];
        for meta in &metas {
            if let Some(rename) = serde_value(meta, "rename") {
                keys[0] = rename;
            } else if let Some(alias) = serde_value(meta, "alias") {
                keys.push(alias);
            }
        }
        Some(keys)
    }
}

/// Parse `#[cypher(rename_all = "...")]` from the struct attributes.
fn parse_rename_all(input: &DeriveInput) -> Result<Option<RenameRule>> {
    for meta in cypher_metas(&input.attrs)? {
        let Meta::NameValue(nv) = &meta else {
            return Err(syn::Error::new_spanned(meta, "expected `rename_all = \"...\"`"));
        };
        if !nv.path.is_ident("rename_all") {
            return Err(syn::Error::new_spanned(
                &nv.path,
                "unknown container attribute, expected `rename_all`",
            ));
        }
        let value = string_value(&nv.value)
            .ok_or_else(|| syn::Error::new_spanned(&nv.value, "rename_all expects a string"))?;
        return RenameRule::parse(&value).map(Some).ok_or_else(|| {
            syn::Error::new_spanned(
                &nv.value,
                "unsupported rename_all rule, expected one of \"PascalCase\", \"camelCase\", \"snake_case\", \"SCREAMING_SNAKE_CASE\"",
            )
        });
    }
    Ok(None)
}

/// Parse `#[cypher(expr = "...")]`, `#[cypher(ident = "...")]` and `#[cypher(rename = "...")]`.
fn parse_field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut attrs = FieldAttrs {
        source: None,
        rename: None,
    };

    for meta in cypher_metas(&field.attrs)? {
        let Meta::NameValue(nv) = &meta else {
            return Err(syn::Error::new_spanned(meta, "expected `key = \"value\"`"));
        };
        let value = string_value(&nv.value)
            .ok_or_else(|| syn::Error::new_spanned(&nv.value, "expected a string literal"))?;
        if value.trim().is_empty() {
            return Err(syn::Error::new_spanned(&nv.value, "value must not be empty"));
        }

        if nv.path.is_ident("rename") {
            attrs.rename = Some(value);
        } else if nv.path.is_ident("expr") || nv.path.is_ident("ident") {
            if attrs.source.is_some() {
                return Err(syn::Error::new_spanned(
                    &nv.path,
                    "`expr` and `ident` are mutually exclusive",
                ));
            }
            attrs.source = Some(if nv.path.is_ident("expr") {
                Source::Expr(value)
            } else {
                Source::Ident(value)
            });
        } else {
            return Err(syn::Error::new_spanned(
                &nv.path,
                "unknown field attribute, expected `expr`, `ident` or `rename`",
            ));
        }
    }

    Ok(attrs)
}
