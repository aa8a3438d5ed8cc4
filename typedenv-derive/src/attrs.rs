//! Attribute parsing for `#[env(...)]` annotations.
//!
//! This module extracts and validates configuration attributes from the
//! struct and its fields during macro expansion.

use syn::{Attribute, Expr, Field, Lit, Path};

/// Parse either a bare expression or a string literal holding one.
///
/// Accepts `converter = my_fn` as well as `converter = "my_fn"`.
fn parse_expr_value(meta: &syn::meta::ParseNestedMeta) -> syn::Result<Expr> {
    let expr: Expr = meta.value()?.parse()?;
    match expr {
        Expr::Lit(syn::ExprLit {
            lit: Lit::Str(s), ..
        }) => s.parse(),
        other => Ok(other),
    }
}

/// Parsed struct-level `#[env(...)]` attributes.
#[derive(Debug, Default)]
pub struct StructAttrs {
    /// Frozen policy; `None` keeps the library default (frozen).
    pub frozen: Option<bool>,

    /// Parent configuration type whose declaration is extended.
    pub extends: Option<Path>,

    /// Extra converter functions registered for this type only.
    pub converters: Vec<Expr>,
}

impl StructAttrs {
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                // frozen or frozen = bool
                if meta.path.is_ident("frozen") {
                    if meta.input.peek(syn::Token![=]) {
                        let value: syn::LitBool = meta.value()?.parse()?;
                        parsed.frozen = Some(value.value);
                    } else {
                        parsed.frozen = Some(true);
                    }
                    return Ok(());
                }

                // extends = Parent
                if meta.path.is_ident("extends") {
                    parsed.extends = Some(meta.value()?.parse()?);
                    return Ok(());
                }

                // converter = function
                if meta.path.is_ident("converter") {
                    parsed.converters.push(parse_expr_value(&meta)?);
                    return Ok(());
                }

                Err(meta.error("unsupported struct-level env attribute"))
            })?;
        }

        Ok(parsed)
    }
}

/// Parsed field-level `#[env(...)]` attributes.
#[derive(Debug, Default)]
pub struct FieldAttrs {
    /// Custom environment variable name override.
    ///
    /// If `None`, the field name is converted to UPPER_SNAKE_CASE.
    pub name: Option<String>,

    /// Explicit default value expression
    pub default: Option<Expr>,

    /// Inline converter function, preferred over the type's registry
    pub converter: Option<Expr>,

    /// Leave the field out of the declaration and fill it with `Default`
    pub skip: bool,
}

impl FieldAttrs {
    /// Extract and validate `#[env(...)]` attributes from a struct field.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let mut attrs = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                // name = "..."
                if meta.path.is_ident("name") {
                    let value: syn::LitStr = meta.value()?.parse()?;
                    attrs.name = Some(value.value());
                    return Ok(());
                }

                // default = value
                if meta.path.is_ident("default") {
                    attrs.default = Some(meta.value()?.parse()?);
                    return Ok(());
                }

                // converter = function
                if meta.path.is_ident("converter") {
                    attrs.converter = Some(parse_expr_value(&meta)?);
                    return Ok(());
                }

                if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    return Ok(());
                }

                Err(meta.error("unsupported env attribute"))
            })?;
        }

        if attrs.skip
            && (attrs.name.is_some() || attrs.default.is_some() || attrs.converter.is_some())
        {
            return Err(syn::Error::new_spanned(
                field,
                "skipped fields cannot have other env attributes",
            ));
        }

        Ok(attrs)
    }
}
