use proc_macro2::Span;
use syn::{spanned::Spanned, Attribute, LitStr};

#[derive(Default, Clone)]
pub(crate) struct FieldAttr {
    pub(crate) rename: Option<LitStr>,
    pub(crate) skip: bool,
    pub(crate) default: bool,
}

#[derive(Default, Clone)]
pub(crate) struct VariantAttr {
    pub(crate) rename: Option<LitStr>,
}

pub(crate) fn ensure_no_bencode_attrs(attrs: &[Attribute], ctx: &str) -> syn::Result<()> {
    for a in attrs {
        if a.path().is_ident("bencode") {
            return Err(syn::Error::new(
                a.span(),
                format!("`#[bencode(...)]` is not supported on {ctx}"),
            ));
        }
    }
    Ok(())
}

pub(crate) fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttr> {
    let mut out = FieldAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("bencode") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                if out.skip {
                    return Err(meta.error("duplicate `bencode(skip)`"));
                }
                out.skip = true;
                return Ok(());
            }
            if meta.path.is_ident("default") {
                if out.default {
                    return Err(meta.error("duplicate `bencode(default)`"));
                }
                out.default = true;
                return Ok(());
            }
            if meta.path.is_ident("rename") {
                if out.rename.is_some() {
                    return Err(meta.error("duplicate `bencode(rename = ...)`"));
                }
                out.rename = Some(meta.value()?.parse()?);
                return Ok(());
            }
            Err(meta.error(
                "unsupported `bencode(...)` field attribute (allowed: rename, skip, default)",
            ))
        })?;
    }

    if out.skip && (out.rename.is_some() || out.default) {
        return Err(syn::Error::new(
            Span::call_site(),
            "`bencode(skip)` cannot be combined with `rename` or `default`",
        ));
    }

    Ok(out)
}

pub(crate) fn parse_variant_attrs(attrs: &[Attribute]) -> syn::Result<VariantAttr> {
    let mut out = VariantAttr::default();
    for attr in attrs {
        if !attr.path().is_ident("bencode") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if out.rename.is_some() {
                    return Err(meta.error("duplicate `bencode(rename = ...)` on variant"));
                }
                out.rename = Some(meta.value()?.parse()?);
                return Ok(());
            }
            Err(meta.error("unsupported `bencode(...)` variant attribute (allowed: rename)"))
        })?;
    }
    Ok(out)
}
