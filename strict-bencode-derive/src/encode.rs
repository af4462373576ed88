use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, FieldsNamed, FieldsUnnamed, Ident, LitByteStr, LitStr, Type};

use crate::attrs::{ensure_no_bencode_attrs, parse_field_attrs, parse_variant_attrs};
use crate::util::{is_option_type, key_bytes, type_mentions_self, where_clause_with};

pub(crate) fn derive_bencode_encode_impl(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let mut bounds: Vec<&Type> = Vec::new();

    let body = match &input.data {
        Data::Struct(ds) => encode_struct(name, &ds.fields, &mut bounds)?,
        Data::Enum(de) => encode_enum(name, de, &mut bounds)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "BencodeEncode cannot be derived for unions",
            ));
        }
    };

    let encode_bound = quote!(::strict_bencode::BencodeEncode);
    let where_clause = where_clause_with(where_clause, &bounds, &encode_bound);

    Ok(quote! {
        impl #impl_generics ::strict_bencode::BencodeEncode for #name #ty_generics #where_clause {
            fn encode(
                &self,
                enc: &mut ::strict_bencode::Encoder,
            ) -> ::core::result::Result<(), ::strict_bencode::BencodeError> {
                #body
            }
        }

        impl #impl_generics ::strict_bencode::BencodeListElem for #name #ty_generics #where_clause {}
    })
}

struct Entry<'a> {
    key: Vec<u8>,
    lit: LitByteStr,
    access: TokenStream,
    ty: &'a Type,
}

/// Dictionary entries of a named-field shape, sorted by key bytes.
fn named_entries<'a>(
    self_ident: &Ident,
    fields: &'a FieldsNamed,
    by_ref: bool,
    bounds: &mut Vec<&'a Type>,
) -> syn::Result<Vec<Entry<'a>>> {
    let mut out = Vec::with_capacity(fields.named.len());
    for field in &fields.named {
        let attr = parse_field_attrs(&field.attrs)?;
        if attr.skip {
            continue;
        }
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let key = attr
            .rename
            .unwrap_or_else(|| LitStr::new(&ident.unraw().to_string(), ident.span()));
        if !type_mentions_self(&field.ty, self_ident) {
            bounds.push(&field.ty);
        }
        let access = if by_ref {
            quote!(#ident)
        } else {
            quote!(&self.#ident)
        };
        out.push(Entry {
            key: key.value().into_bytes(),
            lit: key_bytes(&key),
            access,
            ty: &field.ty,
        });
    }

    out.sort_by(|a, b| a.key.cmp(&b.key));
    for pair in out.windows(2) {
        if pair[0].key == pair[1].key {
            return Err(syn::Error::new(
                pair[1].lit.span(),
                "duplicate dictionary key after rename",
            ));
        }
    }
    Ok(out)
}

fn dict_body(entries: &[Entry<'_>]) -> TokenStream {
    let writes = entries.iter().map(|e| {
        let lit = &e.lit;
        let access = &e.access;
        if is_option_type(e.ty) {
            quote! {
                if let ::core::option::Option::Some(v) = #access {
                    d.field(#lit, v)?;
                }
            }
        } else {
            quote!(d.field(#lit, #access)?;)
        }
    });
    quote! {
        enc.dict(|d| {
            #(#writes)*
            ::core::result::Result::Ok(())
        })
    }
}

fn check_unnamed(fields: &FieldsUnnamed) -> syn::Result<()> {
    for field in &fields.unnamed {
        ensure_no_bencode_attrs(&field.attrs, "tuple fields")?;
    }
    Ok(())
}

fn encode_struct<'a>(
    name: &Ident,
    fields: &'a Fields,
    bounds: &mut Vec<&'a Type>,
) -> syn::Result<TokenStream> {
    match fields {
        Fields::Named(named) => {
            let entries = named_entries(name, named, false, bounds)?;
            Ok(dict_body(&entries))
        }
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
            check_unnamed(unnamed)?;
            let ty = &unnamed.unnamed[0].ty;
            if !type_mentions_self(ty, name) {
                bounds.push(ty);
            }
            Ok(quote!(enc.encode(&self.0)))
        }
        Fields::Unnamed(unnamed) => {
            check_unnamed(unnamed)?;
            let mut writes = Vec::with_capacity(unnamed.unnamed.len());
            for (i, field) in unnamed.unnamed.iter().enumerate() {
                if !type_mentions_self(&field.ty, name) {
                    bounds.push(&field.ty);
                }
                let idx = syn::Index::from(i);
                writes.push(quote!(l.encode(&self.#idx)?;));
            }
            Ok(quote! {
                enc.list(|l| {
                    #(#writes)*
                    ::core::result::Result::Ok(())
                })
            })
        }
        Fields::Unit => Ok(quote!(enc.list(|_| ::core::result::Result::Ok(())))),
    }
}

fn encode_enum<'a>(
    name: &Ident,
    de: &'a syn::DataEnum,
    bounds: &mut Vec<&'a Type>,
) -> syn::Result<TokenStream> {
    let mut names: Vec<String> = Vec::with_capacity(de.variants.len());
    let mut arms = Vec::with_capacity(de.variants.len());

    for variant in &de.variants {
        let attr = parse_variant_attrs(&variant.attrs)?;
        let vname = attr
            .rename
            .unwrap_or_else(|| LitStr::new(&variant.ident.unraw().to_string(), variant.ident.span()));
        if names.contains(&vname.value()) {
            return Err(syn::Error::new(vname.span(), "duplicate variant name"));
        }
        names.push(vname.value());
        let lit = key_bytes(&vname);
        let v_ident = &variant.ident;

        let arm = match &variant.fields {
            Fields::Unit => quote! {
                Self::#v_ident => enc.bytes(#lit),
            },
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                check_unnamed(unnamed)?;
                let ty = &unnamed.unnamed[0].ty;
                if !type_mentions_self(ty, name) {
                    bounds.push(ty);
                }
                quote! {
                    Self::#v_ident(v0) => enc.dict(|d| d.field(#lit, v0)),
                }
            }
            Fields::Unnamed(unnamed) => {
                check_unnamed(unnamed)?;
                let pats: Vec<Ident> = (0..unnamed.unnamed.len())
                    .map(|i| format_ident!("v{i}"))
                    .collect();
                for field in &unnamed.unnamed {
                    if !type_mentions_self(&field.ty, name) {
                        bounds.push(&field.ty);
                    }
                }
                quote! {
                    Self::#v_ident(#(#pats),*) => enc.dict(|d| {
                        d.entry(#lit, |enc| {
                            enc.list(|l| {
                                #(l.encode(#pats)?;)*
                                ::core::result::Result::Ok(())
                            })
                        })
                    }),
                }
            }
            Fields::Named(named) => {
                let entries = named_entries(name, named, true, bounds)?;
                let pats = named.named.iter().filter_map(|f| f.ident.as_ref());
                let inner = dict_body(&entries);
                quote! {
                    #[allow(unused_variables)]
                    Self::#v_ident { #(#pats),* } => enc.dict(|d| {
                        d.entry(#lit, |enc| #inner)
                    }),
                }
            }
        };
        arms.push(arm);
    }

    if arms.is_empty() {
        return Ok(quote!(match *self {}));
    }
    Ok(quote! {
        match self {
            #(#arms)*
        }
    })
}
