use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{
    Data, DataEnum, DeriveInput, Fields, FieldsNamed, FieldsUnnamed, Ident, LitStr, Type,
};

use crate::attrs::{ensure_no_bencode_attrs, parse_field_attrs, parse_variant_attrs};
use crate::util::{
    add_where_bound, decode_lifetime, is_option_type, key_bytes, type_mentions_self,
};

pub(crate) fn derive_bencode_decode_impl(input: DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (_, ty_generics, _) = input.generics.split_for_impl();
    let (mut generics, de) = decode_lifetime(&input.generics);

    let mut bounds = Bounds::default();
    let body = match &input.data {
        Data::Struct(ds) => decode_struct(name, &ds.fields, &mut bounds)?,
        Data::Enum(data) => decode_enum(name, data, &mut bounds)?,
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "BencodeDecode cannot be derived for unions",
            ));
        }
    };

    {
        let wc = generics.make_where_clause();
        for ty in &bounds.decode {
            add_where_bound(wc, ty, quote!(::strict_bencode::BencodeDecode<#de>));
        }
        for ty in &bounds.default {
            add_where_bound(wc, ty, quote!(::core::default::Default));
        }
    }
    let (impl_generics, _, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::strict_bencode::BencodeDecode<#de> for #name #ty_generics #where_clause {
            fn decode(
                decoder: &mut ::strict_bencode::Decoder<#de>,
            ) -> ::core::result::Result<Self, ::strict_bencode::BencodeError> {
                #body
            }
        }
    })
}

#[derive(Default)]
struct Bounds<'a> {
    decode: Vec<&'a Type>,
    default: Vec<&'a Type>,
}

fn err(code: &str) -> TokenStream {
    let code = format_ident!("{code}");
    quote! {
        ::strict_bencode::BencodeError::new(
            ::strict_bencode::ErrorCode::#code,
            decoder.position(),
        )
    }
}

fn check_unnamed(fields: &FieldsUnnamed) -> syn::Result<()> {
    for field in &fields.unnamed {
        ensure_no_bencode_attrs(&field.attrs, "tuple fields")?;
    }
    Ok(())
}

/// Decode a dictionary body into `ctor { fields }`. The opening `d` must already be consumed.
fn named_body<'a>(
    self_ident: &Ident,
    ctor: &TokenStream,
    fields: &'a FieldsNamed,
    bounds: &mut Bounds<'a>,
) -> syn::Result<TokenStream> {
    let mut slots = Vec::new();
    let mut arms = Vec::new();
    let mut inits = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    let dup = err("DuplicateKey");

    for (i, field) in fields.named.iter().enumerate() {
        let attr = parse_field_attrs(&field.attrs)?;
        let Some(ident) = &field.ident else {
            return Err(syn::Error::new_spanned(field, "expected a named field"));
        };
        let ty = &field.ty;
        if attr.skip {
            if !type_mentions_self(ty, self_ident) {
                bounds.default.push(ty);
            }
            inits.push(quote!(#ident: ::core::default::Default::default()));
            continue;
        }

        let key = attr
            .rename
            .unwrap_or_else(|| LitStr::new(&ident.unraw().to_string(), ident.span()));
        if seen.contains(&key.value()) {
            return Err(syn::Error::new(
                key.span(),
                "duplicate dictionary key after rename",
            ));
        }
        seen.push(key.value());
        let lit = key_bytes(&key);

        if !type_mentions_self(ty, self_ident) {
            bounds.decode.push(ty);
        }
        let slot = format_ident!("__f{i}");
        slots.push(quote! {
            let mut #slot: ::core::option::Option<#ty> = ::core::option::Option::None;
        });
        arms.push(quote! {
            #lit => {
                if #slot.is_some() {
                    return ::core::result::Result::Err(#dup);
                }
                #slot = ::core::option::Option::Some(
                    ::strict_bencode::BencodeDecode::decode(decoder)?,
                );
            }
        });

        let init = if is_option_type(ty) {
            quote!(#slot.flatten())
        } else if attr.default {
            if !type_mentions_self(ty, self_ident) {
                bounds.default.push(ty);
            }
            quote!(#slot.unwrap_or_default())
        } else {
            quote! {
                #slot.ok_or(::strict_bencode::BencodeError::new(
                    ::strict_bencode::ErrorCode::MissingKey,
                    __start,
                ))?
            }
        };
        inits.push(quote!(#ident: #init));
    }

    Ok(quote! {
        let __start = decoder.position();
        #(#slots)*
        while let ::core::option::Option::Some(__key) = decoder.next_key()? {
            match __key {
                #(#arms)*
                _ => decoder.skip_value()?,
            }
        }
        ::core::result::Result::Ok(#ctor { #(#inits),* })
    })
}

/// Decode list items into `ctor(fields)`. The opening `l` must already be consumed.
fn tuple_body<'a>(
    self_ident: &Ident,
    ctor: &TokenStream,
    fields: &'a FieldsUnnamed,
    bounds: &mut Bounds<'a>,
) -> syn::Result<TokenStream> {
    check_unnamed(fields)?;
    let short = err("ListLenMismatch");
    let mut items = Vec::with_capacity(fields.unnamed.len());
    for field in &fields.unnamed {
        if !type_mentions_self(&field.ty, self_ident) {
            bounds.decode.push(&field.ty);
        }
        items.push(quote! {
            {
                if decoder.at_end()? {
                    return ::core::result::Result::Err(#short);
                }
                ::strict_bencode::BencodeDecode::decode(decoder)?
            }
        });
    }
    Ok(quote! {
        let __value = #ctor(#(#items),*);
        decoder.end_list()?;
        ::core::result::Result::Ok(__value)
    })
}

fn decode_struct<'a>(
    name: &Ident,
    fields: &'a Fields,
    bounds: &mut Bounds<'a>,
) -> syn::Result<TokenStream> {
    let ctor = quote!(Self);
    match fields {
        Fields::Named(named) => {
            let body = named_body(name, &ctor, named, bounds)?;
            Ok(quote! {
                decoder.begin_dict()?;
                #body
            })
        }
        Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
            check_unnamed(unnamed)?;
            let ty = &unnamed.unnamed[0].ty;
            if !type_mentions_self(ty, name) {
                bounds.decode.push(ty);
            }
            Ok(quote! {
                ::core::result::Result::Ok(Self(::strict_bencode::BencodeDecode::decode(decoder)?))
            })
        }
        Fields::Unnamed(unnamed) => {
            let body = tuple_body(name, &ctor, unnamed, bounds)?;
            Ok(quote! {
                decoder.begin_list()?;
                #body
            })
        }
        Fields::Unit => Ok(quote! {
            decoder.begin_list()?;
            decoder.end_list()?;
            ::core::result::Result::Ok(Self)
        }),
    }
}

fn decode_enum<'a>(
    name: &Ident,
    data: &'a DataEnum,
    bounds: &mut Bounds<'a>,
) -> syn::Result<TokenStream> {
    let unknown = err("UnknownVariant");
    let mut names: Vec<String> = Vec::with_capacity(data.variants.len());
    let mut unit_arms = Vec::new();
    let mut dict_arms = Vec::new();

    for variant in &data.variants {
        let attr = parse_variant_attrs(&variant.attrs)?;
        let vname = attr.rename.unwrap_or_else(|| {
            LitStr::new(&variant.ident.unraw().to_string(), variant.ident.span())
        });
        if names.contains(&vname.value()) {
            return Err(syn::Error::new(vname.span(), "duplicate variant name"));
        }
        names.push(vname.value());
        let lit = key_bytes(&vname);
        let v_ident = &variant.ident;
        let ctor = quote!(Self::#v_ident);

        match &variant.fields {
            Fields::Unit => {
                unit_arms.push(quote!(#lit => ::core::result::Result::Ok(#ctor),));
            }
            Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                check_unnamed(unnamed)?;
                let ty = &unnamed.unnamed[0].ty;
                if !type_mentions_self(ty, name) {
                    bounds.decode.push(ty);
                }
                dict_arms.push(quote! {
                    #lit => #ctor(::strict_bencode::BencodeDecode::decode(decoder)?),
                });
            }
            Fields::Unnamed(unnamed) => {
                let body = tuple_body(name, &ctor, unnamed, bounds)?;
                dict_arms.push(quote! {
                    #lit => {
                        decoder.begin_list()?;
                        (|| -> ::core::result::Result<Self, ::strict_bencode::BencodeError> {
                            #body
                        })()?
                    }
                });
            }
            Fields::Named(named) => {
                let body = named_body(name, &ctor, named, bounds)?;
                dict_arms.push(quote! {
                    #lit => {
                        decoder.begin_dict()?;
                        (|| -> ::core::result::Result<Self, ::strict_bencode::BencodeError> {
                            #body
                        })()?
                    }
                });
            }
        }
    }

    let by_name = if unit_arms.is_empty() {
        quote!(::core::result::Result::Err(#unknown))
    } else {
        quote! {
            let __name = decoder.bytes()?;
            match __name {
                #(#unit_arms)*
                _ => ::core::result::Result::Err(#unknown),
            }
        }
    };

    let by_entry = if dict_arms.is_empty() {
        quote!(::core::result::Result::Err(#unknown))
    } else {
        quote! {
            decoder.begin_dict()?;
            let ::core::option::Option::Some(__key) = decoder.next_key()? else {
                return ::core::result::Result::Err(#unknown);
            };
            let __value = match __key {
                #(#dict_arms)*
                _ => return ::core::result::Result::Err(#unknown),
            };
            if decoder.next_key()?.is_some() {
                return ::core::result::Result::Err(#unknown);
            }
            ::core::result::Result::Ok(__value)
        }
    };

    Ok(quote! {
        match decoder.peek_kind()? {
            ::strict_bencode::BencodeKind::ByteString => { #by_name }
            ::strict_bencode::BencodeKind::Dictionary => { #by_entry }
            _ => ::core::result::Result::Err(#unknown),
        }
    })
}
