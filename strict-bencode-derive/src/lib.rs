//! Derive macros for `strict-bencode`.
//!
//! - Named structs encode as dictionaries with keys sorted by their UTF-8 bytes. `Option`
//!   fields are omitted when `None`.
//! - Tuple structs encode as lists, newtypes as their inner value, unit structs as `le`.
//! - Unit variants encode as their name. Other variants encode as a single-entry dictionary
//!   keyed by the variant name.
//!
//! Field attributes: `#[bencode(rename = "key")]`, `#[bencode(skip)]`, `#[bencode(default)]`.
//! Variant attribute: `#[bencode(rename = "name")]`.

extern crate proc_macro;

mod attrs;
mod decode;
mod encode;
mod util;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(BencodeEncode, attributes(bencode))]
pub fn derive_bencode_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    encode::derive_bencode_encode_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(BencodeDecode, attributes(bencode))]
pub fn derive_bencode_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    decode::derive_bencode_decode_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
