use proc_macro2::{Span, TokenStream};
use syn::{
    parse_quote, GenericArgument, GenericParam, Generics, Ident, Lifetime, LifetimeParam,
    LitByteStr, LitStr, Path, PathArguments, Type, WhereClause, WherePredicate,
};

pub(crate) fn add_where_bound(wc: &mut WhereClause, ty: &Type, bound: TokenStream) {
    let pred: WherePredicate = parse_quote!(#ty: #bound);
    wc.predicates.push(pred);
}

/// Where clause to extend with field bounds, created empty if the item has none.
pub(crate) fn where_clause_with(
    base: Option<&WhereClause>,
    bounds: &[&Type],
    bound: &TokenStream,
) -> Option<WhereClause> {
    let mut out = base.cloned();
    if !bounds.is_empty() {
        let wc = out.get_or_insert_with(|| WhereClause {
            where_token: Default::default(),
            predicates: Default::default(),
        });
        for ty in bounds {
            add_where_bound(wc, ty, bound.clone());
        }
    }
    out
}

pub(crate) fn is_option_type(ty: &Type) -> bool {
    let Type::Path(tp) = ty else { return false };
    let Some(seg) = tp.path.segments.last() else {
        return false;
    };
    seg.ident == "Option"
}

fn path_might_be_self(path: &Path, self_ident: &Ident) -> bool {
    let Some(last) = path.segments.last() else {
        return false;
    };
    if last.ident != *self_ident {
        return false;
    }
    path.segments
        .iter()
        .take(path.segments.len() - 1)
        .all(|seg| matches!(seg.ident.to_string().as_str(), "crate" | "self" | "super"))
}

/// Whether `ty` may refer to the type being derived. Such fields get no where-clause bound.
pub(crate) fn type_mentions_self(ty: &Type, self_ident: &Ident) -> bool {
    match ty {
        Type::Path(tp) => {
            if tp.qself.is_none() && path_might_be_self(&tp.path, self_ident) {
                return true;
            }
            if let Some(q) = &tp.qself {
                if type_mentions_self(&q.ty, self_ident) {
                    return true;
                }
            }
            tp.path.segments.iter().any(|seg| match &seg.arguments {
                PathArguments::AngleBracketed(args) => args.args.iter().any(|arg| match arg {
                    GenericArgument::Type(inner) => type_mentions_self(inner, self_ident),
                    _ => false,
                }),
                _ => false,
            })
        }
        Type::Reference(tr) => type_mentions_self(&tr.elem, self_ident),
        Type::Tuple(tt) => tt.elems.iter().any(|t| type_mentions_self(t, self_ident)),
        Type::Array(ta) => type_mentions_self(&ta.elem, self_ident),
        Type::Slice(ts) => type_mentions_self(&ts.elem, self_ident),
        Type::Group(tg) => type_mentions_self(&tg.elem, self_ident),
        Type::Paren(tp) => type_mentions_self(&tp.elem, self_ident),
        _ => false,
    }
}

/// Add a fresh decode lifetime that outlives every lifetime of the input type.
pub(crate) fn decode_lifetime(generics: &Generics) -> (Generics, Lifetime) {
    let mut out = generics.clone();
    let mut name = "__de".to_string();
    let mut counter = 0usize;
    while out.lifetimes().any(|lt| lt.lifetime.ident == name) {
        counter += 1;
        name = format!("__de{counter}");
    }
    let lt = Lifetime::new(&format!("'{name}"), Span::call_site());
    out.params
        .insert(0, GenericParam::Lifetime(LifetimeParam::new(lt.clone())));
    let where_clause = out.make_where_clause();
    for lifetime in generics.lifetimes() {
        let lt_ident = &lifetime.lifetime;
        where_clause.predicates.push(parse_quote!(#lt: #lt_ident));
    }
    (out, lt)
}

pub(crate) fn key_bytes(key: &LitStr) -> LitByteStr {
    LitByteStr::new(key.value().as_bytes(), key.span())
}
