use crate::Error;
use paramkit_core::{ParamKind, Value};
use paramkit_schema::{
    symbol::SymbolError,
    types::{Bound, DefaultValue, IntConstraint, SymbolRef},
};
use proc_macro2::{Literal, TokenStream};
use quote::{format_ident, quote};

// Quoting helpers

/// Quote an `Option`, applying the transform to the inner value when present.
pub fn quote_option<T, F>(opt: Option<&T>, transform: F) -> TokenStream
where
    F: FnOnce(&T) -> TokenStream,
{
    if let Some(v) = opt {
        let transformed = transform(v);
        quote!(Some(#transformed))
    } else {
        quote!(None)
    }
}

/// Quote a slice by transforming each element and returning a token array.
pub fn quote_slice<T, F>(vec: &[T], transform: F) -> TokenStream
where
    F: Fn(&T) -> TokenStream,
{
    let items: Vec<TokenStream> = vec.iter().map(transform).collect();

    quote! {
        &[#(#items),*]
    }
}

/// `#[doc = "..."]` lines, or nothing when docs are off or empty.
pub fn doc_attr(enabled: bool, doc: &str) -> TokenStream {
    if !enabled || doc.trim().is_empty() {
        return quote!();
    }

    let lines = doc.lines().map(|l| format!(" {}", l.trim_end()));
    quote! { #( #[doc = #lines] )* }
}

// Literal helpers

/// Float literal with an explicit suffix; non-finite values use the `f64`
/// constants.
pub fn float_lit(v: f64) -> TokenStream {
    if v.is_nan() {
        quote!(f64::NAN)
    } else if v == f64::INFINITY {
        quote!(f64::INFINITY)
    } else if v == f64::NEG_INFINITY {
        quote!(f64::NEG_INFINITY)
    } else {
        let lit = Literal::f64_suffixed(v);
        quote!(#lit)
    }
}

/// Unsuffixed literal for a context that fixes the type.
pub fn untyped_lit(v: &Value) -> TokenStream {
    match v {
        Value::Bool(b) => quote!(#b),
        Value::Int(i) => {
            let lit = Literal::i64_unsuffixed(*i);
            quote!(#lit)
        }
        Value::UInt(u) => {
            let lit = Literal::u64_unsuffixed(*u);
            quote!(#lit)
        }
        Value::Float(f) if f.is_finite() => {
            let lit = Literal::f64_unsuffixed(*f);
            quote!(#lit)
        }
        Value::Float(f) => float_lit(*f),
        Value::Text(s) => quote!(#s),
    }
}

/// Runtime `Value` expression for a literal.
pub fn value_expr(rt: &syn::Path, v: &Value) -> TokenStream {
    match v {
        Value::Bool(b) => quote!(#rt::Value::Bool(#b)),
        Value::Int(i) => quote!(#rt::Value::Int(#i)),
        Value::UInt(u) => quote!(#rt::Value::UInt(#u)),
        Value::Float(f) => {
            let f = float_lit(*f);
            quote!(#rt::Value::Float(#f))
        }
        Value::Text(s) => quote!(#rt::Value::Text(::std::string::String::from(#s))),
    }
}

/// Parse a symbol as a Rust path. The path is emitted as written.
pub fn symbol_path(unit: &str, symbol: &SymbolRef) -> Result<syn::Path, Error> {
    syn::parse_str(symbol.as_str()).map_err(|_| Error::Syntax {
        unit: unit.to_string(),
        text: symbol.to_string(),
        what: "path",
    })
}

/// Default as a runtime `Value` expression. Symbols convert through
/// `Value::from`, so their type picks the variant.
pub fn default_expr(rt: &syn::Path, unit: &str, default: &DefaultValue) -> Result<TokenStream, Error> {
    match default {
        DefaultValue::Literal(v) => Ok(value_expr(rt, v)),
        DefaultValue::Symbol(s) => {
            let path = symbol_path(unit, s)?;
            Ok(quote!(#rt::Value::from(#path)))
        }
    }
}

/// Constraint bound as an `i64` expression.
pub fn bound_expr(unit: &str, bound: &Bound) -> Result<TokenStream, Error> {
    match bound {
        Bound::Literal(v) => Ok(quote!(#v)),
        Bound::Symbol(s) => {
            let path = symbol_path(unit, s)?;
            Ok(quote!((#path) as i64))
        }
    }
}

/// `[min, max, step]` bound expressions. Registration has already
/// rejected constraints with a missing bound.
pub fn constraint_exprs(unit: &str, c: &IntConstraint) -> Result<[TokenStream; 3], Error> {
    let bound = |b: &Option<Bound>, label: &'static str| -> Result<TokenStream, Error> {
        let b = b
            .as_ref()
            .ok_or_else(|| paramkit_schema::Error::from(SymbolError::MissingBound(label)))?;
        bound_expr(unit, b)
    };

    Ok([
        bound(&c.min, "min")?,
        bound(&c.max, "max")?,
        bound(&c.step, "step")?,
    ])
}

/// Runtime `ParamKind` path.
pub fn kind_expr(rt: &syn::Path, kind: ParamKind) -> TokenStream {
    let variant = format_ident!("{kind}");

    quote!(#rt::ParamKind::#variant)
}

/// Native accessor type for a kind.
pub fn native_type(kind: ParamKind) -> TokenStream {
    match kind {
        ParamKind::Bool => quote!(bool),
        ParamKind::Int => quote!(i64),
        ParamKind::UInt => quote!(u64),
        ParamKind::Float => quote!(f64),
        ParamKind::Hex => quote!(u32),
        ParamKind::String | ParamKind::QString => quote!(::std::string::String),
    }
}
