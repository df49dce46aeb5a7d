// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashSet;
use syn::ext::IdentExt;
use syn::{
    parse_macro_input, Attribute, Data, DataEnum, DeriveInput, Expr, ExprLit, ExprUnary, Fields,
    GenericArgument, Ident, Lit, LitStr, PathArguments, PathSegment, Type, UnOp,
};

/// `#[derive(Described)]` macro: generates a `rpcwire::Described` impl
///
/// Structs (named fields) become struct descriptors, field kinds are
/// derived from the Rust field types:
/// - primitives: bool, i8..i64, u8..u64, f32, f64, char
/// - `String` -> string, `Vec<u8>` / `[u8; N]` -> bytes, `DateTime<_>` -> date
/// - `Vec<T>`, `VecDeque<T>` -> list; `HashSet<T>`, `BTreeSet<T>` -> set;
///   `HashMap<K, V>`, `BTreeMap<K, V>` -> map
/// - `Option<T>`, `Box<T>`, `Arc<T>`, `Rc<T>` -> kind of `T`
/// - `Value`, `ObjectId` -> any
/// - any other type `T` -> `<T as Described>::field_kind()`
///
/// Fieldless enums become enum descriptors. Every variant needs a stable
/// code, from `#[wire(code = N)]` or an explicit discriminant.
///
/// Attributes:
/// - type: `#[wire(name = "pkg.Type")]` (default: the Rust type name)
/// - field: `#[wire(transient)]`, `#[wire(rename = "..")]`, `#[wire(any)]`
/// - variant: `#[wire(code = N)]`, `#[wire(description = "..")]`,
///   `#[wire(rename = "..")]`
///
/// Example:
/// ```ignore
/// use rpcwire::Described;
///
/// #[derive(Described)]
/// #[wire(name = "shop.Order")]
/// struct Order {
///     id: i64,
///     lines: Vec<OrderLine>,      // list<object<shop.OrderLine>>
///     status: Status,             // enum<shop.Status>
///     #[wire(transient)]
///     cached_total: f64,
/// }
///
/// #[derive(Described)]
/// #[wire(name = "shop.Status")]
/// enum Status {
///     #[wire(description = "accepting lines")]
///     Open = 1,
///     #[wire(code = 2, description = "frozen")]
///     Closed,
/// }
/// ```
#[proc_macro_derive(Described, attributes(wire))]
pub fn derive_described(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic types cannot derive Described",
        ));
    }
    let attrs = TypeAttrs::parse(&input.attrs)?;
    let ident = &input.ident;
    let type_id = attrs.name.unwrap_or_else(|| ident.unraw().to_string());

    match &input.data {
        Data::Struct(data) => expand_struct(ident, &type_id, &data.fields),
        Data::Enum(data) => expand_enum(ident, &type_id, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            ident,
            "unions cannot derive Described",
        )),
    }
}

fn expand_struct(ident: &Ident, type_id: &str, fields: &Fields) -> syn::Result<TokenStream2> {
    let named = match fields {
        Fields::Named(f) => f.named.iter().collect::<Vec<_>>(),
        Fields::Unit => Vec::new(),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                fields,
                "only named fields are supported",
            ))
        }
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(named.len());
    for field in named {
        let Some(field_ident) = field.ident.as_ref() else {
            return Err(syn::Error::new_spanned(field, "field must have a name"));
        };
        let attrs = FieldAttrs::parse(&field.attrs)?;
        let name = attrs
            .rename
            .unwrap_or_else(|| field_ident.unraw().to_string());
        if !seen.insert(name.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate wire field name `{name}`"),
            ));
        }
        let kind = if attrs.any {
            quote! { ::rpcwire::FieldKind::Any }
        } else {
            field_kind(&field.ty)?
        };
        let transient = attrs.transient.then(|| quote! { .transient() });
        entries.push(quote! {
            ::rpcwire::FieldDescriptor::new(#name, #kind) #transient
        });
    }

    Ok(quote! {
        impl ::rpcwire::types::Described for #ident {
            const TYPE_ID: &'static str = #type_id;

            fn type_descriptor() -> ::rpcwire::TypeDescriptor {
                ::rpcwire::TypeDescriptor::struct_type(#type_id, ::std::vec![#(#entries),*])
            }
        }
    })
}

fn expand_enum(ident: &Ident, type_id: &str, data: &DataEnum) -> syn::Result<TokenStream2> {
    let mut codes = HashSet::new();
    let mut entries = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "only fieldless enum variants are supported",
            ));
        }
        let attrs = VariantAttrs::parse(&variant.attrs)?;
        let code = match (attrs.code, &variant.discriminant) {
            (Some(code), _) => code,
            (None, Some((_, expr))) => eval_code(expr)?,
            (None, None) => {
                return Err(syn::Error::new_spanned(
                    variant,
                    "variant needs #[wire(code = N)] or an explicit discriminant",
                ))
            }
        };
        if !codes.insert(code) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate enum code {code}"),
            ));
        }
        let name = attrs
            .rename
            .unwrap_or_else(|| variant.ident.unraw().to_string());
        let description = attrs.description.unwrap_or_default();
        entries.push(quote! {
            ::rpcwire::EnumVariant::new(#name, #code).with_description(#description)
        });
    }

    Ok(quote! {
        impl ::rpcwire::types::Described for #ident {
            const TYPE_ID: &'static str = #type_id;

            fn type_descriptor() -> ::rpcwire::TypeDescriptor {
                ::rpcwire::TypeDescriptor::enum_type(
                    #type_id,
                    ::rpcwire::EnumDescriptor::new(::std::vec![#(#entries),*]),
                )
            }

            fn field_kind() -> ::rpcwire::FieldKind {
                ::rpcwire::FieldKind::Enum(::std::string::ToString::to_string(Self::TYPE_ID))
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

fn wire_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|a| a.path().is_ident("wire"))
}

#[derive(Default)]
struct TypeAttrs {
    name: Option<String>,
}

impl TypeAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in wire_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.name = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("unsupported wire attribute on type (expected `name`)"))
                }
            })?;
        }
        Ok(out)
    }
}

#[derive(Default)]
struct FieldAttrs {
    transient: bool,
    any: bool,
    rename: Option<String>,
}

impl FieldAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in wire_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("transient") {
                    out.transient = true;
                } else if meta.path.is_ident("any") {
                    out.any = true;
                } else if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename = Some(lit.value());
                } else {
                    return Err(meta.error(
                        "unsupported wire attribute on field (expected `transient`, `any` or `rename`)",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

#[derive(Default)]
struct VariantAttrs {
    code: Option<i32>,
    description: Option<String>,
    rename: Option<String>,
}

impl VariantAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut out = Self::default();
        for attr in wire_attrs(attrs) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("code") {
                    let expr: Expr = meta.value()?.parse()?;
                    out.code = Some(eval_code(&expr)?);
                } else if meta.path.is_ident("description") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.description = Some(lit.value());
                } else if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    out.rename = Some(lit.value());
                } else {
                    return Err(meta.error(
                        "unsupported wire attribute on variant (expected `code`, `description` or `rename`)",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(out)
    }
}

/// Evaluate an integer literal, optionally negated, as an i32 code.
fn eval_code(expr: &Expr) -> syn::Result<i32> {
    fn eval(expr: &Expr) -> syn::Result<i64> {
        match expr {
            Expr::Lit(ExprLit {
                lit: Lit::Int(lit), ..
            }) => lit.base10_parse::<i64>(),
            Expr::Unary(ExprUnary {
                op: UnOp::Neg(_),
                expr: inner,
                ..
            }) => Ok(-eval(inner)?),
            Expr::Group(g) => eval(&g.expr),
            Expr::Paren(p) => eval(&p.expr),
            _ => Err(syn::Error::new_spanned(expr, "expected an integer literal")),
        }
    }
    let value = eval(expr)?;
    i32::try_from(value)
        .map_err(|_| syn::Error::new_spanned(expr, format!("enum code {value} does not fit i32")))
}

// ---------------------------------------------------------------------------
// Field kinds
// ---------------------------------------------------------------------------

fn primitive(variant: &str) -> TokenStream2 {
    let variant = Ident::new(variant, proc_macro2::Span::call_site());
    quote! { ::rpcwire::FieldKind::Primitive(::rpcwire::PrimitiveKind::#variant) }
}

fn type_args(segment: &PathSegment) -> Vec<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|a| match a {
                GenericArgument::Type(t) => Some(t),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn is_u8(ty: &Type) -> bool {
    matches!(ty, Type::Path(p) if p.qself.is_none() && p.path.is_ident("u8"))
}

/// Map a Rust field type to a `rpcwire::FieldKind` expression.
fn field_kind(ty: &Type) -> syn::Result<TokenStream2> {
    let unsupported = || syn::Error::new_spanned(ty, "unsupported field type for Described");
    match ty {
        Type::Paren(p) => field_kind(&p.elem),
        Type::Group(g) => field_kind(&g.elem),
        Type::Reference(r) => field_kind(&r.elem),
        Type::Slice(s) if is_u8(&s.elem) => Ok(primitive("Bytes")),
        Type::Slice(s) => {
            let inner = field_kind(&s.elem)?;
            Ok(quote! { ::rpcwire::FieldKind::list(#inner) })
        }
        Type::Array(a) if is_u8(&a.elem) => Ok(primitive("Bytes")),
        Type::Array(a) => {
            let inner = field_kind(&a.elem)?;
            Ok(quote! { ::rpcwire::FieldKind::list(#inner) })
        }
        Type::Path(tp) if tp.qself.is_none() => {
            let segment = tp.path.segments.last().ok_or_else(unsupported)?;
            let args = type_args(segment);
            let first = || args.first().copied().ok_or_else(unsupported);
            let kind = match segment.ident.to_string().as_str() {
                "bool" => primitive("Bool"),
                "i8" => primitive("I8"),
                "i16" => primitive("I16"),
                "i32" => primitive("I32"),
                "i64" => primitive("I64"),
                "u8" => primitive("U8"),
                "u16" => primitive("U16"),
                "u32" => primitive("U32"),
                "u64" => primitive("U64"),
                "f32" => primitive("F32"),
                "f64" => primitive("F64"),
                "char" => primitive("Char"),
                "String" | "str" => primitive("String"),
                "DateTime" => primitive("Date"),
                "Value" | "ObjectId" => quote! { ::rpcwire::FieldKind::Any },
                "Option" | "Box" | "Arc" | "Rc" => field_kind(first()?)?,
                "Vec" if is_u8(first()?) => primitive("Bytes"),
                "Vec" | "VecDeque" | "LinkedList" => {
                    let inner = field_kind(first()?)?;
                    quote! { ::rpcwire::FieldKind::list(#inner) }
                }
                "HashSet" | "BTreeSet" => {
                    let inner = field_kind(first()?)?;
                    quote! { ::rpcwire::FieldKind::set(#inner) }
                }
                "HashMap" | "BTreeMap" => {
                    let (Some(k), Some(v)) = (args.first(), args.get(1)) else {
                        return Err(unsupported());
                    };
                    let key = field_kind(k)?;
                    let value = field_kind(v)?;
                    quote! { ::rpcwire::FieldKind::map(#key, #value) }
                }
                _ => quote! { <#ty as ::rpcwire::types::Described>::field_kind() },
            };
            Ok(kind)
        }
        _ => Err(unsupported()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(src: &str) -> String {
        let ty: Type = syn::parse_str(src).expect("type");
        field_kind(&ty).expect("kind").to_string().replace(' ', "")
    }

    #[test]
    fn test_primitive_kinds() {
        assert!(kind_of("i32").ends_with("PrimitiveKind::I32)"));
        assert!(kind_of("String").ends_with("PrimitiveKind::String)"));
        assert!(kind_of("Option<String>").ends_with("PrimitiveKind::String)"));
        assert!(kind_of("chrono::DateTime<chrono::Utc>").ends_with("PrimitiveKind::Date)"));
    }

    #[test]
    fn test_bytes_and_collections() {
        assert!(kind_of("Vec<u8>").ends_with("PrimitiveKind::Bytes)"));
        assert!(kind_of("[u8; 16]").ends_with("PrimitiveKind::Bytes)"));
        assert!(kind_of("Vec<i64>").starts_with("::rpcwire::FieldKind::list("));
        assert!(kind_of("HashSet<String>").starts_with("::rpcwire::FieldKind::set("));
        let map = kind_of("BTreeMap<String, Vec<String>>");
        assert!(map.starts_with("::rpcwire::FieldKind::map("));
        assert!(map.contains("FieldKind::list("));
    }

    #[test]
    fn test_user_types_defer_to_trait() {
        assert_eq!(
            kind_of("Order"),
            "<Orderas::rpcwire::types::Described>::field_kind()"
        );
        assert_eq!(kind_of("rpcwire::Value"), "::rpcwire::FieldKind::Any");
    }

    #[test]
    fn test_unsupported_types() {
        let ty: Type = syn::parse_str("(i32, i32)").expect("type");
        assert!(field_kind(&ty).is_err());
        let ty: Type = syn::parse_str("HashMap<String>").expect("type");
        assert!(field_kind(&ty).is_err());
    }

    #[test]
    fn test_eval_code() {
        let parse = |s: &str| eval_code(&syn::parse_str::<Expr>(s).expect("expr"));
        assert_eq!(parse("7").expect("7"), 7);
        assert_eq!(parse("-1").expect("-1"), -1);
        assert_eq!(parse("-2147483648").expect("min"), i32::MIN);
        assert!(parse("4294967296").is_err());
        assert!(parse("A").is_err());
    }
}
