use syn::{Attribute, Error, Ident, Lit, LitInt, LitStr, Meta, NestedMeta, Result};

pub(super) fn clog2(value: usize) -> usize {
    if value <= 1 {
        0
    } else {
        (usize::BITS - (value - 1).leading_zeros()) as usize
    }
}

/// Integer argument of the first `#[<name>(N)]` attribute.
fn int_attr(attrs: &[Attribute], name: &str) -> Option<LitInt> {
    attrs.iter().filter(|attr| attr.path.is_ident(name)).find_map(|attr| match attr.parse_meta() {
        Ok(Meta::List(list)) => list.nested.iter().find_map(|nested| match nested {
            NestedMeta::Lit(Lit::Int(value)) => Some(value.clone()),
            _ => None,
        }),
        _ => None,
    })
}

/// `#[width(N)]` on a register enum.
pub(super) fn get_enum_width(attrs: &[Attribute]) -> Option<LitInt> { int_attr(attrs, "width") }

/// `#[encode(N)]` on a register enum state.
pub(super) fn get_enum_encode_value(attrs: &[Attribute]) -> Option<LitInt> { int_attr(attrs, "encode") }

/// Trace name of a member: `#[member(name = "...")]` or the field name. `None` for an empty name,
/// which inlines the member's own ports.
pub(super) fn get_member_symbol(attrs: &[Attribute], field: &Ident) -> Result<Option<LitStr>> {
    let renamed = attrs.iter().filter(|attr| attr.path.is_ident("member")).find_map(|attr| match attr.parse_meta() {
        Ok(Meta::List(list)) => list.nested.iter().find_map(|nested| match nested {
            NestedMeta::Meta(Meta::NameValue(nv)) if nv.path.is_ident("name") => Some(nv.lit.clone()),
            _ => None,
        }),
        _ => None,
    });

    match renamed {
        None => Ok(Some(LitStr::new(&field.to_string(), field.span()))),
        Some(Lit::Str(name)) if name.value().is_empty() => Ok(None),
        Some(Lit::Str(name)) => Ok(Some(name)),
        Some(other) => Err(Error::new(other.span(), "member name should be a string literal")),
    }
}
