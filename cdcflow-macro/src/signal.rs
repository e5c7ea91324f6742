use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DataEnum, DeriveInput, Error, Fields, FieldsNamed, Result};

use super::utils::{clog2, get_enum_encode_value, get_enum_width, get_member_symbol};

pub(super) fn derive(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    let body = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => derive_struct(fields),
            fields => Err(Error::new(fields.span(), "register structs need named fields")),
        },
        Data::Enum(data) => derive_enum(&ast, data),
        Data::Union(_) => Err(Error::new(ast.ident.span(), "a union has no bit layout")),
    };

    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    match body {
        Ok(body) => quote! {
            impl #impl_generics Signal for #name #ty_generics #where_clause {
                #body
            }
        }
        .into(),
        Err(error) => error.to_compile_error().into(),
    }
}

/// Members are laid out in declaration order, the first one at the least significant bit.
fn derive_struct(fields: &FieldsNamed) -> Result<TokenStream2> {
    let mut widths = vec![];
    let mut member_bits = vec![];
    let mut members = vec![];

    for field in &fields.named {
        let ty = &field.ty;
        let ident = field.ident.as_ref().ok_or_else(|| Error::new(field.span(), "unnamed member"))?;

        widths.push(quote! { <#ty>::WIDTH });
        member_bits.push(quote! { self.#ident.transl() });
        members.push(match get_member_symbol(&field.attrs, ident)? {
            Some(symbol) => quote! { (Some(#symbol.to_string()), <#ty>::port_decls()) },
            None => quote! { (None, <#ty>::port_decls()) },
        });
    }

    Ok(quote! {
        const WIDTH: usize = 0 #(+ #widths)*;

        fn transl(self) -> Vec<bool> {
            let mut bits = Vec::with_capacity(Self::WIDTH);
            #(bits.extend(#member_bits);)*
            bits
        }

        fn port_decls() -> PortDecls {
            PortDecls::Struct(vec![#(#members),*])
        }
    })
}

/// Variants are encoded by index unless tagged `#[encode(N)]`.
fn derive_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream2> {
    if data.variants.is_empty() {
        return Err(Error::new(ast.ident.span(), "a register enum needs at least one state"));
    }

    let width = match get_enum_width(&ast.attrs) {
        Some(width) => width.base10_parse::<usize>()?,
        None => clog2(data.variants.len()).max(1),
    };

    let mut arms = vec![];
    for (index, variant) in data.variants.iter().enumerate() {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(Error::new(variant.span(), "register enum states cannot carry data"));
        }
        let code = match get_enum_encode_value(&variant.attrs) {
            Some(code) => code.base10_parse::<usize>()?,
            None => index,
        };
        if width < usize::BITS as usize && code >> width != 0 {
            return Err(Error::new(variant.span(), format!("state code {} does not fit in {} bits", code, width)));
        }

        let ident = &variant.ident;
        arms.push(quote! { Self::#ident => #code });
    }

    Ok(quote! {
        const WIDTH: usize = #width;

        fn transl(self) -> Vec<bool> {
            let code: usize = match self { #(#arms),* };
            (0..Self::WIDTH).map(|bit| (code >> bit) & 1 == 1).collect()
        }

        fn port_decls() -> PortDecls {
            PortDecls::Bits(Self::WIDTH)
        }
    })
}
