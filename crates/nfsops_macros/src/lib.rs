#![doc = include_str!("../README.md")]

extern crate proc_macro;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DataEnum, DataStruct, DeriveInput, Fields, Ident, Index, parse_macro_input};

#[proc_macro_derive(XdrCodec)]
pub fn derive_xdr_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let generics = &input.generics;

    let expanded = match &input.data {
        Data::Struct(data) => struct_impl(name, generics, data),
        Data::Enum(data) => enum_impl(name, generics, data),
        Data::Union(_) => {
            return syn::Error::new_spanned(name, "XdrCodec cannot be derived for unions")
                .to_compile_error()
                .into();
        }
    };

    match expanded {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn struct_impl(
    name: &Ident,
    generics: &syn::Generics,
    data: &DataStruct,
) -> syn::Result<TokenStream2> {
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let (size_body, pack_body, unpack_body, construct) = match &data.fields {
        Fields::Named(fields) => {
            let idents: Vec<Ident> = fields
                .named
                .iter()
                .filter_map(|f| f.ident.clone())
                .collect();
            (
                quote! { 0usize #(+ self.#idents.packed_size())* },
                quote! { #(written += self.#idents.pack(out)?;)* },
                quote! {
                    #(
                        let (#idents, n) = nfsops_types::xdr::Unpack::unpack(input)?;
                        read += n;
                    )*
                },
                quote! { Self { #(#idents),* } },
            )
        }
        Fields::Unnamed(fields) => {
            let indices: Vec<Index> = (0..fields.unnamed.len()).map(Index::from).collect();
            let vars: Vec<Ident> = (0..fields.unnamed.len())
                .map(|i| Ident::new(&format!("field_{i}"), proc_macro2::Span::call_site()))
                .collect();
            (
                quote! { 0usize #(+ self.#indices.packed_size())* },
                quote! { #(written += self.#indices.pack(out)?;)* },
                quote! {
                    #(
                        let (#vars, n) = nfsops_types::xdr::Unpack::unpack(input)?;
                        read += n;
                    )*
                },
                quote! { Self(#(#vars),*) },
            )
        }
        Fields::Unit => (quote! { 0usize }, quote! {}, quote! {}, quote! { Self }),
    };

    Ok(quote! {
        impl #impl_generics nfsops_types::xdr::Pack for #name #ty_generics #where_clause {
            fn packed_size(&self) -> usize {
                use nfsops_types::xdr::Pack;
                #size_body
            }

            fn pack(&self, out: &mut impl std::io::Write) -> nfsops_types::xdr::Result<usize> {
                use nfsops_types::xdr::Pack;
                let mut written = 0usize;
                #pack_body
                Ok(written)
            }
        }

        impl #impl_generics nfsops_types::xdr::Unpack for #name #ty_generics #where_clause {
            fn unpack(input: &mut impl std::io::Read) -> nfsops_types::xdr::Result<(Self, usize)> {
                let mut read = 0usize;
                #unpack_body
                let _ = &mut read;
                Ok((#construct, read))
            }
        }
    })
}

fn enum_impl(name: &Ident, generics: &syn::Generics, data: &DataEnum) -> syn::Result<TokenStream2> {
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "XdrCodec only derives C-like enums; unions with payloads get hand-written codecs",
            ));
        }
    }

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let pack_arms = data.variants.iter().map(|v| {
        let ident = &v.ident;
        quote! { Self::#ident => (Self::#ident as u32).pack(out), }
    });

    let unpack_arms = data.variants.iter().map(|v| {
        let ident = &v.ident;
        quote! { tag if tag == Self::#ident as u32 => Self::#ident, }
    });

    Ok(quote! {
        impl #impl_generics nfsops_types::xdr::Pack for #name #ty_generics #where_clause {
            fn packed_size(&self) -> usize {
                4
            }

            fn pack(&self, out: &mut impl std::io::Write) -> nfsops_types::xdr::Result<usize> {
                use nfsops_types::xdr::Pack;
                match self {
                    #(#pack_arms)*
                }
            }
        }

        impl #impl_generics nfsops_types::xdr::Unpack for #name #ty_generics #where_clause {
            fn unpack(input: &mut impl std::io::Read) -> nfsops_types::xdr::Result<(Self, usize)> {
                let (tag, read) = <u32 as nfsops_types::xdr::Unpack>::unpack(input)?;
                let value = match tag {
                    #(#unpack_arms)*
                    _ => return Err(nfsops_types::xdr::Error::InvalidEnumValue(tag)),
                };
                Ok((value, read))
            }
        }
    })
}
