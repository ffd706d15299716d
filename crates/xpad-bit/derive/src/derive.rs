use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

/// Widest mask the `Bitable` storage can hold.
const MAX_VARIANTS: usize = 32;

pub(crate) fn expand_bit(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "Bit can be derived only for enums",
        ));
    };

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Bit supports only fieldless enum variants",
            ));
        }
        variants.push(&variant.ident);
    }

    if variants.len() > MAX_VARIANTS {
        return Err(syn::Error::new_spanned(
            name,
            format!("Bit supports at most {MAX_VARIANTS} variants"),
        ));
    }

    let index_arms = variants.iter().enumerate().map(|(i, v)| {
        let idx = i as u32;
        quote! { #name::#v => #idx }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::xpad_bit_mask::Bitable for #name #ty_generics #where_clause {
            const ALL: &'static [Self] = &[ #( #name::#variants ),* ];

            #[inline]
            fn index(&self) -> u32 {
                match self { #( #index_arms, )* }
            }

            #[inline]
            fn bit(&self) -> u32 {
                1u32 << self.index()
            }
        }
    })
}
