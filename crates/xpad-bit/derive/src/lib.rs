mod derive;

use proc_macro::TokenStream;

use crate::derive::expand_bit;

/// Implements `xpad_bit_mask::Bitable` for a fieldless enum.
///
/// Variants get consecutive bit positions in declaration order, and
/// `Bitable::ALL` lists them in that same order.
#[proc_macro_derive(Bit)]
pub fn derive_bit(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);
    expand_bit(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
