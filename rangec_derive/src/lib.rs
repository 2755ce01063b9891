use inflector::Inflector;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::*;

// 变量名转成 snake_case 输出，`#[style("...")]` 可以覆盖
fn variant_text(v: &Variant) -> std::result::Result<String, TokenStream2> {
	for attr in &v.attrs {
		if attr.path().is_ident("style") {
			return match attr.parse_args::<LitStr>() {
				Ok(lit_str) => Ok(lit_str.value()),
				Err(_) => Err(
					Error::new_spanned(attr, "Expected a string literal")
						.to_compile_error(),
				),
			};
		}
	}
	Ok(v.ident.to_string().to_snake_case())
}

/// Derives `Display` for a fieldless enum, printing each variant as its
/// snake_case name. Opcodes whose textual form differs carry
/// `#[style("...")]`.
#[proc_macro_derive(FuyukiDisplay, attributes(style))]
pub fn display_lowercase(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);

	let name = input.ident;
	let Data::Enum(DataEnum { variants, .. }) = input.data else {
		return Error::new_spanned(name, "FuyukiDisplay is only defined for enums")
			.to_compile_error()
			.into();
	};

	let mut cases = Vec::new();
	for v in variants.iter() {
		if !matches!(v.fields, Fields::Unit) {
			return Error::new_spanned(v, "variants must not carry fields")
				.to_compile_error()
				.into();
		}
		let variant_name = &v.ident;
		match variant_text(v) {
			Ok(text) => cases.push(quote! {
				#name::#variant_name => write!(f, "{}", #text)
			}),
			Err(e) => return e.into(),
		}
	}

	let expanded = quote! {
		impl std::fmt::Display for #name {
			fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
				match self {
					#( #cases, )*
				}
			}
		}
	};

	TokenStream::from(expanded)
}
