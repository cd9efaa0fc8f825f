//! Attribute helpers for the conditional export surface of `taqvim`.
//!
//! Binding generators (`wasm-bindgen`, `pyo3`) reject some items that plain Rust accepts, most
//! notably `const fn`. The conversion engine therefore writes plain `fn`s and asks for `const` (or
//! an ABI) only under the configurations that can take it, via [`fn_attr()`].

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Abi, Attribute, ImplItem, ImplItemFn, ItemFn, ItemImpl, Meta, Token, parse::ParseStream,
    parse_macro_input,
};

/// Qualifier accepted by [`fn_attr()`].
enum Qualifier {
    Const,
    Abi(Abi),
}

impl syn::parse::Parse for Qualifier {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(Token![const]) {
            input.parse::<Token![const]>()?;
            return Ok(Self::Const);
        }
        if input.peek(Token![extern]) {
            return Ok(Self::Abi(input.parse()?));
        }
        Err(input.error("expected `const` or `extern \"ABI\"`"))
    }
}

/// Add a qualifier to a free function signature.
///
/// ```rust,ignore
/// #[cfg_attr(not(feature = "wasm"), fn_attr(const))]
/// #[cfg_attr(feature = "c", unsafe(no_mangle), fn_attr(extern "C"))]
/// pub fn days_in_jalali_month(jy: i32, jm: i32) -> u8 { ... }
/// ```
#[proc_macro_attribute]
pub fn fn_attr(args: TokenStream, tokens: TokenStream) -> TokenStream {
    let qualifier = parse_macro_input!(args as Qualifier);
    let mut item_fn = parse_macro_input!(tokens as ItemFn);

    match qualifier {
        Qualifier::Const => item_fn.sig.constness = Some(Default::default()),
        Qualifier::Abi(abi) => item_fn.sig.abi = Some(abi),
    }

    quote!(#item_fn).into()
}

/// Push an attribute to every method of a conditionally compiled `pymethods` block.
///
/// PyO3 does not see nested attributes such as `staticmethod` when the `pymethods` header itself
/// sits behind `cfg_attr` (<https://github.com/PyO3/pyo3/issues/780>), so this re-emits the header
/// and copies the given attribute onto each function.
///
/// ```rust,ignore
/// #[cfg_attr(feature = "py", py_attr(pymethods, staticmethod))]
/// impl Ymd {
///     pub fn from_numbers(y: f64, m: f64, d: f64) -> Self { ... }
/// }
/// ```
#[proc_macro_attribute]
pub fn py_attr(args: TokenStream, tokens: TokenStream) -> TokenStream {
    let arg_parser = |input: ParseStream| {
        let parent = input.parse::<Meta>()?;
        input.parse::<Token![,]>()?;
        let meta = input.parse::<Meta>()?;
        Ok((parent, meta))
    };

    let (parent, meta) = parse_macro_input!(args with arg_parser);

    if !parent.path().is_ident("pymethods") {
        return syn::Error::new_spanned(parent, "only `pymethods` blocks are supported")
            .to_compile_error()
            .into();
    }

    let mut item_impl = parse_macro_input!(tokens as ItemImpl);
    for item in item_impl.items.iter_mut() {
        if let ImplItem::Fn(ImplItemFn { attrs, .. }) = item {
            attrs.push(Attribute {
                pound_token: Default::default(),
                style: syn::AttrStyle::Outer,
                bracket_token: Default::default(),
                meta: meta.clone(),
            });
        }
    }

    quote! {
        #[#parent]
        #item_impl
    }
    .into()
}
