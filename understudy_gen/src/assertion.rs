// vim: tw=80
//! Emission of custom assertion functions

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{ItemFn, Path};

use crate::{
    error::Result,
    spec::AssertionSpec
};

/// One generated assertion function.
///
/// It takes a reporter, the declared parameters, and an optional message
/// that overrides the default.  When the condition is false it reports
/// `Failure::Assertion` and returns `false`; it never panics.
pub(crate) struct Assertion {
    item: ItemFn
}

impl Assertion {
    pub fn new(spec: &AssertionSpec, runtime: &Path) -> Result<Self> {
        let name = format_ident!("{}", spec.name());
        let params = spec.param_decls()?;
        let condition = spec.condition_tokens()?;
        let default = spec.message();
        let doc = format!(" Asserts `{}`.", spec.condition());
        let tokens = quote!(
            #[doc = #doc]
            #[track_caller]
            pub fn #name(
                reporter: &dyn #runtime::Reporter,
                #(#params,)*
                message: ::std::option::Option<&str>,
            ) -> bool {
                let holds: bool = { #condition };
                if !holds {
                    let message = message
                        .filter(|m| !m.is_empty())
                        .unwrap_or(#default);
                    reporter.report(
                        #runtime::Failure::Assertion {
                            message: ::std::string::ToString::to_string(message),
                        },
                        ::std::panic::Location::caller(),
                    );
                }
                holds
            }
        );
        let item = syn::parse2::<ItemFn>(tokens)
            .map_err(|e| spec.error(format!("bad condition: {e}")))?;
        Ok(Assertion{item})
    }
}

impl ToTokens for Assertion {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.item.to_tokens(tokens)
    }
}
