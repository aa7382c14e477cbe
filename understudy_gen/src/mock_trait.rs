// vim: tw=80
//! Emission of a whole mock: the struct, its constructor, and the trait impl

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Ident, Path};

use crate::{
    error::{Error, Result},
    extract::Contract,
    mock_function::{self, MockFunction}
};

pub(crate) struct MockTrait {
    methods: Vec<MockFunction>,
    /// Name of the generated struct
    mock_ident: Ident,
    runtime: Path,
    /// Name of the trait being mocked
    trait_ident: Ident,
    unsafety: bool
}

impl MockTrait {
    /// Check that every part of `contract` can be mocked.
    pub fn new(contract: &Contract, runtime: &Path) -> Result<Self> {
        let name = &contract.name;
        if !contract.generics.params.is_empty() {
            return Err(Error::generation(name,
                "generic traits are not supported"));
        }
        if !contract.associated.is_empty() {
            return Err(Error::generation(name, format!(
                "associated items are not supported: {}",
                contract.associated.join(", "))));
        }
        let methods = contract.methods.iter()
            .map(|m| mock_function::Builder::new(m)
                .runtime(runtime)
                .trait_(name)
                .build()
            ).collect::<Result<Vec<_>>>()?;
        Ok(MockTrait {
            methods,
            mock_ident: format_ident!("Mock{}", name),
            runtime: runtime.clone(),
            trait_ident: name.clone(),
            unsafety: contract.unsafety
        })
    }

    pub fn mock_ident(&self) -> &Ident {
        &self.mock_ident
    }

    pub fn method_names(&self) -> impl Iterator<Item=&Ident> {
        self.methods.iter().map(MockFunction::name)
    }
}

impl ToTokens for MockTrait {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let mock_ident = &self.mock_ident;
        let trait_ident = &self.trait_ident;
        let runtime = &self.runtime;
        let methods = &self.methods;
        let unsafety = self.unsafety.then(|| quote!(unsafe));
        let struct_doc = format!(
            " Mock implementation of [`{}`], backed by a [`Substitute`]({}).",
            trait_ident,
            quote!(#runtime::Substitute).to_string().replace(' ', ""));
        quote!(
            use super::*;

            #[doc = #struct_doc]
            pub struct #mock_ident<'a> {
                substitute: &'a #runtime::Substitute,
            }

            impl<'a> #mock_ident<'a> {
                pub fn new(substitute: &'a #runtime::Substitute) -> Self {
                    #mock_ident { substitute }
                }

                #[doc = " The substitute that answers calls to this mock"]
                pub fn substitute(&self) -> &'a #runtime::Substitute {
                    self.substitute
                }
            }

            #unsafety impl #trait_ident for #mock_ident<'_> {
                #(#methods)*
            }
        ).to_tokens(tokens);
    }
}
