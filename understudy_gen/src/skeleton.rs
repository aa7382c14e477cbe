// vim: tw=80
//! Emission of test skeletons

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use std::path::Path as FsPath;
use syn::Path;

use crate::error::{Error, Result};

/// A test module with placeholder cases for each phase of a test.
pub(crate) struct Skeleton {
    /// Snake-case base name of the target
    name: String,
    runtime: Path
}

impl Skeleton {
    /// `target` is a module name, or the path to a module or package.
    pub fn new(target: &str, runtime: &Path) -> Result<Self> {
        let base = FsPath::new(target.trim_end_matches(['/', '\\']))
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let name = snake_case(base);
        if name.is_empty() {
            return Err(Error::generation(target,
                "the target has no usable module name"));
        }
        Ok(Skeleton{name, runtime: runtime.clone()})
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the file to write the skeleton to
    pub fn file_name(&self) -> String {
        format!("{}_test.rs", self.name)
    }

    /// The target name in title case, one word per snake-case word
    pub fn title(&self) -> String {
        self.name.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(c) => c.to_uppercase().chain(chars).collect(),
                    None => String::new()
                }
            }).collect::<Vec<String>>()
            .join(" ")
    }
}

impl ToTokens for Skeleton {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let modname = format_ident!("test_{}", self.name);
        let doc = format!(" Tests for {}", self.title());
        let runtime = &self.runtime;
        quote!(
            #[doc = #doc]
            #[cfg(test)]
            mod #modname {
                #[allow(unused_imports)]
                use super::*;
                use #runtime::prelude::*;

                #[test]
                fn setup() {
                    let substitute = Substitute::new();
                    assert!(substitute.is_empty());
                }

                #[test]
                fn execution() {
                    let substitute = Substitute::new();
                    substitute.expect("call", params![ANY]).once();
                    let _ = substitute.dispatch("call", args![()]);
                    assert_eq!(substitute.call_count("call"), 1);
                }

                #[test]
                fn assertion() {
                    let substitute = Substitute::new();
                    assert_eq!(substitute.verify(), 0);
                }
            }
        ).to_tokens(tokens);
    }
}

/// Lowercase `s`, break camel-case words apart, and replace everything that
/// can't appear in an identifier with underscores.
fn snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_lower = false;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
