// vim: tw=80
//! Source-driven generator for Understudy test doubles
//!
//! The [`Generator`] reads Rust source and writes new Rust source:
//!
//! * [`generate_mocks`](Generator::generate_mocks) writes a mock
//!   implementation of the first trait declared in each compilation unit.
//!   Every mocked method forwards its name and arguments to
//!   `Substitute::dispatch` and converts the configured results back to the
//!   declared return type, substituting zero values for missing ones.
//! * [`generate_test_boilerplate`](Generator::generate_test_boilerplate)
//!   writes a test module skeleton.
//! * [`generate_assertions`](Generator::generate_assertions) writes custom
//!   assertion functions described by one-line specs.  See [`spec`].
//!
//! # Examples
//! ```no_run
//! use understudy_gen::Generator;
//!
//! let generator = Generator::new("src/repo");
//! let written = generator.generate_mocks(&["src/repo.rs"]).unwrap();
//! assert_eq!(written[0].file_name().unwrap(), "mock_repo.rs");
//! ```
//!
//! The mock file expects to be declared as a child module of the module that
//! declares the trait:
//! ```ignore
//! // src/repo.rs
//! pub trait UserRepository { /* ... */ }
//!
//! #[cfg(test)]
//! mod mock_repo;
//! ```

use proc_macro2::TokenStream;
use quote::ToTokens;
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf}
};
use tracing::{debug, info, warn};

mod assertion;
mod error;
pub mod extract;
mod mock_function;
mod mock_trait;
mod skeleton;
pub mod spec;

pub use crate::error::{Error, Result};
pub use crate::extract::{Contract, Method, Param, extract, extract_source};
pub use crate::spec::AssertionSpec;

use crate::{
    assertion::Assertion,
    mock_trait::MockTrait,
    skeleton::Skeleton
};

/// First line of every generated file
pub const BANNER: &str = "// @generated by understudy-gen. Do not edit.";

/// Name of the file written by
/// [`generate_assertions`](Generator::generate_assertions)
pub const ASSERTIONS_FILE: &str = "custom_assertions.rs";

/// Writes generated source into one output directory.
///
/// A `Generator` keeps no state between calls, apart from its configuration.
#[derive(Clone, Debug)]
pub struct Generator {
    output_dir: PathBuf,
    runtime: syn::Path
}

impl Generator {
    /// A generator that writes into `output_dir`, creating it when needed.
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Generator {
            output_dir: output_dir.into(),
            runtime: syn::parse_quote!(::understudy)
        }
    }

    /// The path by which generated code names the runtime crate.
    ///
    /// Defaults to `::understudy`.
    pub fn runtime_path(mut self, path: syn::Path) -> Self {
        self.runtime = path;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write a mock for the first trait in each of `sources`.
    ///
    /// Each mock goes in `mock_<stem>.rs`, where `stem` is the source's file
    /// stem.  The first failure aborts the call; mocks written before it are
    /// left in place.  Two sources with the same stem are a failure, since
    /// their mocks would share a file.
    pub fn generate_mocks<P: AsRef<Path>>(&self, sources: &[P])
        -> Result<Vec<PathBuf>>
    {
        let mut written = Vec::with_capacity(sources.len());
        let mut origins = HashMap::new();
        for source in sources {
            let source = source.as_ref();
            let contract = extract(source)?;
            let mock = MockTrait::new(&contract, &self.runtime)?;
            let stem = source.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| contract.name.to_string());
            let file_name = format!("mock_{stem}.rs");
            if let Some(other) = origins.insert(file_name.clone(), source) {
                return Err(Error::generation(source.display(), format!(
                    "{} is already generated from {}", file_name,
                    other.display())));
            }
            let path = self.write(&file_name, mock.to_token_stream())?;
            info!(source = %source.display(), path = %path.display(),
                  mock = %mock.mock_ident(),
                  methods = mock.method_names().count(),
                  "generated mock");
            written.push(path);
        }
        Ok(written)
    }

    /// Write a test skeleton for `target`, a module name or the path to a
    /// module or package.
    pub fn generate_test_boilerplate(&self, target: &str) -> Result<PathBuf> {
        let skeleton = Skeleton::new(target, &self.runtime)?;
        let path = self.write(&skeleton.file_name(),
                              skeleton.to_token_stream())?;
        info!(target, module = skeleton.name(), path = %path.display(),
              "generated test skeleton");
        Ok(path)
    }

    /// Write one assertion function per valid spec line, in input order.
    ///
    /// Malformed lines don't stop the batch.  Each one is logged, skipped,
    /// and listed in the returned report.  The file is written even if every
    /// line was skipped.
    pub fn generate_assertions<S: AsRef<str>>(&self, lines: &[S])
        -> Result<AssertionReport>
    {
        let mut generated = Vec::new();
        let mut skipped = Vec::new();
        let mut names = HashSet::new();
        let mut items = TokenStream::new();
        for (i, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let assertion = AssertionSpec::parse(line).and_then(|spec| {
                if !names.insert(spec.name().to_owned()) {
                    return Err(spec.error("duplicate assertion name"));
                }
                let assertion = Assertion::new(&spec, &self.runtime)?;
                Ok((spec, assertion))
            });
            match assertion {
                Ok((spec, assertion)) => {
                    debug!(name = spec.name(), "generated assertion");
                    assertion.to_tokens(&mut items);
                    generated.push(spec);
                },
                Err(error) => {
                    warn!(line = i + 1, %error, "skipping assertion spec");
                    skipped.push(Skipped {
                        line: i + 1,
                        spec: line.to_owned(),
                        error
                    });
                }
            }
        }
        let file = quote::quote!(
            #![allow(non_snake_case)]
            #items
        );
        let path = self.write(ASSERTIONS_FILE, file)?;
        info!(path = %path.display(), generated = generated.len(),
              skipped = skipped.len(), "generated assertions");
        Ok(AssertionReport{path, generated, skipped})
    }

    /// Format `tokens` and write them to `file_name` in the output directory.
    fn write(&self, file_name: &str, tokens: TokenStream) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let text = render(tokens)
            .map_err(|e| Error::generation(path.display(), e.to_string()))?;
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| Error::io(&self.output_dir, e))?;
        fs::write(&path, text)
            .map_err(|e| Error::io(&path, e))?;
        Ok(path)
    }
}

/// Pretty-print a generated file, with the banner on top.
fn render(tokens: TokenStream) -> syn::Result<String> {
    let file = syn::parse2::<syn::File>(tokens)?;
    Ok(format!("{}\n\n{}", BANNER, prettyplease::unparse(&file)))
}

/// What [`Generator::generate_assertions`] did.
#[derive(Debug)]
pub struct AssertionReport {
    /// The file that was written
    pub path: PathBuf,
    /// Specs that became assertion functions, in input order
    pub generated: Vec<AssertionSpec>,
    /// Lines that were skipped, in input order
    pub skipped: Vec<Skipped>
}

impl AssertionReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A spec line that could not be turned into an assertion.
#[derive(Debug)]
pub struct Skipped {
    /// One-based position of the line in the input
    pub line: usize,
    pub spec: String,
    pub error: Error
}

#[cfg(test)]
mod t {
    use super::*;
    use proc_macro2::{Group, Punct, Spacing, TokenTree};
    use pretty_assertions::assert_eq;

    /// Print `tokens` with every punctuation mark standing alone.
    ///
    /// Macro arguments keep their raw spacing, which differs between lexed
    /// text (`&*`) and quoted tokens (`& *`).
    pub(crate) fn spaced(tokens: TokenStream) -> String {
        fn respace(tokens: TokenStream) -> TokenStream {
            tokens.into_iter()
                .map(|tt| match tt {
                    TokenTree::Punct(p) =>
                        Punct::new(p.as_char(), Spacing::Alone).into(),
                    TokenTree::Group(g) =>
                        Group::new(g.delimiter(), respace(g.stream())).into(),
                    tt => tt
                }).collect()
        }
        respace(tokens).to_string()
    }

    #[test]
    fn render_adds_the_banner() {
        let text = render(quote::quote!(struct Foo;)).unwrap();
        assert_eq!(text, format!("{}\n\nstruct Foo;\n", BANNER));
    }

    #[test]
    fn render_rejects_non_items() {
        assert!(render(quote::quote!(1 + 1)).is_err());
    }

    #[test]
    fn runtime_path_defaults_to_understudy() {
        let generator = Generator::new("out");
        assert_eq!(generator.runtime.to_token_stream().to_string(),
                   ":: understudy");
        let generator = generator.runtime_path(syn::parse_quote!(my::rt));
        assert_eq!(generator.runtime.to_token_stream().to_string(),
                   "my :: rt");
        assert_eq!(generator.output_dir(), Path::new("out"));
    }
}
