// vim: tw=80
//! The declaration extractor: find the first trait in a compilation unit and
//! describe its methods.

use quote::{ToTokens, format_ident};
use std::{
    fmt,
    fs,
    path::Path
};
use syn::{
    FnArg,
    Generics,
    Ident,
    Item,
    ItemTrait,
    Pat,
    Receiver,
    ReturnType,
    Signature,
    TraitItem,
    Type
};
use tracing::debug;

use crate::error::{Error, Result};

/// An interface-shaped declaration: a trait's name and its methods, in
/// declaration order.
///
/// Types are captured verbatim from the source.  Nothing is resolved across
/// files or modules.
#[derive(Clone, Debug)]
pub struct Contract {
    pub name: Ident,
    pub unsafety: bool,
    pub generics: Generics,
    /// Associated types, consts and macro invocations, which mocks can't
    /// provide
    pub associated: Vec<String>,
    pub methods: Vec<Method>
}

impl Contract {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl From<ItemTrait> for Contract {
    fn from(item: ItemTrait) -> Self {
        let mut associated = Vec::new();
        let mut methods = Vec::new();
        for ti in item.items {
            match ti {
                TraitItem::Fn(tif) => methods.push(Method::from(tif.sig)),
                TraitItem::Type(tit) =>
                    associated.push(format!("type {}", tit.ident)),
                TraitItem::Const(tic) =>
                    associated.push(format!("const {}", tic.ident)),
                TraitItem::Macro(tim) => associated.push(
                    format!("{}!", tim.mac.path.to_token_stream())),
                other => associated.push(other.to_token_stream().to_string())
            }
        }
        Contract {
            name: item.ident,
            unsafety: item.unsafety.is_some(),
            generics: item.generics,
            associated,
            methods
        }
    }
}

/// One method signature of a [`Contract`].
#[derive(Clone, Debug)]
pub struct Method {
    pub name: Ident,
    /// `None` for associated functions
    pub receiver: Option<Receiver>,
    pub params: Vec<Param>,
    /// The declared output, split into positions.  A tuple output has one
    /// position per element and `()` has none.
    pub results: Vec<Type>,
    /// The declared output as written
    pub output: ReturnType,
    pub generics: Generics,
    pub unsafety: bool,
    pub asyncness: bool
}

impl From<Signature> for Method {
    fn from(sig: Signature) -> Self {
        let mut receiver = None;
        let mut params = Vec::new();
        for (i, input) in sig.inputs.into_iter().enumerate() {
            match input {
                FnArg::Receiver(r) => receiver = Some(r),
                FnArg::Typed(pt) => {
                    let name = match *pt.pat {
                        Pat::Ident(pi) if pi.subpat.is_none() => pi.ident,
                        _ => format_ident!("arg{}", i)
                    };
                    params.push(Param{name, ty: *pt.ty});
                }
            }
        }
        let results = match &sig.output {
            ReturnType::Default => Vec::new(),
            ReturnType::Type(_, ty) => match ty.as_ref() {
                Type::Tuple(tt) => tt.elems.iter().cloned().collect(),
                ty => vec![ty.clone()]
            }
        };
        Method {
            name: sig.ident,
            receiver,
            params,
            results,
            output: sig.output,
            generics: sig.generics,
            unsafety: sig.unsafety.is_some(),
            asyncness: sig.asyncness.is_some()
        }
    }
}

/// A named, typed method parameter.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: Ident,
    pub ty: Type
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty.to_token_stream())
    }
}

/// Read the compilation unit at `path` and describe its first trait.
pub fn extract<P: AsRef<Path>>(path: P) -> Result<Contract> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .map_err(|e| Error::io(path, e))?;
    parse(path, &source)
}

/// Like [`extract`], for source text that did not come from a file.
pub fn extract_source(source: &str) -> Result<Contract> {
    parse(Path::new("<source>"), source)
}

fn parse(path: &Path, source: &str) -> Result<Contract> {
    let file = syn::parse_file(source).map_err(|e| {
        let start = e.span().start();
        Error::Parse {
            path: path.to_owned(),
            line: start.line,
            column: start.column + 1,
            message: e.to_string()
        }
    })?;
    // Only the first trait is used, even if the unit declares several.
    let item = file.items
        .into_iter()
        .find_map(|item| match item {
            Item::Trait(it) => Some(it),
            _ => None
        }).ok_or_else(|| Error::NotFound{path: path.to_owned()})?;
    let contract = Contract::from(item);
    debug!(path = %path.display(), name = %contract.name,
           methods = contract.methods.len(), "extracted contract");
    Ok(contract)
}
