// vim: tw=80
//! Emission of one mocked method

use proc_macro2::{Literal, TokenStream};
use quote::{ToTokens, quote};
use syn::{
    GenericParam,
    Ident,
    Lifetime,
    Path,
    ReturnType,
    Type,
    TypeImplTrait,
    TypeReference,
    visit::{self, Visit}
};

use crate::{
    error::{Error, Result},
    extract::Method
};

/// Build a MockFunction.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Builder<'a> {
    method: &'a Method,
    runtime: Option<&'a Path>,
    trait_: Option<&'a Ident>
}

impl<'a> Builder<'a> {
    pub fn new(method: &'a Method) -> Self {
        Builder {
            method,
            runtime: None,
            trait_: None
        }
    }

    /// Path to the runtime crate
    pub fn runtime(&mut self, path: &'a Path) -> &mut Self {
        self.runtime = Some(path);
        self
    }

    /// Supply the name of the trait being mocked, for error messages
    pub fn trait_(&mut self, ident: &'a Ident) -> &mut Self {
        self.trait_ = Some(ident);
        self
    }

    /// Check that the method can be mocked, and prepare its pieces.
    pub fn build(self) -> Result<MockFunction> {
        let m = self.method;
        let item = match self.trait_ {
            Some(t) => format!("{}::{}", t, m.name),
            None => m.name.to_string()
        };
        let fail = |reason: String| Error::generation(&item, reason);

        if m.receiver.is_none() {
            return Err(fail("associated functions without a receiver have no \
                            substitute to dispatch to".to_owned()));
        }
        if m.asyncness {
            return Err(fail("async methods are not supported".to_owned()));
        }
        if m.generics.params.iter()
            .any(|gp| !matches!(gp, GenericParam::Lifetime(_)))
        {
            return Err(fail("generic methods are not supported".to_owned()));
        }

        let mut argexprs = Vec::new();
        for p in m.params.iter() {
            argexprs.push(argument(&p.name, &p.ty)
                .map_err(|why| fail(format!("parameter {}: {}", p.name, why)))?);
        }
        for (i, ty) in m.results.iter().enumerate() {
            if let Some(why) = unassignable(ty) {
                return Err(fail(format!("result {}: {}", i, why)));
            }
        }
        let tuple = matches!(&m.output,
            ReturnType::Type(_, ty) if matches!(ty.as_ref(), Type::Tuple(_)));

        Ok(MockFunction {
            argexprs,
            method: m.clone(),
            runtime: self.runtime.cloned()
                .unwrap_or_else(|| syn::parse_quote!(::understudy)),
            tuple
        })
    }
}

pub(crate) struct MockFunction {
    /// Expressions that turn each parameter into a dispatched argument
    argexprs: Vec<TokenStream>,
    method: Method,
    runtime: Path,
    /// Does the method return a tuple?
    tuple: bool
}

impl MockFunction {
    /// Convert every configured result back to its declared type.
    fn conversions(&self) -> Vec<TokenStream> {
        self.method.results.iter()
            .enumerate()
            .map(|(i, ty)| {
                let i = Literal::usize_unsuffixed(i);
                let zero = zero(ty);
                quote!(returns.take::<#ty>(#i).unwrap_or_else(|| #zero))
            }).collect()
    }

    pub fn name(&self) -> &Ident {
        &self.method.name
    }
}

impl ToTokens for MockFunction {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let m = &self.method;
        let name = &m.name;
        let name_str = name.to_string();
        let generics = &m.generics;
        let where_clause = &m.generics.where_clause;
        let inputs = m.receiver.iter()
            .map(ToTokens::to_token_stream)
            .chain(m.params.iter().map(|p| {
                let (pname, pty) = (&p.name, &p.ty);
                quote!(#pname: #pty)
            }));
        let output = &m.output;
        let unsafety = m.unsafety.then(|| quote!(unsafe));
        let runtime = &self.runtime;
        let argexprs = &self.argexprs;
        let dispatch = quote!(
            self.substitute.dispatch(#name_str, #runtime::args![#(#argexprs),*])
        );
        let convs = self.conversions();
        let body = if convs.is_empty() {
            quote!(#dispatch;)
        } else if self.tuple {
            quote!(
                let mut returns = #dispatch;
                (#(#convs,)*)
            )
        } else {
            quote!(
                let mut returns = #dispatch;
                #(#convs)*
            )
        };
        quote!(
            #[track_caller]
            #unsafety fn #name #generics(#(#inputs),*) #output
                #where_clause
            {
                #body
            }
        ).to_tokens(tokens);
    }
}

/// The expression that passes parameter `name` to `dispatch`.
///
/// Borrowed parameters are converted to their owned form, so expectations
/// can be written with owned values.
fn argument(name: &Ident, ty: &Type) -> std::result::Result<TokenStream,
                                                              String>
{
    match ty {
        Type::ImplTrait(_) => Err("impl Trait parameters are generic".into()),
        Type::Reference(tr) => {
            if matches!(tr.elem.as_ref(),
                Type::TraitObject(_) | Type::ImplTrait(_))
            {
                return Err("trait object parameters can't be compared"
                           .into());
            }
            if let Some(why) = Checker::check(&tr.elem) {
                return Err(why);
            }
            Ok(quote!(::std::borrow::ToOwned::to_owned(&*#name)))
        },
        ty => match Checker::check(ty) {
            Some(why) => Err(why),
            None => Ok(quote!(#name))
        }
    }
}

/// Why a value of type `ty` can't be handed back by a substitute, if it
/// can't.
pub(crate) fn unassignable(ty: &Type) -> Option<String> {
    match ty {
        Type::Paren(tp) => unassignable(&tp.elem),
        Type::Group(tg) => unassignable(&tg.elem),
        Type::TraitObject(_) => Some("trait objects are unsized".into()),
        Type::Slice(_) => Some("slices are unsized".into()),
        Type::BareFn(_) => Some("function pointers have no zero value".into()),
        Type::Verbatim(ts) => Some(format!("unrecognized type {}", ts)),
        ty => Checker::check(ty)
    }
}

/// Looks for anything that can't be stored in a substitute and moved out
/// again.
#[derive(Default)]
struct Checker {
    problem: Option<String>
}

impl Checker {
    fn check(ty: &Type) -> Option<String> {
        let mut checker = Checker::default();
        checker.visit_type(ty);
        checker.problem
    }

    fn flag(&mut self, problem: impl Into<String>) {
        self.problem.get_or_insert_with(|| problem.into());
    }
}

impl<'ast> Visit<'ast> for Checker {
    fn visit_lifetime(&mut self, lt: &'ast Lifetime) {
        if lt.ident != "static" {
            self.flag(format!("borrows for {} instead of 'static", lt));
        }
    }

    fn visit_path(&mut self, path: &'ast Path) {
        if path.segments.iter().any(|seg| seg.ident == "Self") {
            self.flag("mentions Self");
        }
        visit::visit_path(self, path);
    }

    fn visit_type_impl_trait(&mut self, _: &'ast TypeImplTrait) {
        self.flag("impl Trait can't be named");
    }

    fn visit_type_infer(&mut self, _: &'ast syn::TypeInfer) {
        self.flag("inferred types can't be named");
    }

    fn visit_type_macro(&mut self, _: &'ast syn::TypeMacro) {
        self.flag("macros in type position can't be expanded");
    }

    fn visit_type_never(&mut self, _: &'ast syn::TypeNever) {
        self.flag("the never type has no values");
    }

    fn visit_type_reference(&mut self, tr: &'ast TypeReference) {
        if tr.lifetime.is_none() {
            self.flag("borrows for an elided lifetime instead of 'static");
        }
        visit::visit_type_reference(self, tr);
    }
}

/// The value a mocked method returns in position `ty` when no result was
/// configured for it.
pub(crate) fn zero(ty: &Type) -> TokenStream {
    match ty {
        Type::Tuple(tt) => {
            let zeros = tt.elems.iter().map(zero);
            quote!((#(#zeros,)*))
        },
        Type::Paren(tp) => zero(&tp.elem),
        Type::Group(tg) => zero(&tg.elem),
        Type::Ptr(tp) if tp.mutability.is_some() =>
            quote!(::std::ptr::null_mut()),
        Type::Ptr(_) => quote!(::std::ptr::null()),
        Type::Array(ta) => {
            let z = zero(&ta.elem);
            quote!(::std::array::from_fn(|_| #z))
        },
        Type::Path(tp) if tp.qself.is_none() => {
            let Some(last) = tp.path.segments.last() else {
                return default();
            };
            if last.ident == "Option" {
                quote!(::std::option::Option::None)
            } else if last.ident == "Result" {
                let ok = first_type_arg(&last.arguments)
                    .map(zero)
                    .unwrap_or_else(default);
                quote!(::std::result::Result::Ok(#ok))
            } else {
                default()
            }
        },
        _ => default()
    }
}

fn default() -> TokenStream {
    quote!(::std::default::Default::default())
}

fn first_type_arg(args: &syn::PathArguments) -> Option<&Type> {
    match args {
        syn::PathArguments::AngleBracketed(ab) => ab.args.iter()
            .find_map(|ga| match ga {
                syn::GenericArgument::Type(ty) => Some(ty),
                _ => None
            }),
        _ => None
    }
}

#[cfg(test)]
mod t {
    use super::*;
    use crate::{extract::extract_source, t::spaced};
    use pretty_assertions::assert_eq;

    fn ty(s: &str) -> Type {
        syn::parse_str(s).unwrap()
    }

    fn method(decl: &str) -> Method {
        let code = format!("trait Foo {{ {} }}", decl);
        extract_source(&code).unwrap().methods.remove(0)
    }

    fn build(decl: &str) -> Result<MockFunction> {
        let m = method(decl);
        let trait_ = Ident::new("Foo", proc_macro2::Span::call_site());
        Builder::new(&m).trait_(&trait_).build()
    }

    fn emit(decl: &str) -> String {
        let mf = build(decl).unwrap();
        let item: syn::ImplItemFn = syn::parse2(mf.to_token_stream()).unwrap();
        spaced(item.to_token_stream())
    }

    fn cmp(actual: String, expected: &str) {
        let expected: syn::ImplItemFn = syn::parse_str(expected).unwrap();
        assert_eq!(actual, spaced(expected.to_token_stream()));
    }

    mod zero {
        use super::*;
        use pretty_assertions::assert_eq;

        fn zero_of(s: &str) -> String {
            zero(&ty(s)).to_string()
        }

        #[test]
        fn default() {
            let expected = quote!(::std::default::Default::default())
                .to_string();
            assert_eq!(zero_of("u32"), expected);
            assert_eq!(zero_of("HashMap<String, u8>"), expected);
            assert_eq!(zero_of("<T as Trait>::Option"), expected);
        }

        #[test]
        fn option() {
            assert_eq!(zero_of("Option<User>"),
                       quote!(::std::option::Option::None).to_string());
        }

        #[test]
        fn result() {
            assert_eq!(zero_of("Result<Option<u8>, E>"),
                quote!(::std::result::Result::Ok(::std::option::Option::None))
                .to_string());
            assert_eq!(zero_of("std::fmt::Result"),
                quote!(::std::result::Result::Ok(
                        ::std::default::Default::default()))
                .to_string());
        }

        #[test]
        fn tuples_are_elementwise() {
            assert_eq!(zero_of("()"), "()");
            assert_eq!(zero_of("(Option<u8>,)"),
                quote!((::std::option::Option::None,)).to_string());
        }

        #[test]
        fn pointers() {
            assert_eq!(zero_of("*const u8"),
                       quote!(::std::ptr::null()).to_string());
            assert_eq!(zero_of("*mut u8"),
                       quote!(::std::ptr::null_mut()).to_string());
        }

        #[test]
        fn arrays() {
            assert_eq!(zero_of("[Option<u8>; 4]"),
                quote!(::std::array::from_fn(|_| ::std::option::Option::None))
                .to_string());
        }
    }

    mod unassignable {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn assignable() {
            for s in ["u32", "String", "Vec<Option<User>>", "(u8, bool)",
                      "&'static str", "Box<u32>", "[u8; 3]", "*const u8",
                      "Result<(), io::Error>", "Result<u8, Box<dyn Error>>",
                      "anyhow::Result<Vec<u8>>"]
            {
                assert_eq!(unassignable(&ty(s)), None, "{}", s);
            }
        }

        #[test]
        fn unassignable_types() {
            for s in ["&str", "&'a User", "impl Iterator<Item = u8>",
                      "dyn Fn()", "!", "_", "Self", "Option<Self>",
                      "Self::Item", "[u8]", "fn(u8) -> u8", "Cow<'a, str>",
                      "(u8, &str)", "m!()"]
            {
                assert!(unassignable(&ty(s)).is_some(), "{}", s);
            }
        }
    }

    mod build {
        use super::*;

        #[test]
        fn associated_function() {
            let e = build("fn new() -> u32;").err().unwrap();
            assert!(e.to_string().starts_with("cannot generate Foo::new:"),
                    "{}", e);
        }

        #[test]
        fn async_method() {
            assert!(build("async fn foo(&self);").is_err());
        }

        #[test]
        fn generic_method() {
            assert!(build("fn foo<T: Debug>(&self, t: T);").is_err());
            assert!(build("fn foo<const N: usize>(&self);").is_err());
        }

        #[test]
        fn lifetime_generics_are_allowed() {
            assert!(build("fn foo<'a>(&'a self, x: &'a str) -> u32;").is_ok());
        }

        #[test]
        fn borrowed_result() {
            let e = build("fn name(&self) -> &str;").err().unwrap();
            assert!(e.to_string().contains("result 0"), "{}", e);
        }

        #[test]
        fn bad_parameters() {
            assert!(build("fn foo(&self, x: impl Debug);").is_err());
            assert!(build("fn foo(&self, x: &dyn Debug);").is_err());
            assert!(build("fn foo(&self, x: Cow<'a, str>);").is_err());
            assert!(build("fn foo(&self, x: &Self);").is_err());
        }
    }

    mod emit {
        use super::*;

        #[test]
        fn no_results() {
            cmp(emit("fn ping(&self);"), r#"
                #[track_caller]
                fn ping(&self) {
                    self.substitute.dispatch("ping", ::understudy::args![]);
                }
            "#);
        }

        #[test]
        fn one_result() {
            cmp(emit("fn save(&mut self, user: User, force: bool) -> Option<u64>;"), r#"
                #[track_caller]
                fn save(&mut self, user: User, force: bool) -> Option<u64> {
                    let mut returns = self.substitute.dispatch("save",
                        ::understudy::args![user, force]);
                    returns.take::<Option<u64> >(0)
                        .unwrap_or_else(|| ::std::option::Option::None)
                }
            "#);
        }

        #[test]
        fn borrowed_parameters_become_owned() {
            cmp(emit("fn find(&self, id: &str) -> u8;"), r#"
                #[track_caller]
                fn find(&self, id: &str) -> u8 {
                    let mut returns = self.substitute.dispatch("find",
                        ::understudy::args![
                            ::std::borrow::ToOwned::to_owned(&*id)
                        ]);
                    returns.take::<u8>(0)
                        .unwrap_or_else(|| ::std::default::Default::default())
                }
            "#);
        }

        #[test]
        fn tuple_results_are_positional() {
            cmp(emit("fn pair(&self) -> (u8, Option<String>);"), r#"
                #[track_caller]
                fn pair(&self) -> (u8, Option<String>) {
                    let mut returns = self.substitute.dispatch("pair",
                        ::understudy::args![]);
                    (
                        returns.take::<u8>(0)
                            .unwrap_or_else(|| ::std::default::Default::default()),
                        returns.take::<Option<String> >(1)
                            .unwrap_or_else(|| ::std::option::Option::None),
                    )
                }
            "#);
        }

        /// io::Error isn't Clone, so results are moved out
        #[test]
        fn result_that_cannot_be_cloned() {
            cmp(emit("fn load(&self, path: String) -> Result<u8, io::Error>;"),
                r#"
                #[track_caller]
                fn load(&self, path: String) -> Result<u8, io::Error> {
                    let mut returns = self.substitute.dispatch("load",
                        ::understudy::args![path]);
                    returns.take::<Result<u8, io::Error> >(0)
                        .unwrap_or_else(|| ::std::result::Result::Ok(
                            ::std::default::Default::default()))
                }
            "#);
        }

        #[test]
        fn unsafe_method_by_value() {
            cmp(emit("unsafe fn consume(self, n: u32);"), r#"
                #[track_caller]
                unsafe fn consume(self, n: u32) {
                    self.substitute.dispatch("consume", ::understudy::args![n]);
                }
            "#);
        }
    }
}
