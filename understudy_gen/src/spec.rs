// vim: tw=80
//! The assertion spec mini-language
//!
//! One line describes one assertion function:
//! ```text
//! name:params:condition:defaultMessage
//! ```
//! Only the first three colons delimit fields, so the message may contain
//! colons of its own.  The condition may not, which rules out paths like
//! `str::len`; use method syntax instead.
//!
//! Parameters are written without colons, as `name Type` pairs separated by
//! commas: `value i32, s &str`.

use proc_macro2::TokenStream;
use quote::quote;
use std::{fmt, str::FromStr};
use syn::{Ident, Type};

use crate::error::{Error, Result};

/// Parameter names used by every generated assertion function.
const RESERVED: [&str; 2] = ["reporter", "message"];

/// One parsed assertion spec line.  All fields are trimmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionSpec {
    name: String,
    params: String,
    condition: String,
    message: String
}

impl AssertionSpec {
    pub fn parse(line: &str) -> Result<Self> {
        line.parse()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameter declarations, as written
    pub fn params(&self) -> &str {
        &self.params
    }

    /// The condition expression, as written
    pub fn condition(&self) -> &str {
        &self.condition
    }

    /// The default failure message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The parameter list rewritten as Rust `name: Type` declarations.
    pub(crate) fn param_decls(&self) -> Result<Vec<TokenStream>> {
        split_params(&self.params)
            .into_iter()
            .map(|entry| self.param_decl(entry))
            .collect()
    }

    fn param_decl(&self, entry: &str) -> Result<TokenStream> {
        let (name, ty) = entry.split_once(char::is_whitespace)
            .ok_or_else(|| self.error(
                format!("parameter {entry:?} needs a name and a type")))?;
        let name = syn::parse_str::<Ident>(name)
            .map_err(|_| self.error(
                format!("{name:?} is not a valid parameter name")))?;
        if RESERVED.iter().any(|r| name == r) {
            return Err(self.error(format!("parameter name {name} is reserved")));
        }
        let ty = syn::parse_str::<Type>(ty.trim())
            .map_err(|e| self.error(format!("bad type for {name}: {e}")))?;
        Ok(quote!(#name: #ty))
    }

    /// The condition, lexed into tokens.
    pub(crate) fn condition_tokens(&self) -> Result<TokenStream> {
        TokenStream::from_str(&self.condition)
            .map_err(|e| self.error(format!("bad condition: {e}")))
    }

    pub(crate) fn error(&self, reason: impl Into<String>) -> Error {
        Error::format(&self.to_string(), reason)
    }
}

impl FromStr for AssertionSpec {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let fields = line.splitn(4, ':')
            .map(str::trim)
            .collect::<Vec<_>>();
        let [name, params, condition, message] = fields[..] else {
            return Err(Error::format(line, format!(
                "expected 4 colon-separated fields, found {}", fields.len())));
        };
        if name.is_empty() {
            return Err(Error::format(line, "missing name"));
        }
        if syn::parse_str::<Ident>(name).is_err() {
            return Err(Error::format(line,
                format!("{name:?} is not a valid identifier")));
        }
        if condition.is_empty() {
            return Err(Error::format(line, "missing condition"));
        }
        Ok(AssertionSpec {
            name: name.to_owned(),
            params: params.to_owned(),
            condition: condition.to_owned(),
            message: message.to_owned()
        })
    }
}

impl fmt::Display for AssertionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.name, self.params, self.condition,
               self.message)
    }
}

/// Split on commas that aren't nested inside `<>`, `()` or `[]`.
fn split_params(params: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    let mut prev = '\0';
    for (i, c) in params.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            // The '>' of "->" doesn't close anything
            '>' if prev != '-' => depth -= 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                entries.push(&params[start..i]);
                start = i + 1;
            },
            _ => ()
        }
        prev = c;
    }
    entries.push(&params[start..]);
    entries.into_iter()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod t {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decls(spec: &AssertionSpec) -> Vec<String> {
        spec.param_decls()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn parse() {
        let spec = AssertionSpec::parse(
            "IsPositive:value i32:value > 0:expected positive value").unwrap();
        assert_eq!(spec.name(), "IsPositive");
        assert_eq!(spec.params(), "value i32");
        assert_eq!(spec.condition(), "value > 0");
        assert_eq!(spec.message(), "expected positive value");
    }

    #[test]
    fn fields_are_trimmed() {
        let spec: AssertionSpec =
            "  IsEmpty : s &str : s.is_empty() :  expected empty string "
            .parse().unwrap();
        assert_eq!(spec.name(), "IsEmpty");
        assert_eq!(spec.params(), "s &str");
        assert_eq!(spec.condition(), "s.is_empty()");
        assert_eq!(spec.message(), "expected empty string");
    }

    #[test]
    fn message_keeps_extra_colons() {
        let spec = AssertionSpec::parse("IsOk:v u8:v < 10:bad: too big: 10+")
            .unwrap();
        assert_eq!(spec.message(), "bad: too big: 10+");
    }

    #[test]
    fn too_few_fields() {
        let e = AssertionSpec::parse("invalid:spec").unwrap_err();
        assert_eq!(e.to_string(), "invalid assertion spec \"invalid:spec\": \
                   expected 4 colon-separated fields, found 2");
    }

    #[test]
    fn bad_names() {
        for line in [":v u8:v > 0:m", "9lives:v u8:v > 0:m", "fn:v u8:v > 0:m",
                     "is positive:v u8:v > 0:m"]
        {
            let e = AssertionSpec::parse(line).unwrap_err();
            assert!(matches!(e, Error::Format{..}), "{}: {:?}", line, e);
        }
    }

    #[test]
    fn empty_condition() {
        assert!(AssertionSpec::parse("IsOk:v u8: :m").is_err());
    }

    #[test]
    fn empty_params_and_message() {
        let spec = AssertionSpec::parse("Always::true:").unwrap();
        assert_eq!(spec.params(), "");
        assert_eq!(spec.message(), "");
        assert!(spec.param_decls().unwrap().is_empty());
    }

    #[test]
    fn param_decls() {
        let spec = AssertionSpec::parse(
            "InRange:v i64, range (i64, i64):v >= range.0 && v <= range.1:out")
            .unwrap();
        assert_eq!(decls(&spec), ["v : i64", "range : (i64 , i64)"]);
    }

    #[test]
    fn nested_commas_do_not_split() {
        let spec = AssertionSpec::parse(
            "HasKey:m HashMap<String, u32>, k &str, f fn(u8, u8) -> bool, \
             a [u8; 4]:m.contains_key(k):missing key").unwrap();
        assert_eq!(decls(&spec), [
            "m : HashMap < String , u32 >",
            "k : & str",
            "f : fn (u8 , u8) -> bool",
            "a : [u8 ; 4]"
        ]);
    }

    #[test]
    fn param_without_a_type() {
        let spec = AssertionSpec::parse("IsOk:value:value > 0:m").unwrap();
        let e = spec.param_decls().unwrap_err();
        assert!(e.to_string().contains("needs a name and a type"), "{}", e);
    }

    #[test]
    fn reserved_param_names() {
        let spec = AssertionSpec::parse("IsOk:message u8:message > 0:m")
            .unwrap();
        let e = spec.param_decls().unwrap_err();
        assert!(e.to_string().contains("reserved"), "{}", e);
    }

    #[test]
    fn condition_tokens() {
        let spec = AssertionSpec::parse("IsOk:v u8:v > 0:m").unwrap();
        assert_eq!(spec.condition_tokens().unwrap().to_string(), "v > 0");
        let spec = AssertionSpec::parse("IsOk:v &str:v == \"oops:m").unwrap();
        // The unterminated string swallowed the third colon
        assert_eq!(spec.condition(), "v == \"oops");
        assert!(spec.condition_tokens().is_err());
    }
}
