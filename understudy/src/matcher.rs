// vim: tw=80
//! Argument matching
//!
//! An expectation's argument specification is a list of [`Slot`]s, one per
//! positional argument.  A slot either accepts any value ([`ANY`]) or accepts
//! only values of the same concrete type that compare equal with
//! `PartialEq`.

use downcast::{downcast, Any};
use predicates::{
    prelude::Predicate,
    reflection::{Case, PredicateReflection, Product}
};
use predicates_tree::CaseTreeExt;
use std::fmt::{self, Debug, Display};

/// A value that can be observed in a dispatched call.
///
/// Implemented for every `'static` type that is `Debug` and `PartialEq`.
/// Values of different concrete types never compare equal, so `"abc"` (a
/// `&'static str`) does not match `String::from("abc")`.
pub trait Argument: Any + Debug {
    /// Is `other` a value of the same type, equal to `self`?
    fn eq_argument(&self, other: &dyn Argument) -> bool;
}
downcast!(dyn Argument);

impl<T: Any + Debug + PartialEq> Argument for T {
    fn eq_argument(&self, other: &dyn Argument) -> bool {
        match other.downcast_ref::<T>() {
            Ok(other) => self == other,
            Err(_) => false
        }
    }
}

/// Marker that matches any value in its position, of any type.
///
/// Use the [`ANY`] constant rather than constructing it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Wildcard;

/// The wildcard.  See [`Wildcard`].
pub const ANY: Wildcard = Wildcard;

impl Display for Wildcard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ANY")
    }
}

/// One position of an argument specification.
pub enum Slot {
    /// Accept anything
    Any,
    /// Accept a value of the same type that compares equal
    Eq(Box<dyn Argument>)
}

impl Slot {
    /// Build a slot from an expected value.
    ///
    /// [`ANY`] is recognized by its type, not by its value, and becomes
    /// [`Slot::Any`].  Everything else becomes [`Slot::Eq`].
    pub fn new<T: Argument>(value: T) -> Self {
        let boxed: Box<dyn Argument> = Box::new(value);
        if boxed.is::<Wildcard>() {
            Slot::Any
        } else {
            Slot::Eq(boxed)
        }
    }

    /// Does this slot accept every argument?
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Slot::Any)
    }
}

impl Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Any => Display::fmt(&ANY, f),
            Slot::Eq(v) => Debug::fmt(v, f)
        }
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Any => f.write_str("any value"),
            Slot::Eq(v) => write!(f, "var == {v:?}")
        }
    }
}

impl PredicateReflection for Slot {}

impl Predicate<dyn Argument> for Slot {
    fn eval(&self, variable: &dyn Argument) -> bool {
        match self {
            Slot::Any => true,
            Slot::Eq(expected) => expected.eq_argument(variable)
        }
    }

    fn find_case<'a>(&'a self, expected: bool, variable: &dyn Argument)
        -> Option<Case<'a>>
    {
        let actual = self.eval(variable);
        if actual == expected {
            let case = Case::new(Some(self as &dyn PredicateReflection), actual)
                .add_product(Product::new("var", format!("{variable:?}")));
            Some(case)
        } else {
            None
        }
    }
}

/// Decides whether an argument specification accepts an observed argument
/// list.
///
/// Matching has no side effects.  The lists must have the same length and
/// every position must accept; there are no partial matches.
#[derive(Debug, Default)]
pub struct Matcher(Vec<Slot>);

impl Matcher {
    /// A matcher that accepts exactly one argument per slot.
    pub fn new(slots: Vec<Slot>) -> Self {
        Matcher(slots)
    }

    /// The slots, in argument order
    pub fn slots(&self) -> &[Slot] {
        &self.0
    }

    /// Does every position of `args` satisfy its slot?
    pub fn matches(&self, args: &[&dyn Argument]) -> bool {
        self.0.len() == args.len() &&
            self.0.iter()
                .zip(args.iter())
                .all(|(slot, arg)| slot.eval(*arg))
    }

    /// Describe why `args` are rejected, or `None` if they match.
    ///
    /// Only the first rejecting position is described.
    pub fn explain(&self, args: &[&dyn Argument]) -> Option<String> {
        if self.0.len() != args.len() {
            return Some(format!("expected {} arguments, got {}",
                                self.0.len(), args.len()));
        }
        self.0.iter()
            .zip(args.iter())
            .enumerate()
            .find_map(|(i, (slot, arg))| {
                slot.find_case(false, *arg)
                    .map(|case| format!("argument {}: {}", i, case.tree()))
            })
    }
}

impl Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, slot) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            Debug::fmt(slot, f)?;
        }
        f.write_str(")")
    }
}
