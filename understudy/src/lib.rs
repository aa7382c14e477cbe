// vim: tw=80
//! A test-double runtime for Rust.
//!
//! Understudy lets a test register expected calls on a [`Substitute`],
//! dispatch real calls against those expectations, and verify afterwards that
//! every expectation was exercised.  Mock types, whether written by hand or
//! emitted by `understudy-gen`, hold a reference to a `Substitute` and route
//! every trait method through [`Substitute::dispatch`].
//!
//! # Getting started
//! ```
//! use understudy::*;
//!
//! trait UserRepository {
//!     fn find_by_id(&self, id: &str) -> Option<String>;
//! }
//!
//! // This is what `understudy-gen` emits for the trait above.
//! struct MockUserRepository<'a> {
//!     substitute: &'a Substitute,
//! }
//!
//! impl<'a> UserRepository for MockUserRepository<'a> {
//!     #[track_caller]
//!     fn find_by_id(&self, id: &str) -> Option<String> {
//!         let mut returns = self.substitute
//!             .dispatch("find_by_id", args![id.to_owned()]);
//!         returns.take::<Option<String>>(0).unwrap_or_else(|| None)
//!     }
//! }
//!
//! let substitute = Substitute::new();
//! let repo = MockUserRepository { substitute: &substitute };
//! substitute.expect("find_by_id", params![String::from("123")])
//!     .return_const(Some(String::from("Alice")));
//!
//! assert_eq!(repo.find_by_id("123").as_deref(), Some("Alice"));
//! assert_eq!(substitute.call_count("find_by_id"), 1);
//! assert_eq!(substitute.verify(), 0);
//! ```
//!
//! # Matching
//!
//! Expectations are checked in the order they were registered, and the first
//! one whose method name and arguments match answers the call.  Register the
//! more specific expectation first when two could match.  Each argument
//! position either compares equal with `PartialEq` (values of different types
//! never match) or is the wildcard [`ANY`], which matches anything.
//!
//! # Call counts
//!
//! By default an expectation only needs to be matched at least once.
//! [`times`](ExpectationBuilder::times), [`once`](ExpectationBuilder::once)
//! and [`never`](ExpectationBuilder::never) demand an exact count, which
//! [`verify`](Substitute::verify) enforces.  An expectation that has used up
//! its count yields to a later expectation that also matches, which allows
//! sequences like "return 1, then return 2":
//! ```
//! # use understudy::*;
//! let substitute = Substitute::new();
//! substitute.expect("next", params![]).return_const(1u32).once();
//! substitute.expect("next", params![]).return_const(2u32).once();
//! assert_eq!(substitute.dispatch("next", args![]).get::<u32>(0), Some(1));
//! assert_eq!(substitute.dispatch("next", args![]).get::<u32>(0), Some(2));
//! assert_eq!(substitute.verify(), 0);
//! ```
//!
//! # Failures
//!
//! Unexpected calls and unmet expectations are reported to a [`Reporter`]
//! instead of panicking on the spot.  The default [`Recorder`] collects them
//! and panics when it is dropped at the end of the test, listing every
//! failure at once.
//!
//! A `Substitute` is deliberately neither `Send` nor `Sync`.  Use one per
//! test.

use std::{
    cell::RefCell,
    fmt,
    panic::Location,
    rc::Rc
};
use tracing::{debug, trace, warn};

mod expectation;
mod matcher;
mod report;

pub use crate::expectation::{
    Expectation,
    ExpectationBuilder,
    Returned,
    Returns
};
pub use crate::matcher::{ANY, Argument, Matcher, Slot, Wildcard};
pub use crate::report::{Failure, Recorded, Recorder, Reporter};

use crate::expectation::{Ledger, borrow_ledger};

/// Everything a test module usually needs.
pub mod prelude {
    pub use crate::{
        ANY,
        Failure,
        Recorder,
        Reporter,
        Substitute,
        args,
        params,
        results
    };
}

/// Build an argument specification for [`Substitute::expect`].
///
/// Each element is any `Debug + PartialEq` value, or [`ANY`].
/// ```
/// # use understudy::*;
/// let spec = params![42u32, ANY, String::from("name")];
/// assert_eq!(spec.len(), 3);
/// assert!(spec[1].is_wildcard());
/// ```
#[macro_export]
macro_rules! params {
    ($($value:expr),* $(,)?) => {
        ::std::vec![$($crate::Slot::new($value)),*]
    };
}

/// Build the observed argument list for [`Substitute::dispatch`].
#[macro_export]
macro_rules! args {
    ($($value:expr),* $(,)?) => {
        &[$(&$value as &dyn $crate::Argument),*]
    };
}

/// Build a list of result values for
/// [`returning`](ExpectationBuilder::returning).
#[macro_export]
macro_rules! results {
    ($($value:expr),* $(,)?) => {
        ::std::vec![
            $(::std::boxed::Box::new($value)
                as ::std::boxed::Box<dyn $crate::Returned>),*
        ]
    };
}

/// The substitute object: records expectations, answers calls, and reports
/// what went wrong.
pub struct Substitute {
    ledger: RefCell<Ledger>,
    reporter: Rc<dyn Reporter>
}

impl Substitute {
    /// Create a substitute that reports to a fresh [`Recorder`].
    pub fn new() -> Self {
        Self::with_reporter(Rc::new(Recorder::new()))
    }

    /// Create a substitute that reports to `reporter`.
    pub fn with_reporter(reporter: Rc<dyn Reporter>) -> Self {
        Substitute {
            ledger: RefCell::new(Ledger::default()),
            reporter
        }
    }

    /// Where this substitute sends its failures
    pub fn reporter(&self) -> &Rc<dyn Reporter> {
        &self.reporter
    }

    /// Register a new expectation for `method` and return a handle for
    /// configuring it.
    ///
    /// # Panics
    ///
    /// If `method` is empty.
    pub fn expect<S: Into<String>>(&self, method: S, args: Vec<Slot>)
        -> ExpectationBuilder<'_>
    {
        let method = method.into();
        assert!(!method.is_empty(), "Expectations need a method name");
        debug!(method = %method, arity = args.len(), "registered expectation");
        let id = borrow_ledger(&self.ledger).register(method, args);
        ExpectationBuilder::new(&self.ledger, id)
    }

    /// Answer a call to `method` with `args`.
    ///
    /// The first matching expectation, in registration order, is marked
    /// satisfied and its results are returned.  If none matches,
    /// [`Failure::UnexpectedCall`] is reported and the returned value is
    /// empty.
    #[track_caller]
    pub fn dispatch(&self, method: &str, args: &[&dyn Argument]) -> Returns {
        let location = Location::caller();
        let outcome = borrow_ledger(&self.ledger).call(method, args);
        match outcome {
            Some(values) => {
                trace!(method, "matched expectation");
                Returns::new(method, values, self.reporter.clone())
            },
            None => {
                let nearest = self.ledger.borrow().nearest(method, args);
                let failure = Failure::UnexpectedCall {
                    method: method.to_owned(),
                    args: args.iter().map(|a| format!("{a:?}")).collect(),
                    nearest
                };
                warn!(%failure);
                self.reporter.report(failure, location);
                Returns::new(method, Vec::new(), self.reporter.clone())
            }
        }
    }

    /// Report every expectation that was never matched, or that was matched
    /// a different number of times than it demanded.
    ///
    /// All problems are reported, not just the first.  Returns how many
    /// there were.
    #[track_caller]
    pub fn verify(&self) -> usize {
        let location = Location::caller();
        let failures = self.ledger.borrow().failures();
        for failure in failures.iter() {
            warn!(%failure);
            self.reporter.report(failure.clone(), location);
        }
        failures.len()
    }

    /// How many dispatched calls to `method` matched an expectation.
    pub fn call_count(&self, method: &str) -> usize {
        self.ledger.borrow().count(method)
    }

    /// Forget every expectation and call count.
    ///
    /// Builders returned by earlier calls to [`expect`](Self::expect) must
    /// not be used afterwards.
    pub fn reset(&self) {
        borrow_ledger(&self.ledger).clear();
    }

    /// Inspect the registered expectations.
    ///
    /// # Panics
    ///
    /// If `f` registers, dispatches, resets, or configures an expectation on
    /// this substitute.  Read what you need inside `f` and act on it
    /// afterwards.
    pub fn with_expectations<F, T>(&self, f: F) -> T
        where F: FnOnce(&[Expectation]) -> T
    {
        f(self.ledger.borrow().expectations())
    }

    /// How many expectations are registered?
    pub fn len(&self) -> usize {
        self.with_expectations(<[Expectation]>::len)
    }

    /// Are there no registered expectations?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Substitute {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Substitute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substitute")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Substitute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Substitute with {} expected calls", self.len())
    }
}
