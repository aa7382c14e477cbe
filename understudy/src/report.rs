// vim: tw=80
//! The failure reporting channel
//!
//! A [`Substitute`](crate::Substitute) never panics on its own account.  It
//! reports every unexpected call and unmet expectation to a [`Reporter`] and
//! carries on, so that a single test run surfaces every problem.

use std::{
    cell::RefCell,
    fmt,
    panic::Location,
    thread
};
use thiserror::Error;

/// Everything that can go wrong in a test using a substitute.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Failure {
    /// A dispatched call matched no registered expectation.
    #[error("Unexpected call to {method}({}){}", .args.join(", "),
            nearest_note(.nearest))]
    UnexpectedCall {
        method: String,
        /// `Debug` rendering of each observed argument
        args: Vec<String>,
        /// Why the first expectation with the same method name rejected the
        /// call, if there is one
        nearest: Option<String>
    },
    /// An expectation was never matched.
    #[error("Expected call to {method}{spec} was not made")]
    UnmetExpectation {
        method: String,
        spec: String
    },
    /// An expectation with an exact call count was matched a different
    /// number of times.
    #[error("Expected {method}{spec} to be called {expected} times, but it was called {actual} times")]
    CallCount {
        method: String,
        spec: String,
        expected: usize,
        actual: usize
    },
    /// A configured result could not be converted to the declared type.
    #[error("Result {position} of {method} is not a {expected}")]
    ResultType {
        method: String,
        position: usize,
        expected: &'static str
    },
    /// A generated custom assertion did not hold.
    #[error("{message}")]
    Assertion {
        message: String
    }
}

fn nearest_note(nearest: &Option<String>) -> String {
    match nearest {
        Some(why) => format!("\n  nearest expectation rejected it: {why}"),
        None => String::new()
    }
}

/// Test-reporting handle.
///
/// Implementations record the failure and return; they must not unwind.
pub trait Reporter {
    fn report(&self, failure: Failure, location: &'static Location<'static>);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, failure: Failure, location: &'static Location<'static>) {
        (**self).report(failure, location)
    }
}

/// A [`Failure`] together with where it was reported from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recorded {
    pub failure: Failure,
    /// Where the failing call or verification happened
    pub location: &'static Location<'static>
}

impl fmt::Display for Recorded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.failure)
    }
}

/// The default [`Reporter`].
///
/// Failures are collected as they are reported.  When the `Recorder` is
/// dropped with failures still recorded, it panics with all of them, which
/// fails the enclosing test.  Tests that expect failures should drain them
/// with [`take_failures`](Recorder::take_failures).
#[derive(Debug, Default)]
pub struct Recorder {
    recorded: RefCell<Vec<Recorded>>
}

impl Recorder {
    /// A recorder with nothing recorded yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Every failure reported so far, in report order.
    pub fn failures(&self) -> Vec<Failure> {
        self.recorded.borrow()
            .iter()
            .map(|r| r.failure.clone())
            .collect()
    }

    /// Like [`failures`](Recorder::failures), with locations.
    pub fn recorded(&self) -> Vec<Recorded> {
        self.recorded.borrow().clone()
    }

    /// Remove and return every failure reported so far.
    pub fn take_failures(&self) -> Vec<Failure> {
        self.recorded.borrow_mut()
            .drain(..)
            .map(|r| r.failure)
            .collect()
    }

    /// Has nothing been reported, or has everything been taken?
    pub fn is_clean(&self) -> bool {
        self.recorded.borrow().is_empty()
    }
}

impl Reporter for Recorder {
    fn report(&self, failure: Failure, location: &'static Location<'static>) {
        self.recorded.borrow_mut().push(Recorded{failure, location});
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        let recorded = self.recorded.get_mut();
        if !thread::panicking() && !recorded.is_empty() {
            let lines = recorded.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            panic!("{} test failure(s):\n{}", recorded.len(), lines);
        }
    }
}
