// vim: tw=80
//! Expectations and the values they return

use downcast::Any;
use std::{
    any,
    cell::{RefCell, RefMut},
    collections::HashMap,
    fmt,
    panic::Location,
    rc::Rc
};

use crate::{
    matcher::{Argument, Matcher, Slot},
    report::{Failure, Reporter}
};

/// A value that an expectation can hand back to every caller.
///
/// Implemented for every `'static` type that is `Clone`.  Each matching call
/// receives its own clone, so one expectation can answer any number of
/// calls.  Values that can't be cloned are configured with
/// [`return_once`](ExpectationBuilder::return_once) instead.
pub trait Returned: Any {
    /// A fresh copy for one caller
    fn clone_any(&self) -> Box<dyn any::Any>;
}

impl<T: Any + Clone> Returned for T {
    fn clone_any(&self) -> Box<dyn any::Any> {
        Box::new(self.clone())
    }
}

/// One configured result position.
enum Stored {
    /// Cloned for every matching call
    Each(Box<dyn Returned>),
    /// Moved out by the first matching call
    Once(Option<Box<dyn any::Any>>)
}

/// One registered expected invocation.
///
/// The method name and argument specification never change after
/// registration.  Only the owning [`Substitute`](crate::Substitute) changes
/// the satisfied flag and the call count.
pub struct Expectation {
    method: String,
    matcher: Matcher,
    results: Vec<Stored>,
    satisfied: bool,
    count: usize,
    /// Exact number of calls required, if any
    limit: Option<usize>
}

impl Expectation {
    fn new(method: String, slots: Vec<Slot>) -> Self {
        Expectation {
            method,
            matcher: Matcher::new(slots),
            results: Vec::new(),
            satisfied: false,
            count: 0,
            limit: None
        }
    }

    /// The method this expectation answers
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Decides which arguments this expectation accepts
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Has this expectation been matched at least once?
    pub fn is_satisfied(&self) -> bool {
        self.satisfied
    }

    /// How many calls has this expectation matched?
    pub fn count(&self) -> usize {
        self.count
    }

    /// The exact call count set by [`times`](ExpectationBuilder::times), if
    /// any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    fn matches(&self, method: &str, args: &[&dyn Argument]) -> bool {
        self.method == method && self.matcher.matches(args)
    }

    /// Has this expectation already been called as many times as it may be?
    fn is_saturated(&self) -> bool {
        self.limit.is_some_and(|n| self.count >= n)
    }

    fn call(&mut self) -> Vec<Option<Box<dyn any::Any>>> {
        self.satisfied = true;
        self.count += 1;
        self.results.iter_mut()
            .map(|r| match r {
                Stored::Each(value) => Some(value.clone_any()),
                Stored::Once(value) => value.take()
            }).collect()
    }

    /// What, if anything, is wrong with this expectation at verification
    /// time?
    fn failure(&self) -> Option<Failure> {
        let spec = self.matcher.to_string();
        if !self.satisfied && self.limit != Some(0) {
            Some(Failure::UnmetExpectation {
                method: self.method.clone(),
                spec
            })
        } else {
            match self.limit {
                Some(n) if n != self.count => Some(Failure::CallCount {
                    method: self.method.clone(),
                    spec,
                    expected: n,
                    actual: self.count
                }),
                _ => None
            }
        }
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("method", &self.method)
            .field("args", &self.matcher.slots())
            .field("results", &self.results.len())
            .field("satisfied", &self.satisfied)
            .field("count", &self.count)
            .field("limit", &self.limit)
            .finish()
    }
}

/// Every expectation of one substitute, plus per-method call counts.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    expectations: Vec<Expectation>,
    counts: HashMap<String, usize>,
    /// Bumped by every reset, so stale builders can be detected
    generation: u64
}

/// Borrow the ledger for modification.
///
/// # Panics
///
/// If the ledger is already borrowed, which only happens when a substitute
/// is used from inside
/// [`with_expectations`](crate::Substitute::with_expectations).
pub(crate) fn borrow_ledger(ledger: &RefCell<Ledger>) -> RefMut<'_, Ledger> {
    match ledger.try_borrow_mut() {
        Ok(ledger) => ledger,
        Err(_) => panic!("A Substitute can't be modified from inside \
                          with_expectations")
    }
}

impl Ledger {
    /// Add an expectation.  Returns the generation and index that identify
    /// it.
    pub(crate) fn register(&mut self, method: String, slots: Vec<Slot>)
        -> (u64, usize)
    {
        self.expectations.push(Expectation::new(method, slots));
        (self.generation, self.expectations.len() - 1)
    }

    /// Find the expectation that should answer this call.
    ///
    /// Expectations are checked in registration order.  A saturated
    /// expectation yields to a later matching one that still has room, but
    /// if every match is saturated the first one is used anyway.
    fn select(&self, method: &str, args: &[&dyn Argument]) -> Option<usize> {
        let mut first = None;
        for (i, e) in self.expectations.iter().enumerate() {
            if e.matches(method, args) {
                if !e.is_saturated() {
                    return Some(i);
                }
                first.get_or_insert(i);
            }
        }
        first
    }

    /// Record a call.  Returns `None` if no expectation matches.
    pub(crate) fn call(&mut self, method: &str, args: &[&dyn Argument])
        -> Option<Vec<Option<Box<dyn any::Any>>>>
    {
        let i = self.select(method, args)?;
        let results = self.expectations[i].call();
        *self.counts.entry(method.to_owned()).or_default() += 1;
        Some(results)
    }

    /// Explain why the first expectation named `method` rejected `args`.
    pub(crate) fn nearest(&self, method: &str, args: &[&dyn Argument])
        -> Option<String>
    {
        self.expectations.iter()
            .find(|e| e.method == method)
            .and_then(|e| e.matcher.explain(args))
    }

    pub(crate) fn failures(&self) -> Vec<Failure> {
        self.expectations.iter()
            .filter_map(Expectation::failure)
            .collect()
    }

    pub(crate) fn count(&self, method: &str) -> usize {
        self.counts.get(method).copied().unwrap_or(0)
    }

    pub(crate) fn expectations(&self) -> &[Expectation] {
        &self.expectations
    }

    pub(crate) fn clear(&mut self) {
        self.expectations.clear();
        self.counts.clear();
        self.generation += 1;
    }

    fn get_mut(&mut self, generation: u64, index: usize)
        -> Option<&mut Expectation>
    {
        if generation == self.generation {
            self.expectations.get_mut(index)
        } else {
            None
        }
    }
}

/// Fluent handle to a freshly registered [`Expectation`].
///
/// Every setter returns the same handle, so configuration can be chained:
/// ```
/// # use understudy::*;
/// let substitute = Substitute::new();
/// substitute.expect("find", params![42u64])
///     .return_const(Some(String::from("forty-two")))
///     .once();
/// # let _ = substitute.dispatch("find", args![42u64]);
/// ```
///
/// A builder belongs to the expectation it registered.  Using it after
/// [`reset`](crate::Substitute::reset) panics.
pub struct ExpectationBuilder<'s> {
    ledger: &'s RefCell<Ledger>,
    generation: u64,
    index: usize
}

impl<'s> ExpectationBuilder<'s> {
    pub(crate) fn new(ledger: &'s RefCell<Ledger>, id: (u64, usize)) -> Self {
        let (generation, index) = id;
        ExpectationBuilder{ledger, generation, index}
    }

    fn update<F: FnOnce(&mut Expectation)>(self, f: F) -> Self {
        let mut ledger = borrow_ledger(self.ledger);
        match ledger.get_mut(self.generation, self.index) {
            Some(e) => f(e),
            None => panic!("This expectation was discarded by \
                            Substitute::reset")
        }
        drop(ledger);
        self
    }

    /// Replace the values returned by every matching call.  See
    /// [`results!`](crate::results).
    pub fn returning(self, results: Vec<Box<dyn Returned>>) -> Self {
        self.update(|e| e.results = results.into_iter()
            .map(Stored::Each)
            .collect())
    }

    /// Return exactly one value from every matching call.
    pub fn return_const<T: Returned>(self, value: T) -> Self {
        self.returning(vec![Box::new(value) as Box<dyn Returned>])
    }

    /// Return `value` from a single matching call.
    ///
    /// Unlike [`return_const`](Self::return_const), `value` need not be
    /// `Clone`.  It is moved out by the first matching call, so this also
    /// implies [`once`](Self::once).  Later calls get no result, and
    /// [`verify`](crate::Substitute::verify) reports the extra calls.
    /// ```
    /// # use understudy::*;
    /// # use std::io;
    /// let substitute = Substitute::new();
    /// substitute.expect("open", params![])
    ///     .return_once(Err::<u32, io::Error>(io::ErrorKind::NotFound.into()));
    /// let mut returns = substitute.dispatch("open", args![]);
    /// let e = returns.take::<Result<u32, io::Error>>(0).unwrap().unwrap_err();
    /// assert_eq!(e.kind(), io::ErrorKind::NotFound);
    /// ```
    pub fn return_once<T: Any>(self, value: T) -> Self {
        let value = Box::new(value) as Box<dyn any::Any>;
        self.update(|e| e.results = vec![Stored::Once(Some(value))])
            .once()
    }

    /// Require exactly `n` matching calls.
    ///
    /// Checked by [`verify`](crate::Substitute::verify).
    pub fn times(self, n: usize) -> Self {
        self.update(|e| e.limit = Some(n))
    }

    /// Shortcut for [`times(1)`](#method.times).
    pub fn once(self) -> Self {
        self.times(1)
    }

    /// Forbid this expectation from ever being matched.
    pub fn never(self) -> Self {
        self.times(0)
    }
}

/// The values configured on the expectation that answered a call.
///
/// Empty when the call was unexpected.
pub struct Returns {
    method: String,
    values: Vec<Option<Box<dyn any::Any>>>,
    reporter: Rc<dyn Reporter>
}

impl Returns {
    pub(crate) fn new(method: &str, values: Vec<Option<Box<dyn any::Any>>>,
                      reporter: Rc<dyn Reporter>) -> Self
    {
        Returns{method: method.to_owned(), values, reporter}
    }

    /// A copy of the value in position `index`, converted to `T`.
    ///
    /// Returns `None` when there is no such position, or when it was already
    /// taken.  A value of some other type is reported as
    /// [`Failure::ResultType`] and also yields `None`, so the caller can
    /// substitute a zero value and continue.
    #[track_caller]
    pub fn get<T: Any + Clone>(&self, index: usize) -> Option<T> {
        let value = self.values.get(index)?.as_deref()?;
        match value.downcast_ref::<T>() {
            Some(v) => Some(v.clone()),
            None => {
                self.mismatch::<T>(index);
                None
            }
        }
    }

    /// Move the value in position `index` out, converted to `T`.
    ///
    /// Like [`get`](Self::get), but `T` need not be `Clone`.  A value that
    /// is taken can't be taken or read again.  A value of the wrong type is
    /// reported and dropped.
    #[track_caller]
    pub fn take<T: Any>(&mut self, index: usize) -> Option<T> {
        let value = self.values.get_mut(index)?.take()?;
        match value.downcast::<T>() {
            Ok(v) => Some(*v),
            Err(_) => {
                self.mismatch::<T>(index);
                None
            }
        }
    }

    #[track_caller]
    fn mismatch<T>(&self, index: usize) {
        let failure = Failure::ResultType {
            method: self.method.clone(),
            position: index,
            expected: any::type_name::<T>()
        };
        tracing::warn!(%failure);
        self.reporter.report(failure, Location::caller());
    }

    /// How many result positions the answering expectation configured
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Returns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Returns")
            .field("method", &self.method)
            .field("len", &self.values.len())
            .finish()
    }
}
