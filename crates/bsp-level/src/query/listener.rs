//! Receivers for query results.
//!
//! Queries push each result into a listener as soon as it is found, so a
//! listener can stop a query early without the query knowing what it is
//! looking for.

use std::ops::ControlFlow;

/// Receiver of results of type `R`.
///
/// Implement this trait to define what happens with each result. Returning
/// [`ControlFlow::Break`] abandons the rest of the query.
pub trait QueryListener<R> {
    fn on_result(&mut self, result: R) -> ControlFlow<()>;
}

/// A listener that keeps every result.
#[derive(Debug)]
pub struct CollectingListener<R> {
    collected: Vec<R>,
}

impl<R> Default for CollectingListener<R> {
    fn default() -> Self {
        Self {
            collected: Vec::new(),
        }
    }
}

impl<R> CollectingListener<R> {
    /// Creates a new empty collecting listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected results.
    pub fn into_results(self) -> Vec<R> {
        self.collected
    }

    /// Returns a reference to the collected results.
    pub fn results(&self) -> &[R] {
        &self.collected
    }
}

impl<R> QueryListener<R> for CollectingListener<R> {
    fn on_result(&mut self, result: R) -> ControlFlow<()> {
        self.collected.push(result);
        ControlFlow::Continue(())
    }
}

/// A listener that calls a closure for each result.
pub struct FnListener<F> {
    func: F,
}

impl<F> FnListener<F> {
    /// Creates a new listener from a closure.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<R, F> QueryListener<R> for FnListener<F>
where
    F: FnMut(R) -> ControlFlow<()>,
{
    fn on_result(&mut self, result: R) -> ControlFlow<()> {
        (self.func)(result)
    }
}
