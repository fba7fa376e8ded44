//! Solution stream types and constructors
//!
//! Resolution produces lazy asynchronous streams: nothing is computed until
//! the consumer pulls, and dropping a stream cancels every nested frame at
//! its next suspension point. [`Solutions`] is the boxed stream of binding
//! sets the resolver and built-in handlers exchange; [`SolutionStream`] adds
//! the collection helper the tests and embedders use.

use std::pin::Pin;

use futures_core::Stream;
use futures_util::TryStreamExt;

use crate::bindings::Bindings;
use crate::error::{QueryError, QueryResult};

/// Boxed lazy stream of substitutions.
///
/// An `Err` item is fatal: the stream is finished after yielding it.
pub type Solutions = Pin<Box<dyn Stream<Item = QueryResult<Bindings>> + Send>>;

/// Any stream of fallible query output, with a convenience collector.
pub trait SolutionStream<T: Send>: Stream<Item = Result<T, QueryError>> + Send {
    /// Collects every item into a `Vec`, propagating the first error.
    #[allow(async_fn_in_trait)]
    fn try_vec(self) -> impl std::future::Future<Output = Result<Vec<T>, QueryError>> + Send
    where
        Self: Sized,
    {
        async move { self.try_collect().await }
    }
}

impl<S, T: Send> SolutionStream<T> for S where S: Stream<Item = Result<T, QueryError>> + Send {}

/// Stream with no solutions — ordinary failure.
pub fn empty() -> Solutions {
    Box::pin(futures_util::stream::empty())
}

/// Stream with exactly one solution.
pub fn single(bindings: Bindings) -> Solutions {
    Box::pin(futures_util::stream::iter([Ok(bindings)]))
}

/// Stream over an already-computed sequence of results.
pub fn from_results<I>(results: I) -> Solutions
where
    I: IntoIterator<Item = QueryResult<Bindings>>,
    I::IntoIter: Send + 'static,
{
    Box::pin(futures_util::stream::iter(results))
}

/// Stream that fails fatally with the given error.
pub fn fault(error: QueryError) -> Solutions {
    Box::pin(futures_util::stream::iter([Err(error)]))
}
