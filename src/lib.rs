//! Siamese — a backward-chaining inference engine
//!
//! Siamese evaluates goals against an in-memory knowledge base of facts and
//! Horn-clause rules, producing a lazy asynchronous stream of
//! variable-binding solutions. Built-in predicates are pluggable and may
//! suspend on I/O (`http_get_json` does), so inference interleaves cleanly
//! with the host's async scheduler: the resolver only advances when the
//! consumer pulls, and dropping a solution stream cancels the search.
//!
//! ```
//! use futures_util::StreamExt;
//! use siamese::{goal, Engine, QueryOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let mut engine = Engine::new();
//! engine.add_fact("parent", ["david", "john"])?;
//! engine.add_fact("parent", ["john", "mary"])?;
//! engine.add_rule(
//!     goal!("grandparent", "?A", "?C"),
//!     vec![goal!("parent", "?A", "?P"), goal!("parent", "?P", "?C")],
//! )?;
//!
//! let mut solutions = engine.query(goal!("grandparent", "david", "?GC"), QueryOptions::default());
//! while let Some(solution) = solutions.next().await {
//!     let solution = solution?;
//!     println!("grandchild: {}", solution["?GC"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bindings;
pub mod builtin;
pub mod dsl;
pub mod engine;
pub mod error;
pub mod knowledge;
pub mod resolve;
pub mod stream;
pub mod syntax;
pub mod term;
pub mod trace;
pub mod unify;

pub use bindings::Bindings;
pub use builtin::{Builtin, BuiltinRegistry};
pub use engine::{Answers, Engine, EngineBuilder, QueryOptions, Solution, DEFAULT_MAX_DEPTH};
pub use error::{BuiltinError, KnowledgeError, QueryError, QueryResult};
pub use knowledge::{Clause, KnowledgeBase};
pub use resolve::{solve, ResolveContext, Resolver};
pub use stream::{SolutionStream, Solutions};
pub use syntax::{KnowledgeFile, RuleSyntax, TermSyntax};
pub use term::{Compound, Goal, Number, Term};
pub use trace::{LogTrace, NullTrace, TraceEvent, TraceSink};
pub use unify::unify;

/// Re-export of commonly used types.
pub mod prelude {
    pub use crate::bindings::Bindings;
    pub use crate::builtin::{Builtin, BuiltinRegistry};
    pub use crate::engine::{Engine, QueryOptions, Solution};
    pub use crate::error::{KnowledgeError, QueryError, QueryResult};
    pub use crate::knowledge::{Clause, KnowledgeBase};
    pub use crate::stream::{SolutionStream, Solutions};
    pub use crate::term::{Compound, Goal, Term};
    pub use crate::unify::unify;
}
