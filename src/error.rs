//! Error types for the inference engine
//!
//! Three surfaces, matching the three places things can go wrong:
//! [`KnowledgeError`] for clause insertion and knowledge file loading,
//! [`BuiltinError`] for registry construction, and [`QueryError`] for fatal
//! failures inside a running query. Exhausted searches, depth cutoffs and
//! unknown predicates are not errors — they are empty streams.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while building the knowledge base.
///
/// `load_from_file` reports these before touching engine state, so a failed
/// load leaves the knowledge base exactly as it was.
#[derive(Error, Debug)]
pub enum KnowledgeError {
    /// A clause head (or fact) must be a tuple naming a predicate.
    #[error("clause head must be a non-empty tuple, got {found}")]
    InvalidHead {
        /// Rendering of the offending syntax node.
        found: String,
    },

    /// The first element of a tuple must be a predicate name, not a variable,
    /// number or nested tuple.
    #[error("predicate name must be an atom, got {found}")]
    InvalidPredicateName {
        /// Rendering of the offending syntax node.
        found: String,
    },

    /// Reading the knowledge file failed.
    #[error("failed to read knowledge file {path:?}")]
    Io {
        /// Path the engine attempted to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The knowledge file is not valid JSON for the expected shape.
    #[error("failed to parse knowledge file: {source}")]
    Parse {
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised while constructing an engine's built-in registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuiltinError {
    /// The same predicate name was registered twice.
    #[error("built-in {name:?} is already registered")]
    Duplicate {
        /// Offending predicate name.
        name: String,
    },
}

/// Fatal errors inside a running query.
///
/// These propagate through the solution stream as an `Err` item; the stream
/// is finished afterwards and all nested resolution frames are dropped. A
/// built-in that merely has no solutions produces an empty stream instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A built-in handler failed in a way that is not "no solution".
    #[error("built-in {name:?} failed: {message}")]
    Builtin {
        /// Name the handler was registered under.
        name: String,
        /// Handler-supplied description of the failure.
        message: String,
    },
}

impl QueryError {
    /// Convenience constructor for handler failures.
    pub fn builtin(name: impl Into<String>, message: impl Into<String>) -> Self {
        QueryError::Builtin {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result alias for query execution.
pub type QueryResult<T> = Result<T, QueryError>;
