//! Built-in predicate protocol and registry
//!
//! A built-in is an external predicate: when the resolver meets a goal whose
//! name is registered here, it hands the goal to the handler instead of the
//! knowledge base, and splices the handler's stream of binding extensions
//! back into the resolution stream. Handlers may suspend on I/O — the
//! network built-ins do — which is what makes the whole engine cooperative.
//!
//! A handler that has no solutions returns an empty stream; yielding an
//! `Err` is fatal to the query. Registered names shadow knowledge base
//! clauses of the same name.

pub mod collection;
pub mod compare;
pub mod http;
pub mod json;
pub mod logic;

use std::collections::HashMap;
use std::sync::Arc;

use crate::bindings::Bindings;
use crate::error::{BuiltinError, QueryError, QueryResult};
use crate::resolve::Resolver;
use crate::stream::Solutions;
use crate::term::Goal;

/// An external predicate handler.
///
/// `apply` receives the goal with its arguments shallowly walked, the
/// current substitution, and a [`Resolver`] handle for handlers that need to
/// re-enter resolution (disjunction does). It returns a lazy, possibly
/// asynchronous stream of extended substitutions.
pub trait Builtin: Send + Sync {
    /// Produces the binding extensions under which the goal holds.
    fn apply(&self, goal: &Goal, bindings: &Bindings, resolver: &Resolver) -> Solutions;
}

/// Plain functions and closures with the right shape are handlers.
impl<F> Builtin for F
where
    F: Fn(&Goal, &Bindings, &Resolver) -> Solutions + Send + Sync,
{
    fn apply(&self, goal: &Goal, bindings: &Bindings, resolver: &Resolver) -> Solutions {
        self(goal, bindings, resolver)
    }
}

/// Checks the argument count a handler was invoked with. A mismatch is a
/// programming error in the calling rule, reported fatally rather than as a
/// silent failure.
pub fn expect_arity(name: &str, goal: &Goal, arity: usize) -> QueryResult<()> {
    if goal.arity() == arity {
        Ok(())
    } else {
        Err(QueryError::builtin(
            name,
            format!("expects {} arguments, got {}", arity, goal.arity()),
        ))
    }
}

/// Name-indexed collection of built-in handlers.
#[derive(Clone, Default)]
pub struct BuiltinRegistry {
    handlers: HashMap<String, Arc<dyn Builtin>>,
}

impl BuiltinRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the standard set: `eq`, `neq`, the numeric
    /// comparisons, `member`, `or`, `http_get_json` and `unify_json_path`.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.insert("eq", Arc::new(logic::Equality));
        registry.insert("neq", Arc::new(logic::Disequality));
        registry.insert("or", Arc::new(logic::Disjunction));
        registry.insert("gt", Arc::new(compare::GreaterThan));
        registry.insert("gte", Arc::new(compare::GreaterOrEqual));
        registry.insert("lt", Arc::new(compare::LessThan));
        registry.insert("lte", Arc::new(compare::LessOrEqual));
        registry.insert("member", Arc::new(collection::Member));
        registry.insert("http_get_json", Arc::new(http::HttpGetJson::default()));
        registry.insert("unify_json_path", Arc::new(json::JsonPath));
        registry
    }

    fn insert(&mut self, name: &str, handler: Arc<dyn Builtin>) {
        self.handlers.insert(name.to_string(), handler);
    }

    /// Registers a handler under a new name. Registering a name twice is a
    /// configuration error; overriding a standard built-in goes through
    /// [`BuiltinRegistry::replace`] so the intent is explicit.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: Arc<dyn Builtin>,
    ) -> Result<(), BuiltinError> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(BuiltinError::Duplicate { name });
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Replaces or installs a handler unconditionally.
    pub fn replace(&mut self, name: impl Into<String>, handler: Arc<dyn Builtin>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Handler registered under `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Builtin>> {
        self.handlers.get(name).cloned()
    }

    /// True if `name` dispatches to a built-in.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

impl std::fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("BuiltinRegistry").field("names", &names).finish()
    }
}
