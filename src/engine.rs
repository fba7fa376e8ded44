//! Engine facade: the embedding API
//!
//! An [`Engine`] owns the knowledge base, the built-in registry and the
//! trace sink. Queries take a snapshot of the knowledge base when they
//! start, so mutating the engine between queries is ordinary `&mut` code and
//! an in-flight query keeps seeing the state it started with; writers go
//! through copy-on-write and never block readers.
//!
//! Engines clone cheaply (the knowledge base is shared until the next
//! mutation), which is the intended way to run queries concurrently from
//! several tasks.

use std::collections::BTreeMap;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use futures_util::StreamExt;

use crate::bindings::Bindings;
use crate::builtin::{Builtin, BuiltinRegistry};
use crate::error::{BuiltinError, KnowledgeError, QueryResult};
use crate::knowledge::KnowledgeBase;
use crate::resolve::{solve, ResolveContext};
use crate::syntax::KnowledgeFile;
use crate::term::{Compound, Goal, Term};
use crate::trace::{LogTrace, TraceSink};

/// Default bound on rule-expansion depth.
pub const DEFAULT_MAX_DEPTH: usize = 25;

/// One solution projected back to the caller: the user's query variables
/// mapped to the terms they were bound to. Ordered so printing and
/// comparison are deterministic.
pub type Solution = BTreeMap<String, Term>;

/// Lazy stream of projected solutions.
pub type Answers = Pin<Box<dyn Stream<Item = QueryResult<Solution>> + Send>>;

/// Per-query knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Maximum rule-expansion depth; deeper branches prune silently.
    pub max_depth: usize,
    /// Cap on yielded solutions; `None` is unbounded.
    pub max_solutions: Option<usize>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            max_solutions: None,
        }
    }
}

impl QueryOptions {
    /// Options with a solution cap.
    pub fn max_solutions(limit: usize) -> Self {
        QueryOptions {
            max_solutions: Some(limit),
            ..Default::default()
        }
    }

    /// Options with a depth bound.
    pub fn max_depth(depth: usize) -> Self {
        QueryOptions {
            max_depth: depth,
            ..Default::default()
        }
    }
}

/// Backward-chaining inference engine.
#[derive(Clone)]
pub struct Engine {
    knowledge: Arc<KnowledgeBase>,
    builtins: Arc<BuiltinRegistry>,
    tracer: Arc<dyn TraceSink>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// Creates an engine with the standard built-ins and the `tracing`-backed
    /// trace sink.
    pub fn new() -> Self {
        Engine {
            knowledge: Arc::new(KnowledgeBase::new()),
            builtins: Arc::new(BuiltinRegistry::standard()),
            tracer: Arc::new(LogTrace),
        }
    }

    /// Starts configuring an engine with custom built-ins or tracing.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Number of clauses currently asserted.
    pub fn clause_count(&self) -> usize {
        self.knowledge.len()
    }

    /// Appends a fact. Arguments convert the usual way: `?`-strings become
    /// variables, other strings become atoms.
    pub fn add_fact<N, A, T>(&mut self, name: N, args: A) -> Result<(), KnowledgeError>
    where
        N: Into<String>,
        A: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        Arc::make_mut(&mut self.knowledge).assert_fact(Compound::new(name, args))
    }

    /// Appends a rule with the given head and body goals.
    pub fn add_rule(&mut self, head: Goal, body: Vec<Goal>) -> Result<(), KnowledgeError> {
        Arc::make_mut(&mut self.knowledge).assert_rule(head, body)
    }

    /// Loads a knowledge document (see [`crate::syntax`]) from a string,
    /// returning how many clauses were added. Parsing and validation run
    /// against a staging copy, so on error the engine is untouched.
    pub fn load_from_str(&mut self, text: &str) -> Result<usize, KnowledgeError> {
        let clauses = KnowledgeFile::parse(text)?.into_clauses()?;
        let mut staged = (*self.knowledge).clone();
        let count = clauses.len();
        for clause in clauses {
            staged.assert_clause(clause)?;
        }
        self.knowledge = Arc::new(staged);
        tracing::debug!(clauses = count, total = self.knowledge.len(), "knowledge loaded");
        Ok(count)
    }

    /// Loads a knowledge file from disk.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<usize, KnowledgeError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from_str(&text)
    }

    /// Runs a query, streaming solutions lazily.
    ///
    /// Each solution maps the variables that appear in `goal` to deep-walked
    /// terms; bindings a rule or built-in introduced internally are filtered
    /// out. Nothing is computed until the stream is polled, and dropping the
    /// stream cancels the search at its next suspension point.
    pub fn query(&self, goal: Goal, options: QueryOptions) -> Answers {
        tracing::debug!(goal = %goal, "query");
        let variables = Term::Compound(goal.clone()).variables();
        let context = Arc::new(ResolveContext::new(
            self.knowledge.clone(),
            self.builtins.clone(),
            options.max_depth,
            self.tracer.clone(),
        ));
        let solutions = solve(context, vec![goal], Bindings::new(), 0)
            .map(move |result| result.map(|bindings| bindings.project(&variables)));
        match options.max_solutions {
            Some(limit) => Box::pin(solutions.take(limit)),
            None => Box::pin(solutions),
        }
    }

    /// First solution, if any.
    pub async fn query_one(&self, goal: Goal, options: QueryOptions) -> QueryResult<Option<Solution>> {
        let mut solutions = self.query(goal, options);
        solutions.next().await.transpose()
    }

    /// True iff the goal has at least one solution.
    pub async fn exists(&self, goal: Goal) -> QueryResult<bool> {
        let found = self.query_one(goal, QueryOptions::default()).await?;
        Ok(found.is_some())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("clauses", &self.knowledge.len())
            .field("builtins", &self.builtins)
            .finish()
    }
}

/// Configures and constructs an [`Engine`].
///
/// User-supplied built-ins are resolved at `build()`: registering the same
/// name twice is a configuration error, while a single registration under a
/// standard name overrides that built-in.
#[derive(Default)]
pub struct EngineBuilder {
    builtins: Vec<(String, Arc<dyn Builtin>)>,
    tracer: Option<Arc<dyn TraceSink>>,
}

impl EngineBuilder {
    /// Registers (or, for a standard name, overrides) a built-in.
    pub fn with_builtin(
        mut self,
        name: impl Into<String>,
        handler: Arc<dyn Builtin>,
    ) -> Self {
        self.builtins.push((name.into(), handler));
        self
    }

    /// Installs a trace sink for resolution events.
    pub fn with_trace(mut self, tracer: Arc<dyn TraceSink>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Builds the engine, surfacing duplicate registrations.
    pub fn build(self) -> Result<Engine, BuiltinError> {
        let mut registry = BuiltinRegistry::standard();
        let mut seen = std::collections::HashSet::new();
        for (name, handler) in self.builtins {
            if !seen.insert(name.clone()) {
                return Err(BuiltinError::Duplicate { name });
            }
            registry.replace(name, handler);
        }
        Ok(Engine {
            knowledge: Arc::new(KnowledgeBase::new()),
            builtins: Arc::new(registry),
            tracer: self.tracer.unwrap_or_else(|| Arc::new(LogTrace)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::Resolver;
    use crate::stream::{self, SolutionStream};

    #[tokio::test]
    async fn test_projection_keeps_only_query_variables() -> anyhow::Result<()> {
        let mut engine = Engine::new();
        engine.add_fact("parent", ["david", "john"])?;
        engine.add_fact("parent", ["john", "mary"])?;
        engine.add_rule(
            Compound::new("grandparent", ["?A", "?C"]),
            vec![
                Compound::new("parent", ["?A", "?P"]),
                Compound::new("parent", ["?P", "?C"]),
            ],
        )?;

        let solutions = engine
            .query(
                Compound::new("grandparent", ["david", "?GC"]),
                QueryOptions::default(),
            )
            .try_vec()
            .await?;

        assert_eq!(solutions.len(), 1);
        // Only ?GC shows up — not ?P or any renamed internal variable.
        let keys: Vec<_> = solutions[0].keys().cloned().collect();
        assert_eq!(keys, vec!["?GC".to_string()]);
        assert_eq!(solutions[0].get("?GC"), Some(&Term::from("mary")));
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_load_leaves_engine_unchanged() -> anyhow::Result<()> {
        let mut engine = Engine::new();
        engine.add_fact("parent", ["a", "b"])?;

        // Second fact has a variable predicate name and must be rejected.
        let bad = r#"{"facts": [["ok", "x"], ["?Bad", "y"]]}"#;
        assert!(engine.load_from_str(bad).is_err());
        assert_eq!(engine.clause_count(), 1);

        let good = r#"{"facts": [["ok", "x"]]}"#;
        assert_eq!(engine.load_from_str(good)?, 1);
        assert_eq!(engine.clause_count(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_mutation_does_not_disturb_snapshots() -> anyhow::Result<()> {
        let mut engine = Engine::new();
        engine.add_fact("color", ["red"])?;

        // Take a lazy stream, then mutate the engine before polling it.
        let before = engine.query(Compound::new("color", ["?C"]), QueryOptions::default());
        engine.add_fact("color", ["blue"])?;

        let seen = before.try_vec().await?;
        assert_eq!(seen.len(), 1, "snapshot predates the second fact");

        let after = engine
            .query(Compound::new("color", ["?C"]), QueryOptions::default())
            .try_vec()
            .await?;
        assert_eq!(after.len(), 2);
        Ok(())
    }

    #[test]
    fn test_duplicate_builtin_registration_fails_at_build() {
        let handler: Arc<dyn Builtin> =
            Arc::new(|_: &Goal, bindings: &Bindings, _: &Resolver| {
                stream::single(bindings.clone())
            });

        let result = Engine::builder()
            .with_builtin("custom", handler.clone())
            .with_builtin("custom", handler)
            .build();
        assert!(matches!(result, Err(BuiltinError::Duplicate { name }) if name == "custom"));
    }

    #[tokio::test]
    async fn test_user_builtin_overrides_standard() -> anyhow::Result<()> {
        // Override `neq` with a handler that always succeeds.
        let handler: Arc<dyn Builtin> =
            Arc::new(|_: &Goal, bindings: &Bindings, _: &Resolver| {
                stream::single(bindings.clone())
            });
        let engine = Engine::builder().with_builtin("neq", handler).build()?;

        assert!(engine.exists(Compound::new("neq", ["x", "x"])).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_builtin_shadows_clauses() -> anyhow::Result<()> {
        let handler: Arc<dyn Builtin> = Arc::new(|_: &Goal, _: &Bindings, _: &Resolver| {
            stream::empty()
        });
        let mut engine = Engine::builder().with_builtin("special", handler).build()?;
        engine.add_fact("special", ["x"])?;

        // The clause never gets a chance: dispatch goes to the built-in.
        assert!(!engine.exists(Compound::new("special", ["x"])).await?);
        Ok(())
    }
}
