//! Backward-chaining resolution
//!
//! The resolver walks the goal list depth-first and left-to-right, producing
//! a lazy stream of substitutions. Each frame either matches the first goal
//! against a built-in handler or reduces it through the knowledge base's
//! clauses, renaming clause variables fresh on every use so that a recursive
//! rule can never capture its own variables.
//!
//! Everything is pull-driven: a frame only advances when the consumer asks
//! for the next solution, so a solution cap or a dropped stream stops the
//! whole search at its next suspension point.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_stream::try_stream;
use futures_util::TryStreamExt;
use std::collections::HashMap;

use crate::bindings::Bindings;
use crate::builtin::BuiltinRegistry;
use crate::knowledge::{Clause, KnowledgeBase};
use crate::stream::Solutions;
use crate::term::{Compound, Goal, Term, FRESH_MARKER};
use crate::trace::{TraceEvent, TraceSink};
use crate::unify::unify;

/// How many clause attempts may run back-to-back before the resolver yields
/// to the scheduler, keeping long bucket scans fair to sibling tasks.
const CLAUSE_YIELD_INTERVAL: usize = 32;

/// Per-query resolution state: the knowledge snapshot, the built-in
/// registry, the depth bound and the fresh-variable counter.
///
/// Each query owns its context, which is why independent queries can run
/// concurrently against one engine without locks.
pub struct ResolveContext {
    knowledge: Arc<KnowledgeBase>,
    builtins: Arc<BuiltinRegistry>,
    max_depth: usize,
    tracer: Arc<dyn TraceSink>,
    counter: AtomicU64,
}

impl ResolveContext {
    /// Creates the context for one query.
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        builtins: Arc<BuiltinRegistry>,
        max_depth: usize,
        tracer: Arc<dyn TraceSink>,
    ) -> Self {
        ResolveContext {
            knowledge,
            builtins,
            max_depth,
            tracer,
            counter: AtomicU64::new(0),
        }
    }

    /// Allocates a fresh variable name derived from `base`.
    ///
    /// The base's own freshness suffix is stripped first, so renaming an
    /// already-renamed clause does not stack markers: `?X` and `?X#3` both
    /// rename to `?X#k` for the next counter value `k`. User-supplied names
    /// never contain the marker, which keeps the generated namespace
    /// disjoint.
    fn fresh_name(&self, base: &str) -> String {
        let stem = match base.find(FRESH_MARKER) {
            Some(index) => &base[..index],
            None => base,
        };
        let serial = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}{}", stem, FRESH_MARKER, serial)
    }

    /// Renames every variable of a clause to a fresh one, consistently
    /// within this single use.
    fn rename_clause(&self, clause: &Clause) -> (Goal, Vec<Goal>) {
        let mut renames: HashMap<String, String> = HashMap::new();
        let head = self.rename_goal(&clause.head, &mut renames);
        let body = clause
            .body
            .iter()
            .map(|goal| self.rename_goal(goal, &mut renames))
            .collect();
        (head, body)
    }

    fn rename_goal(&self, goal: &Goal, renames: &mut HashMap<String, String>) -> Goal {
        Compound {
            name: goal.name.clone(),
            args: goal
                .args
                .iter()
                .map(|arg| self.rename_term(arg, renames))
                .collect(),
        }
    }

    fn rename_term(&self, term: &Term, renames: &mut HashMap<String, String>) -> Term {
        match term {
            Term::Var(name) => {
                let fresh = renames
                    .entry(name.clone())
                    .or_insert_with(|| self.fresh_name(name));
                Term::Var(fresh.clone())
            }
            Term::Compound(compound) => {
                Term::Compound(self.rename_goal(compound, &mut *renames))
            }
            other => other.clone(),
        }
    }

    fn trace(&self, event: impl FnOnce() -> TraceEvent) {
        if self.tracer.enabled() {
            self.tracer.emit(&event());
        }
    }
}

/// Handle a built-in handler receives to re-enter resolution.
///
/// It is bound to the invoking frame's context and depth: sub-goals resolved
/// through it (the `or` built-in does this) observe the same knowledge
/// snapshot, depth budget and fresh-variable counter, and built-in recursion
/// never increments the rule depth.
#[derive(Clone)]
pub struct Resolver {
    context: Arc<ResolveContext>,
    depth: usize,
}

impl Resolver {
    /// Creates a handle at the given depth. Mostly useful for exercising a
    /// built-in handler outside a full query.
    pub fn new(context: Arc<ResolveContext>, depth: usize) -> Self {
        Resolver { context, depth }
    }

    /// Resolves a goal list under the given bindings, at the depth of the
    /// frame that invoked the built-in.
    pub fn solve(&self, goals: Vec<Goal>, bindings: Bindings) -> Solutions {
        solve(self.context.clone(), goals, bindings, self.depth)
    }
}

/// Solves a conjunction of goals, streaming every substitution under which
/// all of them hold.
///
/// An empty goal list succeeds with the bindings as they stand. A frame
/// whose depth exceeds the bound prunes silently — the depth cutoff is a
/// search boundary, not an error. The first goal dispatches to a built-in
/// when one is registered under its name (built-ins shadow clauses);
/// otherwise every clause of its `(name, arity)` bucket is tried in
/// insertion order, with the clause body prepended to the remaining goals
/// and the depth incremented for the expansion.
pub fn solve(
    context: Arc<ResolveContext>,
    goals: Vec<Goal>,
    bindings: Bindings,
    depth: usize,
) -> Solutions {
    Box::pin(try_stream! {
        match goals.split_first() {
            None => {
                yield bindings;
            }
            Some(_) if depth > context.max_depth => {
                // Depth cutoff: prune this branch without failing the query.
            }
            Some((goal, rest)) => {
                let goal = bindings.walk_goal(goal);
                let rest = rest.to_vec();
                context.trace(|| TraceEvent::Call {
                    goal: goal.clone(),
                    depth,
                });

                let mut proofs = 0usize;
                if let Some(handler) = context.builtins.get(&goal.name) {
                    let resolver = Resolver {
                        context: context.clone(),
                        depth,
                    };
                    let mut extensions = handler.apply(&goal, &bindings, &resolver);
                    while let Some(extended) = extensions.try_next().await? {
                        if proofs > 0 {
                            context.trace(|| TraceEvent::Redo { goal: goal.clone() });
                        }
                        proofs += 1;
                        context.trace(|| TraceEvent::Exit {
                            goal: goal.clone(),
                            bindings: extended.clone(),
                        });
                        let continuation =
                            solve(context.clone(), rest.clone(), extended, depth);
                        for await each in continuation {
                            yield each?;
                        }
                    }
                } else {
                    let clauses = context.knowledge.clauses(&goal.name, goal.arity()).to_vec();
                    for (attempt, clause) in clauses.into_iter().enumerate() {
                        if attempt > 0 && attempt % CLAUSE_YIELD_INTERVAL == 0 {
                            tokio::task::yield_now().await;
                        }
                        let (head, body) = context.rename_clause(&clause);
                        let unified = unify(
                            &Term::Compound(goal.clone()),
                            &Term::Compound(head),
                            &bindings,
                        );
                        let Some(extended) = unified else {
                            continue;
                        };
                        if proofs > 0 {
                            context.trace(|| TraceEvent::Redo { goal: goal.clone() });
                        }
                        let mut subgoals = body;
                        subgoals.extend(rest.iter().cloned());
                        let continuation =
                            solve(context.clone(), subgoals, extended, depth + 1);
                        for await each in continuation {
                            let each = each?;
                            proofs += 1;
                            context.trace(|| TraceEvent::Exit {
                                goal: goal.clone(),
                                bindings: each.clone(),
                            });
                            yield each;
                        }
                    }
                }

                if proofs == 0 {
                    context.trace(|| TraceEvent::Fail { goal: goal.clone() });
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::SolutionStream;
    use crate::trace::NullTrace;
    use std::sync::Mutex;

    fn context(knowledge: KnowledgeBase) -> Arc<ResolveContext> {
        Arc::new(ResolveContext::new(
            Arc::new(knowledge),
            Arc::new(BuiltinRegistry::standard()),
            25,
            Arc::new(NullTrace),
        ))
    }

    fn family() -> KnowledgeBase {
        let mut knowledge = KnowledgeBase::new();
        knowledge
            .assert_fact(Compound::new("parent", ["david", "john"]))
            .expect("fact should insert");
        knowledge
            .assert_fact(Compound::new("parent", ["john", "mary"]))
            .expect("fact should insert");
        knowledge
            .assert_fact(Compound::new("parent", ["john", "peter"]))
            .expect("fact should insert");
        knowledge
    }

    #[tokio::test]
    async fn test_fact_matching_binds_variables() -> anyhow::Result<()> {
        let goals = vec![Compound::new("parent", ["david", "?X"])];
        let solutions = solve(context(family()), goals, Bindings::new(), 0)
            .try_vec()
            .await?;

        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].walk(&Term::var("X")), Term::from("john"));
        Ok(())
    }

    #[tokio::test]
    async fn test_conjunction_threads_bindings() -> anyhow::Result<()> {
        let goals = vec![
            Compound::new("parent", ["david", "?P"]),
            Compound::new("parent", ["?P", "?C"]),
        ];
        let solutions = solve(context(family()), goals, Bindings::new(), 0)
            .try_vec()
            .await?;

        let children: Vec<_> = solutions
            .iter()
            .map(|bindings| bindings.walk(&Term::var("C")))
            .collect();
        assert_eq!(children, vec![Term::from("mary"), Term::from("peter")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_predicate_fails_silently() -> anyhow::Result<()> {
        let goals = vec![Compound::new("unknown", ["x"])];
        let solutions = solve(context(family()), goals, Bindings::new(), 0)
            .try_vec()
            .await?;
        assert!(solutions.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_recursive_rule_does_not_capture_itself() -> anyhow::Result<()> {
        let mut knowledge = family();
        knowledge
            .assert_rule(
                Compound::new("ancestor", ["?A", "?D"]),
                vec![Compound::new("parent", ["?A", "?D"])],
            )
            .expect("rule should insert");
        knowledge
            .assert_rule(
                Compound::new("ancestor", ["?A", "?D"]),
                vec![
                    Compound::new("parent", ["?A", "?P"]),
                    Compound::new("ancestor", ["?P", "?D"]),
                ],
            )
            .expect("rule should insert");

        let goals = vec![Compound::new("ancestor", ["david", "?X"])];
        let solutions = solve(context(knowledge), goals, Bindings::new(), 0)
            .try_vec()
            .await?;

        let descendants: Vec<_> = solutions
            .iter()
            .map(|bindings| bindings.deep_walk(&Term::var("X")))
            .collect();
        assert_eq!(
            descendants,
            vec![Term::from("john"), Term::from("mary"), Term::from("peter")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_depth_cutoff_prunes_silently() -> anyhow::Result<()> {
        let mut knowledge = KnowledgeBase::new();
        knowledge
            .assert_rule(
                Compound::new("loop", ["?X"]),
                vec![Compound::new("loop", ["?X"])],
            )
            .expect("rule should insert");

        let context = Arc::new(ResolveContext::new(
            Arc::new(knowledge),
            Arc::new(BuiltinRegistry::standard()),
            5,
            Arc::new(NullTrace),
        ));
        let goals = vec![Compound::new("loop", ["a"])];
        let solutions = solve(context, goals, Bindings::new(), 0).try_vec().await?;
        assert!(solutions.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_builtins_shadow_clauses() -> anyhow::Result<()> {
        let mut knowledge = KnowledgeBase::new();
        // A clause under a built-in name must never be tried.
        knowledge
            .assert_fact(Compound::new("eq", ["a", "b"]))
            .expect("fact should insert");

        let goals = vec![Compound::new("eq", ["a", "b"])];
        let solutions = solve(context(knowledge), goals, Bindings::new(), 0)
            .try_vec()
            .await?;
        assert!(solutions.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_fresh_renaming_is_query_scoped() -> anyhow::Result<()> {
        // Two uses of the same clause in one proof must not share variables:
        // grandparent expands parent twice through the same rule.
        let mut knowledge = family();
        knowledge
            .assert_rule(
                Compound::new("step", ["?From", "?To"]),
                vec![Compound::new("parent", ["?From", "?To"])],
            )
            .expect("rule should insert");
        knowledge
            .assert_rule(
                Compound::new("grandparent", ["?A", "?C"]),
                vec![
                    Compound::new("step", ["?A", "?P"]),
                    Compound::new("step", ["?P", "?C"]),
                ],
            )
            .expect("rule should insert");

        let goals = vec![Compound::new("grandparent", ["david", "?GC"])];
        let solutions = solve(context(knowledge), goals, Bindings::new(), 0)
            .try_vec()
            .await?;

        let grandchildren: Vec<_> = solutions
            .iter()
            .map(|bindings| bindings.deep_walk(&Term::var("GC")))
            .collect();
        assert_eq!(grandchildren, vec![Term::from("mary"), Term::from("peter")]);
        Ok(())
    }

    struct Recording {
        events: Mutex<Vec<String>>,
    }

    impl TraceSink for Recording {
        fn emit(&self, event: &TraceEvent) {
            let label = match event {
                TraceEvent::Call { goal, depth } => format!("CALL {} @{}", goal, depth),
                TraceEvent::Exit { goal, .. } => format!("EXIT {}", goal),
                TraceEvent::Redo { goal } => format!("REDO {}", goal),
                TraceEvent::Fail { goal } => format!("FAIL {}", goal),
            };
            self.events.lock().expect("sink lock").push(label);
        }
    }

    #[tokio::test]
    async fn test_trace_events_observe_the_search() -> anyhow::Result<()> {
        let sink = Arc::new(Recording {
            events: Mutex::new(Vec::new()),
        });
        let context = Arc::new(ResolveContext::new(
            Arc::new(family()),
            Arc::new(BuiltinRegistry::standard()),
            25,
            sink.clone(),
        ));

        let goals = vec![Compound::new("parent", ["john", "?X"])];
        let solutions = solve(context, goals, Bindings::new(), 0).try_vec().await?;
        assert_eq!(solutions.len(), 2);

        let events = sink.events.lock().expect("sink lock").clone();
        assert_eq!(events[0], "CALL parent(john, ?X) @0");
        assert!(events.iter().any(|event| event.starts_with("EXIT")));
        assert!(events.iter().any(|event| event.starts_with("REDO")));
        Ok(())
    }
}
