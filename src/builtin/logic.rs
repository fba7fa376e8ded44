//! Equality, disequality and disjunction built-ins

use async_stream::try_stream;

use crate::bindings::Bindings;
use crate::builtin::{expect_arity, Builtin};
use crate::error::QueryError;
use crate::resolve::Resolver;
use crate::stream::{self, Solutions};
use crate::term::{Goal, Term};
use crate::unify::unify;

/// `eq(a, b)` — succeeds iff the two arguments unify, yielding the possibly
/// extended substitution.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equality;

impl Builtin for Equality {
    fn apply(&self, goal: &Goal, bindings: &Bindings, _resolver: &Resolver) -> Solutions {
        if let Err(error) = expect_arity("eq", goal, 2) {
            return stream::fault(error);
        }
        match unify(&goal.args[0], &goal.args[1], bindings) {
            Some(unified) => stream::single(unified),
            None => stream::empty(),
        }
    }
}

/// `neq(a, b)` — succeeds with the substitution unchanged iff both arguments
/// are ground after substitution and structurally unequal.
///
/// Unbound arguments fail silently: there is no constructive disequality, so
/// the engine refuses to guess what an unbound variable will not be.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disequality;

impl Builtin for Disequality {
    fn apply(&self, goal: &Goal, bindings: &Bindings, _resolver: &Resolver) -> Solutions {
        if let Err(error) = expect_arity("neq", goal, 2) {
            return stream::fault(error);
        }
        let left = bindings.deep_walk(&goal.args[0]);
        let right = bindings.deep_walk(&goal.args[1]);
        if left.is_ground() && right.is_ground() && left != right {
            stream::single(bindings.clone())
        } else {
            stream::empty()
        }
    }
}

/// `or(goal, goal, ...)` — tries each argument goal in order and yields
/// every solution of each: disjunction in a conjunctive body.
///
/// Sub-goals resolve through the invoking frame's [`Resolver`], so they see
/// the same knowledge snapshot and depth budget; an argument that is not a
/// goal is a malformed rule and fails the query.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disjunction;

impl Builtin for Disjunction {
    fn apply(&self, goal: &Goal, bindings: &Bindings, resolver: &Resolver) -> Solutions {
        // Validate the whole argument list up front: a non-goal argument is a
        // malformed rule, fatal rather than silently empty.
        let mut branches = Vec::with_capacity(goal.args.len());
        for arg in &goal.args {
            match bindings.walk(arg) {
                Term::Compound(subgoal) => branches.push(subgoal),
                other => {
                    return stream::fault(QueryError::builtin(
                        "or",
                        format!("each argument must be a goal, got {}", other),
                    ))
                }
            }
        }
        let bindings = bindings.clone();
        let resolver = resolver.clone();
        Box::pin(try_stream! {
            for subgoal in branches {
                let branch = resolver.solve(vec![subgoal], bindings.clone());
                for await each in branch {
                    yield each?;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BuiltinRegistry;
    use crate::knowledge::KnowledgeBase;
    use crate::resolve::ResolveContext;
    use crate::stream::SolutionStream;
    use crate::term::Compound;
    use crate::trace::NullTrace;
    use std::sync::Arc;

    fn resolver() -> Resolver {
        Resolver::new(
            Arc::new(ResolveContext::new(
                Arc::new(KnowledgeBase::new()),
                Arc::new(BuiltinRegistry::standard()),
                25,
                Arc::new(NullTrace),
            )),
            0,
        )
    }

    #[tokio::test]
    async fn test_eq_unifies() -> anyhow::Result<()> {
        let goal = Compound::new("eq", ["?X", "john"]);
        let solutions = Equality
            .apply(&goal, &Bindings::new(), &resolver())
            .try_vec()
            .await?;

        assert_eq!(solutions.len(), 1);
        assert_eq!(solutions[0].get("?X"), Some(&Term::from("john")));
        Ok(())
    }

    #[tokio::test]
    async fn test_eq_fails_on_mismatch() -> anyhow::Result<()> {
        let goal = Compound::new("eq", ["mary", "john"]);
        let solutions = Equality
            .apply(&goal, &Bindings::new(), &resolver())
            .try_vec()
            .await?;
        assert!(solutions.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_eq_wrong_arity_is_fatal() {
        let goal = Compound::new("eq", ["a"]);
        let result = Equality
            .apply(&goal, &Bindings::new(), &resolver())
            .try_vec()
            .await;
        assert!(matches!(result, Err(QueryError::Builtin { .. })));
    }

    #[tokio::test]
    async fn test_neq_on_ground_terms() -> anyhow::Result<()> {
        let distinct = Compound::new("neq", ["x", "y"]);
        let solutions = Disequality
            .apply(&distinct, &Bindings::new(), &resolver())
            .try_vec()
            .await?;
        assert_eq!(solutions.len(), 1);
        // The substitution comes back unchanged.
        assert!(solutions[0].is_empty());

        let equal = Compound::new("neq", ["x", "x"]);
        let solutions = Disequality
            .apply(&equal, &Bindings::new(), &resolver())
            .try_vec()
            .await?;
        assert!(solutions.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_neq_fails_silently_on_unbound() -> anyhow::Result<()> {
        let goal = Compound::new("neq", ["?X", "y"]);
        let solutions = Disequality
            .apply(&goal, &Bindings::new(), &resolver())
            .try_vec()
            .await?;
        assert!(solutions.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_neq_uses_current_bindings() -> anyhow::Result<()> {
        let goal = Compound::new("neq", ["?X", "y"]);
        let bindings = Bindings::new().bind("?X", Term::from("x"));
        let solutions = Disequality
            .apply(&goal, &bindings, &resolver())
            .try_vec()
            .await?;
        assert_eq!(solutions.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_or_tries_branches_in_order() -> anyhow::Result<()> {
        let goal = Compound::new(
            "or",
            [
                Term::Compound(Compound::new("eq", ["?X", "first"])),
                Term::Compound(Compound::new("eq", ["?X", "second"])),
            ],
        );
        let solutions = Disjunction
            .apply(&goal, &Bindings::new(), &resolver())
            .try_vec()
            .await?;

        let values: Vec<_> = solutions
            .iter()
            .map(|bindings| bindings.walk(&Term::var("X")))
            .collect();
        assert_eq!(values, vec![Term::from("first"), Term::from("second")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_or_with_non_goal_argument_is_fatal() {
        let goal = Compound::new("or", [Term::from(42i64)]);
        let result = Disjunction
            .apply(&goal, &Bindings::new(), &resolver())
            .try_vec()
            .await;
        assert!(matches!(result, Err(QueryError::Builtin { .. })));
    }
}
