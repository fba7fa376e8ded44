//! Numeric comparison built-ins
//!
//! `gt`, `gte`, `lt` and `lte` compare two ground numbers under the current
//! substitution. Anything else — an unbound variable, an atom, a boolean —
//! fails silently, matching the convention that comparisons constrain
//! already-derived values rather than generate them.

use std::cmp::Ordering;

use crate::bindings::Bindings;
use crate::builtin::{expect_arity, Builtin};
use crate::resolve::Resolver;
use crate::stream::{self, Solutions};
use crate::term::{Goal, Term};

fn compare(name: &str, goal: &Goal, bindings: &Bindings, accept: fn(Ordering) -> bool) -> Solutions {
    if let Err(error) = expect_arity(name, goal, 2) {
        return stream::fault(error);
    }
    let left = bindings.walk(&goal.args[0]);
    let right = bindings.walk(&goal.args[1]);
    match (left, right) {
        (Term::Num(left), Term::Num(right)) => match left.partial_cmp(&right) {
            Some(ordering) if accept(ordering) => stream::single(bindings.clone()),
            _ => stream::empty(),
        },
        _ => stream::empty(),
    }
}

/// `gt(a, b)` — strictly greater.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterThan;

impl Builtin for GreaterThan {
    fn apply(&self, goal: &Goal, bindings: &Bindings, _resolver: &Resolver) -> Solutions {
        compare("gt", goal, bindings, |ordering| ordering == Ordering::Greater)
    }
}

/// `gte(a, b)` — greater or equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterOrEqual;

impl Builtin for GreaterOrEqual {
    fn apply(&self, goal: &Goal, bindings: &Bindings, _resolver: &Resolver) -> Solutions {
        compare("gte", goal, bindings, |ordering| ordering != Ordering::Less)
    }
}

/// `lt(a, b)` — strictly less.
#[derive(Debug, Clone, Copy, Default)]
pub struct LessThan;

impl Builtin for LessThan {
    fn apply(&self, goal: &Goal, bindings: &Bindings, _resolver: &Resolver) -> Solutions {
        compare("lt", goal, bindings, |ordering| ordering == Ordering::Less)
    }
}

/// `lte(a, b)` — less or equal.
#[derive(Debug, Clone, Copy, Default)]
pub struct LessOrEqual;

impl Builtin for LessOrEqual {
    fn apply(&self, goal: &Goal, bindings: &Bindings, _resolver: &Resolver) -> Solutions {
        compare("lte", goal, bindings, |ordering| ordering != Ordering::Greater)
    }
}
