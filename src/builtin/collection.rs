//! Sequence membership built-in

use crate::bindings::Bindings;
use crate::builtin::{expect_arity, Builtin};
use crate::resolve::Resolver;
use crate::stream::{self, Solutions};
use crate::term::{Goal, Term};
use crate::unify::unify;

/// `member(x, sequence)` — yields one solution per element of the sequence
/// that unifies with `x`, in element order.
///
/// The second argument must substitute to a ground compound; its arguments
/// are the elements, whatever the compound is called (`list(..)` from JSON
/// conversion, or any tuple written in a knowledge file). A non-compound or
/// non-ground sequence fails silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct Member;

impl Builtin for Member {
    fn apply(&self, goal: &Goal, bindings: &Bindings, _resolver: &Resolver) -> Solutions {
        if let Err(error) = expect_arity("member", goal, 2) {
            return stream::fault(error);
        }
        let walked = bindings.deep_walk(&goal.args[1]);
        if !walked.is_ground() {
            return stream::empty();
        }
        let Term::Compound(sequence) = walked else {
            return stream::empty();
        };
        let matches: Vec<_> = sequence
            .args
            .iter()
            .filter_map(|element| unify(&goal.args[0], element, bindings))
            .map(Ok)
            .collect();
        stream::from_results(matches)
    }
}
