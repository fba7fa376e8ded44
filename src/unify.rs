//! First-order syntactic unification
//!
//! [`unify`] is the only entry point: given two terms and the current
//! substitution it either returns an extended substitution under which both
//! terms are structurally equal, or `None`. The input substitution is never
//! modified, so a failed attempt costs the caller nothing — the resolver
//! just moves on to the next clause.

use crate::bindings::Bindings;
use crate::term::Term;

/// Unifies two terms under the given substitution.
///
/// Both terms are shallow-walked first, so already-bound variables compare by
/// the terms they stand for. Compounds unify argument by argument, threading
/// the substitution left to right. Numbers compare by value (`1` unifies with
/// `1.0`) but never with booleans; atoms and string literals are distinct
/// even when their text matches.
///
/// There is no occurs-check: the clause language and the shipped built-ins
/// cannot produce a binding of a variable to a term containing itself.
pub fn unify(left: &Term, right: &Term, bindings: &Bindings) -> Option<Bindings> {
    let left = bindings.walk(left);
    let right = bindings.walk(right);

    match (&left, &right) {
        // Equal terms (including two occurrences of the same variable) unify
        // without extending the substitution.
        _ if left == right => Some(bindings.clone()),
        (Term::Var(name), _) => Some(bindings.bind(name.clone(), right)),
        (_, Term::Var(name)) => Some(bindings.bind(name.clone(), left)),
        (Term::Compound(left), Term::Compound(right)) => {
            if left.name != right.name || left.args.len() != right.args.len() {
                return None;
            }
            let mut current = bindings.clone();
            for (a, b) in left.args.iter().zip(right.args.iter()) {
                current = unify(a, b, &current)?;
            }
            Some(current)
        }
        _ => None,
    }
}
