//! JSON path extraction built-in
//!
//! `unify_json_path(json, path, ?Out)` navigates a JSON-shaped term — the
//! `object(..)`/`list(..)` encoding produced by
//! [`Term::from_json`](crate::term::Term::from_json) — along a dotted path
//! and unifies the node it lands on with the third argument. A path segment
//! selects an object entry by name, or a list element by zero-based index.

use crate::bindings::Bindings;
use crate::builtin::{expect_arity, Builtin};
use crate::resolve::Resolver;
use crate::stream::{self, Solutions};
use crate::term::{Goal, Term};
use crate::unify::unify;

/// Handler for `unify_json_path`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPath;

/// Selects one step of the path: an entry of an `object(..)` compound by
/// name, or an element of any other compound by numeric index.
fn select<'a>(node: &'a Term, segment: &str) -> Option<&'a Term> {
    let Term::Compound(compound) = node else {
        return None;
    };
    if compound.name == "object" {
        compound.args.iter().find_map(|entry| match entry {
            Term::Compound(entry) if entry.name == segment && entry.arity() == 1 => {
                Some(&entry.args[0])
            }
            _ => None,
        })
    } else {
        let index: usize = segment.parse().ok()?;
        compound.args.get(index)
    }
}

impl Builtin for JsonPath {
    fn apply(&self, goal: &Goal, bindings: &Bindings, _resolver: &Resolver) -> Solutions {
        if let Err(error) = expect_arity("unify_json_path", goal, 3) {
            return stream::fault(error);
        }
        let source = bindings.deep_walk(&goal.args[0]);
        let path = match bindings.walk(&goal.args[1]) {
            Term::Str(path) => path,
            Term::Atom(path) => path,
            _ => return stream::empty(),
        };

        let mut node = &source;
        for segment in path.split('.') {
            match select(node, segment) {
                Some(next) => node = next,
                None => return stream::empty(),
            }
        }

        match unify(&goal.args[2], node, bindings) {
            Some(unified) => stream::single(unified),
            None => stream::empty(),
        }
    }
}
