//! Variable bindings produced by unification
//!
//! A [`Bindings`] value is the substitution σ threaded through resolution:
//! a finite map from variable names to terms. It is a persistent value, so
//! extending it returns a new map that shares structure with the old one.
//! Backtracking never has to undo anything; an outer resolution frame simply
//! keeps using the bindings it already holds.

use std::collections::BTreeMap;
use std::fmt;

use crate::term::{Compound, Goal, Term};

/// Immutable substitution from variable names to terms.
///
/// Extension goes through [`Bindings::bind`], which leaves the receiver
/// untouched. Lookup distinguishes the *shallow* [`walk`](Bindings::walk)
/// used during unification from the *deep* [`deep_walk`](Bindings::deep_walk)
/// used when projecting solutions back to the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    entries: im::HashMap<String, Term>,
}

impl Bindings {
    /// The empty substitution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no variable is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Term bound to `name`, if any. No transitive lookup.
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.entries.get(name)
    }

    /// Returns a copy of this substitution extended with `name ↦ term`.
    pub fn bind(&self, name: impl Into<String>, term: Term) -> Self {
        Bindings {
            entries: self.entries.update(name.into(), term),
        }
    }

    /// Shallow lookup: follows variable links until a non-variable term or an
    /// unbound variable is reached. Compound arguments are left untouched.
    pub fn walk(&self, term: &Term) -> Term {
        let mut current = term;
        while let Term::Var(name) = current {
            match self.entries.get(name) {
                Some(next) => current = next,
                None => break,
            }
        }
        current.clone()
    }

    /// Recursive substitution: walks the term and every compound argument
    /// under it until no bound variable remains. Idempotent.
    pub fn deep_walk(&self, term: &Term) -> Term {
        match self.walk(term) {
            Term::Compound(compound) => Term::Compound(self.deep_walk_compound(&compound)),
            other => other,
        }
    }

    fn deep_walk_compound(&self, compound: &Compound) -> Compound {
        Compound {
            name: compound.name.clone(),
            args: compound.args.iter().map(|arg| self.deep_walk(arg)).collect(),
        }
    }

    /// Substitutes the bound variables appearing directly among a goal's
    /// arguments. This is the shallow goal preparation the resolver performs
    /// before matching a goal against clause heads or built-ins.
    pub fn walk_goal(&self, goal: &Goal) -> Goal {
        Compound {
            name: goal.name.clone(),
            args: goal.args.iter().map(|arg| self.walk(arg)).collect(),
        }
    }

    /// Iterates over `(name, term)` entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Term)> {
        self.entries.iter()
    }

    /// Projects this substitution onto the given variable names, deep-walking
    /// each one. Names bound to nothing are omitted; names bound to other
    /// (unbound) variables project as those variables. The ordered map keeps
    /// solution printing deterministic.
    pub fn project<'a, I>(&self, names: I) -> BTreeMap<String, Term>
    where
        I: IntoIterator<Item = &'a String>,
    {
        names
            .into_iter()
            .map(|name| (name.clone(), self.deep_walk(&Term::Var(name.clone()))))
            .collect()
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        // Sorted so that trace output is stable across runs.
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|(left, _), (right, _)| left.cmp(right));
        for (index, (name, term)) in entries.into_iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, term)?;
        }
        write!(f, "}}")
    }
}
