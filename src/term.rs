//! Term types for goals, facts and rule clauses
//!
//! This module implements the core `Term` type that represents either:
//! - **Constants**: atoms, numbers, booleans and string literals
//! - **Variables**: placeholders that unification can bind to any term
//! - **Compounds**: a predicate name applied to an ordered argument list
//!
//! A `Goal` is syntactically a [`Compound`]. The JSON representation used by
//! knowledge files goes through [`TermSyntax`](crate::syntax::TermSyntax) as
//! an intermediate form, which keeps the API type separate from the wire
//! format.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::syntax::TermSyntax;

/// Sigil that marks a string as a variable name (`?X`, `?Person`).
pub const VARIABLE_SIGIL: char = '?';

/// Separator between a renamed variable and its freshness counter (`?X#4`).
/// User-facing variable names never contain it, which keeps generated names
/// disjoint from user-supplied ones.
pub const FRESH_MARKER: char = '#';

/// A numeric term value.
///
/// Integer inputs stay integers so that knowledge files round-trip without
/// losing exactness; equality and ordering compare across the two variants by
/// numeric value, so `1` and `1.0` are the same number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Exact integer.
    Int(i64),
    /// IEEE 754 double.
    Float(f64),
}

impl Number {
    /// The value widened to a double, used for mixed-variant comparison.
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(value) => *value as f64,
            Number::Float(value) => *value,
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(left), Number::Int(right)) => left == right,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Number::Int(left), Number::Int(right)) => left.partial_cmp(right),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{}", value),
            Number::Float(value) => write!(f, "{}", value),
        }
    }
}

/// A predicate name applied to an ordered list of argument terms.
///
/// Compounds double as goals: the resolver only ever receives compounds, and
/// rule heads and bodies are made of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TermSyntax", into = "TermSyntax")]
pub struct Compound {
    /// Predicate name the arguments are applied to.
    pub name: String,
    /// Argument terms, possibly empty.
    pub args: Vec<Term>,
}

/// A goal submitted to the resolver is syntactically a compound.
pub type Goal = Compound;

impl Compound {
    /// Creates a compound from a predicate name and anything convertible to
    /// terms. Strings starting with `?` become variables, mirroring the
    /// knowledge file conventions.
    pub fn new<N, A, T>(name: N, args: A) -> Self
    where
        N: Into<String>,
        A: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        Compound {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of arguments. Together with the name this identifies the
    /// knowledge base bucket the compound resolves against.
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (index, arg) in self.args.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")
    }
}

/// A first-order term: the value space of facts, goals and bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TermSyntax", into = "TermSyntax")]
pub enum Term {
    /// Case-sensitive symbolic constant (`david`, `null`).
    Atom(String),
    /// Integer or floating-point number.
    Num(Number),
    /// Boolean constant.
    Bool(bool),
    /// Opaque string literal, distinct from atoms. Used for URLs, paths and
    /// JSON string fields.
    Str(String),
    /// Logical variable, identified by its full sigil-prefixed name (`?X`).
    Var(String),
    /// Predicate applied to arguments.
    Compound(Compound),
}

impl Term {
    /// Creates a variable term. The `?` sigil is added when missing so that
    /// `Term::var("X")` and `Term::var("?X")` denote the same variable.
    pub fn var<N: AsRef<str>>(name: N) -> Self {
        let name = name.as_ref();
        if name.starts_with(VARIABLE_SIGIL) {
            Term::Var(name.to_string())
        } else {
            Term::Var(format!("{}{}", VARIABLE_SIGIL, name))
        }
    }

    /// Creates a string literal term, bypassing the `?`-sigil rewriting that
    /// `From<&str>` performs.
    pub fn text<S: Into<String>>(value: S) -> Self {
        Term::Str(value.into())
    }

    /// True if this term is a variable.
    pub fn is_var(&self) -> bool {
        matches!(self, Term::Var(_))
    }

    /// Variable name if this term is a variable.
    pub fn as_var(&self) -> Option<&str> {
        match self {
            Term::Var(name) => Some(name),
            _ => None,
        }
    }

    /// True if no variable occurs anywhere in this term.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Var(_) => false,
            Term::Compound(compound) => compound.args.iter().all(Term::is_ground),
            _ => true,
        }
    }

    /// Collects the names of all variables occurring in this term, in
    /// left-to-right order of first appearance.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Term::Var(name) => {
                if !names.iter().any(|seen| seen == name) {
                    names.push(name.clone());
                }
            }
            Term::Compound(compound) => {
                for arg in &compound.args {
                    arg.collect_variables(names);
                }
            }
            _ => {}
        }
    }

    /// Maps a JSON value into the term model.
    ///
    /// Strings become [`Term::Str`], numbers stay integer-exact, arrays become
    /// `list(..)` compounds and objects become `object(..)` compounds whose
    /// entries are single-argument compounds named after the key. `null` maps
    /// to the `null` atom. Used by the `http_get_json` built-in and by
    /// `unify_json_path` traversal.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Term::Atom("null".to_string()),
            serde_json::Value::Bool(value) => Term::Bool(value),
            serde_json::Value::Number(value) => {
                if let Some(int) = value.as_i64() {
                    Term::Num(Number::Int(int))
                } else {
                    Term::Num(Number::Float(value.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(value) => Term::Str(value),
            serde_json::Value::Array(items) => Term::Compound(Compound {
                name: "list".to_string(),
                args: items.into_iter().map(Term::from_json).collect(),
            }),
            serde_json::Value::Object(entries) => Term::Compound(Compound {
                name: "object".to_string(),
                args: entries
                    .into_iter()
                    .map(|(key, value)| {
                        Term::Compound(Compound {
                            name: key,
                            args: vec![Term::from_json(value)],
                        })
                    })
                    .collect(),
            }),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(name) => write!(f, "{}", name),
            Term::Num(value) => write!(f, "{}", value),
            Term::Bool(value) => write!(f, "{}", value),
            Term::Str(value) => write!(f, "{:?}", value),
            Term::Var(name) => write!(f, "{}", name),
            Term::Compound(compound) => write!(f, "{}", compound),
        }
    }
}

/// Strings rewrite to variables when they carry the `?` sigil and to atoms
/// otherwise, matching the knowledge file conventions. String literals are
/// created explicitly with [`Term::text`].
impl From<&str> for Term {
    fn from(value: &str) -> Self {
        if value.starts_with(VARIABLE_SIGIL) {
            Term::Var(value.to_string())
        } else {
            Term::Atom(value.to_string())
        }
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term::from(value.as_str())
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Num(Number::Int(value))
    }
}

impl From<i32> for Term {
    fn from(value: i32) -> Self {
        Term::Num(Number::Int(value as i64))
    }
}

impl From<f64> for Term {
    fn from(value: f64) -> Self {
        Term::Num(Number::Float(value))
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Term::Bool(value)
    }
}

impl From<Compound> for Term {
    fn from(value: Compound) -> Self {
        Term::Compound(value)
    }
}

impl From<&Term> for Term {
    fn from(term: &Term) -> Self {
        term.clone()
    }
}
