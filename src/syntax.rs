//! Knowledge file syntax
//!
//! The on-disk knowledge format is a JSON document with two sections:
//!
//! ```json
//! {
//!   "facts": [["parent", "david", "john"], ["age", "john", 30]],
//!   "rules": [
//!     { "head": ["grandparent", "?A", "?C"],
//!       "body": [["parent", "?A", "?P"], ["parent", "?P", "?C"]] }
//!   ]
//! }
//! ```
//!
//! Scalar strings starting with `?` are variables; other strings are atoms;
//! `{"str": "..."}` is a string literal; a nested array is a compound whose
//! first element names the predicate. [`TermSyntax`] is the intermediate
//! representation between this wire format and [`Term`] — the same
//! separation the engine uses for terms appearing in query results.

use serde::{Deserialize, Serialize};

use crate::error::KnowledgeError;
use crate::knowledge::Clause;
use crate::term::{Compound, Goal, Number, Term, VARIABLE_SIGIL};

/// Wire-format shape of a single term.
///
/// The untagged variants are tried in order, so integers parse before floats
/// and keep their exactness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermSyntax {
    /// `true` / `false`.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Float(f64),
    /// `{"str": "..."}` — an explicit string literal.
    Text {
        /// Literal contents.
        #[serde(rename = "str")]
        value: String,
    },
    /// Bare string: a variable when it starts with `?`, an atom otherwise.
    Symbol(String),
    /// Nested tuple: a compound term or goal.
    Tuple(Vec<TermSyntax>),
}

impl std::fmt::Display for TermSyntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(rendered) => write!(f, "{}", rendered),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

impl From<Term> for TermSyntax {
    fn from(term: Term) -> Self {
        match term {
            Term::Atom(name) => TermSyntax::Symbol(name),
            Term::Num(Number::Int(value)) => TermSyntax::Int(value),
            Term::Num(Number::Float(value)) => TermSyntax::Float(value),
            Term::Bool(value) => TermSyntax::Bool(value),
            Term::Str(value) => TermSyntax::Text { value },
            Term::Var(name) => TermSyntax::Symbol(name),
            Term::Compound(compound) => TermSyntax::from(compound),
        }
    }
}

impl From<Compound> for TermSyntax {
    fn from(compound: Compound) -> Self {
        let mut elements = Vec::with_capacity(compound.args.len() + 1);
        elements.push(TermSyntax::Symbol(compound.name));
        elements.extend(compound.args.into_iter().map(TermSyntax::from));
        TermSyntax::Tuple(elements)
    }
}

impl TryFrom<TermSyntax> for Term {
    type Error = KnowledgeError;

    fn try_from(syntax: TermSyntax) -> Result<Self, Self::Error> {
        match syntax {
            TermSyntax::Bool(value) => Ok(Term::Bool(value)),
            TermSyntax::Int(value) => Ok(Term::Num(Number::Int(value))),
            TermSyntax::Float(value) => Ok(Term::Num(Number::Float(value))),
            TermSyntax::Text { value } => Ok(Term::Str(value)),
            TermSyntax::Symbol(name) => {
                if name.starts_with(VARIABLE_SIGIL) {
                    Ok(Term::Var(name))
                } else {
                    Ok(Term::Atom(name))
                }
            }
            TermSyntax::Tuple(elements) => Ok(Term::Compound(compound_from_tuple(elements)?)),
        }
    }
}

impl TryFrom<TermSyntax> for Compound {
    type Error = KnowledgeError;

    fn try_from(syntax: TermSyntax) -> Result<Self, Self::Error> {
        match syntax {
            TermSyntax::Tuple(elements) => compound_from_tuple(elements),
            other => Err(KnowledgeError::InvalidHead {
                found: other.to_string(),
            }),
        }
    }
}

/// Builds a compound from the elements of a tuple. The first element must be
/// an atom naming the predicate; remaining elements become arguments.
fn compound_from_tuple(elements: Vec<TermSyntax>) -> Result<Compound, KnowledgeError> {
    let mut elements = elements.into_iter();
    let name = match elements.next() {
        Some(TermSyntax::Symbol(name)) if !name.starts_with(VARIABLE_SIGIL) && !name.is_empty() => {
            name
        }
        Some(other) => {
            return Err(KnowledgeError::InvalidPredicateName {
                found: other.to_string(),
            })
        }
        None => {
            return Err(KnowledgeError::InvalidHead {
                found: "[]".to_string(),
            })
        }
    };
    let args = elements.map(Term::try_from).collect::<Result<_, _>>()?;
    Ok(Compound { name, args })
}

/// Rule record in a knowledge file: a head tuple and an ordered body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSyntax {
    /// Conclusion tuple.
    pub head: Vec<TermSyntax>,
    /// Premise tuples, solved left to right.
    #[serde(default)]
    pub body: Vec<Vec<TermSyntax>>,
}

/// Top-level shape of a knowledge file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeFile {
    /// Ordered facts, asserted first.
    #[serde(default)]
    pub facts: Vec<Vec<TermSyntax>>,
    /// Ordered rules, asserted after the facts.
    #[serde(default)]
    pub rules: Vec<RuleSyntax>,
}

impl KnowledgeFile {
    /// Parses a knowledge document from JSON text.
    pub fn parse(text: &str) -> Result<Self, KnowledgeError> {
        serde_json::from_str(text).map_err(|source| KnowledgeError::Parse { source })
    }

    /// Converts the document into clauses, facts first, preserving order.
    ///
    /// Conversion is all-or-nothing: the first malformed tuple aborts with an
    /// error and no clause is produced, which is what lets the engine promise
    /// that a failed load leaves its state untouched.
    pub fn into_clauses(self) -> Result<Vec<Clause>, KnowledgeError> {
        let mut clauses = Vec::with_capacity(self.facts.len() + self.rules.len());
        for fact in self.facts {
            clauses.push(Clause::fact(compound_from_tuple(fact)?));
        }
        for rule in self.rules {
            let head = compound_from_tuple(rule.head)?;
            let body = rule
                .body
                .into_iter()
                .map(compound_from_tuple)
                .collect::<Result<Vec<Goal>, _>>()?;
            clauses.push(Clause::rule(head, body));
        }
        Ok(clauses)
    }
}
