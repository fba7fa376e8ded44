//! Indexed storage for facts and rules
//!
//! The knowledge base holds clauses bucketed by predicate name and arity,
//! preserving insertion order inside each bucket. It stores and retrieves;
//! all semantics live in the resolver.

use std::collections::HashMap;
use std::fmt;

use crate::error::KnowledgeError;
use crate::term::Goal;

/// A Horn clause: a head that holds whenever every body goal holds.
///
/// Facts are clauses with an empty body; the knowledge base keeps both forms
/// in the same bucket so the resolver tries them in plain insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Conclusion the clause establishes.
    pub head: Goal,
    /// Conjunctive premises, solved left to right. Empty for facts.
    pub body: Vec<Goal>,
}

impl Clause {
    /// Creates a fact — a clause that holds unconditionally.
    pub fn fact(head: Goal) -> Self {
        Clause {
            head,
            body: Vec::new(),
        }
    }

    /// Creates a rule from a head and its body goals.
    pub fn rule(head: Goal, body: Vec<Goal>) -> Self {
        Clause { head, body }
    }

    /// True if this clause has no premises.
    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }

    fn validate(&self) -> Result<(), KnowledgeError> {
        if self.head.name.is_empty() {
            return Err(KnowledgeError::InvalidHead {
                found: self.head.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.head)?;
        if !self.body.is_empty() {
            write!(f, " :- ")?;
            for (index, goal) in self.body.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", goal)?;
            }
        }
        Ok(())
    }
}

/// Clauses bucketed by `(predicate name, arity)`, insertion-ordered.
///
/// The resolver tries clauses in the order they were asserted, which is what
/// makes base-case-first recursive rule sets terminate the way their authors
/// expect. Queries hold a snapshot of the knowledge base (see
/// [`Engine`](crate::engine::Engine)), so the base itself needs no interior
/// mutability.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    buckets: HashMap<(String, usize), Vec<Clause>>,
    clause_count: usize,
}

impl KnowledgeBase {
    /// Creates an empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of clauses across all buckets.
    pub fn len(&self) -> usize {
        self.clause_count
    }

    /// True if no clause has been asserted.
    pub fn is_empty(&self) -> bool {
        self.clause_count == 0
    }

    /// Appends a fact to its `(name, arity)` bucket.
    pub fn assert_fact(&mut self, fact: Goal) -> Result<(), KnowledgeError> {
        self.assert_clause(Clause::fact(fact))
    }

    /// Appends a rule to the bucket of its head.
    pub fn assert_rule(&mut self, head: Goal, body: Vec<Goal>) -> Result<(), KnowledgeError> {
        self.assert_clause(Clause::rule(head, body))
    }

    /// Appends an already-built clause, validating its head first.
    pub fn assert_clause(&mut self, clause: Clause) -> Result<(), KnowledgeError> {
        clause.validate()?;
        let key = (clause.head.name.clone(), clause.head.arity());
        self.buckets.entry(key).or_default().push(clause);
        self.clause_count += 1;
        Ok(())
    }

    /// Clauses for a predicate in insertion order. Unknown predicates get the
    /// empty slice — at query time that is a normal failure, not an error.
    pub fn clauses(&self, name: &str, arity: usize) -> &[Clause] {
        self.buckets
            .get(&(name.to_string(), arity))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Compound;

    #[test]
    fn test_buckets_split_by_arity() {
        let mut knowledge = KnowledgeBase::new();
        knowledge
            .assert_fact(Compound::new("parent", ["david", "john"]))
            .expect("fact should insert");
        knowledge
            .assert_fact(Compound::new("parent", ["john"]))
            .expect("fact should insert");

        assert_eq!(knowledge.clauses("parent", 2).len(), 1);
        assert_eq!(knowledge.clauses("parent", 1).len(), 1);
        assert_eq!(knowledge.clauses("parent", 3).len(), 0);
        assert_eq!(knowledge.len(), 2);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut knowledge = KnowledgeBase::new();
        for child in ["john", "mary", "peter"] {
            knowledge
                .assert_fact(Compound::new("parent", ["david", child]))
                .expect("fact should insert");
        }

        let children: Vec<_> = knowledge
            .clauses("parent", 2)
            .iter()
            .map(|clause| clause.head.args[1].clone())
            .collect();
        assert_eq!(
            children,
            vec!["john".into(), "mary".into(), "peter".into()]
        );
    }

    #[test]
    fn test_facts_and_rules_share_a_bucket() {
        let mut knowledge = KnowledgeBase::new();
        knowledge
            .assert_fact(Compound::new("ancestor", ["a", "b"]))
            .expect("fact should insert");
        knowledge
            .assert_rule(
                Compound::new("ancestor", ["?A", "?D"]),
                vec![
                    Compound::new("parent", ["?A", "?P"]),
                    Compound::new("ancestor", ["?P", "?D"]),
                ],
            )
            .expect("rule should insert");

        let clauses = knowledge.clauses("ancestor", 2);
        assert_eq!(clauses.len(), 2);
        assert!(clauses[0].is_fact());
        assert!(!clauses[1].is_fact());
    }

    #[test]
    fn test_empty_predicate_name_is_rejected() {
        let mut knowledge = KnowledgeBase::new();
        let result = knowledge.assert_fact(Compound::new("", ["x"]));
        assert!(matches!(result, Err(KnowledgeError::InvalidHead { .. })));
    }

    #[test]
    fn test_unknown_predicate_is_empty_not_an_error() {
        let knowledge = KnowledgeBase::new();
        assert!(knowledge.clauses("missing", 1).is_empty());
    }
}
