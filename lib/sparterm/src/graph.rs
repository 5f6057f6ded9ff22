//! [In-memory implementation](Graph) of [RDF graphs](https://www.w3.org/TR/rdf11-concepts/#dfn-graph).
//!
//! Usage example:
//! ```
//! use sparterm::*;
//!
//! let mut graph = Graph::default();
//!
//! // insertion
//! let ex = NamedNode::new("http://example.com")?;
//! let triple = Triple::new(ex.clone(), ex.clone(), ex.clone());
//! graph.insert(triple.clone());
//! assert!(!graph.insert(triple.clone()));
//!
//! // N-Triples dump
//! assert_eq!(
//!     graph.to_string(),
//!     "<http://example.com> <http://example.com> <http://example.com> .\n"
//! );
//! # Result::<_,Box<dyn std::error::Error>>::Ok(())
//! ```

use crate::triple::Triple;
use rustc_hash::FxHashSet;
use std::fmt;

/// An in-memory [RDF graph](https://www.w3.org/TR/rdf11-concepts/#dfn-graph).
///
/// Triples are kept in insertion order and duplicates are ignored.
/// The default string formatter is returning an N-Triples document.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    index: FxHashSet<Triple>,
}

impl Graph {
    /// Creates a new graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a triple to the graph.
    ///
    /// Returns `false` if the triple was already in the graph.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.index.contains(&triple) {
            return false;
        }
        self.index.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    /// Removes a triple from the graph.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        if self.index.remove(triple) {
            self.triples.retain(|t| t != triple);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.index.contains(triple)
    }

    /// Returns the number of triples in this graph.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Checks if this graph contains a triple.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Returns all the triples contained by the graph, in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    pub fn clear(&mut self) {
        self.triples.clear();
        self.index.clear();
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Graph {}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut g = Self::new();
        g.extend(iter);
        g
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for t in iter {
            self.insert(t);
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for t in self {
            writeln!(f, "{t} .")?;
        }
        Ok(())
    }
}
