use crate::blank_node::{BlankNode, BlankNodeIdParseError};
use crate::triple::{Term, Triple};
use rustc_hash::FxHashMap;

/// Maps blank node labels read from the wire to a single [`BlankNode`] instance per label.
///
/// Decoding two results that mention the same label through the same map gives back
/// the very same node (see [`BlankNode::is_same_node()`]), so it could be reused in a
/// later `DELETE`/`INSERT` request. Two maps never share instances.
///
/// The map is not synchronized: use one map per logical session and do not share it
/// between concurrent decodings of unrelated responses, their blank nodes would be merged.
///
/// ```
/// use sparterm::BlankNodeMap;
///
/// let mut session = BlankNodeMap::new();
/// let a = session.get_or_insert("b0")?;
/// let b = session.get_or_insert("b0")?;
/// assert!(a.is_same_node(&b));
///
/// let mut other_session = BlankNodeMap::new();
/// let c = other_session.get_or_insert("b0")?;
/// assert_eq!(a, c);
/// assert!(!a.is_same_node(&c));
/// # Result::<_,sparterm::BlankNodeIdParseError>::Ok(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct BlankNodeMap {
    nodes: FxHashMap<String, BlankNode>,
}

impl BlankNodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node registered for `label`, registering a new one if there is none yet.
    pub fn get_or_insert(&mut self, label: &str) -> Result<BlankNode, BlankNodeIdParseError> {
        if let Some(node) = self.nodes.get(label) {
            return Ok(node.clone());
        }
        let node = BlankNode::new(label)?;
        self.nodes.insert(label.to_owned(), node.clone());
        Ok(node)
    }

    /// Returns the registered node with the same label as `node`, registering `node` if there is none yet.
    pub fn intern(&mut self, node: BlankNode) -> BlankNode {
        self.nodes
            .entry(node.as_str().to_owned())
            .or_insert(node)
            .clone()
    }

    /// Replaces all blank nodes inside of `term` by their registered instances.
    pub fn intern_term(&mut self, term: Term) -> Term {
        match term {
            Term::BlankNode(node) => self.intern(node).into(),
            Term::Triple(triple) => {
                let Triple {
                    subject,
                    predicate,
                    object,
                } = *triple;
                Triple::new(
                    self.intern_term(subject),
                    self.intern_term(predicate),
                    self.intern_term(object),
                )
                .into()
            }
            term => term,
        }
    }

    pub fn get(&self, label: &str) -> Option<&BlankNode> {
        self.nodes.get(label)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Forgets all the registered nodes.
    pub fn clear(&mut self) {
        self.nodes.clear()
    }
}
