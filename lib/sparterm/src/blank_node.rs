use rand::random;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// An owned RDF [blank node](https://www.w3.org/TR/rdf11-concepts/#dfn-blank-node).
///
/// The label is shared between clones: a cloned blank node is the *same node* as its source
/// (see [`BlankNode::is_same_node()`]), while two blank nodes built separately from an equal
/// label are only equal. The [`BlankNodeMap`](crate::BlankNodeMap) relies on it to hand out
/// one node per label.
///
/// The common way to create a new blank node is to use the [`BlankNode::default()`] function.
///
/// The default string formatter is returning an N-Triples, Turtle, and SPARQL compatible representation:
/// ```
/// use sparterm::BlankNode;
///
/// assert_eq!("_:a122", BlankNode::new("a122")?.to_string());
/// # Result::<_,sparterm::BlankNodeIdParseError>::Ok(())
/// ```
#[derive(Clone)]
pub struct BlankNode {
    id: Arc<str>,
}

impl BlankNode {
    /// Creates a blank node from a label.
    ///
    /// The label must be valid according to N-Triples, Turtle, and SPARQL grammars.
    pub fn new(id: impl Into<String>) -> Result<Self, BlankNodeIdParseError> {
        let id = id.into();
        validate_blank_node_identifier(&id)?;
        Ok(Self::new_unchecked(id))
    }

    /// Creates a blank node from a label.
    ///
    /// It is the caller's responsibility to ensure that `id` is a valid blank node identifier
    /// according to N-Triples, Turtle, and SPARQL grammars.
    ///
    /// [`BlankNode::new()`] is a safe version of this constructor and should be used for untrusted data.
    #[inline]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self {
            id: Arc::from(id.into()),
        }
    }

    /// Returns the underlying label of this blank node.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.id.as_ref().to_owned()
    }

    /// Checks if both values are the very same node instance and not only nodes with an equal label.
    ///
    /// ```
    /// use sparterm::BlankNode;
    ///
    /// let node = BlankNode::new("b0")?;
    /// assert!(node.is_same_node(&node.clone()));
    /// assert!(!node.is_same_node(&BlankNode::new("b0")?));
    /// # Result::<_,sparterm::BlankNodeIdParseError>::Ok(())
    /// ```
    #[inline]
    pub fn is_same_node(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.id, &other.id)
    }
}

impl PartialEq for BlankNode {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BlankNode {}

impl Hash for BlankNode {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl PartialOrd for BlankNode {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlankNode {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BlankNode").field(&self.as_str()).finish()
    }
}

impl fmt::Display for BlankNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.id)
    }
}

impl Default for BlankNode {
    /// Builds a new RDF [blank node](https://www.w3.org/TR/rdf11-concepts/#dfn-blank-node) with a unique id.
    #[inline]
    fn default() -> Self {
        // The id must not start with a number to be also valid as a SPARQL variable name
        loop {
            let id = format!("{:x}", random::<u128>());
            if matches!(id.as_bytes().first(), Some(b'a'..=b'f')) {
                return Self::new_unchecked(id);
            }
        }
    }
}

fn validate_blank_node_identifier(id: &str) -> Result<(), BlankNodeIdParseError> {
    let mut chars = id.chars();
    let front = chars.next().ok_or(BlankNodeIdParseError)?;
    match front {
        '0'..='9'
        | '_'
        | 'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}' => (),
        _ => return Err(BlankNodeIdParseError),
    }
    for c in chars {
        match c {
            '.' // checked below
            | '-'
            | '0'..='9'
            | '\u{00B7}'
            | '\u{0300}'..='\u{036F}'
            | '\u{203F}'..='\u{2040}'
            | '_'
            | 'A'..='Z'
            | 'a'..='z'
            | '\u{00C0}'..='\u{00D6}'
            | '\u{00D8}'..='\u{00F6}'
            | '\u{00F8}'..='\u{02FF}'
            | '\u{0370}'..='\u{037D}'
            | '\u{037F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}' => (),
            _ => return Err(BlankNodeIdParseError),
        }
    }

    if id.ends_with('.') {
        Err(BlankNodeIdParseError)
    } else {
        Ok(())
    }
}

/// An error raised during [`BlankNode`] IDs validation.
#[derive(Debug, thiserror::Error)]
#[error("The blank node identifier is invalid")]
pub struct BlankNodeIdParseError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_partial() {
        let b = BlankNode::new("a42").unwrap();
        assert_eq!(b.as_str(), "a42");
        assert_eq!(b.to_string(), "_:a42");
    }

    #[test]
    fn labels_are_validated() {
        BlankNode::new("").unwrap_err();
        BlankNode::new("a.").unwrap_err();
        BlankNode::new("a b").unwrap_err();
        BlankNode::new("-a").unwrap_err();
        BlankNode::new("a.b-c").unwrap();
        BlankNode::new("0").unwrap();
    }

    #[test]
    fn equality_is_by_label_identity_is_by_instance() {
        let a = BlankNode::new_unchecked("b0");
        let b = BlankNode::new_unchecked("b0");
        assert_eq!(a, b);
        assert!(!a.is_same_node(&b));
        assert!(a.is_same_node(&a.clone()));
    }

    #[test]
    fn default_ids_are_fresh() {
        let a = BlankNode::default();
        let b = BlankNode::default();
        assert_ne!(a, b);
        assert!(matches!(a.as_str().as_bytes().first(), Some(b'a'..=b'f')));
    }
}
