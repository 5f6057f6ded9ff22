use crate::blank_node::BlankNode;
use crate::literal::Literal;
use crate::named_node::{NamedNode, NamedNodeRef};
use crate::variable::Variable;
use std::fmt;

/// An owned RDF [term](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-term) or SPARQL variable.
///
/// It is the value a SPARQL client puts into queries and reads back from results.
/// The default string formatter is returning a SPARQL token:
/// ```
/// use sparterm::{NamedNode, Term, Variable};
///
/// assert_eq!(
///     "<http://example.com>",
///     Term::from(NamedNode::new("http://example.com")?).to_string()
/// );
/// assert_eq!("?s", Term::from(Variable::new("s")?).to_string());
/// # Result::<_,Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub enum Term {
    NamedNode(NamedNode),
    BlankNode(BlankNode),
    Literal(Literal),
    Variable(Variable),
    Triple(Box<Triple>),
}

impl Term {
    #[inline]
    pub fn is_named_node(&self) -> bool {
        matches!(self, Self::NamedNode(_))
    }

    #[inline]
    pub fn is_blank_node(&self) -> bool {
        matches!(self, Self::BlankNode(_))
    }

    #[inline]
    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    #[inline]
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    #[inline]
    pub fn is_triple(&self) -> bool {
        matches!(self, Self::Triple(_))
    }

    /// Checks that the term contains no variable, including inside of nested triple terms.
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Variable(_) => false,
            Self::Triple(triple) => triple.is_ground(),
            Self::NamedNode(_) | Self::BlankNode(_) | Self::Literal(_) => true,
        }
    }

    /// Checks if the term is or contains a blank node.
    pub fn has_blank_nodes(&self) -> bool {
        match self {
            Self::BlankNode(_) => true,
            Self::Triple(triple) => triple.has_blank_nodes(),
            Self::NamedNode(_) | Self::Literal(_) | Self::Variable(_) => false,
        }
    }
}

impl fmt::Display for Term {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(node) => node.fmt(f),
            Self::BlankNode(node) => node.fmt(f),
            Self::Literal(literal) => literal.fmt(f),
            Self::Variable(variable) => variable.fmt(f),
            Self::Triple(triple) => write!(f, "<<( {triple} )>>"),
        }
    }
}

impl From<NamedNode> for Term {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::NamedNode(node)
    }
}

impl From<NamedNodeRef<'_>> for Term {
    #[inline]
    fn from(node: NamedNodeRef<'_>) -> Self {
        Self::NamedNode(node.into_owned())
    }
}

impl From<BlankNode> for Term {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::BlankNode(node)
    }
}

impl From<Literal> for Term {
    #[inline]
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<Variable> for Term {
    #[inline]
    fn from(variable: Variable) -> Self {
        Self::Variable(variable)
    }
}

impl From<Triple> for Term {
    #[inline]
    fn from(triple: Triple) -> Self {
        Self::Triple(Box::new(triple))
    }
}

impl From<Box<Triple>> for Term {
    #[inline]
    fn from(triple: Box<Triple>) -> Self {
        Self::Triple(triple)
    }
}

impl<'a> From<&'a str> for Term {
    /// Strings are promoted to simple literals.
    #[inline]
    fn from(value: &'a str) -> Self {
        Self::Literal(value.into())
    }
}

impl From<String> for Term {
    #[inline]
    fn from(value: String) -> Self {
        Self::Literal(value.into())
    }
}

impl From<bool> for Term {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Literal(value.into())
    }
}

impl From<i64> for Term {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Literal(value.into())
    }
}

impl From<i32> for Term {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Literal(value.into())
    }
}

impl From<f64> for Term {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Literal(value.into())
    }
}

impl PartialEq<NamedNode> for Term {
    #[inline]
    fn eq(&self, other: &NamedNode) -> bool {
        matches!(self, Self::NamedNode(node) if node == other)
    }
}

impl PartialEq<NamedNodeRef<'_>> for Term {
    #[inline]
    fn eq(&self, other: &NamedNodeRef<'_>) -> bool {
        matches!(self, Self::NamedNode(node) if node == other)
    }
}

impl PartialEq<Literal> for Term {
    #[inline]
    fn eq(&self, other: &Literal) -> bool {
        matches!(self, Self::Literal(literal) if literal == other)
    }
}

impl PartialEq<BlankNode> for Term {
    #[inline]
    fn eq(&self, other: &BlankNode) -> bool {
        matches!(self, Self::BlankNode(node) if node == other)
    }
}

/// An owned [RDF triple](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-triple), possibly holding variables.
///
/// The default string formatter is returning an N-Triples compatible representation (without the final `.`):
/// ```
/// use sparterm::{NamedNode, Triple};
///
/// assert_eq!(
///     "<http://example.com/s> <http://example.com/p> <http://example.com/o>",
///     Triple::new(
///         NamedNode::new("http://example.com/s")?,
///         NamedNode::new("http://example.com/p")?,
///         NamedNode::new("http://example.com/o")?,
///     )
///     .to_string()
/// );
/// # Result::<_,oxiri::IriParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct Triple {
    /// The [subject](https://www.w3.org/TR/rdf11-concepts/#dfn-subject) of this triple.
    pub subject: Term,
    /// The [predicate](https://www.w3.org/TR/rdf11-concepts/#dfn-predicate) of this triple.
    pub predicate: Term,
    /// The [object](https://www.w3.org/TR/rdf11-concepts/#dfn-object) of this triple.
    pub object: Term,
}

impl Triple {
    #[inline]
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Checks that none of the triple components is or contains a variable.
    #[inline]
    pub fn is_ground(&self) -> bool {
        self.subject.is_ground() && self.predicate.is_ground() && self.object.is_ground()
    }

    #[inline]
    pub fn has_blank_nodes(&self) -> bool {
        self.subject.has_blank_nodes()
            || self.predicate.has_blank_nodes()
            || self.object.has_blank_nodes()
    }
}

impl fmt::Display for Triple {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::xsd;

    #[test]
    fn triple_terms_are_wrapped() {
        let triple = Triple::new(
            BlankNode::new_unchecked("s"),
            NamedNode::new_unchecked("http://example.com/p"),
            Literal::new_typed_literal("1", xsd::INTEGER),
        );
        assert_eq!(
            Term::from(triple).to_string(),
            "<<( _:s <http://example.com/p> \"1\"^^<http://www.w3.org/2001/XMLSchema#integer> )>>"
        );
    }

    #[test]
    fn groundness() {
        let ex = NamedNode::new_unchecked("http://example.com");
        assert!(Triple::new(ex.clone(), ex.clone(), "o").is_ground());
        let nested = Triple::new(
            Triple::new(Variable::new_unchecked("s"), ex.clone(), ex.clone()),
            ex.clone(),
            ex,
        );
        assert!(!nested.is_ground());
        assert!(!nested.has_blank_nodes());
    }

    #[test]
    fn strings_are_literals() {
        assert_eq!(Term::from("foo"), Literal::new_simple_literal("foo"));
    }
}
