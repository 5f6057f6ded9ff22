use crate::error::ArgumentError;
use crate::path::{PathToken, PropertyPathExpression};
use crate::serializer::{TermMode, write_pattern};
use sparterm::{BlankNode, Literal, NamedNode, NamedNodeRef, Term, Triple, Variable};
use std::fmt;

/// The union of [IRIs](https://www.w3.org/TR/rdf11-concepts/#dfn-iri) and [variables](https://www.w3.org/TR/sparql11-query/#sparqlQueryVariables).
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum NamedNodePattern {
    NamedNode(NamedNode),
    Variable(Variable),
}

impl fmt::Display for NamedNodePattern {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(node) => node.fmt(f),
            Self::Variable(var) => var.fmt(f),
        }
    }
}

impl From<NamedNode> for NamedNodePattern {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::NamedNode(node)
    }
}

impl From<NamedNodeRef<'_>> for NamedNodePattern {
    #[inline]
    fn from(node: NamedNodeRef<'_>) -> Self {
        Self::NamedNode(node.into_owned())
    }
}

impl From<Variable> for NamedNodePattern {
    #[inline]
    fn from(var: Variable) -> Self {
        Self::Variable(var)
    }
}

/// What may stand in the predicate position of a [`TriplePattern`].
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Predicate {
    NamedNode(NamedNode),
    Variable(Variable),
    Path(PropertyPathExpression),
}

impl From<NamedNodePattern> for Predicate {
    #[inline]
    fn from(pattern: NamedNodePattern) -> Self {
        match pattern {
            NamedNodePattern::NamedNode(node) => Self::NamedNode(node),
            NamedNodePattern::Variable(var) => Self::Variable(var),
        }
    }
}

/// A [triple pattern](https://www.w3.org/TR/sparql11-query/#defn_TriplePattern), optionally scoped to a graph.
///
/// The default string formatter is returning the SPARQL pattern followed by ` .`:
/// ```
/// use sparbuild::TriplePattern;
/// use sparterm::vocab::rdf;
/// use sparterm::{NamedNode, Variable};
///
/// let pattern = TriplePattern::new(
///     Variable::new("s")?,
///     rdf::TYPE,
///     NamedNode::new("http://schema.org/Person")?,
/// )?;
/// assert_eq!(pattern.to_string(), "?s a <http://schema.org/Person> .");
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: Predicate,
    pub object: Term,
    /// The graph the pattern is evaluated against, wrapping it in a `GRAPH` block.
    pub graph_name: Option<NamedNodePattern>,
}

impl TriplePattern {
    /// Builds a pattern, rejecting predicates that are not IRIs, variables or paths.
    pub fn new(
        subject: impl Into<Term>,
        predicate: impl Into<RawPredicate>,
        object: impl Into<Term>,
    ) -> Result<Self, ArgumentError> {
        Ok(Self {
            subject: subject.into(),
            predicate: predicate.into().build()?,
            object: object.into(),
            graph_name: None,
        })
    }

    #[inline]
    #[must_use]
    pub fn with_graph(mut self, graph_name: impl Into<NamedNodePattern>) -> Self {
        self.graph_name = Some(graph_name.into());
        self
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pattern(self, TermMode::default(), f)
    }
}

/// A loosely typed predicate, validated when the pattern is built.
#[derive(Debug, Clone)]
pub enum RawPredicate {
    Term(Term),
    /// A property path token list, see [`PropertyPathExpression::from_tokens()`].
    Tokens(Vec<PathToken>),
    Path(PropertyPathExpression),
}

impl RawPredicate {
    fn build(self) -> Result<Predicate, ArgumentError> {
        match self {
            Self::Term(Term::NamedNode(node)) => Ok(Predicate::NamedNode(node)),
            Self::Term(Term::Variable(var)) => Ok(Predicate::Variable(var)),
            Self::Term(Term::Literal(literal)) => Err(ArgumentError::msg(format!(
                "The literal {literal} is not allowed in predicate position"
            ))),
            Self::Term(term) => Err(ArgumentError::msg(format!(
                "{term} is not allowed in predicate position"
            ))),
            Self::Tokens(tokens) => Ok(Predicate::Path(PropertyPathExpression::from_tokens(
                &tokens,
            )?)),
            Self::Path(path) => Ok(Predicate::Path(path)),
        }
    }
}

impl From<Term> for RawPredicate {
    #[inline]
    fn from(term: Term) -> Self {
        Self::Term(term)
    }
}

impl From<NamedNode> for RawPredicate {
    #[inline]
    fn from(node: NamedNode) -> Self {
        Self::Term(node.into())
    }
}

impl From<NamedNodeRef<'_>> for RawPredicate {
    #[inline]
    fn from(node: NamedNodeRef<'_>) -> Self {
        Self::Term(node.into())
    }
}

impl From<Variable> for RawPredicate {
    #[inline]
    fn from(var: Variable) -> Self {
        Self::Term(var.into())
    }
}

impl From<BlankNode> for RawPredicate {
    #[inline]
    fn from(node: BlankNode) -> Self {
        Self::Term(node.into())
    }
}

impl From<Literal> for RawPredicate {
    #[inline]
    fn from(literal: Literal) -> Self {
        Self::Term(literal.into())
    }
}

impl From<NamedNodePattern> for RawPredicate {
    #[inline]
    fn from(pattern: NamedNodePattern) -> Self {
        match pattern {
            NamedNodePattern::NamedNode(node) => node.into(),
            NamedNodePattern::Variable(var) => var.into(),
        }
    }
}

impl From<Vec<PathToken>> for RawPredicate {
    #[inline]
    fn from(tokens: Vec<PathToken>) -> Self {
        Self::Tokens(tokens)
    }
}

impl From<PropertyPathExpression> for RawPredicate {
    #[inline]
    fn from(path: PropertyPathExpression) -> Self {
        Self::Path(path)
    }
}

/// A pattern given either already typed or as a `(subject, predicate, object)` tuple.
#[derive(Debug, Clone)]
pub enum RawPattern {
    Pattern(TriplePattern),
    Tuple {
        subject: Term,
        predicate: RawPredicate,
        object: Term,
    },
}

impl RawPattern {
    pub fn build(self) -> Result<TriplePattern, ArgumentError> {
        match self {
            Self::Pattern(pattern) => Ok(pattern),
            Self::Tuple {
                subject,
                predicate,
                object,
            } => TriplePattern::new(subject, predicate, object),
        }
    }
}

impl From<TriplePattern> for RawPattern {
    #[inline]
    fn from(pattern: TriplePattern) -> Self {
        Self::Pattern(pattern)
    }
}

impl From<Triple> for RawPattern {
    #[inline]
    fn from(triple: Triple) -> Self {
        Self::Tuple {
            subject: triple.subject,
            predicate: triple.predicate.into(),
            object: triple.object,
        }
    }
}

impl<S: Into<Term>, P: Into<RawPredicate>, O: Into<Term>> From<(S, P, O)> for RawPattern {
    #[inline]
    fn from((subject, predicate, object): (S, P, O)) -> Self {
        Self::Tuple {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }
}

/// Normalizes a list of typed patterns and tuples.
///
/// Fails on the first pattern with a literal (or any other non IRI, non variable, non path) predicate.
///
/// ```
/// use sparbuild::{PathToken, build_patterns};
/// use sparterm::{NamedNode, Variable};
///
/// let s = Variable::new("s")?;
/// let o = Variable::new("o")?;
/// let p = NamedNode::new("http://example.com/p")?;
/// let patterns = build_patterns([(s, vec![PathToken::from("^"), p.into()], o)])?;
/// assert_eq!(patterns[0].to_string(), "?s ^<http://example.com/p> ?o .");
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn build_patterns<I>(raw: I) -> Result<Vec<TriplePattern>, ArgumentError>
where
    I: IntoIterator,
    I::Item: Into<RawPattern>,
{
    raw.into_iter().map(|p| p.into().build()).collect()
}
