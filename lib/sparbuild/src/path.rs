use crate::error::ArgumentError;
use sparterm::{NamedNode, NamedNodeRef};
use std::fmt;

/// A [property path expression](https://www.w3.org/TR/sparql11-query/#defn_PropertyPathExpr).
///
/// The default string formatter is returning a SPARQL path, parenthesized only where the operator precedence requires it:
/// ```
/// use sparbuild::PropertyPathExpression;
/// use sparterm::NamedNode;
///
/// let p = NamedNode::new("http://example.com/p")?;
/// let q = NamedNode::new("http://example.com/q")?;
/// let path = PropertyPathExpression::ZeroOrMore(Box::new(PropertyPathExpression::Sequence(
///     Box::new(p.into()),
///     Box::new(q.into()),
/// )));
/// assert_eq!(
///     path.to_string(),
///     "(<http://example.com/p>/<http://example.com/q>)*"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum PropertyPathExpression {
    NamedNode(NamedNode),
    Reverse(Box<Self>),
    Sequence(Box<Self>, Box<Self>),
    Alternative(Box<Self>, Box<Self>),
    ZeroOrMore(Box<Self>),
    OneOrMore(Box<Self>),
    ZeroOrOne(Box<Self>),
    NegatedPropertySet(Vec<NamedNode>),
}

impl PropertyPathExpression {
    /// Builds a path from a token list.
    ///
    /// Operators are `^` and `!` (prefix), `/` and `|` (infix) and `*`, `+` and `?` (postfix).
    /// Nested token lists are parenthesized sub-paths.
    ///
    /// ```
    /// use sparbuild::{PathToken, PropertyPathExpression};
    /// use sparterm::NamedNode;
    ///
    /// let p = NamedNode::new("http://example.com/p")?;
    /// let q = NamedNode::new("http://example.com/q")?;
    /// let path = PropertyPathExpression::from_tokens(&[
    ///     "!".into(),
    ///     PathToken::Group(vec![p.into(), "|".into(), q.into()]),
    /// ])?;
    /// assert_eq!(
    ///     path,
    ///     PropertyPathExpression::NegatedPropertySet(vec![
    ///         NamedNode::new("http://example.com/p")?,
    ///         NamedNode::new("http://example.com/q")?
    ///     ])
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn from_tokens(tokens: &[PathToken]) -> Result<Self, ArgumentError> {
        let mut parser = TokenParser {
            tokens,
            position: 0,
        };
        let path = parser.parse_alternative()?;
        if let Some(token) = parser.tokens.get(parser.position) {
            return Err(ArgumentError::msg(format!(
                "Unexpected token {token} in property path"
            )));
        }
        Ok(path)
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Alternative(..) => 0,
            Self::Sequence(..) => 1,
            Self::Reverse(_) => 2,
            Self::ZeroOrMore(_) | Self::OneOrMore(_) | Self::ZeroOrOne(_) => 3,
            Self::NamedNode(_) | Self::NegatedPropertySet(_) => 4,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({self})")
        } else {
            fmt::Display::fmt(self, f)
        }
    }
}

impl fmt::Display for PropertyPathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(p) => p.fmt(f),
            Self::Reverse(p) => {
                f.write_str("^")?;
                p.fmt_operand(f, 3)
            }
            Self::Sequence(a, b) => {
                a.fmt_operand(f, 1)?;
                f.write_str("/")?;
                b.fmt_operand(f, 2)
            }
            Self::Alternative(a, b) => {
                a.fmt_operand(f, 0)?;
                f.write_str("|")?;
                b.fmt_operand(f, 1)
            }
            Self::ZeroOrMore(p) => {
                p.fmt_operand(f, 4)?;
                f.write_str("*")
            }
            Self::OneOrMore(p) => {
                p.fmt_operand(f, 4)?;
                f.write_str("+")
            }
            Self::ZeroOrOne(p) => {
                p.fmt_operand(f, 4)?;
                f.write_str("?")
            }
            Self::NegatedPropertySet(p) => {
                f.write_str("!(")?;
                for (i, c) in p.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    c.fmt(f)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<NamedNode> for PropertyPathExpression {
    fn from(p: NamedNode) -> Self {
        Self::NamedNode(p)
    }
}

impl From<NamedNodeRef<'_>> for PropertyPathExpression {
    fn from(p: NamedNodeRef<'_>) -> Self {
        Self::NamedNode(p.into_owned())
    }
}

impl TryFrom<Vec<PathToken>> for PropertyPathExpression {
    type Error = ArgumentError;

    fn try_from(tokens: Vec<PathToken>) -> Result<Self, Self::Error> {
        Self::from_tokens(&tokens)
    }
}

/// An element of a property path token list.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum PathToken {
    Iri(NamedNode),
    /// One of `^`, `!`, `/`, `|`, `*`, `+` or `?`.
    Op(String),
    /// A parenthesized sub-path.
    Group(Vec<PathToken>),
}

impl PathToken {
    fn is_op(&self, op: &str) -> bool {
        matches!(self, Self::Op(o) if o == op)
    }
}

impl fmt::Display for PathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iri(iri) => iri.fmt(f),
            Self::Op(op) => write!(f, "'{op}'"),
            Self::Group(tokens) => {
                f.write_str("[")?;
                for (i, t) in tokens.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    t.fmt(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<NamedNode> for PathToken {
    fn from(iri: NamedNode) -> Self {
        Self::Iri(iri)
    }
}

impl From<NamedNodeRef<'_>> for PathToken {
    fn from(iri: NamedNodeRef<'_>) -> Self {
        Self::Iri(iri.into_owned())
    }
}

impl From<&str> for PathToken {
    fn from(op: &str) -> Self {
        Self::Op(op.into())
    }
}

impl From<Vec<PathToken>> for PathToken {
    fn from(tokens: Vec<PathToken>) -> Self {
        Self::Group(tokens)
    }
}

struct TokenParser<'a> {
    tokens: &'a [PathToken],
    position: usize,
}

impl<'a> TokenParser<'a> {
    fn peek_is_op(&self, op: &str) -> bool {
        self.tokens
            .get(self.position)
            .is_some_and(|t| t.is_op(op))
    }

    fn next(&mut self) -> Option<&'a PathToken> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn parse_alternative(&mut self) -> Result<PropertyPathExpression, ArgumentError> {
        let mut path = self.parse_sequence()?;
        while self.peek_is_op("|") {
            self.position += 1;
            path = PropertyPathExpression::Alternative(
                Box::new(path),
                Box::new(self.parse_sequence()?),
            );
        }
        Ok(path)
    }

    fn parse_sequence(&mut self) -> Result<PropertyPathExpression, ArgumentError> {
        let mut path = self.parse_elt_or_inverse()?;
        while self.peek_is_op("/") {
            self.position += 1;
            path = PropertyPathExpression::Sequence(
                Box::new(path),
                Box::new(self.parse_elt_or_inverse()?),
            );
        }
        Ok(path)
    }

    fn parse_elt_or_inverse(&mut self) -> Result<PropertyPathExpression, ArgumentError> {
        if self.peek_is_op("^") {
            self.position += 1;
            Ok(PropertyPathExpression::Reverse(Box::new(self.parse_elt()?)))
        } else {
            self.parse_elt()
        }
    }

    fn parse_elt(&mut self) -> Result<PropertyPathExpression, ArgumentError> {
        let primary = self.parse_primary()?;
        Ok(if self.peek_is_op("*") {
            self.position += 1;
            PropertyPathExpression::ZeroOrMore(Box::new(primary))
        } else if self.peek_is_op("+") {
            self.position += 1;
            PropertyPathExpression::OneOrMore(Box::new(primary))
        } else if self.peek_is_op("?") {
            self.position += 1;
            PropertyPathExpression::ZeroOrOne(Box::new(primary))
        } else {
            primary
        })
    }

    fn parse_primary(&mut self) -> Result<PropertyPathExpression, ArgumentError> {
        match self.next() {
            Some(PathToken::Iri(iri)) => Ok(iri.clone().into()),
            Some(PathToken::Group(tokens)) => PropertyPathExpression::from_tokens(tokens),
            Some(PathToken::Op(op)) if op == "!" => match self.next() {
                Some(PathToken::Iri(iri)) => {
                    Ok(PropertyPathExpression::NegatedPropertySet(vec![iri.clone()]))
                }
                Some(PathToken::Group(tokens)) => parse_negated_property_set(tokens),
                Some(token) => Err(ArgumentError::msg(format!(
                    "Unexpected token {token} after '!' in property path"
                ))),
                None => Err(ArgumentError::msg("Unexpected end of property path after '!'")),
            },
            Some(PathToken::Op(op)) => Err(ArgumentError::msg(format!(
                "Unexpected operator '{op}' in property path"
            ))),
            None => Err(ArgumentError::msg("Unexpected end of property path")),
        }
    }
}

fn parse_negated_property_set(
    tokens: &[PathToken],
) -> Result<PropertyPathExpression, ArgumentError> {
    let mut set = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        match token {
            PathToken::Iri(iri) if i % 2 == 0 => set.push(iri.clone()),
            PathToken::Op(op) if i % 2 == 1 && op == "|" => (),
            token => {
                return Err(ArgumentError::msg(format!(
                    "Unexpected token {token} in negated property set"
                )));
            }
        }
    }
    if set.is_empty() || tokens.len() % 2 == 0 {
        return Err(ArgumentError::msg(
            "A negated property set must be a '|' separated list of IRIs",
        ));
    }
    Ok(PropertyPathExpression::NegatedPropertySet(set))
}
