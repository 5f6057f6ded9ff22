use oxiri::{Iri, IriParseError};
use std::fmt;

/// An RDF [IRI](https://www.w3.org/TR/rdf11-concepts/#dfn-iri).
///
/// `Display` gives the `<...>` token, with the characters SPARQL forbids in IRI references written as `\u` escapes:
/// ```
/// use sparterm::NamedNode;
///
/// assert_eq!(
///     NamedNode::new("http://example.com/foo")?.to_string(),
///     "<http://example.com/foo>"
/// );
/// # Result::<_, oxiri::IriParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct NamedNode(String);

impl NamedNode {
    /// Builds a named node from an absolute IRI, validated with [`oxiri`].
    pub fn new(iri: impl Into<String>) -> Result<Self, IriParseError> {
        Iri::parse(iri.into()).map(|iri| Self(iri.into_inner()))
    }

    /// Builds a named node without validation.
    ///
    /// Values coming from the network should go through [`NamedNode::new`].
    #[inline]
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn as_ref(&self) -> NamedNodeRef<'_> {
        NamedNodeRef(&self.0)
    }
}

impl fmt::Display for NamedNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_iri(&self.0, f)
    }
}

impl PartialEq<str> for NamedNode {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NamedNode {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A named node borrowing its IRI, usable in `const` items such as the [`vocab`](crate::vocab) constants.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Copy, Hash)]
pub struct NamedNodeRef<'a>(&'a str);

impl<'a> NamedNodeRef<'a> {
    /// Builds a named node reference without validation.
    #[inline]
    pub const fn new_unchecked(iri: &'a str) -> Self {
        Self(iri)
    }

    #[inline]
    pub const fn as_str(self) -> &'a str {
        self.0
    }

    #[inline]
    pub fn into_owned(self) -> NamedNode {
        NamedNode(self.0.to_owned())
    }
}

impl fmt::Display for NamedNodeRef<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_iri(self.0, f)
    }
}

impl From<NamedNodeRef<'_>> for NamedNode {
    #[inline]
    fn from(node: NamedNodeRef<'_>) -> Self {
        node.into_owned()
    }
}

impl<'a> From<&'a NamedNode> for NamedNodeRef<'a> {
    #[inline]
    fn from(node: &'a NamedNode) -> Self {
        node.as_ref()
    }
}

impl PartialEq<NamedNode> for NamedNodeRef<'_> {
    #[inline]
    fn eq(&self, other: &NamedNode) -> bool {
        self.0 == other.0
    }
}

impl PartialEq<NamedNodeRef<'_>> for NamedNode {
    #[inline]
    fn eq(&self, other: &NamedNodeRef<'_>) -> bool {
        self.0 == other.0
    }
}

fn write_iri(iri: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("<")?;
    for c in iri.chars() {
        if matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' | '\0'..=' ' | '\u{7f}') {
            write!(f, "\\u{:04X}", u32::from(c))?;
        } else {
            fmt::Write::write_char(f, c)?;
        }
    }
    f.write_str(">")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_iri_is_rejected() {
        NamedNode::new("not an iri").unwrap_err();
        NamedNode::new("http://example.com/a b").unwrap_err();
    }

    #[test]
    fn unsafe_characters_are_escaped() {
        assert_eq!(
            NamedNode::new_unchecked("http://example.com/<a>").to_string(),
            "<http://example.com/\\u003Ca\\u003E>"
        );
        assert_eq!(
            NamedNodeRef::new_unchecked("http://example.com/a b").to_string(),
            "<http://example.com/a\\u0020b>"
        );
    }

    #[test]
    fn compares_with_strings_and_references() {
        let node = NamedNode::new_unchecked("http://example.com");
        assert_eq!(node, "http://example.com");
        assert_eq!(NamedNodeRef::new_unchecked("http://example.com"), node);
        assert_eq!(node.as_ref().into_owned(), node);
    }
}
