use crate::named_node::{NamedNode, NamedNodeRef};
use crate::vocab::{rdf, xsd};
use oxilangtag::{LanguageTag, LanguageTagParseError};
use std::fmt::{self, Write};

/// An RDF [literal](https://www.w3.org/TR/rdf11-concepts/#dfn-literal): a lexical form with either a language tag or a datatype.
///
/// `Display` writes the form used both in N-Triples and in SPARQL query text:
/// ```
/// use sparterm::vocab::xsd;
/// use sparterm::Literal;
///
/// assert_eq!(
///     Literal::new_simple_literal("foo\nbar").to_string(),
///     "\"foo\\nbar\""
/// );
/// assert_eq!(
///     Literal::new_typed_literal("1999-01-01", xsd::DATE).to_string(),
///     r#""1999-01-01"^^<http://www.w3.org/2001/XMLSchema#date>"#
/// );
/// assert_eq!(
///     Literal::new_language_tagged_literal("foo", "EN")?.to_string(),
///     r#""foo"@en"#
/// );
/// # Result::<(), sparterm::LanguageTagParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct Literal {
    value: String,
    kind: LiteralKind,
}

/// `xsd:string` is never stored as `Typed` so that equality stays structural.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
enum LiteralKind {
    Simple,
    Language(String),
    Typed(NamedNode),
}

impl Literal {
    #[inline]
    pub fn new_simple_literal(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Simple,
        }
    }

    /// Builds a literal with the given datatype, `xsd:string` giving back a simple literal.
    #[inline]
    pub fn new_typed_literal(value: impl Into<String>, datatype: impl Into<NamedNode>) -> Self {
        let datatype = datatype.into();
        Self {
            value: value.into(),
            kind: if datatype == xsd::STRING {
                LiteralKind::Simple
            } else {
                LiteralKind::Typed(datatype)
            },
        }
    }

    /// Builds a language-tagged string.
    ///
    /// The tag must be valid [BCP47](https://tools.ietf.org/html/bcp47). It is stored lowercased.
    pub fn new_language_tagged_literal(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, LanguageTagParseError> {
        let language = LanguageTag::parse(language.into().to_ascii_lowercase())?;
        Ok(Self::new_language_tagged_literal_unchecked(
            value,
            language.into_inner(),
        ))
    }

    /// Same as [`Literal::new_language_tagged_literal`] without the tag validation and normalization.
    #[inline]
    pub fn new_language_tagged_literal_unchecked(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            value: value.into(),
            kind: LiteralKind::Language(language.into()),
        }
    }

    /// The lexical form.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[inline]
    pub fn language(&self) -> Option<&str> {
        if let LiteralKind::Language(language) = &self.kind {
            Some(language)
        } else {
            None
        }
    }

    /// The datatype IRI: `rdf:langString` for language-tagged strings and `xsd:string` for simple literals.
    #[inline]
    pub fn datatype(&self) -> NamedNodeRef<'_> {
        match &self.kind {
            LiteralKind::Simple => xsd::STRING,
            LiteralKind::Language(_) => rdf::LANG_STRING,
            LiteralKind::Typed(datatype) => datatype.as_ref(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_quoted(&self.value, f)?;
        match &self.kind {
            LiteralKind::Simple => Ok(()),
            LiteralKind::Language(language) => write!(f, "@{language}"),
            LiteralKind::Typed(datatype) => write!(f, "^^{datatype}"),
        }
    }
}

impl From<&str> for Literal {
    #[inline]
    fn from(value: &str) -> Self {
        Self::new_simple_literal(value)
    }
}

impl From<String> for Literal {
    #[inline]
    fn from(value: String) -> Self {
        Self::new_simple_literal(value)
    }
}

impl From<bool> for Literal {
    #[inline]
    fn from(value: bool) -> Self {
        Self::new_typed_literal(if value { "true" } else { "false" }, xsd::BOOLEAN)
    }
}

impl From<i64> for Literal {
    #[inline]
    fn from(value: i64) -> Self {
        Self::new_typed_literal(value.to_string(), xsd::INTEGER)
    }
}

impl From<i32> for Literal {
    #[inline]
    fn from(value: i32) -> Self {
        i64::from(value).into()
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        let lexical = if value == f64::INFINITY {
            "INF".to_owned()
        } else if value == f64::NEG_INFINITY {
            "-INF".to_owned()
        } else {
            value.to_string()
        };
        Self::new_typed_literal(lexical, xsd::DOUBLE)
    }
}

/// Writes `value` between double quotes with the escapes shared by N-Triples and SPARQL strings.
fn write_quoted(value: &str, f: &mut impl Write) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        let escape = match c {
            '"' => "\\\"",
            '\\' => "\\\\",
            '\n' => "\\n",
            '\r' => "\\r",
            '\t' => "\\t",
            '\u{08}' => "\\b",
            '\u{0c}' => "\\f",
            '\0'..='\u{1f}' | '\u{7f}' => {
                write!(f, "\\u{:04X}", u32::from(c))?;
                continue;
            }
            c => {
                f.write_char(c)?;
                continue;
            }
        };
        f.write_str(escape)?;
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xsd_string_is_a_simple_literal() {
        assert_eq!(
            Literal::new_simple_literal("foo"),
            Literal::new_typed_literal("foo", xsd::STRING)
        );
        assert_eq!(Literal::from("foo").datatype(), xsd::STRING);
    }

    #[test]
    fn language_tags_are_normalized() {
        let literal = Literal::new_language_tagged_literal("foo", "EN-us").unwrap();
        assert_eq!(literal.language(), Some("en-us"));
        assert_eq!(literal.datatype(), rdf::LANG_STRING);
        assert_eq!(literal.value(), "foo");
        Literal::new_language_tagged_literal("foo", "not a tag").unwrap_err();
    }

    #[test]
    fn escapes() {
        assert_eq!(
            Literal::new_simple_literal("\"\\\n\r\t\u{8}\u{c}\u{1}").to_string(),
            "\"\\\"\\\\\\n\\r\\t\\b\\f\\u0001\""
        );
    }

    #[test]
    fn native_values() {
        assert_eq!(Literal::from(f64::INFINITY).value(), "INF");
        assert_eq!(Literal::from(f64::NEG_INFINITY).value(), "-INF");
        assert_eq!(Literal::from(1.5).value(), "1.5");
        assert_eq!(Literal::from(-3).to_string(), "\"-3\"^^<http://www.w3.org/2001/XMLSchema#integer>");
        assert_eq!(Literal::from(true).datatype(), xsd::BOOLEAN);
    }
}
