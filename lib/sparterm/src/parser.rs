//! Reading of terms written in the [N-Triples](https://www.w3.org/TR/rdf12-n-triples/) syntax.
//!
//! This is the syntax of TSV result cells and of N-Triples documents:
//! `<iri>`, `_:label`, `"lexical form"` with an optional `@lang` or `^^<datatype>` suffix and `<<( s p o )>>` triple terms.
//! Blank nodes are built from their label only, callers resolve them through a [`BlankNodeMap`](crate::BlankNodeMap).

use crate::blank_node::{BlankNode, BlankNodeIdParseError};
use crate::literal::Literal;
use crate::named_node::NamedNode;
use crate::triple::{Term, Triple};
use oxilangtag::LanguageTagParseError;
use oxiri::IriParseError;
use std::str::{Chars, FromStr};

const MAX_TRIPLE_TERM_DEPTH: usize = 128;

impl FromStr for NamedNode {
    type Err = TermParseError;

    /// ```
    /// use sparterm::NamedNode;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(
    ///     NamedNode::from_str("<http://example.com/\\u00E9>")?,
    ///     NamedNode::new("http://example.com/\u{e9}")?
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut reader = TermReader::new(s);
        let node = reader.named_node()?;
        reader.finish()?;
        Ok(node)
    }
}

impl FromStr for BlankNode {
    type Err = TermParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut reader = TermReader::new(s);
        let node = reader.blank_node()?;
        reader.finish()?;
        Ok(node)
    }
}

impl FromStr for Literal {
    type Err = TermParseError;

    /// ```
    /// use sparterm::Literal;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(
    ///     Literal::from_str("\"chat\"@FR")?,
    ///     Literal::new_language_tagged_literal("chat", "fr")?
    /// );
    /// assert!(Literal::from_str("12").is_err());
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut reader = TermReader::new(s);
        let literal = reader.literal()?;
        reader.finish()?;
        Ok(literal)
    }
}

impl FromStr for Term {
    type Err = TermParseError;

    /// ```
    /// use sparterm::{BlankNode, NamedNode, Term, Triple};
    /// use std::str::FromStr;
    ///
    /// assert_eq!(
    ///     Term::from_str("<<( _:a <http://example.com/p> \"o\" )>>")?,
    ///     Term::from(Triple::new(
    ///         BlankNode::new("a")?,
    ///         NamedNode::new("http://example.com/p")?,
    ///         "o"
    ///     ))
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut reader = TermReader::new(s);
        let term = reader.term()?;
        reader.finish()?;
        Ok(term)
    }
}

impl FromStr for Triple {
    type Err = TermParseError;

    /// Reads an N-Triples statement, the final `.` being optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut reader = TermReader::new(s);
        let triple = reader.triple()?;
        reader.skip_whitespace();
        reader.eat(".");
        reader.finish()?;
        Ok(triple)
    }
}

/// A cursor over the text left to read.
struct TermReader<'a> {
    rest: &'a str,
    depth: usize,
}

impl<'a> TermReader<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            rest: input.trim_start(),
            depth: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, token: &str) -> bool {
        if let Some(rest) = self.rest.strip_prefix(token) {
            self.rest = rest;
            true
        } else {
            false
        }
    }

    fn finish(mut self) -> Result<(), TermParseError> {
        self.skip_whitespace();
        if self.rest.is_empty() {
            Ok(())
        } else {
            Err(TermParseError::msg(format!(
                "Unexpected content after the term: '{}'",
                self.rest
            )))
        }
    }

    fn term(&mut self) -> Result<Term, TermParseError> {
        self.skip_whitespace();
        if self.eat("<<(") {
            if self.depth == MAX_TRIPLE_TERM_DEPTH {
                return Err(TermParseError::msg("Too many nested triple terms"));
            }
            self.depth += 1;
            let triple = self.triple()?;
            self.skip_whitespace();
            if !self.eat(")>>") {
                return Err(TermParseError::msg("Triple terms should end with )>>"));
            }
            self.depth -= 1;
            return Ok(triple.into());
        }
        match self.rest.chars().next() {
            Some('<') => Ok(self.named_node()?.into()),
            Some('"') => Ok(self.literal()?.into()),
            Some('_') => Ok(self.blank_node()?.into()),
            Some(_) => Err(TermParseError::msg(format!(
                "Expecting <iri>, _:label, a quoted literal or <<( triple )>>, found '{}'",
                self.rest
            ))),
            None => Err(TermParseError::msg("Expecting a term, found nothing")),
        }
    }

    fn triple(&mut self) -> Result<Triple, TermParseError> {
        let subject = self.term()?;
        if subject.is_literal() {
            return Err(TermParseError::msg("A literal can not be a triple subject"));
        }
        self.skip_whitespace();
        let predicate = self.named_node()?;
        let object = self.term()?;
        Ok(Triple::new(subject, predicate, object))
    }

    fn named_node(&mut self) -> Result<NamedNode, TermParseError> {
        self.skip_whitespace();
        if !self.eat("<") {
            return Err(TermParseError::msg("IRIs should start with <"));
        }
        let Some((raw, rest)) = self.rest.split_once('>') else {
            return Err(TermParseError::msg("IRIs should end with >"));
        };
        self.rest = rest;
        let iri = if raw.contains('\\') {
            unescape_iri(raw)?
        } else {
            raw.to_owned()
        };
        NamedNode::new(iri.as_str())
            .map_err(|error| TermParseErrorKind::Iri { value: iri, error }.into())
    }

    fn blank_node(&mut self) -> Result<BlankNode, TermParseError> {
        self.skip_whitespace();
        if !self.eat("_:") {
            return Err(TermParseError::msg("Blank nodes should start with _:"));
        }
        let mut end = self
            .rest
            .find(|c: char| c.is_whitespace() || matches!(c, '<' | '"' | '(' | ')'))
            .unwrap_or(self.rest.len());
        // A label can contain dots but not end with one.
        while self.rest[..end].ends_with('.') {
            end -= 1;
        }
        let (label, rest) = self.rest.split_at(end);
        self.rest = rest;
        BlankNode::new(label).map_err(|error| {
            TermParseErrorKind::BlankNode {
                value: label.to_owned(),
                error,
            }
            .into()
        })
    }

    fn literal(&mut self) -> Result<Literal, TermParseError> {
        self.skip_whitespace();
        if !self.eat("\"") {
            return Err(TermParseError::msg("Literals should start with \""));
        }
        let mut value = String::new();
        let mut chars = self.rest.chars();
        loop {
            match chars.next() {
                None => return Err(TermParseError::msg("Unterminated literal")),
                Some('"') => break,
                Some('\\') => value.push(read_escape(&mut chars)?),
                Some(c) => value.push(c),
            }
        }
        self.rest = chars.as_str();
        if self.eat("@") {
            let end = self
                .rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                .unwrap_or(self.rest.len());
            let (language, rest) = self.rest.split_at(end);
            self.rest = rest;
            Literal::new_language_tagged_literal(value, language).map_err(|error| {
                TermParseErrorKind::LanguageTag {
                    value: language.to_owned(),
                    error,
                }
                .into()
            })
        } else if self.eat("^^") {
            Ok(Literal::new_typed_literal(value, self.named_node()?))
        } else {
            Ok(Literal::new_simple_literal(value))
        }
    }
}

/// IRIs only allow `\u` and `\U` escapes.
fn unescape_iri(raw: &str) -> Result<String, TermParseError> {
    let mut iri = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            iri.push(c);
            continue;
        }
        iri.push(match chars.next() {
            Some('u') => read_code_point(&mut chars, 4)?,
            Some('U') => read_code_point(&mut chars, 8)?,
            _ => return Err(TermParseError::msg("Only \\u and \\U escapes are allowed in IRIs")),
        });
    }
    Ok(iri)
}

fn read_escape(chars: &mut Chars<'_>) -> Result<char, TermParseError> {
    Ok(match chars.next() {
        Some('t') => '\t',
        Some('b') => '\u{08}',
        Some('n') => '\n',
        Some('r') => '\r',
        Some('f') => '\u{0c}',
        Some(c @ ('"' | '\'' | '\\')) => c,
        Some('u') => read_code_point(chars, 4)?,
        Some('U') => read_code_point(chars, 8)?,
        Some(c) => return Err(TermParseError::msg(format!("Invalid escape sequence \\{c}"))),
        None => return Err(TermParseError::msg("Unterminated literal")),
    })
}

fn read_code_point(chars: &mut Chars<'_>, len: usize) -> Result<char, TermParseError> {
    let digits = chars.as_str().get(..len).unwrap_or_default();
    let code_point = if digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        u32::from_str_radix(digits, 16).ok()
    } else {
        None
    }
    .ok_or_else(|| {
        TermParseError::msg(format!("Expecting {len} hexadecimal digits, found '{digits}'"))
    })?;
    for _ in 0..len {
        chars.next();
    }
    char::from_u32(code_point).ok_or_else(|| {
        TermParseError::msg(format!("U+{code_point:X} is not a valid code point"))
    })
}

/// An error raised when reading a term with the [`FromStr`] trait.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct TermParseError(#[from] TermParseErrorKind);

#[derive(Debug, thiserror::Error)]
enum TermParseErrorKind {
    #[error("Invalid IRI '{value}': {error}")]
    Iri { error: IriParseError, value: String },
    #[error("Invalid blank node label '{value}': {error}")]
    BlankNode {
        error: BlankNodeIdParseError,
        value: String,
    },
    #[error("Invalid language tag '{value}': {error}")]
    LanguageTag {
        error: LanguageTagParseError,
        value: String,
    },
    #[error("{0}")]
    Msg(String),
}

impl TermParseError {
    fn msg(msg: impl Into<String>) -> Self {
        Self(TermParseErrorKind::Msg(msg.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes() -> Result<(), TermParseError> {
        assert_eq!(
            Term::from_str(r#""a\tb\"\u00E9\U0001F600""#)?,
            Term::from("a\tb\"\u{e9}\u{1f600}")
        );
        assert_eq!(
            Term::from_str(r"<http://example.com/\u00e9>")?,
            Term::from(NamedNode::new_unchecked("http://example.com/\u{e9}"))
        );
        Term::from_str(r#""\u00G9""#).unwrap_err();
        Term::from_str(r#""\uD800""#).unwrap_err();
        Term::from_str(r"<http://example.com/\n>").unwrap_err();
        Ok(())
    }

    #[test]
    fn typed_and_tagged_literals() -> Result<(), TermParseError> {
        assert_eq!(
            Literal::from_str("\"1\"^^<http://www.w3.org/2001/XMLSchema#integer>")?,
            Literal::from(1)
        );
        assert_eq!(Literal::from_str("\"a\"@en-GB")?.language(), Some("en-gb"));
        Literal::from_str("\"a\"@").unwrap_err();
        Ok(())
    }

    #[test]
    fn triple_terms() -> Result<(), TermParseError> {
        let nested = Term::from_str(
            "<<( <<( _:a <http://example.com/p> _:b )>> <http://example.com/p> \"o\" )>>",
        )?;
        let Term::Triple(triple) = nested else {
            panic!("triple term expected")
        };
        assert!(triple.subject.is_triple());
        Term::from_str("<<( \"s\" <http://example.com/p> \"o\" )>>").unwrap_err();
        Term::from_str("<<( _:a <http://example.com/p> \"o\"").unwrap_err();
        let deep = format!(
            "{}_:a{}",
            "<<( ".repeat(MAX_TRIPLE_TERM_DEPTH + 1),
            " <http://example.com/p> _:b )>>".repeat(MAX_TRIPLE_TERM_DEPTH + 1)
        );
        Term::from_str(&deep).unwrap_err();
        Ok(())
    }

    #[test]
    fn statements() -> Result<(), TermParseError> {
        let triple = Triple::from_str("_:s.1 <http://example.com/p> _:o.")?;
        assert_eq!(triple.subject, Term::from(BlankNode::new_unchecked("s.1")));
        assert_eq!(triple.object, Term::from(BlankNode::new_unchecked("o")));
        Triple::from_str("_:s \"p\" _:o .").unwrap_err();
        Ok(())
    }

    #[test]
    fn only_terms_are_read() {
        for input in ["12", "true", "?s", "<http://example.com", "\"a\" \"b\"", "_:a b", ""] {
            assert!(Term::from_str(input).is_err(), "{input} should be rejected");
        }
    }
}
