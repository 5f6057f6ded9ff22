use json_event_parser::JsonSyntaxError;
use sparterm::TermParseError;
use std::io;
use std::sync::Arc;

/// Error returned while decoding a SPARQL query results document.
///
/// Decoding errors are never swallowed: a malformed document does not give an empty solution set.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct DecodeError(#[from] DecodeErrorKind);

#[derive(Debug, thiserror::Error)]
enum DecodeErrorKind {
    #[error(transparent)]
    Json(#[from] JsonSyntaxError),
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("Error {error} on '{term}' in line {}", line + 1)]
    Term {
        #[source]
        error: TermParseError,
        term: String,
        line: u64,
    },
    #[error("{msg}")]
    Msg { msg: String, line: Option<u64> },
    #[error("No reader is available for the content type '{0}'")]
    UnsupportedContentType(String),
}

impl DecodeError {
    /// Builds an error from a printable error message.
    pub(crate) fn msg(msg: impl Into<String>) -> Self {
        Self(DecodeErrorKind::Msg {
            msg: msg.into(),
            line: None,
        })
    }

    /// Builds an error from a printable error message and the line (starting from 0) it applies to.
    pub(crate) fn located_message(msg: impl Into<String>, line: u64) -> Self {
        Self(DecodeErrorKind::Msg {
            msg: msg.into(),
            line: Some(line),
        })
    }

    pub(crate) fn term(error: TermParseError, term: impl Into<String>, line: u64) -> Self {
        Self(DecodeErrorKind::Term {
            error,
            term: term.into(),
            line,
        })
    }

    pub(crate) fn unsupported_content_type(content_type: impl Into<String>) -> Self {
        Self(DecodeErrorKind::UnsupportedContentType(content_type.into()))
    }

    /// Is the error caused by a content type no decoder or RDF reader is able to read?
    ///
    /// ```
    /// use sparresults::ResultsDecoder;
    /// use sparterm::BlankNodeMap;
    ///
    /// let error = ResultsDecoder::new()
    ///     .decode(Some("image/png"), b"", &mut BlankNodeMap::new())
    ///     .unwrap_err();
    /// assert!(error.is_unsupported_content_type());
    /// ```
    pub fn is_unsupported_content_type(&self) -> bool {
        matches!(self.0, DecodeErrorKind::UnsupportedContentType(_))
    }

    /// The line of the document the error applies to, starting from 0, if known.
    pub fn line(&self) -> Option<u64> {
        match &self.0 {
            DecodeErrorKind::Json(e) => Some(e.location().start.line),
            DecodeErrorKind::Csv(e) => e.position().map(|p| p.line().saturating_sub(1)),
            DecodeErrorKind::Term { line, .. } => Some(*line),
            DecodeErrorKind::Msg { line, .. } => *line,
            DecodeErrorKind::Xml(_) | DecodeErrorKind::UnsupportedContentType(_) => None,
        }
    }
}

impl From<DecodeError> for io::Error {
    #[inline]
    fn from(error: DecodeError) -> Self {
        match error.0 {
            DecodeErrorKind::Xml(quick_xml::Error::Io(error)) => {
                Arc::try_unwrap(error).unwrap_or_else(|e| Self::new(e.kind(), e))
            }
            DecodeErrorKind::UnsupportedContentType(content_type) => Self::new(
                io::ErrorKind::Unsupported,
                DecodeError::unsupported_content_type(content_type),
            ),
            kind => Self::new(io::ErrorKind::InvalidData, DecodeError(kind)),
        }
    }
}

#[doc(hidden)]
impl From<JsonSyntaxError> for DecodeError {
    #[inline]
    fn from(error: JsonSyntaxError) -> Self {
        Self(DecodeErrorKind::Json(error))
    }
}

#[doc(hidden)]
impl From<quick_xml::Error> for DecodeError {
    #[inline]
    fn from(error: quick_xml::Error) -> Self {
        Self(DecodeErrorKind::Xml(error))
    }
}

#[doc(hidden)]
impl From<quick_xml::events::attributes::AttrError> for DecodeError {
    #[inline]
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        quick_xml::Error::from(error).into()
    }
}

#[doc(hidden)]
impl From<csv::Error> for DecodeError {
    #[inline]
    fn from(error: csv::Error) -> Self {
        Self(DecodeErrorKind::Csv(error))
    }
}
