//! RDF readers used when a response is not in a query results format, typically the output of `CONSTRUCT` and `DESCRIBE` queries.

use crate::error::DecodeError;
use sparterm::{BlankNodeMap, Graph, Triple};
use std::fmt;
use std::str::FromStr;

/// Reads an RDF serialization into a [`Graph`].
///
/// Implementations must resolve blank nodes through the given [`BlankNodeMap`].
pub trait RdfReader: Send + Sync {
    /// The lowercase media types this reader supports, without parameters.
    fn media_types(&self) -> &[&'static str];

    fn read(&self, body: &[u8], blank_nodes: &mut BlankNodeMap) -> Result<Graph, DecodeError>;
}

/// Reader of [N-Triples](https://www.w3.org/TR/n-triples/) documents.
///
/// ```
/// use sparresults::{NTriplesReader, RdfReader};
/// use sparterm::BlankNodeMap;
///
/// let graph = NTriplesReader.read(
///     b"# comment\n_:s <http://example.com/p> \"o\"@en .\n",
///     &mut BlankNodeMap::new(),
/// )?;
/// assert_eq!(graph.len(), 1);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NTriplesReader;

impl RdfReader for NTriplesReader {
    fn media_types(&self) -> &[&'static str] {
        &["application/n-triples", "text/plain"]
    }

    fn read(&self, body: &[u8], blank_nodes: &mut BlankNodeMap) -> Result<Graph, DecodeError> {
        let body = std::str::from_utf8(body)
            .map_err(|e| DecodeError::msg(format!("N-Triples must be UTF-8: {e}")))?;
        let mut graph = Graph::new();
        for (line_number, line) in (0..).zip(body.lines()) {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let triple =
                Triple::from_str(line).map_err(|e| DecodeError::term(e, line, line_number))?;
            let Triple {
                subject,
                predicate,
                object,
            } = triple;
            graph.insert(Triple::new(
                blank_nodes.intern_term(subject),
                predicate,
                blank_nodes.intern_term(object),
            ));
        }
        Ok(graph)
    }
}

/// The [`RdfReader`]s available to decode graph responses, looked up by media type.
///
/// [`RdfReaderRegistry::default()`] only contains the [`NTriplesReader`].
///
/// ```
/// use sparresults::RdfReaderRegistry;
///
/// let registry = RdfReaderRegistry::default();
/// assert!(registry.reader_for("application/n-triples").is_some());
/// assert!(registry.reader_for("text/turtle").is_none());
/// assert!(RdfReaderRegistry::empty().reader_for("text/plain").is_none());
/// ```
pub struct RdfReaderRegistry {
    readers: Vec<Box<dyn RdfReader>>,
}

impl RdfReaderRegistry {
    /// A registry without any reader.
    pub fn empty() -> Self {
        Self {
            readers: Vec::new(),
        }
    }

    /// Adds a reader. It takes precedence over the ones already registered for the same media types.
    pub fn register(&mut self, reader: impl RdfReader + 'static) {
        self.readers.insert(0, Box::new(reader));
    }

    /// Finds a reader for the media type. Parameters after `;` are ignored.
    pub fn reader_for(&self, media_type: &str) -> Option<&dyn RdfReader> {
        let essence = media_type
            .split_once(';')
            .map_or(media_type, |(essence, _)| essence)
            .trim();
        self.readers
            .iter()
            .find(|reader| {
                reader
                    .media_types()
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(essence))
            })
            .map(|reader| &**reader)
    }

    /// The media types that can be read, to build `Accept` headers.
    pub fn media_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.readers
            .iter()
            .flat_map(|reader| reader.media_types().iter().copied())
    }
}

impl Default for RdfReaderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(NTriplesReader);
        registry
    }
}

impl fmt::Debug for RdfReaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.media_types()).finish()
    }
}
