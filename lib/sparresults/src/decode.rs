use crate::csv::{read_csv_results, read_tsv_results};
use crate::error::DecodeError;
use crate::format::ResultFormat;
use crate::json::read_json_results;
use crate::reader::{RdfReader, RdfReaderRegistry};
use crate::solution::QueryResults;
use crate::xml::{XmlEngine, read_xml_results};
use sparterm::BlankNodeMap;
use tracing::debug;

/// Reads a `text/boolean` body: `true` (surrounding whitespace allowed) is `true`, anything else is `false`.
///
/// ```
/// use sparresults::read_boolean_result;
///
/// assert!(read_boolean_result(b"true\n"));
/// assert!(!read_boolean_result(b"yes"));
/// ```
pub fn read_boolean_result(body: &[u8]) -> bool {
    body.trim_ascii() == b"true"
}

/// Picks the decoder matching a response content type.
///
/// SPARQL results formats are decoded directly, other media types are handed to the [`RdfReaderRegistry`].
///
/// ```
/// use sparresults::{QueryResults, ResultsDecoder};
/// use sparterm::BlankNodeMap;
///
/// let decoder = ResultsDecoder::new();
/// let mut blank_nodes = BlankNodeMap::new();
/// assert_eq!(
///     decoder.decode(
///         Some("application/sparql-results+json; charset=utf-8"),
///         br#"{"boolean": true}"#,
///         &mut blank_nodes
///     )?,
///     QueryResults::Boolean(true)
/// );
/// let graph = decoder.decode(
///     Some("application/n-triples"),
///     b"<http://example.com/s> <http://example.com/p> <http://example.com/o> .",
///     &mut blank_nodes,
/// )?;
/// assert!(graph.is_true());
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Default)]
pub struct ResultsDecoder {
    xml_engine: XmlEngine,
    rdf_readers: RdfReaderRegistry,
}

impl ResultsDecoder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the engine used for XML documents.
    #[inline]
    #[must_use]
    pub fn with_xml_engine(mut self, engine: XmlEngine) -> Self {
        self.xml_engine = engine;
        self
    }

    /// Replaces the readers used for RDF responses.
    #[inline]
    #[must_use]
    pub fn with_rdf_readers(mut self, readers: RdfReaderRegistry) -> Self {
        self.rdf_readers = readers;
        self
    }

    /// Adds a reader used for RDF responses.
    #[inline]
    #[must_use]
    pub fn with_rdf_reader(mut self, reader: impl RdfReader + 'static) -> Self {
        self.rdf_readers.register(reader);
        self
    }

    #[inline]
    pub fn xml_engine(&self) -> XmlEngine {
        self.xml_engine
    }

    #[inline]
    pub fn rdf_readers(&self) -> &RdfReaderRegistry {
        &self.rdf_readers
    }

    /// Decodes a response body according to its content type.
    ///
    /// A missing content type can only be read by an RDF reader registered for the empty media type.
    pub fn decode(
        &self,
        content_type: Option<&str>,
        body: &[u8],
        blank_nodes: &mut BlankNodeMap,
    ) -> Result<QueryResults, DecodeError> {
        self.decode_format(&ResultFormat::from_content_type(content_type), body, blank_nodes)
    }

    /// Decodes a response body in a given format.
    pub fn decode_format(
        &self,
        format: &ResultFormat,
        body: &[u8],
        blank_nodes: &mut BlankNodeMap,
    ) -> Result<QueryResults, DecodeError> {
        debug!(%format, size = body.len(), "decoding response");
        match format {
            ResultFormat::Json => read_json_results(body, blank_nodes),
            ResultFormat::Xml => read_xml_results(body, blank_nodes, self.xml_engine),
            ResultFormat::Csv => read_csv_results(body, blank_nodes),
            ResultFormat::Tsv => read_tsv_results(body, blank_nodes),
            ResultFormat::Boolean => Ok(QueryResults::Boolean(read_boolean_result(body))),
            ResultFormat::Other(media_type) => {
                let Some(reader) = self.rdf_readers.reader_for(media_type) else {
                    debug!(%media_type, "no RDF reader for the response");
                    return Err(DecodeError::unsupported_content_type(media_type.as_str()));
                };
                Ok(QueryResults::Graph(reader.read(body, blank_nodes)?))
            }
        }
    }
}
