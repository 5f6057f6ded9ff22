use crate::transport::HttpMethod;
use sparresults::XmlEngine;
use sparterm::NamedNode;

/// The version of the [SPARQL protocol](https://www.w3.org/TR/sparql11-protocol/) used to send operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolVersion {
    /// POST requests carry the operation in an `application/x-www-form-urlencoded` body.
    #[default]
    V1_0,
    /// POST requests carry the operation directly, as `application/sparql-query` or `application/sparql-update`.
    V1_1,
}

/// Options shared by all the requests of a [`Client`](crate::Client).
///
/// ```
/// use sparclient::{ClientOptions, HttpMethod, ProtocolVersion};
/// use sparterm::NamedNode;
///
/// let options = ClientOptions::default()
///     .with_protocol_version(ProtocolVersion::V1_1)
///     .with_method(HttpMethod::Get)
///     .with_header("Authorization", "Basic XXX==")
///     .with_default_graph(NamedNode::new("http://example.com/g")?);
/// assert_eq!(options.headers().len(), 1);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    protocol_version: ProtocolVersion,
    method: HttpMethod,
    headers: Vec<(String, String)>,
    default_graphs: Vec<NamedNode>,
    named_graphs: Vec<NamedNode>,
    xml_engine: XmlEngine,
}

impl ClientOptions {
    #[inline]
    #[must_use]
    pub fn with_protocol_version(mut self, version: ProtocolVersion) -> Self {
        self.protocol_version = version;
        self
    }

    /// Sets the method used for queries. Updates are always sent with `POST`.
    #[inline]
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Adds a header sent with every request.
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a graph sent as `default-graph-uri` with queries and `using-graph-uri` with updates.
    #[inline]
    #[must_use]
    pub fn with_default_graph(mut self, graph: NamedNode) -> Self {
        self.default_graphs.push(graph);
        self
    }

    /// Adds a graph sent as `named-graph-uri` with queries and `using-named-graph-uri` with updates.
    #[inline]
    #[must_use]
    pub fn with_named_graph(mut self, graph: NamedNode) -> Self {
        self.named_graphs.push(graph);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_xml_engine(mut self, engine: XmlEngine) -> Self {
        self.xml_engine = engine;
        self
    }

    #[inline]
    pub fn protocol_version(&self) -> ProtocolVersion {
        self.protocol_version
    }

    #[inline]
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    #[inline]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    #[inline]
    pub fn default_graphs(&self) -> &[NamedNode] {
        &self.default_graphs
    }

    #[inline]
    pub fn named_graphs(&self) -> &[NamedNode] {
        &self.named_graphs
    }

    #[inline]
    pub fn xml_engine(&self) -> XmlEngine {
        self.xml_engine
    }
}

/// Options of a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    content_type: Option<String>,
    headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Forces the media type of the response.
    ///
    /// It is sent as the `Accept` header and the response body is decoded with it,
    /// whatever `Content-Type` the endpoint returns.
    #[inline]
    #[must_use]
    pub fn with_content_type(mut self, media_type: impl Into<String>) -> Self {
        self.content_type = Some(media_type.into());
        self
    }

    /// Adds a header, replacing the client one with the same name.
    #[inline]
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[inline]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
