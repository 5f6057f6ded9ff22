use crate::error::SparqlError;
#[cfg(feature = "http-client")]
use crate::http::HttpTransport;
use crate::options::{ClientOptions, ProtocolVersion, RequestOptions};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, Transport};
use sparbuild::Query;
use sparbuild::update::{
    Clear, DeleteData, GraphTarget, GraphUpdateOperation, InsertData, Load, Update,
};
use sparresults::{QueryResults, RdfReader, ResultFormat, ResultsDecoder};
use sparterm::{BlankNodeMap, Graph, NamedNode};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;
use url::form_urlencoded;

/// The `Accept` header sent with queries returning solutions or booleans.
pub const RESULTS_ACCEPT: &str = "application/sparql-results+json, application/sparql-results+xml, text/boolean, text/tab-separated-values;q=0.8, text/csv;q=0.2, */*;q=0.1";

#[cfg(feature = "http-client")]
const DEFAULT_REDIRECTION_LIMIT: usize = 5;

/// A query or an update that can be sent to an endpoint.
pub trait Operation {
    fn to_sparql(&self) -> Result<String, SparqlError>;

    /// Checks if the endpoint answers with RDF triples instead of query results.
    fn expects_statements(&self) -> bool;
}

impl Operation for Query {
    #[inline]
    fn to_sparql(&self) -> Result<String, SparqlError> {
        Ok(self.to_string())
    }

    #[inline]
    fn expects_statements(&self) -> bool {
        Query::expects_statements(self)
    }
}

/// Raw SPARQL text. It expects statements if it contains one of the `CONSTRUCT`, `DESCRIBE`, `DELETE` or `CLEAR` keywords.
impl Operation for str {
    #[inline]
    fn to_sparql(&self) -> Result<String, SparqlError> {
        Ok(self.to_owned())
    }

    fn expects_statements(&self) -> bool {
        self.split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| {
                ["CONSTRUCT", "DESCRIBE", "DELETE", "CLEAR"]
                    .iter()
                    .any(|keyword| word.eq_ignore_ascii_case(keyword))
            })
    }
}

impl Operation for String {
    #[inline]
    fn to_sparql(&self) -> Result<String, SparqlError> {
        Ok(self.clone())
    }

    #[inline]
    fn expects_statements(&self) -> bool {
        self.as_str().expects_statements()
    }
}

impl Operation for Update {
    #[inline]
    fn to_sparql(&self) -> Result<String, SparqlError> {
        Ok(Update::to_sparql(self)?)
    }

    #[inline]
    fn expects_statements(&self) -> bool {
        Update::expects_statements(self)
    }
}

impl Operation for GraphUpdateOperation {
    #[inline]
    fn to_sparql(&self) -> Result<String, SparqlError> {
        Ok(GraphUpdateOperation::to_sparql(self)?)
    }

    #[inline]
    fn expects_statements(&self) -> bool {
        GraphUpdateOperation::expects_statements(self)
    }
}

/// An in-process SPARQL engine standing in for a remote endpoint.
///
/// Operations are handed over as SPARQL text.
pub trait LocalEngine: Send + Sync {
    fn query(
        &self,
        query: &str,
        blank_nodes: &mut BlankNodeMap,
    ) -> Result<QueryResults, Box<dyn Error + Send + Sync>>;

    fn update(&self, update: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}

impl<T: LocalEngine + ?Sized> LocalEngine for Arc<T> {
    #[inline]
    fn query(
        &self,
        query: &str,
        blank_nodes: &mut BlankNodeMap,
    ) -> Result<QueryResults, Box<dyn Error + Send + Sync>> {
        (**self).query(query, blank_nodes)
    }

    #[inline]
    fn update(&self, update: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).update(update)
    }
}

/// Where the operations of a [`Client`] are evaluated.
pub enum Endpoint {
    Remote {
        url: Url,
        transport: Box<dyn Transport>,
    },
    Local(Box<dyn LocalEngine>),
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { url, .. } => f.debug_tuple("Remote").field(&url.as_str()).finish(),
            Self::Local(_) => f.write_str("Local"),
        }
    }
}

/// A client of the [SPARQL 1.1 protocol](https://www.w3.org/TR/sparql11-protocol/).
///
/// Blank nodes of the responses are resolved through the [`BlankNodeMap`] given to each query,
/// so that nodes returned by several queries sharing a map can be reused in later operations.
///
/// ```
/// use sparclient::{Client, LocalEngine, RequestOptions};
/// use sparbuild::QueryBuilder;
/// use sparresults::QueryResults;
/// use sparterm::{BlankNodeMap, Variable};
/// use std::error::Error;
///
/// struct Empty;
///
/// impl LocalEngine for Empty {
///     fn query(
///         &self,
///         query: &str,
///         _: &mut BlankNodeMap,
///     ) -> Result<QueryResults, Box<dyn Error + Send + Sync>> {
///         assert_eq!(query, "SELECT ?s WHERE { ?s ?p ?o . }");
///         Ok(QueryResults::Boolean(false))
///     }
///
///     fn update(&self, _: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
///         Ok(())
///     }
/// }
///
/// let client = Client::local(Empty);
/// let query = QueryBuilder::select([Variable::new("s")?])
///     .where_([(Variable::new("s")?, Variable::new("p")?, Variable::new("o")?)])?
///     .build();
/// let results = client.query(&query, &mut BlankNodeMap::new(), &RequestOptions::default())?;
/// assert!(!results.is_true());
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug)]
pub struct Client {
    endpoint: Endpoint,
    options: ClientOptions,
    decoder: ResultsDecoder,
}

impl Client {
    /// A client of the endpoint at `url`, reached through `transport`.
    pub fn new(url: &str, transport: impl Transport + 'static) -> Result<Self, SparqlError> {
        Ok(Self::from_endpoint(Endpoint::Remote {
            url: Url::parse(url)?,
            transport: Box::new(transport),
        }))
    }

    /// A client of the endpoint at `url`, reached through an [`HttpTransport`] without timeout.
    #[cfg(feature = "http-client")]
    pub fn http(url: &str) -> Result<Self, SparqlError> {
        Self::new(url, HttpTransport::new(None, DEFAULT_REDIRECTION_LIMIT)?)
    }

    /// A client evaluating its operations with an in-process engine.
    pub fn local(engine: impl LocalEngine + 'static) -> Self {
        Self::from_endpoint(Endpoint::Local(Box::new(engine)))
    }

    pub fn from_endpoint(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            options: ClientOptions::default(),
            decoder: ResultsDecoder::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.decoder = std::mem::take(&mut self.decoder).with_xml_engine(options.xml_engine());
        self.options = options;
        self
    }

    /// Adds a reader for graph responses. Its media types are added to the `Accept` header of graph queries.
    #[must_use]
    pub fn with_rdf_reader(mut self, reader: impl RdfReader + 'static) -> Self {
        self.decoder = std::mem::take(&mut self.decoder).with_rdf_reader(reader);
        self
    }

    #[inline]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    #[inline]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    #[inline]
    pub fn is_local(&self) -> bool {
        matches!(self.endpoint, Endpoint::Local(_))
    }

    /// The `Accept` header sent with queries returning RDF triples.
    pub fn graph_accept(&self) -> String {
        let mut accept = String::new();
        for media_type in self.decoder.rdf_readers().media_types() {
            accept.push_str(media_type);
            accept.push_str(", ");
        }
        accept.push_str("*/*;q=0.1");
        accept
    }

    fn accept(&self, operation: &(impl Operation + ?Sized), options: &RequestOptions) -> String {
        if let Some(content_type) = options.content_type() {
            content_type.to_owned()
        } else if operation.expects_statements() {
            self.graph_accept()
        } else {
            RESULTS_ACCEPT.to_owned()
        }
    }

    /// Evaluates a query and decodes its results.
    ///
    /// The results are decoded according to the response `Content-Type`,
    /// unless [`RequestOptions::with_content_type`] forces another one.
    pub fn query(
        &self,
        query: &(impl Operation + ?Sized),
        blank_nodes: &mut BlankNodeMap,
        options: &RequestOptions,
    ) -> Result<QueryResults, SparqlError> {
        let text = query.to_sparql()?;
        let (url, transport) = match &self.endpoint {
            Endpoint::Remote { url, transport } => (url, transport),
            Endpoint::Local(engine) => {
                debug!("evaluating the query with the local engine");
                return engine
                    .query(&text, blank_nodes)
                    .map_err(SparqlError::Local);
            }
        };
        let accept = self.accept(query, options);
        let request = self.query_request(url, &text, &accept, options);
        let response = send(&**transport, &request)?;
        Ok(match options.content_type() {
            Some(content_type) => self.decoder.decode_format(
                &ResultFormat::from_media_type(content_type),
                &response.body,
                blank_nodes,
            )?,
            None => self
                .decoder
                .decode(response.content_type(), &response.body, blank_nodes)?,
        })
    }

    /// Executes an update. The response body is ignored.
    pub fn update(
        &self,
        operation: &(impl Operation + ?Sized),
        options: &RequestOptions,
    ) -> Result<(), SparqlError> {
        let text = operation.to_sparql()?;
        let (url, transport) = match &self.endpoint {
            Endpoint::Remote { url, transport } => (url, transport),
            Endpoint::Local(engine) => {
                debug!("executing the update with the local engine");
                return engine.update(&text).map_err(SparqlError::Local);
            }
        };
        let accept = self.accept(operation, options);
        let request = self.update_request(url, &text, &accept, options);
        send(&**transport, &request)?;
        Ok(())
    }

    /// Inserts the triples of `data`, into `graph` if set.
    pub fn insert_data(
        &self,
        data: Graph,
        graph: Option<NamedNode>,
        options: &RequestOptions,
    ) -> Result<(), SparqlError> {
        let mut operation = InsertData::new(data)?;
        if let Some(graph) = graph {
            operation = operation.with_graph(graph);
        }
        self.update(&GraphUpdateOperation::from(operation), options)
    }

    /// Deletes the triples of `data`, from `graph` if set.
    pub fn delete_data(
        &self,
        data: Graph,
        graph: Option<NamedNode>,
        options: &RequestOptions,
    ) -> Result<(), SparqlError> {
        let mut operation = DeleteData::new(data)?;
        if let Some(graph) = graph {
            operation = operation.with_graph(graph);
        }
        self.update(&GraphUpdateOperation::from(operation), options)
    }

    /// Removes all the triples of a named graph.
    pub fn clear_graph(&self, graph: NamedNode, options: &RequestOptions) -> Result<(), SparqlError> {
        self.clear(GraphTarget::NamedNode(graph), false, options)
    }

    pub fn clear(
        &self,
        target: GraphTarget,
        silent: bool,
        options: &RequestOptions,
    ) -> Result<(), SparqlError> {
        let mut operation = Clear::new(target);
        if silent {
            operation = operation.silent();
        }
        self.update(&GraphUpdateOperation::from(operation), options)
    }

    /// Loads the document at `from`, into the graph `into` if set.
    pub fn load(
        &self,
        from: NamedNode,
        into: Option<NamedNode>,
        options: &RequestOptions,
    ) -> Result<(), SparqlError> {
        let mut operation = Load::new(from);
        if let Some(into) = into {
            operation = operation.into_graph(into);
        }
        self.update(&GraphUpdateOperation::from(operation), options)
    }

    fn query_request(
        &self,
        url: &Url,
        query: &str,
        accept: &str,
        options: &RequestOptions,
    ) -> HttpRequest {
        let mut parameters = Vec::new();
        for graph in self.options.default_graphs() {
            parameters.push(("default-graph-uri", graph.as_str()));
        }
        for graph in self.options.named_graphs() {
            parameters.push(("named-graph-uri", graph.as_str()));
        }
        match (self.options.method(), self.options.protocol_version()) {
            (HttpMethod::Get, _) => {
                parameters.insert(0, ("query", query));
                self.request(
                    HttpMethod::Get,
                    with_parameters(url, &parameters),
                    None,
                    accept,
                    options,
                )
            }
            (HttpMethod::Post, ProtocolVersion::V1_0) => {
                parameters.insert(0, ("query", query));
                self.request(
                    HttpMethod::Post,
                    url.to_string(),
                    Some(form_body(&parameters)),
                    accept,
                    options,
                )
            }
            (HttpMethod::Post, ProtocolVersion::V1_1) => self.request(
                HttpMethod::Post,
                with_parameters(url, &parameters),
                Some(("application/sparql-query", query.as_bytes().to_vec())),
                accept,
                options,
            ),
        }
    }

    fn update_request(
        &self,
        url: &Url,
        update: &str,
        accept: &str,
        options: &RequestOptions,
    ) -> HttpRequest {
        let mut parameters = Vec::new();
        for graph in self.options.default_graphs() {
            parameters.push(("using-graph-uri", graph.as_str()));
        }
        for graph in self.options.named_graphs() {
            parameters.push(("using-named-graph-uri", graph.as_str()));
        }
        match self.options.protocol_version() {
            ProtocolVersion::V1_0 => {
                parameters.insert(0, ("update", update));
                self.request(
                    HttpMethod::Post,
                    url.to_string(),
                    Some(form_body(&parameters)),
                    accept,
                    options,
                )
            }
            ProtocolVersion::V1_1 => self.request(
                HttpMethod::Post,
                with_parameters(url, &parameters),
                Some(("application/sparql-update", update.as_bytes().to_vec())),
                accept,
                options,
            ),
        }
    }

    fn request(
        &self,
        method: HttpMethod,
        url: String,
        body: Option<(&str, Vec<u8>)>,
        accept: &str,
        options: &RequestOptions,
    ) -> HttpRequest {
        let mut request = HttpRequest {
            method,
            url,
            headers: vec![("Accept".to_owned(), accept.to_owned())],
            body: Vec::new(),
        };
        if let Some((content_type, body)) = body {
            request
                .headers
                .push(("Content-Type".to_owned(), content_type.to_owned()));
            request.body = body;
        }
        for (name, value) in self.options.headers().iter().chain(options.headers()) {
            set_header(&mut request.headers, name, value);
        }
        request
    }
}

fn send(transport: &dyn Transport, request: &HttpRequest) -> Result<HttpResponse, SparqlError> {
    debug!(
        method = request.method.as_str(),
        url = %request.url,
        accept = request.header("Accept"),
        "sending SPARQL request"
    );
    let response = transport.send(request)?;
    debug!(
        status = response.status,
        content_type = response.content_type(),
        size = response.body.len(),
        "received SPARQL response"
    );
    if !response.is_success() {
        warn!(status = response.status, url = %request.url, "the SPARQL endpoint returned an error");
        return Err(SparqlError::from_status(response.status, &response.body));
    }
    Ok(response)
}

fn with_parameters(url: &Url, parameters: &[(&str, &str)]) -> String {
    if parameters.is_empty() {
        return url.to_string();
    }
    let mut url = url.clone();
    url.query_pairs_mut().extend_pairs(parameters);
    url.into()
}

fn form_body(parameters: &[(&str, &str)]) -> (&'static str, Vec<u8>) {
    let body = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(parameters)
        .finish();
    ("application/x-www-form-urlencoded", body.into_bytes())
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    headers.push((name.to_owned(), value.to_owned()));
}
