#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use sparbuild::update::{GraphName, GraphTarget, GraphUpdateOperation, Move};
use sparbuild::{QueryBuilder, UpdateError};
use sparclient::{
    Client, ClientOptions, HttpMethod, HttpRequest, HttpResponse, LocalEngine, ProtocolVersion,
    RESULTS_ACCEPT, RequestOptions, SparqlError, Transport,
};
use sparresults::QueryResults;
use sparterm::{BlankNodeMap, Graph, NamedNode, Term, Triple, Variable};
use std::error::Error;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

const ENDPOINT: &str = "http://example.com/sparql";

fn init_tracing() {
    let _: Result<(), _> = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records the requests and answers them with a canned response.
struct MockTransport {
    response: io::Result<HttpResponse>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    fn new(status: u16, content_type: Option<&str>, body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(HttpResponse {
                status,
                headers: content_type
                    .map(|content_type| ("Content-Type".to_owned(), content_type.to_owned()))
                    .into_iter()
                    .collect(),
                body: body.as_bytes().to_vec(),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: Err(io::Error::new(io::ErrorKind::ConnectionRefused, "no route")),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn last_request(&self) -> HttpRequest {
        let last = match self.requests.lock() {
            Ok(requests) => requests.last().cloned(),
            Err(_) => None,
        };
        last.unwrap_or_else(|| panic!("no request has been sent"))
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(error) => Err(io::Error::new(error.kind(), error.to_string())),
        }
    }
}

fn mock_client(transport: &Arc<MockTransport>) -> Result<Client, SparqlError> {
    Client::new(ENDPOINT, Arc::clone(transport))
}

#[test]
fn test_status_mapping() -> Result<(), SparqlError> {
    init_tracing();
    for status in [400, 404, 418, 500, 503] {
        let transport = MockTransport::new(status, Some("text/plain"), "oops");
        let Err(error) = mock_client(&transport)?.query(
            "ASK {}",
            &mut BlankNodeMap::new(),
            &RequestOptions::default(),
        ) else {
            panic!("status {status} should fail")
        };
        match status {
            400 => assert!(
                matches!(&error, SparqlError::MalformedQuery(message) if message == "oops"),
                "{error:?}"
            ),
            401..=499 => assert!(
                matches!(&error, SparqlError::Client { message, .. } if message == "oops"),
                "{error:?}"
            ),
            _ => assert!(
                matches!(&error, SparqlError::Server { source: None, .. }),
                "{error:?}"
            ),
        }
        assert_eq!(error.status(), Some(status));
    }

    let transport = MockTransport::failing();
    let Err(error) = mock_client(&transport)?.update("CLEAR ALL", &RequestOptions::default()) else {
        panic!("transport failures should be reported")
    };
    assert!(
        matches!(error, SparqlError::Server { status: None, source: Some(_), .. }),
        "{error:?}"
    );
    Ok(())
}

#[test]
fn test_results_accept_header() -> Result<(), Box<dyn Error>> {
    let transport = MockTransport::new(200, Some("application/sparql-results+json"), r#"{"boolean": false}"#);
    let client = mock_client(&transport)?;
    let [s, p, o] = ["s", "p", "o"].map(Variable::new_unchecked);
    let query = QueryBuilder::select([s.clone()]).where_([(s, p, o)])?.build();
    let results = client.query(&query, &mut BlankNodeMap::new(), &RequestOptions::default())?;
    assert_eq!(results, QueryResults::Boolean(false));
    assert_eq!(transport.last_request().header("accept"), Some(RESULTS_ACCEPT));
    Ok(())
}

#[test]
fn test_graph_accept_header() -> Result<(), Box<dyn Error>> {
    let transport = MockTransport::new(
        200,
        Some("application/n-triples"),
        "_:a <http://example.com/p> \"o\" .\n",
    );
    let client = mock_client(&transport)?;
    let [s, p, o] = ["s", "p", "o"].map(Variable::new_unchecked);
    let query = QueryBuilder::construct([(s.clone(), p.clone(), o.clone())])?
        .where_([(s, p, o)])?
        .build();
    let mut blank_nodes = BlankNodeMap::new();
    let QueryResults::Graph(graph) =
        client.query(&query, &mut blank_nodes, &RequestOptions::default())?
    else {
        panic!("a graph is expected")
    };
    assert_eq!(graph.len(), 1);
    assert_eq!(blank_nodes.len(), 1);
    let graph_accept = "application/n-triples, text/plain, */*;q=0.1";
    assert_eq!(client.graph_accept(), graph_accept);
    assert_eq!(transport.last_request().header("Accept"), Some(graph_accept));

    for (text, accept) in [
        ("DESCRIBE <http://example.com>", graph_accept),
        ("construct { ?s ?p ?o } where { ?s ?p ?o }", graph_accept),
        ("SELECT * WHERE { ?s ?p ?o }", RESULTS_ACCEPT),
    ] {
        client.query(text, &mut blank_nodes, &RequestOptions::default())?;
        assert_eq!(transport.last_request().header("Accept"), Some(accept), "{text}");
    }
    Ok(())
}

#[test]
fn test_content_type_override() -> Result<(), SparqlError> {
    let transport = MockTransport::new(200, Some("text/plain"), "s\r\nhttp://example.com/s\r\n");
    let client = mock_client(&transport)?;
    let options = RequestOptions::default().with_content_type("text/csv");
    let QueryResults::Solutions(solutions) =
        client.query("SELECT ?s {}", &mut BlankNodeMap::new(), &options)?
    else {
        panic!("solutions are expected")
    };
    assert_eq!(
        solutions.solutions()[0]["s"],
        Term::from(NamedNode::new_unchecked("http://example.com/s"))
    );
    assert_eq!(transport.last_request().header("Accept"), Some("text/csv"));

    let transport = MockTransport::new(200, Some("application/sparql-results+json"), "true");
    let results = mock_client(&transport)?.query(
        "ASK {}",
        &mut BlankNodeMap::new(),
        &RequestOptions::default().with_content_type("text/boolean"),
    )?;
    assert!(results.is_true());
    Ok(())
}

#[test]
fn test_custom_headers() -> Result<(), SparqlError> {
    let transport = MockTransport::new(200, Some("text/boolean"), "true");
    let client = mock_client(&transport)?.with_options(
        ClientOptions::default()
            .with_header("Authorization", "Basic XXX==")
            .with_header("X-Trace", "client"),
    );
    client.query(
        "ASK {}",
        &mut BlankNodeMap::new(),
        &RequestOptions::default().with_header("x-trace", "request"),
    )?;
    let request = transport.last_request();
    assert_eq!(request.header("Authorization"), Some("Basic XXX=="));
    assert_eq!(request.header("X-Trace"), Some("request"));
    assert_eq!(
        request
            .headers
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case("x-trace"))
            .count(),
        1
    );

    client.query(
        "ASK {}",
        &mut BlankNodeMap::new(),
        &RequestOptions::default().with_header("Accept", "application/sparql-results+xml"),
    )?;
    assert_eq!(
        transport.last_request().header("Accept"),
        Some("application/sparql-results+xml")
    );
    Ok(())
}

#[test]
fn test_query_encodings() -> Result<(), SparqlError> {
    let transport = MockTransport::new(200, Some("text/boolean"), "true");
    let graph = NamedNode::new_unchecked("http://example.com/g");

    let form = mock_client(&transport)?
        .with_options(ClientOptions::default().with_default_graph(graph.clone()));
    form.query("ASK {}", &mut BlankNodeMap::new(), &RequestOptions::default())?;
    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, ENDPOINT);
    assert_eq!(request.header("Content-Type"), Some("application/x-www-form-urlencoded"));
    assert_eq!(
        request.body,
        b"query=ASK+%7B%7D&default-graph-uri=http%3A%2F%2Fexample.com%2Fg"
    );

    let direct = mock_client(&transport)?.with_options(
        ClientOptions::default()
            .with_protocol_version(ProtocolVersion::V1_1)
            .with_named_graph(graph.clone()),
    );
    direct.query("ASK {}", &mut BlankNodeMap::new(), &RequestOptions::default())?;
    let request = transport.last_request();
    assert_eq!(request.header("Content-Type"), Some("application/sparql-query"));
    assert_eq!(request.body, b"ASK {}");
    assert_eq!(
        request.url,
        "http://example.com/sparql?named-graph-uri=http%3A%2F%2Fexample.com%2Fg"
    );

    let get = mock_client(&transport)?.with_options(ClientOptions::default().with_method(HttpMethod::Get));
    get.query("ASK {}", &mut BlankNodeMap::new(), &RequestOptions::default())?;
    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, "http://example.com/sparql?query=ASK+%7B%7D");
    assert!(request.body.is_empty());
    assert_eq!(request.header("Content-Type"), None);
    Ok(())
}

#[test]
fn test_updates() -> Result<(), SparqlError> {
    let transport = MockTransport::new(204, None, "");
    let graph = NamedNode::new_unchecked("http://example.com/g");
    let client = mock_client(&transport)?.with_options(
        ClientOptions::default()
            .with_protocol_version(ProtocolVersion::V1_1)
            .with_method(HttpMethod::Get),
    );

    client.insert_data(Graph::new(), None, &RequestOptions::default())?;
    let request = transport.last_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.header("Content-Type"), Some("application/sparql-update"));
    assert_eq!(request.body, b"INSERT DATA {\n}\n");
    assert_eq!(request.header("Accept"), Some(RESULTS_ACCEPT));

    client.clear_graph(graph.clone(), &RequestOptions::default())?;
    assert_eq!(
        transport.last_request().body,
        b"CLEAR GRAPH <http://example.com/g>"
    );

    client.clear(GraphTarget::AllGraphs, true, &RequestOptions::default())?;
    assert_eq!(transport.last_request().body, b"CLEAR SILENT ALL");

    let ex = NamedNode::new_unchecked("http://example.com/s");
    client.delete_data(
        Graph::from_iter([Triple::new(ex.clone(), ex.clone(), ex.clone())]),
        Some(graph.clone()),
        &RequestOptions::default(),
    )?;
    assert!(transport.last_request().body.starts_with(b"DELETE DATA"));

    client.load(ex, Some(graph), &RequestOptions::default())?;
    let request = transport.last_request();
    assert_eq!(
        request.body,
        b"LOAD <http://example.com/s> INTO GRAPH <http://example.com/g>"
    );
    assert_eq!(request.header("Accept"), Some(client.graph_accept().as_str()));

    let Err(error) = client.update(
        &GraphUpdateOperation::from(Move {
            from: GraphName::DefaultGraph,
            to: GraphName::NamedNode(NamedNode::new_unchecked("http://example.com/g2")),
        }),
        &RequestOptions::default(),
    ) else {
        panic!("MOVE is not serializable")
    };
    assert!(
        matches!(error, SparqlError::Update(UpdateError::NotImplemented("MOVE"))),
        "{error:?}"
    );
    Ok(())
}

#[test]
fn test_update_form_encoding() -> Result<(), SparqlError> {
    let transport = MockTransport::new(200, Some("text/plain"), "ok");
    let client = mock_client(&transport)?.with_options(
        ClientOptions::default().with_default_graph(NamedNode::new_unchecked("http://example.com/g")),
    );
    client.update("CLEAR ALL", &RequestOptions::default())?;
    let request = transport.last_request();
    assert_eq!(request.header("Content-Type"), Some("application/x-www-form-urlencoded"));
    assert_eq!(
        request.body,
        b"update=CLEAR+ALL&using-graph-uri=http%3A%2F%2Fexample.com%2Fg"
    );
    Ok(())
}

#[test]
fn test_unsupported_response() -> Result<(), SparqlError> {
    for content_type in [None, Some("text/html")] {
        let transport = MockTransport::new(200, content_type, "<html></html>");
        let Err(error) = mock_client(&transport)?.query(
            "SELECT * {}",
            &mut BlankNodeMap::new(),
            &RequestOptions::default(),
        ) else {
            panic!("{content_type:?} can not be decoded")
        };
        let SparqlError::Decode(error) = error else {
            panic!("a decoding error is expected, found {error:?}")
        };
        assert!(error.is_unsupported_content_type());
    }
    Ok(())
}

#[derive(Default)]
struct RecordingEngine {
    operations: Mutex<Vec<String>>,
}

impl LocalEngine for RecordingEngine {
    fn query(
        &self,
        query: &str,
        blank_nodes: &mut BlankNodeMap,
    ) -> Result<QueryResults, Box<dyn Error + Send + Sync>> {
        self.operations
            .lock()
            .map_err(|e| e.to_string())?
            .push(query.to_owned());
        let node = blank_nodes.get_or_insert("b0")?;
        Ok(QueryResults::Graph(Graph::from_iter([Triple::new(
            node.clone(),
            NamedNode::new_unchecked("http://example.com/p"),
            node,
        )])))
    }

    fn update(&self, update: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut operations = self.operations.lock().map_err(|e| e.to_string())?;
        if update.contains("DROP") {
            return Err("DROP is not allowed".into());
        }
        operations.push(update.to_owned());
        Ok(())
    }
}

#[test]
fn test_local_engine_delegation() -> Result<(), Box<dyn Error>> {
    let engine = Arc::new(RecordingEngine::default());
    let client = Client::local(Arc::clone(&engine));
    assert!(client.is_local());

    let mut blank_nodes = BlankNodeMap::new();
    let results = client.query(
        "CONSTRUCT WHERE { ?s ?p ?o }",
        &mut blank_nodes,
        &RequestOptions::default(),
    )?;
    assert!(results.is_true());
    assert_eq!(blank_nodes.len(), 1);
    client.clear(GraphTarget::DefaultGraph, false, &RequestOptions::default())?;
    let Err(error) = client.update("DROP ALL", &RequestOptions::default()) else {
        panic!("the engine error should be returned")
    };
    assert!(matches!(error, SparqlError::Local(_)), "{error:?}");

    let operations = engine.operations.lock().map_err(|e| e.to_string())?;
    assert_eq!(
        *operations,
        ["CONSTRUCT WHERE { ?s ?p ?o }", "CLEAR DEFAULT"]
    );
    Ok(())
}
