use crate::transport::{HttpMethod, HttpRequest, HttpResponse, Transport};
use oxhttp::model::{Method, Request};
use std::io::{Error, ErrorKind, Read, Result};
use std::time::Duration;
use tracing::trace;

/// A [`Transport`] backed by a blocking [`oxhttp`] client.
///
/// ```no_run
/// use sparclient::{Client, HttpTransport};
/// use std::time::Duration;
///
/// let transport = HttpTransport::new(Some(Duration::from_secs(30)), 5)?;
/// let client = Client::new("https://query.wikidata.org/sparql", transport)?;
/// # let _ = client;
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct HttpTransport {
    client: oxhttp::Client,
}

impl HttpTransport {
    /// Builds a client following at most `redirection_limit` redirections.
    ///
    /// The timeout applies to each whole request.
    pub fn new(timeout: Option<Duration>, redirection_limit: usize) -> Result<Self> {
        let mut client = oxhttp::Client::new()
            .with_redirection_limit(redirection_limit)
            .with_user_agent(concat!("sparclient/", env!("CARGO_PKG_VERSION")))
            .map_err(invalid_input_error)?;
        if let Some(timeout) = timeout {
            client = client.with_global_timeout(timeout);
        }
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = Request::builder()
            .method(match request.method {
                HttpMethod::Get => Method::GET,
                HttpMethod::Post => Method::POST,
            })
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let http_request = builder
            .body(request.body.clone())
            .map_err(invalid_input_error)?;
        let response = self.client.request(http_request)?;
        let status = response.status().as_u16();
        let mut headers = Vec::new();
        for (name, value) in response.headers() {
            match value.to_str() {
                Ok(value) => headers.push((name.as_str().to_owned(), value.to_owned())),
                Err(_) => trace!(header = name.as_str(), "skipping a non-ASCII header value"),
            }
        }
        let mut body = Vec::new();
        response.into_body().read_to_end(&mut body)?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn invalid_input_error(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Error {
    Error::new(ErrorKind::InvalidInput, error)
}
