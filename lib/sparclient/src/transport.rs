use std::io;
use std::sync::Arc;

/// The HTTP methods used by the SPARQL protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

impl HttpMethod {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// A request ready to be sent to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// The value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The response returned by an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    #[inline]
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Sends requests to SPARQL endpoints.
///
/// Connection handling, TLS, redirections and timeouts are the responsibility of the implementation.
///
/// ```
/// use sparclient::{Client, HttpRequest, HttpResponse, RequestOptions, Transport};
/// use sparterm::BlankNodeMap;
/// use std::io;
///
/// struct AlwaysTrue;
///
/// impl Transport for AlwaysTrue {
///     fn send(&self, _: &HttpRequest) -> io::Result<HttpResponse> {
///         Ok(HttpResponse {
///             status: 200,
///             headers: vec![("Content-Type".into(), "text/boolean".into())],
///             body: b"true".to_vec(),
///         })
///     }
/// }
///
/// let client = Client::new("http://example.com/sparql", AlwaysTrue)?;
/// let results = client.query("ASK {}", &mut BlankNodeMap::new(), &RequestOptions::default())?;
/// assert!(results.is_true());
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> io::Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    #[inline]
    fn send(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    #[inline]
    fn send(&self, request: &HttpRequest) -> io::Result<HttpResponse> {
        (**self).send(request)
    }
}
