#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod client;
mod error;
#[cfg(feature = "http-client")]
mod http;
mod options;
mod transport;

pub use crate::client::{Client, Endpoint, LocalEngine, Operation, RESULTS_ACCEPT};
pub use crate::error::SparqlError;
#[cfg(feature = "http-client")]
pub use crate::http::HttpTransport;
pub use crate::options::{ClientOptions, ProtocolVersion, RequestOptions};
pub use crate::transport::{HttpMethod, HttpRequest, HttpResponse, Transport};
