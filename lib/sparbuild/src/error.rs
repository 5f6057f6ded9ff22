/// A builder method received a value it can not turn into valid SPARQL.
///
/// It is returned by the method that received the value, never later during serialization.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ArgumentError(String);

impl ArgumentError {
    pub(crate) fn msg(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// An error raised while turning an update operation into SPARQL.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UpdateError {
    /// The operation is known but can not be serialized yet.
    #[error("The {0} operation is not implemented")]
    NotImplemented(&'static str),
    #[error(transparent)]
    Argument(#[from] ArgumentError),
}
