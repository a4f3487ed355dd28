//! Error types for the EyeMove client.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = EyeMoveError> = std::result::Result<T, E>;

/// EyeMove client errors.
///
/// Two failure modes matter to callers: [`EyeMoveError::Transport`] means
/// the remote service was never (or not fully) reached, while
/// [`EyeMoveError::RequestFailed`] means the service executed the call and
/// reported business-level errors. Everything else indicates a mismatch
/// between the response and the expected protocol shape.
#[derive(Error, Debug)]
pub enum EyeMoveError {
    /// Network or protocol-level failure talking to the web service.
    #[error("transport error: {0}")]
    Transport(String),

    /// The web service executed the call but reported failure.
    #[error("request to the EyeMove web service failed: {}", .errors.join("; "))]
    RequestFailed {
        /// Error strings reported by the service, in document order.
        errors: Vec<String>,
    },

    /// The response lacked an expected result key or element.
    #[error("unexpected response shape: missing `{0}`")]
    MissingResult(String),

    /// The response XML could not be parsed as a document tree.
    #[error("XML parsing error: {0}")]
    XmlParse(#[from] xmltree::ParseError),

    /// The request XML could not be serialized.
    #[error("XML serialization error: {0}")]
    XmlWrite(#[from] xmltree::Error),

    /// The response XML could not be read as an event stream.
    #[error("XML reading error: {0}")]
    XmlRead(#[from] quick_xml::Error),

    /// The call succeeded but the result payload had the wrong type.
    #[error("unexpected result type: expected {expected}, got `{actual}`")]
    UnexpectedResultType {
        expected: &'static str,
        actual: String,
    },
}

impl EyeMoveError {
    /// The error strings reported by the service, if this is a
    /// business-level failure.
    pub fn request_errors(&self) -> Option<&[String]> {
        match self {
            Self::RequestFailed { errors } => Some(errors),
            _ => None,
        }
    }
}
