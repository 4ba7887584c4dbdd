//! Error types for diagram rendering and image-map rewriting.

use thiserror::Error;

/// Errors that can occur while rendering a diagram or rewriting its image map.
///
/// Every variant carries owned strings rather than source errors so the enum
/// is `Clone`: the image-map transformer memoizes its parse result (success or
/// failure) and hands the same outcome to every accessor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The cmapx payload is not well-formed XML.
    #[error("malformed image map markup: {0}")]
    MalformedMarkup(String),

    /// The rendering service could not be reached or did not answer.
    #[error("no response from diagram rendering service: {0}")]
    NoResponse(String),

    /// The rendering service answered with a body that is not decodable JSON.
    #[error("invalid response from diagram rendering service: {0}")]
    InvalidResponse(String),

    /// The rendering service reported a typed error code.
    #[error("diagram rendering failed: {code}")]
    Backend {
        code: String,
        message: Option<String>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
