//! Prism - Error kinds surfaced to the user
//!
//! Every failure ends up as an inline message in the UI, so errors carry
//! their text rather than the source error. This keeps them `Clone` and lets
//! them cross the request channel.

use thiserror::Error;

/// Errors raised by file loading, parsing, export and the backend client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrismError {
    /// The file could not be read (missing, unreadable, too large).
    #[error("Failed to read file: {0}")]
    FileRead(String),

    /// Malformed JSON or an empty record set.
    #[error("{0}")]
    Parse(String),

    /// Request failure, non-success status or unreadable response body.
    #[error("{0}")]
    Network(String),

    /// Response is missing the field the view renders.
    #[error("Response is missing `{0}`")]
    Shape(&'static str),

    /// Writing an export failed.
    #[error("Export failed: {0}")]
    Export(String),
}

impl From<std::io::Error> for PrismError {
    fn from(e: std::io::Error) -> Self {
        PrismError::FileRead(e.to_string())
    }
}

impl From<reqwest::Error> for PrismError {
    fn from(e: reqwest::Error) -> Self {
        PrismError::Network(e.to_string())
    }
}

impl From<csv::Error> for PrismError {
    fn from(e: csv::Error) -> Self {
        PrismError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(PrismError::Parse("No records found".into()).to_string(), "No records found");
        assert_eq!(
            PrismError::FileRead("denied".into()).to_string(),
            "Failed to read file: denied"
        );
        assert_eq!(PrismError::Shape("answer").to_string(), "Response is missing `answer`");
    }

    #[test]
    fn test_io_error_is_file_read() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        assert!(matches!(PrismError::from(io), PrismError::FileRead(_)));
    }
}
