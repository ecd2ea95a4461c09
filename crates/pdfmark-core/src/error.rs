use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkError {
    #[error("structural query error: {0}")]
    StructuralQuery(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid DOI: {0}")]
    InvalidDoi(String),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("packet is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl MarkError {
    pub fn structural(what: impl Into<String>) -> Self {
        Self::StructuralQuery(what.into())
    }
}

pub type Result<T> = std::result::Result<T, MarkError>;

/// Failure codes shared with the metadata fetch client.
///
/// The fetch side reports transport and credential problems with the same
/// enum, so a caller can route every failure through one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// The lookup itself failed (connection refused, bad status).
    ClientException,
    /// The record is not applicable or its structure is unusable.
    CrummyMetadata,
    /// The registry rejected the supplied credentials.
    BadCredentials,
    /// Something went wrong while building the packet.
    BuildException,
}

impl FailureCode {
    pub fn code(self) -> i32 {
        match self {
            Self::ClientException => -1,
            Self::CrummyMetadata => -2,
            Self::BadCredentials => -3,
            Self::BuildException => -4,
        }
    }

    /// Process exit status used by the CLI.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::ClientException => 6,
            Self::CrummyMetadata => 2,
            Self::BadCredentials => 3,
            Self::BuildException => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_codes_are_distinct() {
        let codes = [
            FailureCode::ClientException,
            FailureCode::CrummyMetadata,
            FailureCode::BadCredentials,
            FailureCode::BuildException,
        ]
        .map(FailureCode::code);
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn structural_error_message() {
        let err = MarkError::structural("missing <year> in publication_date");
        assert_eq!(
            err.to_string(),
            "structural query error: missing <year> in publication_date"
        );
    }

    #[test]
    fn failure_code_serializes_snake_case() {
        let json = serde_json::to_string(&FailureCode::CrummyMetadata).unwrap();
        assert_eq!(json, "\"crummy_metadata\"");
    }
}
