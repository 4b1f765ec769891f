use crate::parser::ParseError;
use crate::tokenizer::TokenizeError;
use thiserror::Error;

/// Every way a single `transform` call can fail. Nothing is retried; the
/// same inputs reproduce the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SvgrError {
    #[error("Malformed SVG markup: {message}")]
    MalformedMarkup { message: String },

    #[error("<{tag}> has no react-native-svg equivalent")]
    UnsupportedNativeElement { tag: String },

    #[error("Invalid configuration for `{key}`: {message}")]
    InvalidConfiguration { key: String, message: String },

    #[error("{collaborator} failed: {message}")]
    ExternalCollaborator {
        collaborator: String,
        message: String,
    },
}

impl SvgrError {
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        SvgrError::InvalidConfiguration {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl From<TokenizeError> for SvgrError {
    fn from(e: TokenizeError) -> Self {
        SvgrError::MalformedMarkup {
            message: e.to_string(),
        }
    }
}

impl From<ParseError> for SvgrError {
    fn from(e: ParseError) -> Self {
        SvgrError::MalformedMarkup { message: e.message }
    }
}
