use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Empty response from the inference service")]
    EmptyResponse,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid transition: cannot {event} while {from}")]
    InvalidTransition { from: String, event: String },
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::Transport(e.to_string())
    }
}
