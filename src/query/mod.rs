mod http;

pub use http::HttpQuerier;

use std::fmt;

#[derive(Debug)]
pub enum QueryError {
    Transport(reqwest::Error),
    Backend { status: String, message: String },
    UnsupportedShape { shape: String, expr: String },
    Decode(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Backend { status, message } => {
                write!(f, "backend returned status [{status}]: {message}")
            }
            Self::UnsupportedShape { shape, expr } => {
                write!(f, "unsupported result type [{shape}] query=[{expr}]")
            }
            Self::Decode(msg) => write!(f, "decode response: {msg}"),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
