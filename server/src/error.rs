use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Invalid server configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid port '{value}'")]
    InvalidPort { value: String },

    #[error("invalid bucket count '{value}'")]
    InvalidBuckets { value: String },

    #[error("invalid bind address '{value}'")]
    InvalidBind { value: String },

    #[error("unexpected argument '{value}'")]
    UnexpectedArgument { value: String },
}

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors that end a single session; they never stop the server.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("connection closed before a complete request line")]
    Incomplete,

    #[error("no line terminator within the first {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("request is not valid UTF-8")]
    InvalidUtf8,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors of the command line client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{usage}")]
    Usage { usage: &'static str },

    #[error("invalid server address '{value}'")]
    InvalidAddr { value: String },

    #[error("server closed the connection without a response")]
    NoResponse,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
