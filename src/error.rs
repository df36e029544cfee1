use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("handshake failed: {0}")]
    Handshake(#[from] HandshakeError),
}

/// Why a connection was refused before registration.
///
/// The Display output of the rejecting variants is the exact line written
/// back to the client before the transport is closed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HandshakeError {
    #[error("ERROR: Username contains forbidden words")]
    ForbiddenName,

    #[error("ERROR: Username {0} is already taken")]
    NameTaken(String),

    #[error("ERROR: Username cannot be empty")]
    EmptyName,

    /// The peer went away before sending a name line. Nothing is written back.
    #[error("connection closed before a name was sent")]
    Disconnected,
}

impl HandshakeError {
    /// The line to send the client, if any.
    pub fn reply(&self) -> Option<String> {
        match self {
            HandshakeError::Disconnected => None,
            other => Some(other.to_string()),
        }
    }
}

/// Recoverable command failures. Display is the inline reply text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("ERROR: unknown command. Type /help to get the list of all available commands")]
    Unknown(String),

    #[error("Invalid command. Usage: {0} <username1> <username2> ... <message>")]
    Usage(&'static str),

    #[error("No valid message provided after the usernames.")]
    NoMessage,
}

/// Failure to enqueue a line on a session's outbound queue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("session is closed")]
    Closed,

    #[error("outbound queue is full")]
    Full,
}
