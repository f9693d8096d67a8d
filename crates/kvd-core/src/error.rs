//! Session-level error type.

use thiserror::Error;

/// Errors that end a session.
///
/// Unlike a malformed payload (which a handler turns into a status reply
/// and keeps the connection open for), everything reaching this type closes
/// the socket: the session loop's only response to a `SessionError` is to
/// drop the connection and release every reference it held.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("connection I/O error")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] kvd_proto::ProtocolError),
}
