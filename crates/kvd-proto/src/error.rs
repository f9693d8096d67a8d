//! Protocol-level error type.

use thiserror::Error;

/// Errors that arise while decoding a frame or a command payload.
///
/// A [`ProtocolError`] never closes the connection by itself — handlers
/// catch it and reply with the matching status code
/// ([`Status::DataError`][crate::Status::DataError] or
/// [`Status::BadCommand`][crate::Status::BadCommand]); only [`Io`][Self::Io]
/// propagates up to the session loop, which does close the socket.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// A length field was negative, or the payload was shorter than its
    /// declared fields required.
    #[error("malformed payload: {0}")]
    DataError(&'static str),

    /// A request opcode, or a batch sub-opcode, did not match any known
    /// command.
    #[error("unknown command opcode: {0}")]
    BadCommand(i32),

    /// The socket errored while reading or writing a frame.
    #[error("connection I/O error")]
    Io(#[from] std::io::Error),
}
