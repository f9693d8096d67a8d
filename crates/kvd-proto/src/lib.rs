//! Wire protocol for the `kvd` key-value service.
//!
//! Every request and response is an 8-byte header (a 32-bit little-endian
//! `code` followed by a 32-bit little-endian payload length `L`) and a
//! payload of exactly `L` bytes. See [`frame`] for the codec, [`opcode`] for
//! the request opcode table, and [`status`] for the reply status codes.

pub mod batch;
pub mod error;
pub mod frame;
pub mod opcode;
pub mod status;

pub use batch::{BatchOp, BatchParseError};
pub use error::ProtocolError;
pub use frame::Frame;
pub use opcode::OpCode;
pub use status::Status;

/// Protocol-level result type.
pub type Result<T> = std::result::Result<T, ProtocolError>;
