//! Per-connection session state and read loop (C4).
//!
//! Each session is driven by a single owned task: one outstanding read and
//! at most one outstanding write at a time, with the next header read
//! posted only once the current reply has been fully written. Because the
//! whole loop lives on one task, dispatch never observes a concurrent read
//! or write for the same session — the invariant in §8 holds by
//! construction, not by extra locking.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;

use kvd_proto::{Frame, OpCode, ProtocolError, Status};
use kvd_store::{Registry, StoreHandle};

use std::sync::Arc;

use crate::dispatch;
use crate::error::SessionError;

/// The mutable, business-level state of one connection: which store (if
/// any) is currently selected, and a handle back to the shared registry
/// OPEN/CREATE/CLOSE consult. Mutable only by this session's own handlers —
/// no other session observes it.
pub struct SessionState {
    pub registry: Arc<Registry>,
    pub selected: Option<StoreHandle>,
}

impl SessionState {
    pub fn new(registry: Arc<Registry>) -> Self {
        SessionState {
            registry,
            selected: None,
        }
    }
}

/// Drives one connection's read/dispatch/write loop until the socket
/// errors or the service is shutting down.
pub struct Session<S> {
    stream: S,
    state: SessionState,
    shutdown: CancellationToken,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, registry: Arc<Registry>, shutdown: CancellationToken) -> Self {
        Session {
            stream,
            state: SessionState::new(registry),
            shutdown,
        }
    }

    /// Runs the session to completion: READ_HEADER -> READ_PAYLOAD ->
    /// DISPATCH -> HANDLER -> reply -> READ_HEADER, until a socket error,
    /// an explicit shutdown signal, or end-of-stream.
    pub async fn run(mut self) {
        loop {
            let frame: Result<Frame, SessionError> = tokio::select! {
                biased;
                () = self.shutdown.cancelled() => return,
                frame = Frame::read(&mut self.stream) => frame.map_err(SessionError::from),
            };

            let reply = match frame {
                Ok(frame) => self.handle(frame).await,
                Err(SessionError::Protocol(ProtocolError::DataError(reason))) => {
                    log::debug!("malformed frame header: {reason}");
                    Frame::header_only(Status::DataError.into())
                }
                Err(SessionError::Protocol(ProtocolError::BadCommand(code))) => {
                    log::debug!("malformed frame header: bad command {code}");
                    Frame::header_only(Status::BadCommand.into())
                }
                Err(SessionError::Protocol(ProtocolError::Io(err))) => {
                    log::debug!("session closed: {err}");
                    return;
                }
                Err(SessionError::Io(err)) => {
                    log::debug!("session closed: {err}");
                    return;
                }
            };

            if let Err(err) = reply.write(&mut self.stream).await {
                log::debug!("session closed while writing reply: {err}");
                return;
            }
        }
    }

    async fn handle(&mut self, frame: Frame) -> Frame {
        match OpCode::try_from(frame.code) {
            Ok(opcode) => dispatch::dispatch(opcode, frame.payload, &mut self.state).await,
            Err(_unknown) => Frame::header_only(Status::BadCommand.into()),
        }
    }
}
