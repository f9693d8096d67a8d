//! Request-framing and command-dispatch engine: sessions, handlers, the
//! acceptor/worker pool, and the service lifecycle shell around them.

pub mod acceptor;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod service;
pub mod session;

pub use error::SessionError;
pub use service::{Service, ServiceHandle};
pub use session::Session;

/// Default TCP port the service listens on.
pub const DEFAULT_PORT: u16 = 4406;
