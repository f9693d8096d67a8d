//! Service lifecycle shell (C8): idempotent start/stop around the
//! acceptor.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use kvd_store::Registry;

use crate::acceptor;

/// A running acceptor loop, returned by [`Service::start`].
///
/// Dropping a handle without calling [`stop`][ServiceHandle::stop] still
/// cancels the acceptor: the `CancellationToken` is cancelled from `Drop`,
/// the same guarantee the teacher's session guards with its `dropping`
/// flag for a resource that must wind down exactly once either way.
pub struct ServiceHandle {
    shutdown: CancellationToken,
    acceptor: Mutex<Option<JoinHandle<std::io::Result<()>>>>,
    stopped: AtomicBool,
}

impl ServiceHandle {
    /// Signals shutdown and waits for the acceptor task to exit.
    ///
    /// Safe to call more than once, including concurrently: only the first
    /// call does anything, guarded by `stopped`.
    pub async fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shutdown.cancel();
        if let Some(acceptor) = self.acceptor.lock().await.take() {
            if let Err(err) = acceptor.await {
                log::warn!("acceptor task ended abnormally: {err}");
            }
        }
    }
}

impl Drop for ServiceHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Entry point wiring a [`Registry`] to a listening socket.
pub struct Service;

impl Service {
    /// Starts the acceptor loop on `addr` against `registry`, returning a
    /// handle that can later stop it.
    ///
    /// Starting a new service does not affect a handle from a previous
    /// `start` call still in use elsewhere — drop that one (or call its own
    /// `stop`) to tear it down.
    pub fn start(addr: SocketAddr, registry: Arc<Registry>) -> ServiceHandle {
        let shutdown = CancellationToken::new();
        let acceptor = tokio::spawn(acceptor::serve(addr, registry, shutdown.clone()));
        ServiceHandle {
            shutdown,
            acceptor: Mutex::new(Some(acceptor)),
            stopped: AtomicBool::new(false),
        }
    }
}
