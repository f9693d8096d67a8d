//! TCP acceptor (C7): binds the listening socket and spawns one session
//! task per accepted connection.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use kvd_store::Registry;

use crate::session::Session;

/// Binds `addr` and accepts connections until `shutdown` is cancelled.
///
/// Each accepted connection gets its own task running a [`Session`] to
/// completion; the acceptor does not wait for in-flight sessions to finish
/// before returning, matching §4.8's "drain the current frame, not the
/// whole connection" shutdown contract, which is the session's job, not
/// the acceptor's.
pub async fn serve(
    addr: SocketAddr,
    registry: Arc<Registry>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on {addr}");

    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => {
                log::debug!("acceptor shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        log::warn!("accept failed: {err}");
                        continue;
                    }
                };
                log::debug!("accepted connection from {peer}");
                let session = Session::new(stream, registry.clone(), shutdown.clone());
                tokio::spawn(session.run());
            }
        }
    }
}
