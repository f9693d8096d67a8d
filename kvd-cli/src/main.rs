//! `kvd`: process entry point (C9).
//!
//! Parses arguments, installs logging, bootstraps the database registry,
//! starts the service, and blocks until Ctrl-C requests a graceful
//! shutdown.

mod cli;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use clap::Parser;

use cli::Cli;
use kvd_core::Service;
use kvd_store::{config, Registry};

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let runtime = build_runtime(cli.worker_threads);
    runtime.block_on(run(cli));
}

/// Sizes the runtime's worker pool to `worker_threads`, defaulting to the
/// number of available CPUs — the original service's one-thread-per-core
/// pool, reproduced with a `tokio` multi-thread runtime.
fn build_runtime(worker_threads: Option<usize>) -> tokio::runtime::Runtime {
    let worker_threads = worker_threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    });
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()
        .expect("failed to build the tokio runtime")
}

async fn run(cli: Cli) {
    if let Err(err) = tokio::fs::create_dir_all(&cli.data_dir).await {
        log::error!(
            "failed to create data directory {}: {err}",
            cli.data_dir.display()
        );
        return;
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.data_dir.join("leveldb.xml"));
    let options = config::load(&config_path).await;

    let registry = match Registry::bootstrap(cli.data_dir.clone(), options).await {
        Ok(registry) => Arc::new(registry),
        Err(err) => {
            log::error!(
                "failed to bootstrap registry at {}: {err}",
                cli.data_dir.display()
            );
            return;
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let handle = Service::start(addr, registry);
    log::info!("kvd listening on {addr}");

    wait_for_ctrl_c().await;
    log::info!("shutdown requested, draining connections");
    handle.stop().await;
}

/// Resolves once Ctrl-C is received, bridging `ctrlc`'s synchronous handler
/// into the async runtime via a one-shot channel.
async fn wait_for_ctrl_c() {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let tx = Mutex::new(Some(tx));
    ctrlc::set_handler(move || {
        if let Some(tx) = tx.lock().unwrap().take() {
            let _ = tx.send(());
        }
    })
    .expect("failed to install Ctrl-C handler");

    let _ = rx.await;
}
