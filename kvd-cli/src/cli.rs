//! Command-line argument parsing for the `kvd` binary.

use std::path::PathBuf;

use clap::Parser;

use kvd_core::DEFAULT_PORT;

/// A multi-database, network-exposed key-value service.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding one subdirectory per database.
    #[arg(long, default_value = "./data")]
    pub data_dir: PathBuf,

    /// TCP port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of async worker threads. Defaults to the number of available
    /// CPUs, mirroring the original service's one-thread-per-core pool.
    #[arg(long)]
    pub worker_threads: Option<usize>,

    /// Path to the engine tuning config file (`leveldb.xml`-shaped). Missing
    /// or malformed files fall back to defaults; this is never fatal.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
