//! The embedded LSM engine adapter (C10).
//!
//! Out of scope per the design: the engine's own on-disk log and table
//! formats are an external library's concern. This module only binds the
//! "ok / not-found / io-error" contract the rest of the service assumes of
//! it to a concrete, idiomatic Rust embedded store.

use std::path::Path;

use thiserror::Error;

use kvd_proto::BatchOp;

use crate::config::StoreOptions;

/// Errors an engine call can report.
///
/// `NotFound` is kept distinct from `Io` even though this adapter's
/// `delete` never produces it (rocksdb, like the original LevelDB, treats
/// deleting an absent key as a successful no-op) — it exists because the
/// handler contract in §4.6 maps a hypothetical not-found delete to
/// `NOT_FOUND` rather than `DB_ERROR`, and a future engine swap should not
/// have to change that mapping.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("key not found")]
    NotFound,
    #[error("engine I/O error: {0}")]
    Io(String),
}

/// The operations a backing store must support.
///
/// Implemented here over `rocksdb::DB`, the idiomatic Rust binding for an
/// embedded LSM store, filling the role the design treats as an external
/// collaborator.
pub trait Store: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError>;
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), EngineError>;
    fn delete(&self, key: &[u8]) -> Result<(), EngineError>;
    fn write_batch(&self, ops: &[BatchOp]) -> Result<(), EngineError>;
}

/// A [`Store`] backed by a single `rocksdb::DB` instance.
pub struct RocksStore {
    db: rocksdb::DB,
}

impl RocksStore {
    /// Opens (creating if missing) the database at `path` with `opts`
    /// applied.
    pub fn open(path: &Path, opts: &StoreOptions) -> Result<Self, EngineError> {
        let mut rocks_opts = rocksdb::Options::default();
        rocks_opts.create_if_missing(opts.create_if_missing);

        if let Some(write_buffer_size) = opts.write_buffer_size {
            rocks_opts.set_write_buffer_size(write_buffer_size as usize);
        }
        if let Some(max_open_files) = opts.max_open_files {
            rocks_opts.set_max_open_files(max_open_files);
        }

        if opts.cache_size.is_some() || opts.bloom_bits.is_some() {
            let mut block_opts = rocksdb::BlockBasedOptions::default();
            if let Some(cache_size) = opts.cache_size {
                block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(cache_size as usize));
            }
            if let Some(bloom_bits) = opts.bloom_bits {
                block_opts.set_bloom_filter(bloom_bits as f64, false);
            }
            rocks_opts.set_block_based_table_factory(&block_opts);
        }

        let db = rocksdb::DB::open(&rocks_opts, path)
            .map_err(|err| EngineError::Io(err.to_string()))?;
        Ok(RocksStore { db })
    }
}

impl Store for RocksStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, EngineError> {
        self.db
            .get(key)
            .map_err(|err| EngineError::Io(err.to_string()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), EngineError> {
        self.db
            .put(key, value)
            .map_err(|err| EngineError::Io(err.to_string()))
    }

    fn delete(&self, key: &[u8]) -> Result<(), EngineError> {
        self.db
            .delete(key)
            .map_err(|err| EngineError::Io(err.to_string()))
    }

    fn write_batch(&self, ops: &[BatchOp]) -> Result<(), EngineError> {
        let mut batch = rocksdb::WriteBatch::default();
        for op in ops {
            match op {
                BatchOp::Put { key, value } => batch.put(key, value),
                BatchOp::Delete { key } => batch.delete(key),
            }
        }
        self.db
            .write(batch)
            .map_err(|err| EngineError::Io(err.to_string()))
    }
}
