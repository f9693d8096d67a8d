//! Configuration loader (C3).
//!
//! Reads `leveldb.xml`, extracting the engine tuning knobs named in §3.
//! A missing file or any parse error is non-fatal — defaults apply.

use std::path::Path;

use serde::Deserialize;

/// The options value shared by every store the [`Registry`][crate::Registry]
/// opens. Constructed once at startup and held for the process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    /// Bytes for a shared LRU block cache; `None` disables it.
    pub cache_size: Option<u64>,
    /// Overrides the engine's default write buffer size, in bytes.
    pub write_buffer_size: Option<u64>,
    /// Overrides the engine's default max open file handles.
    pub max_open_files: Option<i32>,
    /// Bits-per-key for a bloom filter; `None` disables it.
    pub bloom_bits: Option<i32>,
    /// Always `true` — every store is created on first open.
    pub create_if_missing: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            cache_size: None,
            write_buffer_size: None,
            max_open_files: None,
            bloom_bits: None,
            create_if_missing: true,
        }
    }
}

/// Mirrors the `<leveldb>` element of the config file. Every field is
/// optional so a partially-specified (or entirely absent) file still
/// parses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
struct RawConfig {
    cache_size: Option<u64>,
    write_buffer_size: Option<u64>,
    max_open_files: Option<i32>,
    bloom_bits: Option<i32>,
}

impl From<RawConfig> for StoreOptions {
    fn from(raw: RawConfig) -> Self {
        StoreOptions {
            cache_size: raw.cache_size,
            write_buffer_size: raw.write_buffer_size.filter(|v| *v > 0),
            max_open_files: raw.max_open_files.filter(|v| *v > 0),
            bloom_bits: raw.bloom_bits,
            create_if_missing: true,
        }
    }
}

/// Loads engine options from `path`. Never fails: a missing file or a
/// malformed one is logged at `warn` and defaults are substituted.
pub async fn load(path: &Path) -> StoreOptions {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) => {
            log::debug!("no config file at {}: {err}, using defaults", path.display());
            return StoreOptions::default();
        }
    };

    match quick_xml::de::from_str::<RawConfig>(&contents) {
        Ok(raw) => raw.into(),
        Err(err) => {
            log::warn!("failed to parse {}: {err}, using defaults", path.display());
            StoreOptions::default()
        }
    }
}
