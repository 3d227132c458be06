//! Download cache for fetched result images.
//!
//! A task result lives at a stable URL, and a re-run against the same task
//! (tweaking composition parameters, retrying a failed composite) would
//! otherwise re-download the identical cutout every time. This module
//! caches fetched bytes on disk so only the first run pays the network
//! round-trip.
//!
//! ## Cache keys
//!
//! The cache is addressed by the SHA-256 of the result URL. A cache hit
//! requires both a manifest entry for the hash and the cached file still
//! existing on disk; anything else falls through to a fresh fetch.
//!
//! ## Storage
//!
//! Cached files are named by their key hash and live next to a JSON
//! manifest (`.download-cache.json`) in the cache directory. The manifest
//! carries a version number — bump [`MANIFEST_VERSION`] to invalidate all
//! existing caches when the format changes. A missing or unparsable
//! manifest loads as empty.
//!
//! ## Bypassing
//!
//! `--no-cache` constructs a [`DownloadCache::disabled`] instance: every
//! fetch goes to the network and nothing is written.

use crate::task::{TaskApi, TaskError};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the cache directory.
const MANIFEST_FILENAME: &str = ".download-cache.json";

/// Version of the manifest format. Bump to invalidate existing caches.
const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct CacheManifest {
    version: u32,
    /// url hash → cached file name (relative to the cache directory).
    entries: HashMap<String, String>,
}

impl CacheManifest {
    fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the cache directory, tolerating a missing or corrupt
    /// manifest (both load as empty — the cache re-fills naturally).
    fn load(dir: &Path) -> Self {
        let path = dir.join(MANIFEST_FILENAME);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::empty();
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(manifest) if manifest.version == MANIFEST_VERSION => manifest,
            _ => Self::empty(),
        }
    }

    fn save(&self, dir: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(dir.join(MANIFEST_FILENAME), json)
    }
}

/// Bytes returned by a cache-mediated fetch, with their provenance.
#[derive(Debug)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub from_cache: bool,
}

/// URL-addressed disk cache in front of [`TaskApi::fetch_bytes`].
pub struct DownloadCache {
    /// `None` when caching is bypassed.
    dir: Option<PathBuf>,
    manifest: CacheManifest,
}

impl DownloadCache {
    /// Open (or initialize) the cache in `dir`.
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: Some(dir.to_path_buf()),
            manifest: CacheManifest::load(dir),
        })
    }

    /// A cache that never reads or writes disk (`--no-cache`).
    pub fn disabled() -> Self {
        Self {
            dir: None,
            manifest: CacheManifest::empty(),
        }
    }

    /// Fetch `url`, serving from disk when possible.
    pub fn fetch(&mut self, api: &impl TaskApi, url: &str) -> Result<Fetched, TaskError> {
        let key = url_key(url);

        if let Some(dir) = &self.dir
            && let Some(file_name) = self.manifest.entries.get(&key)
            && let Ok(bytes) = fs::read(dir.join(file_name))
        {
            return Ok(Fetched {
                bytes,
                from_cache: true,
            });
        }

        let bytes = api.fetch_bytes(url)?;

        if let Some(dir) = &self.dir {
            let file_name = format!("{key}.bin");
            fs::write(dir.join(&file_name), &bytes)?;
            self.manifest.entries.insert(key, file_name);
            self.manifest.save(dir)?;
        }

        Ok(Fetched {
            bytes,
            from_cache: false,
        })
    }
}

fn url_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}
