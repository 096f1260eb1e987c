//! Object-store access.
//!
//! The loader only needs `download(bucket, path) -> bytes`. `SupabaseStorage`
//! talks to the Supabase Storage REST API; `MemoryStore` serves fixed bytes for
//! tests and offline runs.

use std::collections::HashMap;

use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::error::AppError;

/// Anything that can hand back the raw bytes of a stored object.
pub trait ObjectStore {
    fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, AppError>;
}

pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    key: String,
}

impl SupabaseStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            key: config.key.clone(),
        }
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket.trim_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl ObjectStore for SupabaseStorage {
    fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, AppError> {
        let url = self.object_url(bucket, path);
        debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .map_err(|e| AppError::runtime(format!("Storage request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::runtime(format!(
                "Storage download of {bucket}/{path} failed with status {}.",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .map_err(|e| AppError::runtime(format!("Failed to read storage response: {e}")))?;
        info!("Downloaded {} bytes from {bucket}/{path}", bytes.len());
        Ok(bytes.to_vec())
    }
}

/// In-memory object store keyed by `(bucket, path)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: HashMap<(String, String), Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, bucket: &str, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.objects
            .insert((bucket.to_string(), path.to_string()), bytes.into());
        self
    }
}

impl ObjectStore for MemoryStore {
    fn download(&self, bucket: &str, path: &str) -> Result<Vec<u8>, AppError> {
        self.objects
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
            .ok_or_else(|| AppError::runtime(format!("Object not found: {bucket}/{path}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_url_joins_segments() {
        let cfg = StorageConfig {
            url: "https://example.supabase.co/".to_string(),
            ..StorageConfig::default()
        };
        let store = SupabaseStorage::new(&cfg);
        assert_eq!(
            store.object_url("realty-data", "/a/b.csv"),
            "https://example.supabase.co/storage/v1/object/realty-data/a/b.csv"
        );
    }

    #[test]
    fn memory_store_serves_and_misses() {
        let store = MemoryStore::new().with_object("b", "p.csv", "x,y\n");
        assert_eq!(store.download("b", "p.csv").unwrap(), b"x,y\n".to_vec());
        let err = store.download("b", "missing.csv").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_RUNTIME);
    }
}
