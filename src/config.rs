//! Storage configuration.
//!
//! The dashboard reads one fixed object. Defaults are embedded; `.env` or the
//! process environment can point it elsewhere (e.g. a staging bucket).

use tracing::debug;

pub const DEFAULT_SUPABASE_URL: &str = "https://kjzkdebwhnwecuaaxerv.supabase.co";
pub const DEFAULT_SUPABASE_KEY: &str = "sb_publishable_LvtH9iUC9QkhYNUwMcVQCA_j3v-FVHQ";
pub const DEFAULT_BUCKET: &str = "realty-data";
pub const DEFAULT_OBJECT_PATH: &str = "realty-data-1141215/test101-1141111.csv";

/// Where the transaction CSV lives and how to authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub url: String,
    pub key: String,
    pub bucket: String,
    pub object_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SUPABASE_URL.to_string(),
            key: DEFAULT_SUPABASE_KEY.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
            object_path: DEFAULT_OBJECT_PATH.to_string(),
        }
    }
}

impl StorageConfig {
    /// Load from `.env` / environment, falling back to the embedded defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |name: &str, default: &str| {
            match lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                Some(v) => {
                    debug!("{name} overridden from environment");
                    v
                }
                None => default.to_string(),
            }
        };
        Self {
            url: pick("SUPABASE_URL", DEFAULT_SUPABASE_URL),
            key: pick("SUPABASE_KEY", DEFAULT_SUPABASE_KEY),
            bucket: pick("REALTY_BUCKET", DEFAULT_BUCKET),
            object_path: pick("REALTY_OBJECT_PATH", DEFAULT_OBJECT_PATH),
        }
    }
}

// Keep the key out of logs and panics.
impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("object_path", &self.object_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_environment_is_empty() {
        let cfg = StorageConfig::from_lookup(|_| None);
        assert_eq!(cfg, StorageConfig::default());
        assert_eq!(cfg.bucket, "realty-data");
    }

    #[test]
    fn overrides_and_ignores_blank_values() {
        let env: HashMap<&str, &str> = [
            ("SUPABASE_URL", "http://localhost:54321"),
            ("REALTY_BUCKET", "   "),
            ("REALTY_OBJECT_PATH", "x/y.csv"),
        ]
        .into_iter()
        .collect();
        let cfg = StorageConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.url, "http://localhost:54321");
        assert_eq!(cfg.bucket, DEFAULT_BUCKET);
        assert_eq!(cfg.object_path, "x/y.csv");
        assert_eq!(cfg.key, DEFAULT_SUPABASE_KEY);
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", StorageConfig::default());
        assert!(!rendered.contains(DEFAULT_SUPABASE_KEY));
        assert!(rendered.contains("<redacted>"));
    }
}
