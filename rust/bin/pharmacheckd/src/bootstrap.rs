//! Bootstrap: startup checks and backend wiring.
//!
//! When pharmacheckd starts:
//! 1. Verify the config is usable; refuse to start otherwise.
//! 2. Open the configured backend and build both stores on top of it.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use auth::store::{IdentityStore, RestIdentityStore, SqlIdentityStore};
use pharmacheck_rest::{RestClient, RestConfig, RetryPolicy};
use pharmacheck_sql::{SQLStore, SqliteStore};
use verify::store::{RecordStore, RestRecordStore, SqlRecordStore};

use crate::config::{Backend, ServerConfig, StoreConfig};

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.jwt.secret.is_empty() {
        anyhow::bail!(
            "JWT secret is empty in configuration.\n\
             Set [jwt].secret or PHARMACHECK_JWT_SECRET."
        );
    }
    if config.jwt.expire_secs <= 0 {
        anyhow::bail!("[jwt].expire_secs must be positive.");
    }
    match config.store.backend {
        Backend::Sqlite if config.store.sqlite_path.is_empty() => {
            anyhow::bail!("Store backend is sqlite but [store].sqlite_path is empty.")
        }
        Backend::Rest if config.store.rest.url.is_empty() || config.store.rest.api_key.is_empty() => {
            anyhow::bail!(
                "Store backend is rest but the URL or API key is missing.\n\
                 Set [store.rest] or SUPABASE_URL / SUPABASE_KEY."
            )
        }
        _ => Ok(()),
    }
}

/// The two stores the modules run on, sharing one backend.
pub struct Stores {
    pub identities: Arc<dyn IdentityStore>,
    pub records: Arc<dyn RecordStore>,
}

pub fn open_stores(config: &StoreConfig) -> anyhow::Result<Stores> {
    let tables = &config.tables;
    match config.backend {
        Backend::Sqlite => {
            let path = std::path::Path::new(&config.sqlite_path);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let sql: Arc<dyn SQLStore> = Arc::new(
                SqliteStore::open(path)
                    .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
            );
            info!(path = %path.display(), "SQLite store opened");
            sql_stores(sql, config)
        }
        Backend::Rest => {
            let client = Arc::new(RestClient::new(RestConfig {
                url: config.rest.url.clone(),
                api_key: config.rest.api_key.clone(),
                timeout: Duration::from_secs(config.rest.timeout_secs),
                retry: RetryPolicy {
                    max_retries: config.rest.max_retries,
                    backoff: Duration::from_millis(config.rest.retry_backoff_ms),
                },
            })?);
            info!(url = %config.rest.url, "REST store configured");
            Ok(Stores {
                identities: Arc::new(RestIdentityStore::new(client.clone(), &tables.profiles)),
                records: Arc::new(RestRecordStore::new(client, tables.records.clone())),
            })
        }
    }
}

/// Build both stores over an already-open SQL backend.
pub fn sql_stores(sql: Arc<dyn SQLStore>, config: &StoreConfig) -> anyhow::Result<Stores> {
    let tables = &config.tables;
    let identities = SqlIdentityStore::new(sql.clone(), &tables.profiles)?;
    let records = SqlRecordStore::new(sql, tables.records.clone())?;
    Ok(Stores {
        identities: Arc::new(identities),
        records: Arc::new(records),
    })
}
