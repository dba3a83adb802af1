//! Server-side configuration, read from `/etc/pharmacheck/<context>.toml`.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use verify::service::VerifyConfig;
use verify::store::Tables;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub verify: VerifyConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub secret: String,
    pub expire_secs: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            expire_secs: 86400,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub allow_admin_signup: bool,
    /// Mark the session cookie `Secure`; enable behind HTTPS.
    pub secure_cookie: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Rest,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: Backend,
    /// Relative paths resolve against the working directory.
    pub sqlite_path: String,
    pub rest: RestSection,
    pub tables: TablesConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Sqlite,
            sqlite_path: "data/pharmacheck.sqlite".to_string(),
            rest: RestSection::default(),
            tables: TablesConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RestSection {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for RestSection {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_secs: 10,
            max_retries: 2,
            retry_backoff_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TablesConfig {
    #[serde(flatten)]
    pub records: Tables,
    pub profiles: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        Self {
            records: Tables::default(),
            profiles: "profiles".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Empty allows any origin.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    ///
    /// `"prod"` becomes `/etc/pharmacheck/prod.toml`; anything containing a
    /// `/` or ending in `.toml` is taken as a path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.ends_with(".toml") {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/pharmacheck/{name_or_path}.toml"))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PHARMACHECK_JWT_SECRET`, `SUPABASE_URL` and `SUPABASE_KEY`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(secret) = non_empty("PHARMACHECK_JWT_SECRET") {
            self.jwt.secret = secret;
        }
        if let Some(url) = non_empty("SUPABASE_URL") {
            self.store.rest.url = url;
        }
        if let Some(key) = non_empty("SUPABASE_KEY") {
            self.store.rest.api_key = key;
        }
    }
}
