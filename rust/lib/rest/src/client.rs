use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::RestError;
use crate::retry::RetryPolicy;

/// Connection settings for a PostgREST / GoTrue project.
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`.
    pub url: String,
    /// Project API key; sent as `apikey` and as the bearer token.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

/// A PostgREST horizontal filter (`column=op.value`).
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, String),
    Gte(String, String),
    Lte(String, String),
}

impl Filter {
    pub fn eq(column: &str, value: impl Into<String>) -> Self {
        Filter::Eq(column.to_string(), value.into())
    }

    pub fn gte(column: &str, value: impl Into<String>) -> Self {
        Filter::Gte(column.to_string(), value.into())
    }

    pub fn lte(column: &str, value: impl Into<String>) -> Self {
        Filter::Lte(column.to_string(), value.into())
    }

    /// Render as a query-string pair.
    pub fn to_query(&self) -> (String, String) {
        match self {
            Filter::Eq(c, v) => (c.clone(), format!("eq.{v}")),
            Filter::Gte(c, v) => (c.clone(), format!("gte.{v}")),
            Filter::Lte(c, v) => (c.clone(), format!("lte.{v}")),
        }
    }
}

/// Client for the `/rest/v1` and `/auth/v1` endpoints of one project.
pub struct RestClient {
    pub(crate) http: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl RestClient {
    pub fn new(config: RestConfig) -> Result<Self, RestError> {
        if config.url.trim().is_empty() {
            return Err(RestError::Config("store URL is empty".into()));
        }
        if config.api_key.trim().is_empty() {
            return Err(RestError::Config("store API key is empty".into()));
        }
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            retry: config.retry,
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    pub(crate) fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }

    /// `GET /rest/v1/{table}?select=...&filters`, retried under the policy.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<T>, RestError> {
        let mut query = vec![("select".to_string(), columns.to_string())];
        query.extend(filters.iter().map(Filter::to_query));
        let url = self.table_url(table);

        self.retry
            .run(|| {
                let req = self.authorize(self.http.get(&url)).query(&query);
                async move { decode(req.send().await?).await }
            })
            .await
    }

    /// `POST /rest/v1/{table}` returning the inserted rows. Not retried.
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        record: &B,
    ) -> Result<Vec<T>, RestError> {
        let resp = self
            .authorize(self.http.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(record)
            .send()
            .await?;
        decode(resp).await
    }
}

/// Turn a response into `T`, or a `RestError::Status` carrying the
/// server's message.
pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, RestError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(RestError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    resp.json::<T>()
        .await
        .map_err(|e| RestError::Decode(e.to_string()))
}

/// PostgREST uses `message`, GoTrue `msg` or `error_description`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}
