//! Data-access layer: one HTTP GET per call, JSON decoded into [`User`]s.
//!
//! No retries, timeouts or caching happen here; the query layer owns those
//! concerns.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::{FetchError, Resource};
use crate::model::User;

/// Public demo endpoint used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Anything that can produce users for the query layer.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// `GET {base}/users`
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError>;

    /// `GET {base}/users/{id}`
    async fn fetch_user(&self, id: &str) -> Result<User, FetchError>;
}

/// [`UserSource`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpUserSource {
    client: Client,
    base_url: String,
}

impl HttpUserSource {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, resource: Resource) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(%url, error = %e, "request failed");
            FetchError::cause(resource, e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "unexpected status");
            return Err(FetchError::status(resource, status));
        }

        response.json::<T>().await.map_err(|e| {
            warn!(%url, error = %e, "failed to decode body");
            FetchError::cause(resource, e)
        })
    }
}

#[async_trait]
impl UserSource for HttpUserSource {
    #[instrument(skip(self))]
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        self.get_json("/users", Resource::Users).await
    }

    #[instrument(skip(self))]
    async fn fetch_user(&self, id: &str) -> Result<User, FetchError> {
        self.get_json(&format!("/users/{id}"), Resource::User).await
    }
}
