//! Shared HTTP session
//!
//! One session (one `reqwest::Client` connection pool) is opened per run and
//! borrowed by every listing and download task. An optional semaphore bounds the
//! number of requests in flight; a permit covers a single request and its body,
//! never a wait on child tasks, so the recursive walk cannot starve itself.
//!
//! The API token is only attached to requests for the origin of the root
//! listing URL. Download URLs pointing at other hosts never see it.

use crate::error::{MirrorError, Result};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Url};
use std::time::Duration;
use tokio::sync::{Semaphore, SemaphorePermit};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub fn default_user_agent() -> String {
    format!("repomirror/{}", env!("CARGO_PKG_VERSION"))
}

/// Transport settings for a session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// API token sent as `Authorization: token <token>`
    pub token: Option<String>,
    /// Upper bound on concurrent requests (None = unbounded)
    pub max_concurrent_requests: Option<usize>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: default_user_agent(),
            token: None,
            max_concurrent_requests: None,
        }
    }
}

pub struct Session {
    client: Client,
    limiter: Option<Semaphore>,
    auth: Option<ApiAuth>,
}

/// Token header bound to the API origin
struct ApiAuth {
    api_root: Url,
    header: HeaderValue,
}

impl ApiAuth {
    fn applies_to(&self, url: &Url) -> bool {
        url.origin() == self.api_root.origin()
    }
}

impl Session {
    /// Open a session for the API rooted at `api_root`.
    pub fn new(options: &SessionOptions, api_root: &Url) -> Result<Self> {
        let auth = match &options.token {
            Some(token) => {
                let mut header = HeaderValue::from_str(&format!("token {}", token))
                    .map_err(|e| MirrorError::Config(format!("Invalid API token: {}", e)))?;
                header.set_sensitive(true);
                Some(ApiAuth {
                    api_root: api_root.clone(),
                    header,
                })
            }
            None => None,
        };

        let client = Client::builder()
            .user_agent(options.user_agent.clone())
            .connect_timeout(options.connect_timeout)
            .timeout(options.request_timeout)
            .build()
            .map_err(|e| MirrorError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            limiter: options.max_concurrent_requests.map(Semaphore::new),
            auth,
        })
    }

    /// Wait for a request slot. Hold the returned guard until the response
    /// body has been consumed.
    pub(crate) async fn acquire(&self) -> Result<Option<SemaphorePermit<'_>>> {
        match &self.limiter {
            Some(limiter) => limiter
                .acquire()
                .await
                .map(Some)
                .map_err(|_| MirrorError::Task("request limiter closed".to_string())),
            None => Ok(None),
        }
    }

    pub(crate) fn get(&self, url: &Url) -> RequestBuilder {
        let request = self.client.get(url.clone());
        match &self.auth {
            Some(auth) if auth.applies_to(url) => {
                request.header(AUTHORIZATION, auth.header.clone())
            }
            _ => request,
        }
    }
}
