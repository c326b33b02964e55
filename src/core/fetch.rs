//! HTTP access for product pages.
//!
//! [`PageFetcher`] is the seam between the pipeline and the network: the real
//! implementation wraps a `reqwest` client with redirects disabled, so status
//! handling (including the single 308 follow) stays in the service layer.

use crate::config::HttpSettings;
use crate::errors::Result;
use async_trait::async_trait;
use reqwest::{StatusCode, header::LOCATION, redirect::Policy};
use std::time::Duration;
use tracing::trace;

/// The parts of an HTTP response the pipeline looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    /// `Location` header, if the server sent one
    pub location: Option<String>,
    /// Body decoded as UTF-8 with invalid sequences replaced; empty unless 200
    pub body: String,
}

impl FetchedPage {
    #[must_use]
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            location: None,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn redirect(status: u16, location: impl Into<String>) -> Self {
        Self {
            status,
            location: Some(location.into()),
            body: String::new(),
        }
    }

    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self {
            status,
            location: None,
            body: String::new(),
        }
    }
}

/// Issues a single GET without following redirects.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// # Errors
    /// Returns an error on transport failures (timeout, DNS, connection reset).
    /// Non-200 statuses are not errors at this level.
    async fn get(&self, url: &str) -> Result<FetchedPage>;
}

/// `reqwest`-backed fetcher with a browser User-Agent and a fixed timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// # Errors
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .redirect(Policy::none())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        trace!("GET {} -> {}", url, status);

        let body = if status == StatusCode::OK {
            let bytes = response.bytes().await?;
            String::from_utf8_lossy(&bytes).into_owned()
        } else {
            String::new()
        };

        Ok(FetchedPage {
            status: status.as_u16(),
            location,
            body,
        })
    }
}
