//! # JSON HTTP Client
//!
//! A thin wrapper around `reqwest` with middleware support for transient
//! retries. Callers get two operations: fetch a JSON document, or push a
//! JSON body with a bearer credential. Anything more exotic does not exist
//! in this system.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Maximum transient retries per request. Kept low: both call sites are
/// best-effort and a tick must not stall behind a long retry ladder.
const MAX_RETRIES: u32 = 2;

/// A JSON-speaking HTTP client with retries and a per-request timeout.
pub struct JsonClient {
    inner: ClientWithMiddleware,
}

impl JsonClient {
    /// Builds a client enforcing `timeout` on every request and retrying
    /// transient failures with exponential backoff.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);
        let base = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("gardenstock/0.1")
            .build()?;
        let inner = ClientBuilder::new(base)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Ok(Self { inner })
    }

    /// GETs `url` and deserializes the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> anyhow::Result<T> {
        let response = self.inner.get(url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// POSTs `body` as JSON to `url`, authorizing with a bearer credential.
    pub async fn post_json<B: Serialize>(
        &self,
        url: &str,
        bearer: &str,
        body: &B,
    ) -> anyhow::Result<()> {
        self.inner
            .post(url)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
