//! [`HttpSend`] implementation backed by [`reqwest`].
//!
//! Proxy and timeout settings live on the [`reqwest::Client`] passed to
//! [`ReqwestHttpSend::new`].

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use reqwest::{Client, Request};
use stacksign_core::{Error, HttpSend, Result};

/// HttpSend that executes requests with a shared `reqwest::Client`.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::config_invalid("failed to build http request").with_source(e))?;
        let url = req.url().as_str().split('?').next().unwrap_or_default().to_string();

        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| {
                Error::transport(format!("failed to send request: {e}"))
                    .with_source(e)
                    .with_context(format!("url: {url}"))
            })?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| {
                Error::transport(format!("failed to read response body: {e}"))
                    .with_source(e)
                    .with_context(format!("url: {url}"))
            })?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
