use std::sync::Arc;

use bytes::Bytes;
use log::{debug, warn};
use stacksign_core::utils::redact_query;
use stacksign_core::{Context, Result};

use crate::constants::*;
use crate::response::parse_response;
use crate::{Config, Document, Element, JobPoller, RequestSigner};

/// Client sends signed requests to one CloudStack endpoint.
///
/// Cloning is cheap and clones share the same context and config.
#[derive(Debug, Clone)]
pub struct Client {
    ctx: Context,
    config: Arc<Config>,
}

impl Client {
    /// Create a new client.
    pub fn new(ctx: Context, config: Config) -> Self {
        Self {
            ctx,
            config: Arc::new(config),
        }
    }

    /// Get the config of this client.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build a signed url for `command`.
    ///
    /// Fails with [`stacksign_core::ErrorKind::ConfigInvalid`] when the
    /// endpoint or the keys are missing.
    pub fn build_url(&self, command: &str, params: &[(&str, &str)]) -> Result<String> {
        let endpoint = self.config.endpoint()?;
        let credential = self.config.credential()?;

        RequestSigner::new(endpoint, credential).build_url(command, params)
    }

    /// Send a GET to a signed url.
    ///
    /// Returns `Ok(None)` when CloudStack reports that nothing matched.
    /// No retry happens here.
    pub async fn get(&self, url: &str) -> Result<Option<Document>> {
        let logged = redact_query(url, &["apiKey", "signature"]);
        debug!("sending cloudstack request: {logged}");

        let req = http::Request::get(url).body(Bytes::new())?;
        let resp = self
            .ctx
            .http_send(req)
            .await
            .map_err(|e| e.with_context(format!("url: {logged}")))?;

        let (parts, body) = resp.into_parts();
        debug!("cloudstack responded {} for {logged}", parts.status);

        parse_response(parts.status, body).map_err(|e| e.with_context(format!("url: {logged}")))
    }

    /// Build, sign and send `command`.
    pub async fn call(&self, command: &str, params: &[(&str, &str)]) -> Result<Option<Document>> {
        let url = self.build_url(command, params)?;
        self.get(&url).await
    }

    /// Collect every `tag` element of a list command across all pages.
    ///
    /// Pages of [`LIST_PAGE_SIZE`] are requested until a short page, the
    /// reported `count` is reached, a page repeats the previous one, or
    /// CloudStack reports no data.
    pub async fn list(
        &self,
        command: &str,
        params: &[(&str, &str)],
        tag: &str,
    ) -> Result<Vec<Element>> {
        let page_size = LIST_PAGE_SIZE.to_string();
        let mut items = Vec::new();

        for page in 1.. {
            let page = page.to_string();
            let mut paged = params.to_vec();
            paged.push(("page", &page));
            paged.push(("pagesize", &page_size));

            let Some(doc) = self.call(command, &paged).await? else {
                break;
            };

            let fetched: Vec<Element> = doc.root().children_named(tag).cloned().collect();
            if fetched.is_empty() {
                break;
            }
            // A command that ignores `page` answers with the first page again.
            if items.len() >= fetched.len() && items[items.len() - fetched.len()..] == fetched[..] {
                warn!("{command}: page {page} repeats the previous page, stop paging");
                break;
            }
            let fetched_len = fetched.len();
            items.extend(fetched);

            let total = doc
                .root()
                .child(TAG_COUNT)
                .and_then(|c| c.text().parse::<usize>().ok());
            if fetched_len < LIST_PAGE_SIZE || total.is_some_and(|total| items.len() >= total) {
                break;
            }
        }

        Ok(items)
    }

    /// Wait for the job started by `doc`, see [`JobPoller::wait`].
    pub async fn wait_for_job(&self, doc: &Document, label: &str) -> Result<Document> {
        JobPoller::new(self, label).wait(doc).await
    }

    /// Wait for a known job id, see [`JobPoller::wait_for_id`].
    pub async fn wait_for_job_id(&self, job_id: &str, label: &str) -> Result<Document> {
        JobPoller::new(self, label).wait_for_id(job_id).await
    }

    /// Create a poller for finer control: cancellation, interval, deadline.
    pub fn job_poller(&self, label: &str) -> JobPoller<'_> {
        JobPoller::new(self, label)
    }
}
