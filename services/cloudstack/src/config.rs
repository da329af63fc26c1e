use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::time::Duration;

use log::warn;
use stacksign_core::utils::Redact;
use stacksign_core::{Context, Error, Result};

use crate::constants::*;
use crate::Credential;

/// Config carries all the configuration for a CloudStack endpoint.
///
/// The config is resolved once and handed to [`crate::Client::new`]; nothing
/// is re-read from the environment afterwards.
#[derive(Clone, Default)]
pub struct Config {
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDSTACK_ENDPOINT`]
    ///
    /// Both `https://cloud.example/client` and `https://cloud.example/client/api`
    /// are accepted.
    pub endpoint: Option<String>,
    /// `api_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDSTACK_API_KEY`]
    pub api_key: Option<String>,
    /// `secret_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDSTACK_SECRET_KEY`]
    pub secret_key: Option<String>,
    /// `proxy_host` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDSTACK_PROXY_HOST`]
    pub proxy_host: Option<String>,
    /// `proxy_port` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDSTACK_PROXY_PORT`]
    pub proxy_port: Option<u16>,
    /// Network timeout for a single request, from [`CLOUDSTACK_TIMEOUT`] in seconds.
    ///
    /// Transport defaults apply when unset.
    pub timeout: Option<Duration>,
    /// Delay between two `queryAsyncJobResult` calls, from
    /// [`CLOUDSTACK_POLL_INTERVAL`] in seconds. Defaults to 5 seconds.
    pub poll_interval: Option<Duration>,
    /// Upper bound for waiting on a single job, from [`CLOUDSTACK_MAX_JOB_WAIT`]
    /// in seconds. Jobs are waited on forever when unset.
    pub max_job_wait: Option<Duration>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set api_key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set secret_key
    pub fn with_secret_key(mut self, secret_key: impl Into<String>) -> Self {
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set proxy host and port
    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy_host = Some(host.into());
        self.proxy_port = Some(port);
        self
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set job poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set max job wait
    pub fn with_max_job_wait(mut self, max_wait: Duration) -> Self {
        self.max_job_wait = Some(max_wait);
        self
    }

    /// Load config from env.
    ///
    /// Fields that are already set are kept. Values that fail to parse are
    /// skipped with a warning.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(CLOUDSTACK_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CLOUDSTACK_API_KEY) {
            self.api_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CLOUDSTACK_SECRET_KEY) {
            self.secret_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CLOUDSTACK_PROXY_HOST) {
            self.proxy_host.get_or_insert(v);
        }
        if self.proxy_port.is_none() {
            self.proxy_port = env_parse(ctx, CLOUDSTACK_PROXY_PORT);
        }
        if self.timeout.is_none() {
            self.timeout = env_parse(ctx, CLOUDSTACK_TIMEOUT).map(Duration::from_secs);
        }
        if self.poll_interval.is_none() {
            self.poll_interval = env_parse(ctx, CLOUDSTACK_POLL_INTERVAL).map(Duration::from_secs);
        }
        if self.max_job_wait.is_none() {
            self.max_job_wait = env_parse(ctx, CLOUDSTACK_MAX_JOB_WAIT).map(Duration::from_secs);
        }

        self
    }

    /// Get the configured endpoint.
    pub fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config_invalid("cloudstack endpoint is not configured"))
    }

    /// Build the credential from the configured keys.
    pub fn credential(&self) -> Result<Credential> {
        let (Some(api_key), Some(secret_key)) = (&self.api_key, &self.secret_key) else {
            return Err(Error::config_invalid(
                "cloudstack api key and secret key must both be configured",
            ));
        };

        let cred = Credential::new(api_key, secret_key);
        if !cred.is_valid() {
            return Err(Error::config_invalid(
                "cloudstack api key and secret key must not be empty",
            ));
        }
        Ok(cred)
    }

    /// Build a `reqwest::Client` honoring the proxy and timeout settings.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        match (&self.proxy_host, self.proxy_port) {
            (Some(host), Some(port)) => {
                let proxy = reqwest::Proxy::all(format!("http://{host}:{port}")).map_err(|e| {
                    Error::config_invalid("invalid proxy setting")
                        .with_source(e)
                        .with_context(format!("proxy: {host}:{port}"))
                })?;
                builder = builder.proxy(proxy);
            }
            (None, None) => {}
            _ => {
                return Err(Error::config_invalid(
                    "proxy host and proxy port must be configured together",
                ))
            }
        }

        builder
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))
    }
}

fn env_parse<T: FromStr>(ctx: &Context, key: &str) -> Option<T> {
    let v = ctx.env_var(key)?;
    match v.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring env {key}: {v:?} is not a valid value");
            None
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(Redact::from))
            .field("secret_key", &self.secret_key.as_ref().map(Redact::from))
            .field("proxy_host", &self.proxy_host)
            .field("proxy_port", &self.proxy_port)
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("max_job_wait", &self.max_job_wait)
            .finish()
    }
}
