//! Signed requests and async jobs for Apache CloudStack.
//!
//! ## Example
//!
//! ```no_run
//! use stacksign_cloudstack::{Client, Config};
//! use stacksign_core::{Context, OsEnv};
//! use stacksign_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> stacksign_core::Result<()> {
//! let env_ctx = Context::new().with_env(OsEnv);
//! let config = Config::new().from_env(&env_ctx);
//! let ctx = env_ctx.with_http_send(ReqwestHttpSend::new(config.http_client()?));
//! let client = Client::new(ctx, config);
//!
//! let resp = client
//!     .call("deployVirtualMachine", &[("zoneId", "1"), ("templateId", "2")])
//!     .await?;
//! if let Some(resp) = resp {
//!     let result = client.wait_for_job(&resp, "deployVirtualMachine").await?;
//!     println!("{:?}", result.find_text("id"));
//! }
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::DEFAULT_POLL_INTERVAL;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{canonical_string, encode, signature, RequestSigner};

mod document;
pub use document::{Document, Element};

mod response;
pub use response::parse_response;

mod cause;
pub use cause::ErrorCause;

mod job;
pub use job::{job_id, job_state, JobOutcome, JobPoller, JobState, JobStatus};

mod client;
pub use client::Client;
