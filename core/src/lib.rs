//! Core components for signing and sending CloudStack API requests.
//!
//! This crate provides the foundational types shared by the stacksign crates.
//!
//! ## Overview
//!
//! - **Context**: A container that holds the HTTP client and environment access used
//!   by the service crates.
//! - **Error**: The error type every stacksign operation returns, carrying a kind,
//!   an optional numeric code and a human readable message.
//!
//! ## Example
//!
//! ```
//! use stacksign_core::{Context, StaticEnv};
//! use std::collections::HashMap;
//!
//! let ctx = Context::new().with_env(StaticEnv {
//!     envs: HashMap::from([("CLOUDSTACK_API_KEY".to_string(), "AK".to_string())]),
//! });
//!
//! assert_eq!(ctx.env_var("CLOUDSTACK_API_KEY").as_deref(), Some("AK"));
//! ```
//!
//! ## Traits
//!
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod error;
pub use error::{Error, ErrorKind, Result};
