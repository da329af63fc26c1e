//! CloudStack query signing.
//!
//! - [CloudStack API signing](https://docs.cloudstack.apache.org/en/latest/developersguide/dev.html#signing-api-requests)

use std::fmt::Write;

use log::debug;
use percent_encoding::utf8_percent_encode;
use stacksign_core::hash::base64_hmac_sha1;
use stacksign_core::Result;

use crate::constants::CLOUDSTACK_QUERY_ENCODE_SET;
use crate::Credential;

/// RequestSigner builds signed CloudStack API urls.
///
/// It only holds read-only data, so one signer can be shared by any number of
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    endpoint: String,
    credential: Credential,
}

impl RequestSigner {
    /// Create a signer for the given endpoint.
    ///
    /// Carriage returns are stripped from both keys, however the credential
    /// was built.
    pub fn new(endpoint: &str, credential: Credential) -> Self {
        Self {
            endpoint: api_base(endpoint),
            credential: Credential::new(&credential.api_key, &credential.secret_key),
        }
    }

    /// Build the full signed url for a command.
    ///
    /// ```text
    /// {endpoint}/api?command={command}&{k}={v}...&apiKey={key}&signature={sig}
    /// ```
    ///
    /// Parameter keys keep their case and values are only percent-encoded;
    /// the lower-casing happens in the canonical string alone.
    pub fn build_url(&self, command: &str, params: &[(&str, &str)]) -> Result<String> {
        let signature = signature(
            command,
            &self.credential.api_key,
            &self.credential.secret_key,
            params,
        );

        let mut url = String::with_capacity(self.endpoint.len() + 128);
        write!(url, "{}?command={}", self.endpoint, encode(command))?;
        for (k, v) in params {
            write!(url, "&{k}={}", encode(v))?;
        }
        write!(
            url,
            "&apiKey={}&signature={}",
            encode(&self.credential.api_key),
            encode(&signature)
        )?;

        Ok(url)
    }
}

/// Percent-encode a value the way CloudStack expects.
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, &CLOUDSTACK_QUERY_ENCODE_SET).to_string()
}

/// Construct the canonical string to sign.
///
/// ## Format
///
/// ```text
/// lower(key) + "=" + lower(encode(value)), sorted by key, joined with "&"
/// ```
///
/// `command` and `apikey` are part of the sorted set. Values are lower-cased
/// here even though the transmitted url keeps their case: the server
/// verifies against the lower-cased form.
pub fn canonical_string(command: &str, api_key: &str, params: &[(&str, &str)]) -> String {
    let mut pairs = Vec::with_capacity(params.len() + 2);
    pairs.push(("command".to_string(), encode(command).to_lowercase()));
    pairs.push(("apikey".to_string(), encode(api_key).to_lowercase()));
    pairs.extend(
        params
            .iter()
            .map(|(k, v)| (k.to_lowercase(), encode(v).to_lowercase())),
    );

    // Sort on (key, value) so repeated keys are order independent too.
    pairs.sort();

    let mut s = String::with_capacity(pairs.iter().map(|(k, v)| k.len() + v.len() + 2).sum());
    for (idx, (k, v)) in pairs.iter().enumerate() {
        if idx != 0 {
            s.push('&');
        }
        s.push_str(k);
        s.push('=');
        s.push_str(v);
    }
    s
}

/// Base64 encoded HMAC-SHA1 of the canonical string, keyed by the secret key.
pub fn signature(command: &str, api_key: &str, secret_key: &str, params: &[(&str, &str)]) -> String {
    let string_to_sign = canonical_string(command, api_key, params);
    debug!("string to sign: {}", &string_to_sign);

    base64_hmac_sha1(secret_key.as_bytes(), string_to_sign.as_bytes())
}

/// Normalize the endpoint into the `/api` base url.
fn api_base(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.ends_with("/api") {
        endpoint.to_string()
    } else {
        format!("{endpoint}/api")
    }
}
