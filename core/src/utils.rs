//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a secret so it can be printed in logs and `Debug` output.
///
/// - Secrets shorter than 12 characters are entirely redacted.
/// - Otherwise only the first three and the last three characters are kept.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let length = self.0.len();
        if length == 0 {
            f.write_str("EMPTY")
        } else if length < 12 || !self.0.is_char_boundary(3) || !self.0.is_char_boundary(length - 3)
        {
            f.write_str("***")
        } else {
            f.write_str(&self.0[..3])?;
            f.write_str("***")?;
            f.write_str(&self.0[length - 3..])
        }
    }
}

/// Redacts the values of the given query keys in a URL.
///
/// Used before logging signed URLs so `apiKey` and `signature` never
/// reach the logs in full.
///
/// ```
/// use stacksign_core::utils::redact_query;
///
/// assert_eq!(
///     redact_query("https://c/api?command=listZones&apiKey=AK&signature=abc", &["apiKey", "signature"]),
///     "https://c/api?command=listZones&apiKey=***&signature=***"
/// );
/// ```
pub fn redact_query(url: &str, keys: &[&str]) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) if keys.contains(&k) => format!("{k}={:?}", Redact(v)),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{base}?{query}")
}
