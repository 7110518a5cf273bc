//! Request header parsing
//!
//! Headers arrive as `name:value` strings, possibly several per argument
//! separated by spaces. Malformed entries, and names or values that are
//! not legal in an HTTP request, are skipped with a warning.

use reqwest::header::{HeaderName, HeaderValue};
use std::collections::HashMap;
use tracing::{info, warn};

pub fn parse_headers<I, S>(entries: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut headers = HashMap::new();

    for entry in entries {
        for header in entry.as_ref().split_whitespace() {
            let Some((name, value)) = header.split_once(':') else {
                warn!(
                    "Header with detail {} was skipped due to incompatible formatting",
                    header
                );
                continue;
            };

            let name = name.trim();
            if name.is_empty() {
                warn!("Header with detail {} was skipped due to an empty name", header);
                continue;
            }

            if HeaderName::from_bytes(name.as_bytes()).is_err() {
                warn!("Header with detail {} was skipped due to an invalid name", header);
                continue;
            }

            let value = value.trim();
            if HeaderValue::from_str(value).is_err() {
                warn!("Header with detail {} was skipped due to an invalid value", header);
                continue;
            }

            info!("Adding header '{}:{}'", name, value);
            headers.insert(name.to_string(), value.to_string());
        }
    }

    headers
}
