//! Endpoint target and URL normalizer
//!
//! `--endpoint` accepts anything from a bare host (`example.com`) to a full
//! URL (`https://example.com:8443/health`). The normalizer strips a scheme
//! prefix, splits the authority from the path and settles the port:
//! a port written in the endpoint always wins over `--port`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::info;
use url::Url;

use super::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved probe target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTarget {
    pub scheme: Scheme,
    pub host: String,
    /// `None` means the scheme default
    pub port: Option<u16>,
    /// Always starts with `/`
    pub path: String,
    pub headers: HashMap<String, String>,
}

impl EndpointTarget {
    /// Build a target from the raw `--endpoint`, `--port` and `--ssl` values
    pub fn build(raw: &str, port: Option<u16>, ssl: bool) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        let mut scheme = if ssl || port == Some(443) {
            Scheme::Https
        } else {
            Scheme::Http
        };

        let rest = match trimmed.split_once("://") {
            Some((prefix, rest)) => {
                info!(
                    "Detected '{}://'. Removing protocol scheme and rebuilding URL.",
                    prefix
                );
                if prefix.eq_ignore_ascii_case("https") {
                    scheme = Scheme::Https;
                }
                rest
            }
            None => trimmed,
        };

        // The authority ends at the first path, query or fragment delimiter
        let split = rest
            .find(|c| matches!(c, '/' | '?' | '#'))
            .unwrap_or(rest.len());
        let (authority, path) = rest.split_at(split);
        let (host, explicit_port) = split_authority(raw, authority)?;
        if host.is_empty() {
            return Err(ConfigError::EmptyHost(raw.to_string()));
        }

        let port = match explicit_port {
            Some(explicit) => {
                if port.is_some() {
                    info!("Ignoring --port directive as port found in URL");
                }
                Some(explicit)
            }
            None => match (port, scheme) {
                (Some(port), _) => Some(port),
                (None, Scheme::Http) => Some(80),
                (None, Scheme::Https) => None,
            },
        };

        let target = Self {
            scheme,
            host: host.to_string(),
            port,
            path: if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{}", path)
            },
            headers: HashMap::new(),
        };

        // Reject hosts the HTTP client could never reach before polling starts
        target.url()?;
        info!("Using built url {}", target);

        Ok(target)
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn url(&self) -> Result<Url, ConfigError> {
        let raw = self.to_string();
        Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }
}

impl fmt::Display for EndpointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        f.write_str(&self.path)
    }
}

/// Split `host[:port]`, including bracketed IPv6 literals
fn split_authority<'a>(
    raw: &str,
    authority: &'a str,
) -> Result<(&'a str, Option<u16>), ConfigError> {
    let (host, port) = if authority.starts_with('[') {
        let end = authority.find(']').ok_or_else(|| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: "unterminated IPv6 address".to_string(),
        })?;
        let (host, rest) = authority.split_at(end + 1);
        let port = if rest.is_empty() {
            None
        } else {
            Some(rest.strip_prefix(':').ok_or_else(|| ConfigError::InvalidPort {
                endpoint: raw.to_string(),
                port: rest.to_string(),
            })?)
        };
        (host, port)
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    let port = match port {
        Some(port) => Some(parse_port(raw, port)?),
        None => None,
    };

    Ok((host, port))
}

fn parse_port(raw: &str, port: &str) -> Result<u16, ConfigError> {
    match port.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort {
            endpoint: raw.to_string(),
            port: port.to_string(),
        }),
    }
}
