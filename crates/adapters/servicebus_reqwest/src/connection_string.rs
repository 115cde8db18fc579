//! Parsing of Service Bus namespace connection strings.
//!
//! ```text
//! Endpoint=sb://<namespace>.servicebus.windows.net/;SharedAccessKeyName=<name>;SharedAccessKey=<key>[;EntityPath=<entity>]
//! ```

use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConnectionStringError {
    #[error("connection string segment {0:?} is not a key=value pair")]
    MalformedSegment(String),
    #[error("connection string is missing {0}")]
    MissingField(&'static str),
    #[error("unsupported endpoint scheme in {0:?}")]
    UnsupportedScheme(String),
}

/// The parts of a connection string needed to send messages.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Base URL requests are sent to, without trailing slash.
    pub endpoint: String,
    pub key_name: String,
    pub key: String,
    pub entity_path: Option<String>,
}

impl std::fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint)
            .field("key_name", &self.key_name)
            .field("key", &"***")
            .field("entity_path", &self.entity_path)
            .finish()
    }
}

/// `sb://` endpoints are reached over HTTPS; `http(s)://` is kept as is.
fn http_endpoint(raw: &str) -> Result<String, ConnectionStringError> {
    let base = if let Some(rest) = raw.strip_prefix("sb://") {
        format!("https://{rest}")
    } else if raw.starts_with("https://") || raw.starts_with("http://") {
        raw.to_string()
    } else {
        return Err(ConnectionStringError::UnsupportedScheme(raw.to_string()));
    };
    Ok(base.trim_end_matches('/').to_string())
}

impl FromStr for ConnectionString {
    type Err = ConnectionStringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut endpoint = None;
        let mut key_name = None;
        let mut key = None;
        let mut entity_path = None;

        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            let (name, value) = segment
                .split_once('=')
                .ok_or_else(|| ConnectionStringError::MalformedSegment(segment.to_string()))?;
            let value = value.trim().to_string();
            match name.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value),
                "sharedaccesskeyname" => key_name = Some(value),
                "sharedaccesskey" => key = Some(value),
                "entitypath" if !value.is_empty() => entity_path = Some(value),
                _ => {}
            }
        }

        let endpoint = endpoint.ok_or(ConnectionStringError::MissingField("Endpoint"))?;
        Ok(Self {
            endpoint: http_endpoint(&endpoint)?,
            key_name: key_name.ok_or(ConnectionStringError::MissingField("SharedAccessKeyName"))?,
            key: key.ok_or(ConnectionStringError::MissingField("SharedAccessKey"))?,
            entity_path,
        })
    }
}
