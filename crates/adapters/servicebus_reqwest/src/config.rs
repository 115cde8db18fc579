//! Service Bus configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

/// Entity receiving order and general integration events.
pub const DEFAULT_EVENTS_ENTITY: &str = "eshop-events";
/// Entity receiving promotion lifecycle events.
pub const PROMOTION_EVENTS_ENTITY: &str = "promotion-events";

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ServiceBusConfig {
    /// Namespace connection string, as copied from the portal.
    pub connection_string: String,
    /// Queue or topic name. An `EntityPath` in the connection string wins.
    pub entity: String,
    /// Lifetime of each generated SAS token.
    pub token_ttl_secs: u64,
    pub request_timeout_secs: u64,
}

impl ServiceBusConfig {
    /// Same settings, pointed at the promotion events entity.
    #[must_use]
    pub fn for_promotions(mut self) -> Self {
        self.entity = PROMOTION_EVENTS_ENTITY.to_string();
        self
    }

    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ServiceBusConfig {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            entity: DEFAULT_EVENTS_ENTITY.to_string(),
            token_ttl_secs: 3600,
            request_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for ServiceBusConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBusConfig")
            .field("connection_string", &"***")
            .field("entity", &self.entity)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
