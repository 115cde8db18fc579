//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `eshop.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::fmt;
use std::str::FromStr;

use eshop_adapter_amqp_lapin::AmqpConfig;
use eshop_adapter_servicebus_reqwest::{ConnectionString, ServiceBusConfig};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker selection.
    pub messaging: MessagingConfig,
    /// Topic-exchange broker settings, used when `messaging.backend = "amqp"`.
    pub amqp: AmqpConfig,
    /// Managed broker settings, used when `messaging.backend = "service_bus"`.
    pub service_bus: ServiceBusConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    pub backend: Backend,
}

/// Which broker integration events go to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// AMQP topic exchange plus the durable order queue.
    #[default]
    Amqp,
    /// Azure Service Bus queues/topics.
    ServiceBus,
    /// Accept and drop every event.
    None,
}

impl Backend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Amqp => "amqp",
            Self::ServiceBus => "service_bus",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amqp" | "rabbitmq" => Ok(Self::Amqp),
            "service_bus" | "servicebus" => Ok(Self::ServiceBus),
            "none" | "noop" => Ok(Self::None),
            other => Err(ConfigError::Validation(format!(
                "unknown messaging backend {other:?}"
            ))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "eshop=info,lapin=warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `eshop.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("eshop.toml")?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("ESHOP_MESSAGING_BACKEND") {
            self.messaging.backend = val.parse()?;
        }
        if let Some(val) = lookup("ESHOP_AMQP_HOST") {
            self.amqp.host = val;
        }
        if let Some(val) = lookup("ESHOP_AMQP_PORT") {
            self.amqp.port = val
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid AMQP port {val:?}")))?;
        }
        if let Some(val) = lookup("ESHOP_AMQP_USERNAME") {
            self.amqp.username = val;
        }
        if let Some(val) = lookup("ESHOP_AMQP_PASSWORD") {
            self.amqp.password = val;
        }
        if let Some(val) = lookup("ESHOP_AMQP_VIRTUAL_HOST") {
            self.amqp.virtual_host = val;
        }
        if let Some(val) = lookup("ESHOP_SERVICE_BUS_CONNECTION_STRING") {
            self.service_bus.connection_string = val;
        }
        if let Some(val) = lookup("ESHOP_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match self.messaging.backend {
            Backend::Amqp => {
                if self.amqp.port == 0 {
                    return Err(ConfigError::Validation(
                        "amqp.port must be non-zero".to_string(),
                    ));
                }
                if self.amqp.exchange.is_empty() || self.amqp.order_queue.is_empty() {
                    return Err(ConfigError::Validation(
                        "amqp.exchange and amqp.order_queue must be set".to_string(),
                    ));
                }
            }
            Backend::ServiceBus => {
                self.service_bus
                    .connection_string
                    .parse::<ConnectionString>()
                    .map_err(|err| {
                        ConfigError::Validation(format!("service_bus.connection_string: {err}"))
                    })?;
            }
            Backend::None => {}
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.messaging.backend, Backend::Amqp);
        assert_eq!(config.amqp.exchange, "eshop.events");
        assert_eq!(config.amqp.order_queue, "order-events");
        assert_eq!(config.service_bus.entity, "eshop-events");
        assert_eq!(config.logging.filter, "eshop=info,lapin=warn");
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.messaging.backend, Backend::Amqp);
        assert_eq!(config.amqp.port, 5672);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [messaging]
            backend = 'service_bus'

            [amqp]
            host = 'rabbit'

            [service_bus]
            connection_string = 'Endpoint=sb://shop.servicebus.windows.net/;SharedAccessKeyName=send;SharedAccessKey=k'
            entity = 'shop-events'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.messaging.backend, Backend::ServiceBus);
        assert_eq!(config.amqp.host, "rabbit");
        assert_eq!(config.service_bus.entity, "shop-events");
        assert_eq!(config.logging.filter, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.amqp.port, 5672);
    }

    #[test]
    fn should_report_parse_error_for_unknown_backend() {
        let result: Result<Config, _> = toml::from_str("[messaging]\nbackend = 'kafka'");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_environment_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("ESHOP_MESSAGING_BACKEND", "none"),
                ("ESHOP_AMQP_HOST", "broker.internal"),
                ("ESHOP_AMQP_PORT", "5673"),
                ("ESHOP_LOG", "eshop=debug"),
            ]))
            .unwrap();
        assert_eq!(config.messaging.backend, Backend::None);
        assert_eq!(config.amqp.host, "broker.internal");
        assert_eq!(config.amqp.port, 5673);
        assert_eq!(config.logging.filter, "eshop=debug");
    }

    #[test]
    fn should_prefer_rust_log_over_eshop_log() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[("ESHOP_LOG", "info"), ("RUST_LOG", "trace")]))
            .unwrap();
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_reject_invalid_port_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(env(&[("ESHOP_AMQP_PORT", "amqp")]));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_zero_amqp_port() {
        let mut config = Config::default();
        config.amqp.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_service_bus_without_connection_string() {
        let mut config = Config::default();
        config.messaging.backend = Backend::ServiceBus;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_none_backend_without_broker_settings() {
        let mut config = Config::default();
        config.messaging.backend = Backend::None;
        config.amqp.port = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_backend_aliases() {
        assert_eq!("RabbitMQ".parse::<Backend>().unwrap(), Backend::Amqp);
        assert_eq!("servicebus".parse::<Backend>().unwrap(), Backend::ServiceBus);
        assert_eq!("noop".parse::<Backend>().unwrap(), Backend::None);
        assert!("kafka".parse::<Backend>().is_err());
    }
}
