//! REST sender for one Service Bus queue or topic.

use std::sync::atomic::{AtomicBool, Ordering};

use eshop_app::ports::{MessageTransport, OutboundMessage};
use eshop_domain::error::PublishError;
use serde::Serialize;

use crate::config::ServiceBusConfig;
use crate::connection_string::ConnectionString;
use crate::error::ServiceBusError;
use crate::sas;

/// System properties of a brokered message, sent in the
/// `BrokerProperties` header.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct BrokerProperties<'a> {
    label: &'a str,
    message_id: String,
}

/// Sends every message to a single pre-provisioned queue or topic.
pub struct ServiceBusTransport {
    client: reqwest::Client,
    connection: ConnectionString,
    entity: String,
    token_ttl_secs: i64,
    closed: AtomicBool,
}

impl ServiceBusTransport {
    /// # Errors
    ///
    /// Returns [`ServiceBusError::ConnectionString`] if the connection string
    /// cannot be parsed, [`ServiceBusError::Client`] if the HTTP client
    /// cannot be built.
    pub fn new(config: &ServiceBusConfig) -> Result<Self, ServiceBusError> {
        let connection: ConnectionString = config.connection_string.parse()?;
        let entity = connection
            .entity_path
            .clone()
            .unwrap_or_else(|| config.entity.clone());
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ServiceBusError::Client)?;
        tracing::info!(endpoint = %connection.endpoint, entity = %entity, "service bus sender ready");
        Ok(Self {
            client,
            connection,
            entity,
            token_ttl_secs: i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX),
            closed: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Reject every later send. In-flight requests are not interrupted.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            tracing::info!(entity = %self.entity, "service bus sender closed");
        }
    }

    fn resource(&self) -> String {
        format!("{}/{}", self.connection.endpoint, self.entity)
    }

    async fn post(&self, message: OutboundMessage) -> Result<(), ServiceBusError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(ServiceBusError::Closed);
        }

        let resource = self.resource();
        let expiry = eshop_domain::time::now()
            .timestamp()
            .saturating_add(self.token_ttl_secs);
        let authorization = sas::token(
            &resource,
            &self.connection.key_name,
            &self.connection.key,
            expiry,
        );
        let broker_properties = serde_json::to_string(&BrokerProperties {
            label: message.event_type,
            message_id: message.message_id.to_string(),
        })?;

        let response = self
            .client
            .post(format!("{resource}/messages"))
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(reqwest::header::CONTENT_TYPE, message.content_type)
            .header("BrokerProperties", broker_properties)
            .body(message.body)
            .send()
            .await
            .map_err(ServiceBusError::Request)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(ServiceBusError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

impl MessageTransport for ServiceBusTransport {
    async fn send(&self, message: OutboundMessage) -> Result<(), PublishError> {
        tracing::debug!(
            entity = %self.entity,
            subject = message.event_type,
            message_id = %message.message_id,
            "sending to service bus"
        );
        self.post(message).await.map_err(PublishError::from)
    }
}
