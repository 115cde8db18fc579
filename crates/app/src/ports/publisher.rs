//! Publisher port: what use-cases call to emit integration events.

use std::future::Future;

use eshop_domain::error::PublishError;
use eshop_domain::event::IntegrationEvent;
use tokio_util::sync::CancellationToken;

/// Publishes integration events, transport-agnostic.
///
/// One delivery attempt per call. Failures are returned to the caller and
/// never retried here.
pub trait EventPublisher {
    fn publish<E: IntegrationEvent>(
        &self,
        event: &E,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish<E: IntegrationEvent>(
        &self,
        event: &E,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<(), PublishError>> + Send {
        (**self).publish(event, cancel)
    }
}
