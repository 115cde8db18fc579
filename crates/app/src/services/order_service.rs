//! Order service: order completion and its integration events.
//!
//! Unlike promotion notifications, a failed publish here fails the call.
//! The status change has already been persisted by then and is not rolled
//! back.

use eshop_domain::error::{EshopError, NotFoundError};
use eshop_domain::event::{OrderCompletedDetailed, OrderCompletedEvent};
use eshop_domain::id::OrderId;
use eshop_domain::order::Order;
use tokio_util::sync::CancellationToken;

use crate::ports::{Clock, EventPublisher, OrderRepository, SystemClock};

/// Application service for the order-completion use-case.
///
/// `events` receives the slim [`OrderCompletedEvent`]; `queue` receives the
/// denormalized [`OrderCompletedDetailed`] snapshot.
pub struct OrderService<R, P, Q, C = SystemClock> {
    repo: R,
    events: P,
    queue: Q,
    clock: C,
}

impl<R, P, Q> OrderService<R, P, Q, SystemClock>
where
    R: OrderRepository,
    P: EventPublisher,
    Q: EventPublisher,
{
    /// Create a new service reading the wall clock.
    pub fn new(repo: R, events: P, queue: Q) -> Self {
        Self::with_clock(repo, events, queue, SystemClock)
    }
}

impl<R, P, Q, C> OrderService<R, P, Q, C>
where
    R: OrderRepository,
    P: EventPublisher,
    Q: EventPublisher,
    C: Clock,
{
    /// Create a new service with an explicit clock.
    pub fn with_clock(repo: R, events: P, queue: Q, clock: C) -> Self {
        Self {
            repo,
            events,
            queue,
            clock,
        }
    }

    /// Look up an order by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`EshopError::NotFound`] when no order with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, EshopError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Order",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Mark a pending order completed, persist it, then publish the
    /// completion event followed by the detailed snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EshopError::NotFound`] if the order does not exist,
    /// [`EshopError::Validation`] if it is not pending, a storage error from
    /// the repository, or [`EshopError::Publish`] if either publish fails.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn complete_order(
        &self,
        id: OrderId,
        cancel: &CancellationToken,
    ) -> Result<Order, EshopError> {
        let mut order = self.get_order(id).await?;
        order.complete()?;
        let order = self.repo.update(order).await?;

        let completed_utc = self.clock.now();
        self.events
            .publish(&OrderCompletedEvent::from_order(&order, completed_utc), cancel)
            .await?;
        self.queue
            .publish(
                &OrderCompletedDetailed::from_order(&order, completed_utc),
                cancel,
            )
            .await?;

        tracing::info!(order_id = %order.id, items = order.lines.len(), "order completed");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;

    use eshop_domain::error::{PublishError, ValidationError};
    use eshop_domain::id::ProductId;
    use eshop_domain::order::{OrderLine, OrderStatus};
    use rust_decimal_macros::dec;

    use crate::publisher::TransportPublisher;
    use crate::services::test_support::{RejectingTransport, SteppingClock, day};
    use crate::transport::InProcessTransport;

    #[derive(Default)]
    struct InMemoryOrderRepo {
        store: Mutex<HashMap<OrderId, Order>>,
    }

    impl InMemoryOrderRepo {
        fn with(order: Order) -> Self {
            let repo = Self::default();
            repo.store.lock().unwrap().insert(order.id, order);
            repo
        }
    }

    impl OrderRepository for InMemoryOrderRepo {
        fn get_by_id(
            &self,
            id: OrderId,
        ) -> impl Future<Output = Result<Option<Order>, EshopError>> + Send {
            let result = self.store.lock().unwrap().get(&id).cloned();
            async { Ok(result) }
        }

        fn update(&self, order: Order) -> impl Future<Output = Result<Order, EshopError>> + Send {
            self.store.lock().unwrap().insert(order.id, order.clone());
            async { Ok(order) }
        }
    }

    fn order() -> Order {
        Order::builder()
            .id(42)
            .order_date(day(1))
            .customer(5, "Ada")
            .bill_amount(dec!(19.98))
            .shipping("1 Main St", "Courier")
            .payment(2, "Card")
            .line(OrderLine {
                product_id: ProductId::new(1),
                product_name: "Mug".to_string(),
                qty: 2,
                price: dec!(9.99),
                discount: dec!(0),
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_publish_event_and_detailed_snapshot_on_completion() {
        let events = InProcessTransport::new(8);
        let queue = InProcessTransport::new(8);
        let mut events_rx = events.subscribe();
        let mut queue_rx = queue.subscribe();
        let svc = OrderService::with_clock(
            InMemoryOrderRepo::with(order()),
            TransportPublisher::new(events),
            TransportPublisher::new(queue),
            SteppingClock::new([day(2)]),
        );

        let completed = svc
            .complete_order(OrderId::new(42), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);

        let event = events_rx.recv().await.unwrap();
        assert_eq!(event.event_type, "OrderCompletedEvent");
        let body: serde_json::Value = serde_json::from_slice(&event.body).unwrap();
        assert_eq!(body["OrderId"], 42);
        assert_eq!(body["OrderStatus"], "Completed");

        let detailed = queue_rx.recv().await.unwrap();
        assert_eq!(detailed.event_type, "OrderCompletedDetailed");
        let body: serde_json::Value = serde_json::from_slice(&detailed.body).unwrap();
        assert_eq!(body["OrderId"], 42);
        assert_eq!(body["CompletedUtc"], "2025-01-02T00:00:00Z");
        let items = body["Items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["Qty"], 2);
    }

    #[tokio::test]
    async fn should_persist_completion_even_when_publish_fails() {
        let svc = OrderService::with_clock(
            InMemoryOrderRepo::with(order()),
            TransportPublisher::new(RejectingTransport),
            TransportPublisher::new(InProcessTransport::new(8)),
            SteppingClock::new([day(2)]),
        );

        let result = svc
            .complete_order(OrderId::new(42), &CancellationToken::new())
            .await;
        assert!(matches!(
            result,
            Err(EshopError::Publish(PublishError::TransportUnavailable(_)))
        ));

        let stored = svc.get_order(OrderId::new(42)).await.unwrap();
        assert_eq!(stored.status, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn should_reject_completing_order_twice() {
        let svc = OrderService::with_clock(
            InMemoryOrderRepo::with(order()),
            TransportPublisher::new(InProcessTransport::new(8)),
            TransportPublisher::new(InProcessTransport::new(8)),
            SteppingClock::new([day(2)]),
        );
        let cancel = CancellationToken::new();

        svc.complete_order(OrderId::new(42), &cancel).await.unwrap();
        let result = svc.complete_order(OrderId::new(42), &cancel).await;
        assert!(matches!(
            result,
            Err(EshopError::Validation(ValidationError::OrderNotPending(_)))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_order() {
        let svc = OrderService::with_clock(
            InMemoryOrderRepo::default(),
            TransportPublisher::new(InProcessTransport::new(8)),
            TransportPublisher::new(InProcessTransport::new(8)),
            SteppingClock::new([day(2)]),
        );
        let result = svc
            .complete_order(OrderId::new(1), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(EshopError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_skip_queue_when_cancelled() {
        let queue = InProcessTransport::new(8);
        let mut queue_rx = queue.subscribe();
        let svc = OrderService::with_clock(
            InMemoryOrderRepo::with(order()),
            TransportPublisher::new(InProcessTransport::new(8)),
            TransportPublisher::new(queue),
            SteppingClock::new([day(2)]),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = svc.complete_order(OrderId::new(42), &cancel).await;
        assert!(matches!(
            result,
            Err(EshopError::Publish(PublishError::Cancelled))
        ));
        assert!(queue_rx.try_recv().is_err());
    }
}
