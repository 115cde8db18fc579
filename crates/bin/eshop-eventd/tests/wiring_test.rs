//! End-to-end tests for the publishing stack as the daemon wires it.
//!
//! Each test builds real services over in-test repositories and real
//! publishers, then inspects the JSON that reaches the transport. No broker
//! is contacted.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use eshop_app::ports::{Clock, OrderRepository, OutboundMessage, PromotionRepository};
use eshop_app::publisher::TransportPublisher;
use eshop_app::services::order_service::OrderService;
use eshop_app::services::promotion_service::PromotionService;
use eshop_app::transport::InProcessTransport;
use eshop_domain::error::EshopError;
use eshop_domain::id::{OrderId, ProductId, PromotionId};
use eshop_domain::order::{Order, OrderLine, OrderStatus};
use eshop_domain::promotion::{Promotion, PromotionChanges};
use eshop_domain::time::Timestamp;
use eshop_domain::transition::TimeWindow;
use eshop_eventd::backend::Backends;
use rust_decimal_macros::dec;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

fn day(d: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
}

/// Hands out the queued instants in order, then repeats the last one.
struct ScriptedClock(Mutex<VecDeque<Timestamp>>, Mutex<Timestamp>);

impl ScriptedClock {
    fn new(ticks: &[Timestamp]) -> Self {
        Self(
            Mutex::new(ticks.iter().copied().collect()),
            Mutex::new(ticks[0]),
        )
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> Timestamp {
        let mut last = self.1.lock().unwrap();
        if let Some(next) = self.0.lock().unwrap().pop_front() {
            *last = next;
        }
        *last
    }
}

#[derive(Default)]
struct Promotions(Mutex<HashMap<PromotionId, Promotion>>);

impl PromotionRepository for Promotions {
    fn create(
        &self,
        promotion: Promotion,
    ) -> impl Future<Output = Result<Promotion, EshopError>> + Send {
        self.0.lock().unwrap().insert(promotion.id, promotion.clone());
        async { Ok(promotion) }
    }

    fn get_by_id(
        &self,
        id: PromotionId,
    ) -> impl Future<Output = Result<Option<Promotion>, EshopError>> + Send {
        let found = self.0.lock().unwrap().get(&id).cloned();
        async { Ok(found) }
    }

    fn get_active(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<Promotion>, EshopError>> + Send {
        let active: Vec<Promotion> = self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|promo| promo.is_active(now))
            .cloned()
            .collect();
        async { Ok(active) }
    }

    fn update(
        &self,
        promotion: Promotion,
    ) -> impl Future<Output = Result<Promotion, EshopError>> + Send {
        self.0.lock().unwrap().insert(promotion.id, promotion.clone());
        async { Ok(promotion) }
    }

    fn delete(&self, id: PromotionId) -> impl Future<Output = Result<(), EshopError>> + Send {
        self.0.lock().unwrap().remove(&id);
        async { Ok(()) }
    }
}

#[derive(Default)]
struct Orders(Mutex<HashMap<OrderId, Order>>);

impl OrderRepository for Orders {
    fn get_by_id(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, EshopError>> + Send {
        let found = self.0.lock().unwrap().get(&id).cloned();
        async { Ok(found) }
    }

    fn update(&self, order: Order) -> impl Future<Output = Result<Order, EshopError>> + Send {
        self.0.lock().unwrap().insert(order.id, order.clone());
        async { Ok(order) }
    }
}

fn order_42() -> Order {
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

fn drain(rx: &mut broadcast::Receiver<OutboundMessage>) -> Vec<(String, Value)> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        let body: Value = serde_json::from_slice(&message.body).unwrap();
        messages.push((message.event_type.to_string(), body));
    }
    messages
}

#[tokio::test]
async fn should_announce_start_on_create_then_end_when_update_expires_promotion() {
    let transport = InProcessTransport::new(16);
    let mut rx = transport.subscribe();
    let service = PromotionService::with_clock(
        Promotions::default(),
        TransportPublisher::new(transport),
        ScriptedClock::new(&[day(5), day(15), day(25)]),
    );
    let cancel = CancellationToken::new();

    let created = service
        .create_promotion(
            Promotion::builder()
                .id(7)
                .name("WINTER25")
                .discount(dec!(25))
                .window(day(10), day(20))
                .build()
                .unwrap(),
            &cancel,
        )
        .await
        .unwrap();

    let messages = drain(&mut rx);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "PromotionStartedEvent");
    assert_eq!(messages[0].1["PromotionId"], 7);

    service
        .update_promotion(
            created.id,
            PromotionChanges {
                name: "WINTER25".to_string(),
                description: None,
                discount: dec!(25),
                start_date: day(10),
                end_date: day(20),
                details: Vec::new(),
            },
            &cancel,
        )
        .await
        .unwrap();

    let messages = drain(&mut rx);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "PromotionEndedEvent");
    assert_eq!(messages[0].1["PromotionId"], 7);
    assert_eq!(messages[0].1["EndedUtc"], "2025-01-25T00:00:00Z");
}

#[tokio::test]
async fn should_send_detailed_order_snapshot_to_order_queue() {
    let events = InProcessTransport::new(16);
    let queue = InProcessTransport::new(16);
    let mut events_rx = events.subscribe();
    let mut queue_rx = queue.subscribe();
    let repo = Orders::default();
    repo.0.lock().unwrap().insert(OrderId::new(42), order_42());

    let service = OrderService::with_clock(
        repo,
        TransportPublisher::new(events),
        TransportPublisher::new(queue),
        ScriptedClock::new(&[day(2)]),
    );
    service
        .complete_order(OrderId::new(42), &CancellationToken::new())
        .await
        .unwrap();

    let events = drain(&mut events_rx);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "OrderCompletedEvent");

    let queued = drain(&mut queue_rx);
    assert_eq!(queued.len(), 1);
    let (event_type, body) = &queued[0];
    assert_eq!(event_type, "OrderCompletedDetailed");
    assert_eq!(body["OrderId"], 42);
    let items = body["Items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["Qty"], 2);
}

#[tokio::test]
async fn should_complete_order_through_noop_backend() {
    let backends = Backends::noop();
    let repo = Orders::default();
    repo.0.lock().unwrap().insert(OrderId::new(42), order_42());

    let service = OrderService::new(
        repo,
        backends.event_publisher(),
        backends.order_queue_publisher(),
    );
    let order = service
        .complete_order(OrderId::new(42), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Completed);
    backends.close().await;
}

#[tokio::test]
async fn should_manage_promotions_through_noop_backend() {
    let backends = Backends::noop();
    let service = PromotionService::new(Promotions::default(), backends.promotion_publisher());
    let cancel = CancellationToken::new();
    let now = Utc::now();

    let created = service
        .create_promotion(
            Promotion::builder()
                .id(1)
                .name("ALWAYS")
                .discount(dec!(5))
                .window(now - chrono::Duration::days(1), now + chrono::Duration::days(1))
                .build()
                .unwrap(),
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(service.list_current_promotions().await.unwrap().len(), 1);
    service.delete_promotion(created.id, &cancel).await.unwrap();
    assert!(service.list_current_promotions().await.unwrap().is_empty());
}
