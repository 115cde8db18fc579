//! Integration events: immutable facts about committed domain changes,
//! published for other services to observe.
//!
//! The JSON field names and the [`IntegrationEvent::EVENT_TYPE`] of each
//! variant are the wire contract: consumers bind on the event type, so
//! renaming a variant is a breaking change.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::id::{CustomerId, OrderId, PaymentMethodId, ProductId, PromotionId};
use crate::order::{Order, OrderStatus};
use crate::promotion::Promotion;
use crate::time::Timestamp;

/// Content type of every serialized event body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A payload that can be published as an integration event.
pub trait IntegrationEvent: Serialize + Send + Sync {
    /// Logical discriminator, used as routing key / subject / type tag.
    const EVENT_TYPE: &'static str;

    fn event_type(&self) -> &'static str {
        Self::EVENT_TYPE
    }

    /// When the fact became true. Set by the producer, never by the transport.
    fn occurred_utc(&self) -> Timestamp;
}

/// Implements [`IntegrationEvent`] for a catalog type. The event type is the
/// declared type name unless an explicit name is given with `as "..."`.
macro_rules! integration_event {
    ($name:ident, occurred = $field:ident) => {
        integration_event!($name as stringify!($name), occurred = $field);
    };
    ($name:ident as $event_type:expr, occurred = $field:ident) => {
        impl IntegrationEvent for $name {
            const EVENT_TYPE: &'static str = $event_type;

            fn occurred_utc(&self) -> Timestamp {
                self.$field
            }
        }
    };
}

/// Wire envelope: the concrete payload's fields plus `OccurredUtc`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Envelope<'a, E> {
    #[serde(flatten)]
    payload: &'a E,
    occurred_utc: Timestamp,
}

impl<'a, E: IntegrationEvent> Envelope<'a, E> {
    #[must_use]
    pub fn new(payload: &'a E) -> Self {
        Self {
            occurred_utc: payload.occurred_utc(),
            payload,
        }
    }

    /// Serialize to a UTF-8 JSON document.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; unreachable for the catalog types.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// An order was completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderCompletedEvent {
    order_id: OrderId,
    customer_name: String,
    bill_amount: Decimal,
    order_status: OrderStatus,
    completed_utc: Timestamp,
}

integration_event!(OrderCompletedEvent, occurred = completed_utc);

impl OrderCompletedEvent {
    #[must_use]
    pub fn new(
        order_id: OrderId,
        customer_name: impl Into<String>,
        bill_amount: Decimal,
        order_status: OrderStatus,
        completed_utc: Timestamp,
    ) -> Self {
        Self {
            order_id,
            customer_name: customer_name.into(),
            bill_amount,
            order_status,
            completed_utc,
        }
    }

    #[must_use]
    pub fn from_order(order: &Order, completed_utc: Timestamp) -> Self {
        Self::new(
            order.id,
            order.customer_name.clone(),
            order.bill_amount,
            order.status,
            completed_utc,
        )
    }

    #[must_use]
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    #[must_use]
    pub fn order_status(&self) -> OrderStatus {
        self.order_status
    }
}

/// A promotion entered its active window (or was created).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PromotionStartedEvent {
    promotion_id: PromotionId,
    code: String,
    discount_percent: Decimal,
    started_utc: Timestamp,
}

integration_event!(PromotionStartedEvent, occurred = started_utc);

impl PromotionStartedEvent {
    #[must_use]
    pub fn new(
        promotion_id: PromotionId,
        code: impl Into<String>,
        discount_percent: Decimal,
        started_utc: Timestamp,
    ) -> Self {
        Self {
            promotion_id,
            code: code.into(),
            discount_percent,
            started_utc,
        }
    }

    #[must_use]
    pub fn from_promotion(promotion: &Promotion, started_utc: Timestamp) -> Self {
        Self::new(
            promotion.id,
            promotion.code(),
            promotion.discount,
            started_utc,
        )
    }

    #[must_use]
    pub fn promotion_id(&self) -> PromotionId {
        self.promotion_id
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// A promotion left its active window or was deleted while active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PromotionEndedEvent {
    promotion_id: PromotionId,
    code: String,
    ended_utc: Timestamp,
}

integration_event!(PromotionEndedEvent, occurred = ended_utc);

impl PromotionEndedEvent {
    #[must_use]
    pub fn new(promotion_id: PromotionId, code: impl Into<String>, ended_utc: Timestamp) -> Self {
        Self {
            promotion_id,
            code: code.into(),
            ended_utc,
        }
    }

    #[must_use]
    pub fn from_promotion(promotion: &Promotion, ended_utc: Timestamp) -> Self {
        Self::new(promotion.id, promotion.code(), ended_utc)
    }

    #[must_use]
    pub fn promotion_id(&self) -> PromotionId {
        self.promotion_id
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Denormalized snapshot of a completed order and its lines, taken at
/// publish time. It owns all its data, so later edits to the order never
/// reach a message that was already built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderCompletedDetailed {
    order_id: OrderId,
    #[serde(rename = "Order_Date")]
    order_date: Timestamp,
    customer_id: CustomerId,
    customer_name: String,
    bill_amount: Decimal,
    #[serde(rename = "Order_Status")]
    order_status: OrderStatus,
    shipping_address: String,
    shipping_method: String,
    payment_method_id: PaymentMethodId,
    payment_name: String,
    completed_utc: Timestamp,
    items: Vec<OrderCompletedItem>,
}

integration_event!(OrderCompletedDetailed, occurred = completed_utc);

/// Slim line-item record carried by [`OrderCompletedDetailed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderCompletedItem {
    #[serde(rename = "Product_Id")]
    pub product_id: ProductId,
    #[serde(rename = "Product_name")]
    pub product_name: String,
    #[serde(rename = "Qty")]
    pub qty: i32,
    #[serde(rename = "Price")]
    pub price: Decimal,
    #[serde(rename = "Discount")]
    pub discount: Decimal,
}

impl OrderCompletedDetailed {
    /// Fold an order and all of its lines into one message.
    #[must_use]
    pub fn from_order(order: &Order, completed_utc: Timestamp) -> Self {
        let items = order
            .lines
            .iter()
            .map(|line| OrderCompletedItem {
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                qty: line.qty,
                price: line.price,
                discount: line.discount,
            })
            .collect();

        Self {
            order_id: order.id,
            order_date: order.order_date,
            customer_id: order.customer_id,
            customer_name: order.customer_name.clone(),
            bill_amount: order.bill_amount,
            order_status: order.status,
            shipping_address: order.shipping_address.clone(),
            shipping_method: order.shipping_method.clone(),
            payment_method_id: order.payment_method_id,
            payment_name: order.payment_name.clone(),
            completed_utc,
            items,
        }
    }

    #[must_use]
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    #[must_use]
    pub fn items(&self) -> &[OrderCompletedItem] {
        &self.items
    }
}
