//! Storage port: repository traits for persistence.

use std::future::Future;

use eshop_domain::error::EshopError;
use eshop_domain::id::{OrderId, PromotionId};
use eshop_domain::order::Order;
use eshop_domain::promotion::Promotion;
use eshop_domain::time::Timestamp;

/// Persistence of [`Promotion`] aggregates.
pub trait PromotionRepository {
    /// Insert a promotion. The store assigns the id.
    fn create(
        &self,
        promotion: Promotion,
    ) -> impl Future<Output = Result<Promotion, EshopError>> + Send;

    fn get_by_id(
        &self,
        id: PromotionId,
    ) -> impl Future<Output = Result<Option<Promotion>, EshopError>> + Send;

    /// Promotions whose window contains `now`.
    fn get_active(
        &self,
        now: Timestamp,
    ) -> impl Future<Output = Result<Vec<Promotion>, EshopError>> + Send;

    fn update(
        &self,
        promotion: Promotion,
    ) -> impl Future<Output = Result<Promotion, EshopError>> + Send;

    fn delete(&self, id: PromotionId) -> impl Future<Output = Result<(), EshopError>> + Send;
}

/// Persistence of [`Order`] aggregates.
pub trait OrderRepository {
    fn get_by_id(
        &self,
        id: OrderId,
    ) -> impl Future<Output = Result<Option<Order>, EshopError>> + Send;

    fn update(&self, order: Order) -> impl Future<Output = Result<Order, EshopError>> + Send;
}
