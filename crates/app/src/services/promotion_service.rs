//! Promotion service: CRUD use-cases that announce lifecycle transitions.
//!
//! Lifecycle events are secondary: a failed publish is logged and the
//! already-committed write stands.

use eshop_domain::error::{EshopError, NotFoundError};
use eshop_domain::event::{PromotionEndedEvent, PromotionStartedEvent};
use eshop_domain::id::PromotionId;
use eshop_domain::promotion::{Promotion, PromotionChanges};
use eshop_domain::time::Timestamp;
use eshop_domain::transition::{Transition, TransitionDetector};
use tokio_util::sync::CancellationToken;

use crate::ports::{Clock, EventPublisher, PromotionRepository, SystemClock};

/// Application service for promotion CRUD and lifecycle notification.
pub struct PromotionService<R, P, C = SystemClock> {
    repo: R,
    publisher: P,
    clock: C,
}

impl<R, P> PromotionService<R, P, SystemClock>
where
    R: PromotionRepository,
    P: EventPublisher,
{
    /// Create a new service reading the wall clock.
    pub fn new(repo: R, publisher: P) -> Self {
        Self::with_clock(repo, publisher, SystemClock)
    }
}

impl<R, P, C> PromotionService<R, P, C>
where
    R: PromotionRepository,
    P: EventPublisher,
    C: Clock,
{
    /// Create a new service with an explicit clock.
    pub fn with_clock(repo: R, publisher: P, clock: C) -> Self {
        Self {
            repo,
            publisher,
            clock,
        }
    }

    /// Persist a new promotion, then announce it as started.
    ///
    /// Creation always announces [`PromotionStartedEvent`], even when the
    /// window has not opened yet.
    ///
    /// # Errors
    ///
    /// Returns [`EshopError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip_all, fields(promotion_name = %promotion.name))]
    pub async fn create_promotion(
        &self,
        promotion: Promotion,
        cancel: &CancellationToken,
    ) -> Result<Promotion, EshopError> {
        promotion.validate()?;
        let detector = TransitionDetector::for_create();

        let created = self.repo.create(promotion).await?;

        let now = self.clock.now();
        self.announce(detector.after(&created, now), &created, now, cancel)
            .await;
        Ok(created)
    }

    /// Look up a promotion by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`EshopError::NotFound`] when no promotion with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_promotion(&self, id: PromotionId) -> Result<Promotion, EshopError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Promotion",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List promotions whose window contains the current time.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_current_promotions(&self) -> Result<Vec<Promotion>, EshopError> {
        self.repo.get_active(self.clock.now()).await
    }

    /// Replace a promotion's editable fields and announce a start or end if
    /// the edit moved "now" across the window.
    ///
    /// # Errors
    ///
    /// Returns [`EshopError::NotFound`] if the promotion does not exist, or
    /// a storage error from the repository.
    #[tracing::instrument(skip(self, changes, cancel))]
    pub async fn update_promotion(
        &self,
        id: PromotionId,
        changes: PromotionChanges,
        cancel: &CancellationToken,
    ) -> Result<Promotion, EshopError> {
        let mut promotion = self.get_promotion(id).await?;
        let detector = TransitionDetector::before(&promotion, self.clock.now());

        promotion.apply_changes(changes);
        let updated = self.repo.update(promotion).await?;

        let now = self.clock.now();
        self.announce(detector.after(&updated, now), &updated, now, cancel)
            .await;
        Ok(updated)
    }

    /// Delete a promotion, announcing its end if it was active.
    ///
    /// # Errors
    ///
    /// Returns [`EshopError::NotFound`] if the promotion does not exist, or
    /// a storage error from the repository.
    #[tracing::instrument(skip(self, cancel))]
    pub async fn delete_promotion(
        &self,
        id: PromotionId,
        cancel: &CancellationToken,
    ) -> Result<(), EshopError> {
        let promotion = self.get_promotion(id).await?;
        let detector = TransitionDetector::before(&promotion, self.clock.now());

        self.repo.delete(id).await?;

        let now = self.clock.now();
        self.announce(detector.after_delete(), &promotion, now, cancel)
            .await;
        Ok(())
    }

    async fn announce(
        &self,
        transition: Option<Transition>,
        promotion: &Promotion,
        now: Timestamp,
        cancel: &CancellationToken,
    ) {
        let result = match transition {
            None => return,
            Some(Transition::Started) => {
                let event = PromotionStartedEvent::from_promotion(promotion, now);
                self.publisher.publish(&event, cancel).await
            }
            Some(Transition::Ended) => {
                let event = PromotionEndedEvent::from_promotion(promotion, now);
                self.publisher.publish(&event, cancel).await
            }
        };

        if let Err(err) = result {
            tracing::warn!(
                promotion_id = %promotion.id,
                ?transition,
                error = %err,
                "promotion lifecycle event lost"
            );
        }
    }
}
