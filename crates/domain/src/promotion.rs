//! Promotion: a percentage discount on product categories, valid inside an
//! inclusive `[start_date, end_date]` window.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EshopError, ValidationError};
use crate::id::{CategoryId, PromotionId};
use crate::time::Timestamp;
use crate::transition::TimeWindow;

/// A time-windowed discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub id: PromotionId,
    pub name: String,
    pub description: Option<String>,
    /// Discount percentage, `0..=100`.
    pub discount: Decimal,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub details: Vec<PromotionDetail>,
}

/// A product category the promotion applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionDetail {
    pub product_category_id: CategoryId,
    pub product_category_name: String,
}

/// Replacement values for an edit. Every editable field is overwritten and
/// the details list is replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionChanges {
    pub name: String,
    pub description: Option<String>,
    pub discount: Decimal,
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub details: Vec<PromotionDetail>,
}

impl Promotion {
    /// Create a builder for constructing a [`Promotion`].
    #[must_use]
    pub fn builder() -> PromotionBuilder {
        PromotionBuilder::default()
    }

    /// Code announced on lifecycle events. Promotions are addressed by name.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.name
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EshopError::Validation`] when the name is empty, the
    /// discount is outside `0..=100`, or the window ends before it starts.
    pub fn validate(&self) -> Result<(), EshopError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.discount < Decimal::ZERO || self.discount > Decimal::ONE_HUNDRED {
            return Err(ValidationError::DiscountOutOfRange.into());
        }
        if self.end_date < self.start_date {
            return Err(ValidationError::InvalidWindow.into());
        }
        Ok(())
    }

    /// Overwrite the editable fields. The id is kept.
    ///
    /// Edits are taken as given: only [`PromotionBuilder::build`] validates.
    pub fn apply_changes(&mut self, changes: PromotionChanges) {
        self.name = changes.name;
        self.description = changes.description;
        self.discount = changes.discount;
        self.start_date = changes.start_date;
        self.end_date = changes.end_date;
        self.details = changes.details;
    }
}

impl TimeWindow for Promotion {
    fn window_start(&self) -> Timestamp {
        self.start_date
    }

    fn window_end(&self) -> Timestamp {
        self.end_date
    }
}

/// Step-by-step builder for [`Promotion`].
#[derive(Debug, Default)]
pub struct PromotionBuilder {
    id: Option<PromotionId>,
    name: Option<String>,
    description: Option<String>,
    discount: Option<Decimal>,
    start_date: Option<Timestamp>,
    end_date: Option<Timestamp>,
    details: Vec<PromotionDetail>,
}

impl PromotionBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<PromotionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn discount(mut self, discount: Decimal) -> Self {
        self.discount = Some(discount);
        self
    }

    #[must_use]
    pub fn window(mut self, start_date: Timestamp, end_date: Timestamp) -> Self {
        self.start_date = Some(start_date);
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn detail(mut self, category_id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        self.details.push(PromotionDetail {
            product_category_id: category_id.into(),
            product_category_name: name.into(),
        });
        self
    }

    /// Consume the builder, validate, and return a [`Promotion`].
    ///
    /// A missing window defaults to the zero-length window at the Unix epoch.
    ///
    /// # Errors
    ///
    /// Returns [`EshopError::Validation`] if invariants fail.
    pub fn build(self) -> Result<Promotion, EshopError> {
        let start_date = self.start_date.unwrap_or_default();
        let promotion = Promotion {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            discount: self.discount.unwrap_or_default(),
            start_date,
            end_date: self.end_date.unwrap_or(start_date),
            details: self.details,
        };
        promotion.validate()?;
        Ok(promotion)
    }
}
