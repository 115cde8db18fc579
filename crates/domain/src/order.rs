//! Order: a customer's purchase with its line items.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EshopError, ValidationError};
use crate::id::{CustomerId, OrderId, PaymentMethodId, ProductId};
use crate::time::Timestamp;

/// Lifecycle status of an order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An order aggregate with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_date: Timestamp,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub bill_amount: Decimal,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub shipping_method: String,
    pub payment_method_id: PaymentMethodId,
    pub payment_name: String,
    pub lines: Vec<OrderLine>,
}

/// One product line of an [`Order`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub qty: i32,
    pub price: Decimal,
    pub discount: Decimal,
}

impl Order {
    /// Create a builder for constructing an [`Order`].
    #[must_use]
    pub fn builder() -> OrderBuilder {
        OrderBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EshopError::Validation`] when the customer name is empty or
    /// a line has a non-positive quantity.
    pub fn validate(&self) -> Result<(), EshopError> {
        if self.customer_name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.lines.iter().any(|line| line.qty <= 0) {
            return Err(ValidationError::NonPositiveQuantity.into());
        }
        Ok(())
    }

    /// Move a pending order to [`OrderStatus::Completed`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OrderNotPending`] if the order is already
    /// completed or cancelled.
    pub fn complete(&mut self) -> Result<(), EshopError> {
        if self.status != OrderStatus::Pending {
            return Err(ValidationError::OrderNotPending(self.status.as_str()).into());
        }
        self.status = OrderStatus::Completed;
        Ok(())
    }
}

/// Step-by-step builder for [`Order`].
#[derive(Debug, Default)]
pub struct OrderBuilder {
    id: Option<OrderId>,
    order_date: Option<Timestamp>,
    customer_id: Option<CustomerId>,
    customer_name: Option<String>,
    bill_amount: Option<Decimal>,
    shipping_address: Option<String>,
    shipping_method: Option<String>,
    payment_method_id: Option<PaymentMethodId>,
    payment_name: Option<String>,
    lines: Vec<OrderLine>,
}

impl OrderBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<OrderId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn order_date(mut self, order_date: Timestamp) -> Self {
        self.order_date = Some(order_date);
        self
    }

    #[must_use]
    pub fn customer(mut self, id: impl Into<CustomerId>, name: impl Into<String>) -> Self {
        self.customer_id = Some(id.into());
        self.customer_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn bill_amount(mut self, bill_amount: Decimal) -> Self {
        self.bill_amount = Some(bill_amount);
        self
    }

    #[must_use]
    pub fn shipping(mut self, address: impl Into<String>, method: impl Into<String>) -> Self {
        self.shipping_address = Some(address.into());
        self.shipping_method = Some(method.into());
        self
    }

    #[must_use]
    pub fn payment(mut self, id: impl Into<PaymentMethodId>, name: impl Into<String>) -> Self {
        self.payment_method_id = Some(id.into());
        self.payment_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn line(mut self, line: OrderLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Consume the builder, validate, and return a pending [`Order`].
    ///
    /// # Errors
    ///
    /// Returns [`EshopError::Validation`] if invariants fail.
    pub fn build(self) -> Result<Order, EshopError> {
        let order = Order {
            id: self.id.unwrap_or_default(),
            order_date: self.order_date.unwrap_or_else(crate::time::now),
            customer_id: self.customer_id.unwrap_or_default(),
            customer_name: self.customer_name.unwrap_or_default(),
            bill_amount: self.bill_amount.unwrap_or_default(),
            status: OrderStatus::Pending,
            shipping_address: self.shipping_address.unwrap_or_default(),
            shipping_method: self.shipping_method.unwrap_or_default(),
            payment_method_id: self.payment_method_id.unwrap_or_default(),
            payment_name: self.payment_name.unwrap_or_default(),
            lines: self.lines,
        };
        order.validate()?;
        Ok(order)
    }
}
