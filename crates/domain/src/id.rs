//! Typed identifier newtypes backed by the integer keys of each service's
//! database.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw key.
            #[must_use]
            pub const fn new(value: i32) -> Self {
                Self(value)
            }

            /// Access the inner key.
            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Identifier of a [`Promotion`](crate::promotion::Promotion).
    PromotionId
);

define_id!(
    /// Identifier of an [`Order`](crate::order::Order).
    OrderId
);

define_id!(
    /// Identifier of the customer who placed an order.
    CustomerId
);

define_id!(
    /// Identifier of a catalog product.
    ProductId
);

define_id!(
    /// Identifier of a product category targeted by a promotion.
    CategoryId
);

define_id!(
    /// Identifier of the payment method used for an order.
    PaymentMethodId
);
