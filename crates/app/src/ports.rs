//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod clock;
pub mod publisher;
pub mod storage;
pub mod transport;

pub use clock::{Clock, SystemClock};
pub use publisher::EventPublisher;
pub use storage::{OrderRepository, PromotionRepository};
pub use transport::{MessageTransport, OutboundMessage};
