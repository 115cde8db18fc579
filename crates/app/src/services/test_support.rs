//! Port doubles shared by the service tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use eshop_domain::error::PublishError;
use eshop_domain::time::Timestamp;

use crate::ports::{Clock, MessageTransport, OutboundMessage};

pub fn day(d: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
}

/// Returns the queued instants in order, then keeps returning the last one.
pub struct SteppingClock {
    ticks: Mutex<VecDeque<Timestamp>>,
    last: Mutex<Timestamp>,
}

impl SteppingClock {
    pub fn new(ticks: impl IntoIterator<Item = Timestamp>) -> Self {
        let ticks: VecDeque<Timestamp> = ticks.into_iter().collect();
        let last = ticks.front().copied().unwrap_or_else(Utc::now);
        Self {
            ticks: Mutex::new(ticks),
            last: Mutex::new(last),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> Timestamp {
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.ticks.lock().unwrap().pop_front() {
            *last = next;
        }
        *last
    }
}

/// Transport whose every send fails.
pub struct RejectingTransport;

impl MessageTransport for RejectingTransport {
    fn send(
        &self,
        _message: OutboundMessage,
    ) -> impl Future<Output = Result<(), PublishError>> + Send {
        async { Err(PublishError::transport("broker unreachable")) }
    }
}
