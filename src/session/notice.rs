//! Transient user-facing notices.
//!
//! Raised by attachment operations; expire after a fixed wall-clock window.
//! Expiry is checked at read time — no timer task in the single-threaded
//! cooperative model.

use std::time::{Duration, Instant};

/// How long a notice stays visible unless dismissed or superseded.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Notice {
    text: String,
    raised_at: Instant,
}

impl Notice {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), raised_at: Instant::now() }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Expired notices read as absent.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        now.duration_since(self.raised_at) > NOTICE_TTL
    }
}

#[cfg(test)]
#[path = "notice_test.rs"]
mod tests;
