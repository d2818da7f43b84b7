//! Auto-expiring error message.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Holds the most recent user-visible error until it expires.
///
/// Each new message replaces the previous one and restarts the timer.
#[derive(Debug)]
pub struct ErrorBanner {
    ttl: Duration,
    current: Mutex<Option<(String, Instant)>>,
}

impl ErrorBanner {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            current: Mutex::new(None),
        }
    }

    pub fn show(&self, message: impl Into<String>) {
        *self.current.lock() = Some((message.into(), Instant::now()));
    }

    /// The visible message, if one was shown less than `ttl` ago.
    pub fn message(&self) -> Option<String> {
        let mut current = self.current.lock();
        match current.as_ref() {
            Some((message, shown)) if shown.elapsed() < self.ttl => Some(message.clone()),
            Some(_) => {
                *current = None;
                None
            }
            None => None,
        }
    }

    pub fn clear(&self) {
        *self.current.lock() = None;
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_message_expires() {
        let banner = ErrorBanner::new(Duration::from_millis(30));
        assert_eq!(banner.message(), None);

        banner.show("Cannot start places SDK: offline");
        assert_eq!(
            banner.message().as_deref(),
            Some("Cannot start places SDK: offline")
        );

        thread::sleep(Duration::from_millis(60));
        assert_eq!(banner.message(), None);
    }

    #[test]
    fn test_new_message_restarts_timer() {
        let banner = ErrorBanner::new(Duration::from_millis(80));
        banner.show("first");
        thread::sleep(Duration::from_millis(50));
        banner.show("second");
        thread::sleep(Duration::from_millis(50));

        // The first message's deadline has passed; the second is still live.
        assert_eq!(banner.message().as_deref(), Some("second"));
    }

    #[test]
    fn test_clear() {
        let banner = ErrorBanner::new(Duration::from_secs(3));
        banner.show("x");
        banner.clear();
        assert_eq!(banner.message(), None);
    }
}
