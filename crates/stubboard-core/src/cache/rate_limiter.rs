//! Fixed-window rate limiting on top of write-expiring counter caches.

use crate::config::RateLimitConfig;
use crate::metrics;
use moka::sync::Cache;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Request categories with independent windows and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateCategory {
    BoardCreation,
    MockExecution,
    General,
}

impl RateCategory {
    fn label(self) -> &'static str {
        match self {
            RateCategory::BoardCreation => "board_creation",
            RateCategory::MockExecution => "mock_execution",
            RateCategory::General => "general",
        }
    }
}

/// Per-category counter caches keyed by caller identity. A counter is born
/// at zero on first touch and disappears when its window (the cache's
/// write-expiry) elapses, which is what starts the next window. Burst at the
/// window boundary is an accepted tradeoff of the fixed-window scheme.
pub struct RateLimiter {
    enabled: bool,
    board_creation: CounterWindow,
    mock_execution: CounterWindow,
    general: CounterWindow,
}

struct CounterWindow {
    counters: Cache<String, Arc<AtomicU32>>,
    limit: u32,
}

impl CounterWindow {
    fn new(limit: u32, window: std::time::Duration) -> Self {
        Self {
            counters: Cache::builder().time_to_live(window).build(),
            limit,
        }
    }

    /// Atomic increment-and-read; true while the post-increment count is
    /// within the limit.
    fn allow(&self, key: &str) -> bool {
        let counter = self
            .counters
            .get_with(key.to_string(), || Arc::new(AtomicU32::new(0)));
        counter.fetch_add(1, Ordering::SeqCst) + 1 <= self.limit
    }
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            board_creation: CounterWindow::new(
                config.board_creation.limit,
                config.board_creation.window(),
            ),
            mock_execution: CounterWindow::new(
                config.mock_execution.limit,
                config.mock_execution.window(),
            ),
            general: CounterWindow::new(config.general.limit, config.general.window()),
        }
    }

    /// Admission check, prior to any cache or router touch.
    pub fn allow(&self, category: RateCategory, key: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let window = match category {
            RateCategory::BoardCreation => &self.board_creation,
            RateCategory::MockExecution => &self.mock_execution,
            RateCategory::General => &self.general,
        };
        let allowed = window.allow(key);
        if !allowed {
            debug!(category = category.label(), key, "rate limit exceeded");
            metrics::RATE_LIMITED_TOTAL
                .with_label_values(&[category.label()])
                .inc();
        }
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateWindow;

    fn limiter(limit: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled: true,
            board_creation: RateWindow {
                limit,
                window_secs,
            },
            mock_execution: RateWindow {
                limit,
                window_secs,
            },
            general: RateWindow {
                limit,
                window_secs,
            },
        })
    }

    #[test]
    fn test_allows_up_to_limit() {
        let rl = limiter(3, 60);
        for _ in 0..3 {
            assert!(rl.allow(RateCategory::MockExecution, "ip-1"));
        }
        assert!(!rl.allow(RateCategory::MockExecution, "ip-1"));
    }

    #[test]
    fn test_keys_are_independent() {
        let rl = limiter(1, 60);
        assert!(rl.allow(RateCategory::General, "ip-1"));
        assert!(!rl.allow(RateCategory::General, "ip-1"));
        assert!(rl.allow(RateCategory::General, "ip-2"));
    }

    #[test]
    fn test_categories_are_independent() {
        let rl = limiter(1, 60);
        assert!(rl.allow(RateCategory::BoardCreation, "ip-1"));
        assert!(rl.allow(RateCategory::MockExecution, "ip-1"));
        assert!(rl.allow(RateCategory::General, "ip-1"));
        assert!(!rl.allow(RateCategory::BoardCreation, "ip-1"));
    }

    #[test]
    fn test_window_expiry_resets_counter() {
        let rl = limiter(1, 1);
        assert!(rl.allow(RateCategory::General, "ip-1"));
        assert!(!rl.allow(RateCategory::General, "ip-1"));

        std::thread::sleep(std::time::Duration::from_millis(1_100));
        assert!(rl.allow(RateCategory::General, "ip-1"));
    }

    #[test]
    fn test_disabled_limiter_always_allows() {
        let mut config = RateLimitConfig::default();
        config.enabled = false;
        config.general = RateWindow {
            limit: 0,
            window_secs: 60,
        };
        let rl = RateLimiter::new(&config);
        for _ in 0..10 {
            assert!(rl.allow(RateCategory::General, "ip-1"));
        }
    }

    #[test]
    fn test_concurrent_increments_respect_limit() {
        use std::sync::atomic::AtomicUsize;
        use std::sync::Arc;
        use std::thread;

        let rl = Arc::new(limiter(100, 60));
        let allowed = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let rl = Arc::clone(&rl);
                let allowed = Arc::clone(&allowed);
                thread::spawn(move || {
                    for _ in 0..20 {
                        if rl.allow(RateCategory::MockExecution, "shared") {
                            allowed.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        // 200 attempts against a limit of 100: exactly 100 admitted
        assert_eq!(allowed.load(Ordering::SeqCst), 100);
    }
}
