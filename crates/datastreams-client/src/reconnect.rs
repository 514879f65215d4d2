//! Reconnection Policy
//!
//! Bounded exponential backoff with jitter for stream reconnection. The
//! policy tracks the attempt budget; whether the delay is actually waited
//! out is the session's business.

use std::time::Duration;

use rand::Rng;

use crate::config::DEFAULT_MAX_RECONNECT_ATTEMPTS;

/// Configuration for reconnection behavior.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Whether reconnection is attempted at all.
    pub enabled: bool,
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Ceiling on the delay between attempts.
    pub max_delay: Duration,
    /// Backoff multiplier applied after each attempt.
    pub multiplier: f64,
    /// Jitter fraction applied to each delay (0.1 = ±10%).
    pub jitter_factor: f64,
    /// Maximum number of attempts (0 = unlimited).
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(64),
            multiplier: 2.0,
            jitter_factor: 0.1,
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

impl ReconnectConfig {
    /// A policy that never reconnects.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Tracks the reconnection budget and produces backoff delays.
#[derive(Debug)]
pub struct ReconnectPolicy {
    config: ReconnectConfig,
    next_base_delay: Duration,
    attempts: u32,
}

impl ReconnectPolicy {
    /// Create a policy from its configuration.
    #[must_use]
    pub const fn new(config: ReconnectConfig) -> Self {
        let next_base_delay = config.initial_delay;
        Self {
            config,
            next_base_delay,
            attempts: 0,
        }
    }

    /// Whether reconnection is enabled at all.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Number of attempts consumed so far.
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempts
    }

    /// Consume one attempt and return the delay to wait before it.
    ///
    /// Returns `None` when reconnection is disabled or the attempt budget
    /// is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if !self.config.enabled {
            return None;
        }
        if self.config.max_attempts > 0 && self.attempts >= self.config.max_attempts {
            return None;
        }
        self.attempts += 1;

        let delay = self.jittered(self.next_base_delay);
        self.next_base_delay = self.scaled(self.next_base_delay);
        Some(delay)
    }

    /// Reset the budget after a healthy connection.
    pub const fn reset(&mut self) {
        self.next_base_delay = self.config.initial_delay;
        self.attempts = 0;
    }

    fn scaled(&self, delay: Duration) -> Duration {
        let next = delay.as_secs_f64() * self.config.multiplier;
        let capped = next.min(self.config.max_delay.as_secs_f64());
        if capped.is_finite() && capped > 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            self.config.max_delay
        }
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.config.jitter_factor <= 0.0 {
            return delay;
        }
        let base = delay.as_secs_f64();
        let spread = base * self.config.jitter_factor;
        let offset = rand::rng().random_range(-spread..=spread);
        Duration::from_secs_f64((base + offset).max(0.001))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_jitter(max_attempts: u32) -> ReconnectConfig {
        ReconnectConfig {
            enabled: true,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
            jitter_factor: 0.0,
            max_attempts,
        }
    }

    #[test]
    fn delays_double_until_the_cap() {
        let mut policy = ReconnectPolicy::new(config_without_jitter(0));

        assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(100));
        assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(200));
        assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(400));
        assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(800));
        assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(1600));
        // capped from here on
        assert_eq!(policy.next_delay().unwrap(), Duration::from_secs(2));
        assert_eq!(policy.next_delay().unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn budget_is_enforced() {
        let mut policy = ReconnectPolicy::new(config_without_jitter(3));

        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert_eq!(policy.attempt_count(), 3);
        assert!(policy.next_delay().is_none());
    }

    #[test]
    fn disabled_policy_never_yields_a_delay() {
        let mut policy = ReconnectPolicy::new(ReconnectConfig::disabled());
        assert!(!policy.is_enabled());
        assert!(policy.next_delay().is_none());
        assert_eq!(policy.attempt_count(), 0);
    }

    #[test]
    fn reset_restores_the_budget_and_delay() {
        let mut policy = ReconnectPolicy::new(config_without_jitter(3));
        let _ = policy.next_delay();
        let _ = policy.next_delay();

        policy.reset();

        assert_eq!(policy.attempt_count(), 0);
        assert_eq!(policy.next_delay().unwrap(), Duration::from_millis(100));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        for _ in 0..100 {
            let mut policy = ReconnectPolicy::new(ReconnectConfig {
                enabled: true,
                initial_delay: Duration::from_millis(1000),
                max_delay: Duration::from_secs(10),
                multiplier: 2.0,
                jitter_factor: 0.1,
                max_attempts: 0,
            });
            let millis = policy.next_delay().unwrap().as_millis();
            assert!((900..=1100).contains(&millis), "delay {millis}ms out of bounds");
        }
    }

    #[test]
    fn unlimited_budget_keeps_yielding() {
        let mut policy = ReconnectPolicy::new(config_without_jitter(0));
        for _ in 0..500 {
            assert!(policy.next_delay().is_some());
        }
    }
}
