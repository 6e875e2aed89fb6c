//! # Backoff policy for retrying tasks.
//!
//! [`BackoffPolicy`] computes the delay inserted between a failed attempt and the
//! next one. It is parameterized by:
//! - [`BackoffPolicy::step`] the base delay unit;
//! - [`BackoffPolicy::growth`] how the delay scales with the attempt number;
//! - [`BackoffPolicy::max`] the maximum delay cap;
//! - [`BackoffPolicy::jitter`] optional randomization.
//!
//! With the default linear growth the delay after failed attempt `k` is `step × k`
//! (50ms, 100ms, 150ms, ...). The base delay is derived purely from the attempt
//! number, so jitter output never feeds back into later delays.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use taskqueue::{BackoffPolicy, Growth, JitterPolicy};
//!
//! let linear = BackoffPolicy::default();
//! assert_eq!(linear.next(1), Duration::from_millis(50));
//! assert_eq!(linear.next(3), Duration::from_millis(150));
//!
//! let exponential = BackoffPolicy {
//!     step: Duration::from_millis(100),
//!     max: Duration::from_secs(1),
//!     growth: Growth::Exponential { factor: 2.0 },
//!     jitter: JitterPolicy::None,
//! };
//! assert_eq!(exponential.next(1), Duration::from_millis(100));
//! assert_eq!(exponential.next(2), Duration::from_millis(200));
//! assert_eq!(exponential.next(10), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// How the base delay scales with the attempt number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Growth {
    /// `step × attempt`.
    Linear,
    /// `step × factor^(attempt - 1)`.
    Exponential {
        /// Multiplicative growth factor (`>= 1.0` recommended).
        factor: f64,
    },
}

/// Retry backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Base delay unit.
    pub step: Duration,
    /// Maximum delay cap.
    pub max: Duration,
    /// Scaling with the attempt number.
    pub growth: Growth,
    /// Jitter policy to prevent synchronized retries.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a strategy with:
    /// - `step = 50ms`, linear growth;
    /// - `max = 30s`;
    /// - no jitter.
    fn default() -> Self {
        Self {
            step: Duration::from_millis(50),
            max: Duration::from_secs(30),
            growth: Growth::Linear,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Linear policy with the given step and the default cap.
    pub fn linear(step: Duration) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    /// Computes the delay to wait after failed attempt `attempt` (1-based).
    ///
    /// Attempt `0` is treated as `1`. The base delay is clamped to [`BackoffPolicy::max`]
    /// before jitter is applied.
    pub fn next(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);

        let base = match self.growth {
            Growth::Linear => self
                .step
                .checked_mul(attempt)
                .map_or(self.max, |d| d.min(self.max)),
            Growth::Exponential { factor } => {
                let exp = (attempt - 1).min(i32::MAX as u32) as i32;
                let secs = self.step.as_secs_f64() * factor.powi(exp);
                if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
                    self.max
                } else {
                    Duration::from_secs_f64(secs)
                }
            }
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_linear_fifty_ms() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.next(1), Duration::from_millis(50));
        assert_eq!(policy.next(2), Duration::from_millis(100));
        assert_eq!(policy.next(3), Duration::from_millis(150));
        assert_eq!(policy.next(4), Duration::from_millis(200));
    }

    #[test]
    fn test_linear_is_monotonic() {
        let policy = BackoffPolicy::linear(Duration::from_millis(10));
        let mut prev = Duration::ZERO;
        for attempt in 1..50 {
            let delay = policy.next(attempt);
            assert!(delay > prev, "attempt {attempt}: {delay:?} <= {prev:?}");
            prev = delay;
        }
    }

    #[test]
    fn test_attempt_zero_behaves_like_first() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.next(0), policy.next(1));
    }

    #[test]
    fn test_exponential_growth_no_jitter() {
        let policy = BackoffPolicy {
            step: Duration::from_millis(100),
            max: Duration::from_secs(30),
            growth: Growth::Exponential { factor: 2.0 },
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(1), Duration::from_millis(100));
        assert_eq!(policy.next(2), Duration::from_millis(200));
        assert_eq!(policy.next(3), Duration::from_millis(400));
        assert_eq!(policy.next(4), Duration::from_millis(800));
    }

    #[test]
    fn test_clamped_to_max() {
        let policy = BackoffPolicy {
            step: Duration::from_millis(100),
            max: Duration::from_secs(1),
            growth: Growth::Linear,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(10), Duration::from_secs(1));
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(1));
    }

    #[test]
    fn test_non_finite_overflow_clamps_to_max() {
        let policy = BackoffPolicy {
            step: Duration::from_millis(100),
            max: Duration::from_secs(10),
            growth: Growth::Exponential { factor: 2.0 },
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(u32::MAX), Duration::from_secs(10));
    }

    #[test]
    fn test_equal_jitter_bounds() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Equal,
            ..BackoffPolicy::linear(Duration::from_millis(1000))
        };
        for _ in 0..50 {
            let delay = policy.next(1);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn test_full_jitter_bounds() {
        let policy = BackoffPolicy {
            jitter: JitterPolicy::Full,
            ..BackoffPolicy::linear(Duration::from_millis(100))
        };
        for attempt in 1..20 {
            assert!(policy.next(attempt) <= Duration::from_millis(100) * attempt);
        }
    }
}
