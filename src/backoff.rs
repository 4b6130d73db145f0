// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Spindrift Labs

//! Deterministic exponential backoff for confirmation polling.
//!
//! One policy object carries the whole retry budget: attempt count,
//! delay growth, delay cap, and a wall-clock timeout that overrides
//! remaining attempts. Delays are deterministic (no jitter) so retry
//! schedules are exactly reproducible.

use std::time::Duration;

/// Retry budget for a polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Maximum number of poll attempts
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles from there
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Wall-clock budget for the whole loop
    pub timeout: Duration,
}

impl BackoffPolicy {
    /// Production policy for transaction confirmation.
    pub fn confirmation() -> Self {
        Self {
            max_attempts: 30,
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(10_000),
            timeout: Duration::from_secs(120),
        }
    }

    /// Delay to sleep before the given 1-based attempt.
    ///
    /// The first attempt polls immediately; attempt `n` waits
    /// `initial_delay * 2^(n-2)`, capped at `max_delay`.
    pub fn delay_before_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exp = attempt - 2;
        let factor = match 1u32.checked_shl(exp) {
            Some(f) => f,
            None => return self.max_delay,
        };
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::confirmation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> BackoffPolicy {
        BackoffPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_millis(2000),
            max_delay: Duration::from_millis(10_000),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_delay_sequence() {
        let p = policy();
        let delays: Vec<u64> = (1..=5)
            .map(|n| p.delay_before_attempt(n).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![0, 2000, 4000, 8000, 10000]);
    }

    #[test]
    fn test_first_attempt_is_immediate() {
        assert_eq!(policy().delay_before_attempt(1), Duration::ZERO);
        // Attempt numbers are 1-based; 0 is treated as the first
        assert_eq!(policy().delay_before_attempt(0), Duration::ZERO);
    }

    #[test]
    fn test_cap_holds_for_large_attempts() {
        let p = policy();
        for n in [6, 10, 40, 200, u32::MAX] {
            assert_eq!(p.delay_before_attempt(n), p.max_delay);
        }
    }

    #[test]
    fn test_growth_is_monotonic_until_cap() {
        let p = policy();
        let mut last = Duration::ZERO;
        for n in 1..=10 {
            let d = p.delay_before_attempt(n);
            assert!(d >= last);
            last = d;
        }
    }

    #[test]
    fn test_confirmation_defaults() {
        let p = BackoffPolicy::confirmation();
        assert_eq!(p.max_attempts, 30);
        assert_eq!(p.initial_delay, Duration::from_millis(2000));
        assert_eq!(p.max_delay, Duration::from_millis(10_000));
        assert_eq!(p.timeout, Duration::from_secs(120));
    }
}
