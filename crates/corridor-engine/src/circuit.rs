//! Per-provider circuit breaker state machine, process-wide and shared
//! across sessions: closed → open → half-open → closed/open.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerPhase {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
struct ProviderState {
    phase: BreakerPhase,
    failures: u32,
    opened_at: Option<Instant>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            phase: BreakerPhase::Closed,
            failures: 0,
            opened_at: None,
        }
    }
}

/// Outcome of a pre-attempt admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Attempt the provider normally.
    Allow,
    /// Cooldown elapsed; this is the single probe attempt of a half-open
    /// window. Caller should emit a `circuit_half_open` event.
    AllowHalfOpen,
    /// Still open; skip with tag `skip_circuit_open:<provider>`.
    Skip,
}

/// Process-wide, per-provider breaker. Every transition is serialized
/// through a single mutex guarding the whole map — contention is
/// negligible since the router only ever attempts providers sequentially.
#[derive(Default)]
pub struct CircuitBreaker {
    states: Mutex<HashMap<String, ProviderState>>,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_skip(&self, provider: &str, cooldown_seconds: f64) -> Admission {
        let mut states = self.states.lock();
        let entry = states.entry(provider.to_string()).or_default();

        match entry.phase {
            BreakerPhase::Closed => Admission::Allow,
            BreakerPhase::HalfOpen => Admission::Allow,
            BreakerPhase::Open => {
                let elapsed = entry.opened_at.map(|t| t.elapsed()).unwrap_or_default();
                if elapsed >= Duration::from_secs_f64(cooldown_seconds.max(0.0)) {
                    entry.phase = BreakerPhase::HalfOpen;
                    Admission::AllowHalfOpen
                } else {
                    Admission::Skip
                }
            }
        }
    }

    pub fn record_success(&self, provider: &str) {
        let mut states = self.states.lock();
        let entry = states.entry(provider.to_string()).or_default();
        entry.phase = BreakerPhase::Closed;
        entry.failures = 0;
        entry.opened_at = None;
    }

    pub fn record_failure(&self, provider: &str, failure_threshold: u32) {
        let mut states = self.states.lock();
        let entry = states.entry(provider.to_string()).or_default();

        match entry.phase {
            BreakerPhase::HalfOpen => {
                entry.phase = BreakerPhase::Open;
                entry.opened_at = Some(Instant::now());
            }
            _ => {
                entry.failures += 1;
                if entry.failures >= failure_threshold.max(1) {
                    entry.phase = BreakerPhase::Open;
                    entry.opened_at = Some(Instant::now());
                }
            }
        }
    }

    pub fn phase(&self, provider: &str) -> BreakerPhase {
        self.states
            .lock()
            .get(provider)
            .map(|s| s.phase)
            .unwrap_or(BreakerPhase::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new();
        breaker.record_failure("p1", 1);
        assert_eq!(breaker.phase("p1"), BreakerPhase::Open);
    }

    #[test]
    fn single_failure_below_threshold_stays_closed() {
        let breaker = CircuitBreaker::new();
        breaker.record_failure("p1", 3);
        assert_eq!(breaker.phase("p1"), BreakerPhase::Closed);
    }

    #[test]
    fn open_breaker_skips_before_cooldown() {
        let breaker = CircuitBreaker::new();
        breaker.record_failure("p1", 1);
        assert_eq!(breaker.should_skip("p1", 60.0), Admission::Skip);
    }

    #[test]
    fn open_breaker_admits_half_open_after_cooldown() {
        let breaker = CircuitBreaker::new();
        breaker.record_failure("p1", 1);
        assert_eq!(breaker.should_skip("p1", 0.0), Admission::AllowHalfOpen);
        assert_eq!(breaker.phase("p1"), BreakerPhase::HalfOpen);
    }

    #[test]
    fn half_open_success_closes_and_resets_failures() {
        let breaker = CircuitBreaker::new();
        breaker.record_failure("p1", 1);
        breaker.should_skip("p1", 0.0);
        breaker.record_success("p1");
        assert_eq!(breaker.phase("p1"), BreakerPhase::Closed);
        breaker.record_failure("p1", 1);
        assert_eq!(breaker.phase("p1"), BreakerPhase::Open);
    }

    #[test]
    fn half_open_failure_reopens() {
        let breaker = CircuitBreaker::new();
        breaker.record_failure("p1", 1);
        breaker.should_skip("p1", 0.0);
        breaker.record_failure("p1", 1);
        assert_eq!(breaker.phase("p1"), BreakerPhase::Open);
    }
}
