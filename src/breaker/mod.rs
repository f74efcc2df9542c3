//! Sliding-window circuit breaker: closed / open / half-open, with cooldown
//! and a single half-open probe.
use std::collections::VecDeque;
use std::time::Instant;

use crate::config::CircuitBreakerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Closed,
    Open,
    HalfOpen,
}

/// Not thread-safe by itself; callers share one instance behind a mutex
/// (see the dispatcher), since contention between `allow_request` and
/// `record` is expected to be low.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: State,
    history: VecDeque<bool>,
    opened_at: Option<Instant>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: State::Closed,
            history: VecDeque::with_capacity(config.window_size),
            opened_at: None,
        }
    }

    /// Returns whether this dispatch may proceed. May transition
    /// open -> half_open when the cooldown has elapsed.
    pub fn allow_request(&mut self) -> bool {
        match self.state {
            State::Closed | State::HalfOpen => true,
            State::Open => {
                let Some(opened_at) = self.opened_at else {
                    return false;
                };
                if opened_at.elapsed().as_secs_f64() >= self.config.open_cooldown_sec {
                    self.state = State::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Records the outcome of a request that was admitted by a prior
    /// `allow_request()` call.
    pub fn record(&mut self, success: bool) {
        match self.state {
            State::HalfOpen => {
                if success {
                    self.close();
                } else {
                    self.open();
                }
            }
            State::Closed => {
                self.history.push_back(success);
                if self.history.len() > self.config.window_size {
                    self.history.pop_front();
                }
                self.evaluate();
            }
            State::Open => {}
        }
    }

    fn evaluate(&mut self) {
        if self.history.len() != self.config.window_size {
            return;
        }
        let successes = self.history.iter().filter(|s| **s).count();
        let error_rate = 1.0 - (successes as f64 / self.history.len() as f64);
        if error_rate >= self.config.error_rate_threshold {
            self.open();
        }
    }

    fn open(&mut self) {
        self.state = State::Open;
        self.opened_at = Some(Instant::now());
        self.history.clear();
    }

    fn close(&mut self) {
        self.state = State::Closed;
        self.history.clear();
    }

    #[cfg(test)]
    fn is_open(&self) -> bool {
        self.state == State::Open
    }

    #[cfg(test)]
    fn is_closed(&self) -> bool {
        self.state == State::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    fn config() -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            enabled: true,
            window_size: 4,
            error_rate_threshold: 0.5,
            open_cooldown_sec: 0.1,
        }
    }

    #[test]
    fn opens_after_window_size_consecutive_failures() {
        let mut breaker = CircuitBreaker::new(config());
        for _ in 0..4 {
            assert!(breaker.allow_request());
            breaker.record(false);
        }
        assert!(breaker.is_open());
    }

    #[test]
    fn recovers_via_half_open_probe_after_cooldown() {
        let mut breaker = CircuitBreaker::new(config());
        for _ in 0..4 {
            breaker.allow_request();
            breaker.record(false);
        }
        assert!(breaker.is_open());
        sleep(Duration::from_millis(120));
        assert!(breaker.allow_request());
        breaker.record(true);
        assert!(breaker.is_closed());
    }

    #[test]
    fn half_open_failure_reopens() {
        let mut breaker = CircuitBreaker::new(config());
        for _ in 0..4 {
            breaker.allow_request();
            breaker.record(false);
        }
        sleep(Duration::from_millis(120));
        assert!(breaker.allow_request());
        breaker.record(false);
        assert!(breaker.is_open());
    }

    #[test]
    fn stays_closed_below_threshold() {
        let mut breaker = CircuitBreaker::new(config());
        breaker.allow_request();
        breaker.record(true);
        breaker.allow_request();
        breaker.record(false);
        breaker.allow_request();
        breaker.record(true);
        breaker.allow_request();
        breaker.record(true);
        assert!(breaker.is_closed());
    }

    #[test]
    fn blocks_while_open_before_cooldown() {
        let mut breaker = CircuitBreaker::new(config());
        for _ in 0..4 {
            breaker.allow_request();
            breaker.record(false);
        }
        assert!(!breaker.allow_request());
    }
}
