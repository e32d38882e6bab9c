use std::time::Duration;

/// Exponential backoff for reconnection.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    current: Duration,
    initial: Duration,
    max: Duration,
    factor: f64,
}

impl ExponentialBackoff {
    pub fn new(initial: Duration, max: Duration, factor: f64) -> Self {
        Self {
            current: initial,
            initial,
            max,
            factor,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = Duration::from_secs_f64(
            (self.current.as_secs_f64() * self.factor).min(self.max.as_secs_f64()),
        );
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

/// What to do after a connection attempt failed or a live connection dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { attempt: u32, delay: Duration },
    /// Reconnection is disabled.
    Stop,
    /// `max_attempts` consecutive failures reached.
    GiveUp { attempts: u32 },
}

/// Disconnected -> Connecting -> Connected -> Disconnected, with bounded
/// exponential delays between attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    backoff: ExponentialBackoff,
    enabled: bool,
    max_attempts: u32,
    failures: u32,
}

impl RetryPolicy {
    /// `max_attempts == 0` means unlimited.
    pub fn new(backoff: ExponentialBackoff, enabled: bool, max_attempts: u32) -> Self {
        Self {
            backoff,
            enabled,
            max_attempts,
            failures: 0,
        }
    }

    pub fn on_connected(&mut self) {
        self.failures = 0;
        self.backoff.reset();
    }

    pub fn on_failure(&mut self) -> RetryDecision {
        if !self.enabled {
            return RetryDecision::Stop;
        }
        if self.max_attempts > 0 && self.failures >= self.max_attempts {
            return RetryDecision::GiveUp {
                attempts: self.failures,
            };
        }
        self.failures += 1;
        RetryDecision::Retry {
            attempt: self.failures,
            delay: self.backoff.next_delay(),
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backoff() -> ExponentialBackoff {
        ExponentialBackoff::new(Duration::from_secs(1), Duration::from_secs(8), 2.0)
    }

    #[test]
    fn delays_double_up_to_max_and_reset() {
        let mut b = backoff();
        let delays: Vec<u64> = (0..6).map(|_| b.next_delay().as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 8, 8]);
        b.reset();
        assert_eq!(b.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn disabled_policy_stops_immediately() {
        let mut p = RetryPolicy::new(backoff(), false, 0);
        assert_eq!(p.on_failure(), RetryDecision::Stop);
    }

    #[test]
    fn bounded_policy_gives_up_after_max_attempts() {
        let mut p = RetryPolicy::new(backoff(), true, 2);
        assert_eq!(
            p.on_failure(),
            RetryDecision::Retry {
                attempt: 1,
                delay: Duration::from_secs(1)
            }
        );
        assert_eq!(
            p.on_failure(),
            RetryDecision::Retry {
                attempt: 2,
                delay: Duration::from_secs(2)
            }
        );
        assert_eq!(p.on_failure(), RetryDecision::GiveUp { attempts: 2 });
    }

    #[test]
    fn successful_connect_resets_attempts_and_delay() {
        let mut p = RetryPolicy::new(backoff(), true, 0);
        p.on_failure();
        p.on_failure();
        assert_eq!(p.consecutive_failures(), 2);
        p.on_connected();
        assert_eq!(p.consecutive_failures(), 0);
        assert_eq!(
            p.on_failure(),
            RetryDecision::Retry {
                attempt: 1,
                delay: Duration::from_secs(1)
            }
        );
    }
}
