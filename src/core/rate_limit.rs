use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_window_seconds};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Call-rate ceiling: at most `max_calls` admissions within any trailing
/// `window`. Validated on construction, before any call is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    max_calls: usize,
    window: Duration,
}

impl RateLimit {
    pub fn new(max_calls: usize, window_seconds: f64) -> Result<Self> {
        validate_positive_number("rate_limit.max_calls", max_calls, 1)?;
        validate_window_seconds("rate_limit.window_seconds", window_seconds)?;

        Ok(Self {
            max_calls,
            window: Duration::from_secs_f64(window_seconds),
        })
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Sliding-log admission control. Holds the timestamps of the most recent
/// up-to-`max_calls` admitted calls; owned by whoever runs the batch, not
/// process-global. Only call admission waits here, never response handling.
#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    admitted: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            admitted: VecDeque::with_capacity(limit.max_calls()),
        }
    }

    pub fn limit(&self) -> RateLimit {
        self.limit
    }

    /// Blocks until one more call may start without exceeding the ceiling,
    /// then records the admission.
    pub async fn acquire(&mut self) {
        loop {
            let now = Instant::now();

            // 移除已離開視窗的時間戳
            while let Some(front) = self.admitted.front() {
                if now.duration_since(*front) >= self.limit.window() {
                    self.admitted.pop_front();
                } else {
                    break;
                }
            }

            if self.admitted.len() < self.limit.max_calls() {
                self.admitted.push_back(now);
                return;
            }

            // Full window: wait until the oldest admission exits, re-check.
            if let Some(front) = self.admitted.front() {
                sleep_until(*front + self.limit.window()).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EnrichError;

    #[test]
    fn test_rejects_zero_max_calls() {
        let err = RateLimit::new(0, 1.0).unwrap_err();
        assert!(matches!(err, EnrichError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_rejects_non_positive_window() {
        assert!(RateLimit::new(20, 0.0).is_err());
        assert!(RateLimit::new(20, -1.0).is_err());
        assert!(RateLimit::new(20, f64::NAN).is_err());
    }

    #[test]
    fn test_accepts_fractional_window() {
        let limit = RateLimit::new(3, 0.5).unwrap();
        assert_eq!(limit.max_calls(), 3);
        assert_eq!(limit.window(), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_under_ceiling_admit_immediately() {
        let mut limiter = RateLimiter::new(RateLimit::new(5, 1.0).unwrap());
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forty_one_calls_span_two_full_windows() {
        let mut limiter = RateLimiter::new(RateLimit::new(20, 1.0).unwrap());
        let start = Instant::now();
        let mut admissions = Vec::with_capacity(41);

        for _ in 0..41 {
            limiter.acquire().await;
            admissions.push(Instant::now());
        }

        // Calls 21 and 41 must each wait for their window to free up
        assert!(admissions[20].duration_since(start) >= Duration::from_secs(1));
        assert!(admissions[40].duration_since(start) >= Duration::from_secs(2));
        assert!(start.elapsed() >= Duration::from_secs(2));

        // No trailing 1-second interval ever holds more than 20 admissions
        for window in admissions.windows(21) {
            assert!(window[20].duration_since(window[0]) >= Duration::from_secs(1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_call_ceiling_spaces_calls_by_window() {
        let mut limiter = RateLimiter::new(RateLimit::new(1, 0.5).unwrap());
        let start = Instant::now();

        for _ in 0..3 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() >= Duration::from_secs(1));
    }
}
