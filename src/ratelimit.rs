use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Delay-based brute-force limiter for the login route, keyed by client
/// address. Attempts past `delay_after` within a window are slowed by a
/// growing delay rather than rejected, so a legitimate user behind a shared
/// address is never locked out.
pub struct LoginLimiter {
    window: Duration,
    delay_after: u32,
    delay_step: Duration,
    max_delay: Duration,
    hits: Mutex<HashMap<IpAddr, Window>>,
}

struct Window {
    started: Instant,
    attempts: u32,
}

impl LoginLimiter {
    pub fn new(window: Duration, delay_after: u32, delay_step: Duration) -> Self {
        Self {
            window,
            delay_after,
            delay_step,
            // Cap keeps a determined client from pushing its own delay past
            // any sensible request timeout.
            max_delay: delay_step * 40,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Record one attempt from `addr` and return the delay to apply before
    /// handling it. Windows restart once they have fully elapsed.
    pub fn penalty(&self, addr: IpAddr) -> Duration {
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());

        // Opportunistic prune so idle addresses don't accumulate.
        hits.retain(|_, w| w.started.elapsed() < self.window);

        let window = hits.entry(addr).or_insert_with(|| Window {
            started: Instant::now(),
            attempts: 0,
        });
        window.attempts += 1;

        if window.attempts <= self.delay_after {
            Duration::ZERO
        } else {
            (self.delay_step * (window.attempts - self.delay_after)).min(self.max_delay)
        }
    }

    /// Apply the penalty for `addr`, suspending the calling task.
    pub async fn throttle(&self, addr: IpAddr) {
        let delay = self.penalty(addr);
        if !delay.is_zero() {
            tracing::debug!("Delaying login from {} by {:?}", addr, delay);
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last])
    }

    fn limiter() -> LoginLimiter {
        LoginLimiter::new(Duration::from_secs(600), 5, Duration::from_millis(250))
    }

    #[test]
    fn first_attempts_are_free() {
        let limiter = limiter();
        for _ in 0..5 {
            assert_eq!(limiter.penalty(addr(1)), Duration::ZERO);
        }
    }

    #[test]
    fn delay_grows_past_the_threshold() {
        let limiter = limiter();
        for _ in 0..5 {
            limiter.penalty(addr(1));
        }
        assert_eq!(limiter.penalty(addr(1)), Duration::from_millis(250));
        assert_eq!(limiter.penalty(addr(1)), Duration::from_millis(500));
        assert_eq!(limiter.penalty(addr(1)), Duration::from_millis(750));
    }

    #[test]
    fn delay_is_capped() {
        let limiter = limiter();
        let mut last = Duration::ZERO;
        for _ in 0..200 {
            last = limiter.penalty(addr(1));
        }
        assert_eq!(last, Duration::from_millis(250) * 40);
    }

    #[test]
    fn addresses_are_tracked_independently() {
        let limiter = limiter();
        for _ in 0..10 {
            limiter.penalty(addr(1));
        }
        assert_eq!(limiter.penalty(addr(2)), Duration::ZERO);
    }

    #[test]
    fn window_expiry_resets_the_count() {
        let limiter = LoginLimiter::new(Duration::ZERO, 2, Duration::from_millis(100));
        // Every call starts a fresh window because the previous one has
        // already elapsed, so no delay ever accrues.
        for _ in 0..10 {
            assert_eq!(limiter.penalty(addr(1)), Duration::ZERO);
        }
    }
}
