//! Quota pacing and retry for the Shopify Admin API.
//!
//! Shopify meters REST calls with a leaky bucket and reports its fill level
//! on every response as `X-Shopify-Shop-Api-Call-Limit: used/max`. Before
//! each request the [`QuotaPacer`] turns the most recent reading into a wait
//! using [`PacingPolicy::next_wait_duration`], so the client slows down as the
//! bucket fills instead of running into 429s.
//!
//! Requests that still fail with a transient error go through
//! [`retry_with_backoff`].

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::ShopifyError;

/// Response header carrying the bucket fill level.
pub const CALL_LIMIT_HEADER: &str = "x-shopify-shop-api-call-limit";

/// Longest single wait between two attempts, server-requested or computed.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Parameters of the pacing feedback controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingPolicy {
    /// Floor for the interval between two requests.
    pub min_interval: Duration,
    /// Remaining fraction at or above which only `min_interval` applies.
    pub comfort_fraction: f64,
    /// Remaining fraction below which the full refill wait applies.
    pub low_water_fraction: f64,
    /// Bucket leak rate in calls per second.
    pub leak_per_sec: f64,
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(500),
            comfort_fraction: 0.5,
            low_water_fraction: 0.25,
            leak_per_sec: 2.0,
        }
    }
}

impl PacingPolicy {
    #[must_use]
    pub fn with_min_interval(min_interval: Duration) -> Self {
        Self {
            min_interval,
            ..Self::default()
        }
    }

    /// Wait before the next request given `remaining` of `max` calls left.
    ///
    /// - At or above the comfort fraction: `min_interval`.
    /// - Between the low-water mark and comfort: the time the bucket needs
    ///   to leak back to comfort, scaled linearly from zero at comfort to the
    ///   full amount at the low-water mark.
    /// - Below the low-water mark: the full refill time.
    ///
    /// Never shorter than `min_interval`, and never shorter for less
    /// remaining quota than for more.
    #[must_use]
    pub fn next_wait_duration(&self, remaining: u32, max: u32) -> Duration {
        if max == 0 {
            return self.min_interval;
        }
        let max_f = f64::from(max);
        let remaining_f = f64::from(remaining.min(max));
        let fraction = remaining_f / max_f;

        if fraction >= self.comfort_fraction {
            return self.min_interval;
        }

        let deficit = self.comfort_fraction * max_f - remaining_f;
        let refill_secs = deficit / self.leak_per_sec.max(f64::EPSILON);

        let band = (self.comfort_fraction - self.low_water_fraction).max(f64::EPSILON);
        let scale = if fraction >= self.low_water_fraction {
            (self.comfort_fraction - fraction) / band
        } else {
            1.0
        };

        let wait = Duration::from_secs_f64((refill_secs * scale).max(0.0));
        wait.max(self.min_interval)
    }
}

/// Parses `used/max` from the call-limit header into `(remaining, max)`.
#[must_use]
pub fn parse_call_limit(value: &str) -> Option<(u32, u32)> {
    let (used, max) = value.trim().split_once('/')?;
    let used = used.trim().parse::<u32>().ok()?;
    let max = max.trim().parse::<u32>().ok()?;
    if max == 0 {
        return None;
    }
    Some((max.saturating_sub(used), max))
}

#[derive(Debug, Default)]
struct PacerState {
    last_request: Option<Instant>,
    /// Most recent `(remaining, max)` reading.
    quota: Option<(u32, u32)>,
}

/// Stateful pacer shared by every request made with one access token.
#[derive(Debug)]
pub struct QuotaPacer {
    policy: PacingPolicy,
    state: Mutex<PacerState>,
}

impl QuotaPacer {
    #[must_use]
    pub fn new(policy: PacingPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(PacerState::default()),
        }
    }

    #[must_use]
    pub fn policy(&self) -> PacingPolicy {
        self.policy
    }

    /// Latest `(remaining, max)` reading, if any response carried one.
    #[must_use]
    pub fn last_quota(&self) -> Option<(u32, u32)> {
        self.lock().quota
    }

    /// Records the quota reported by a response.
    pub fn observe(&self, header: Option<&str>) {
        if let Some(quota) = header.and_then(parse_call_limit) {
            self.lock().quota = Some(quota);
        }
    }

    /// Sleeps until the next request may be sent, then marks it as sent.
    pub async fn pace(&self) {
        let delay = {
            let state = self.lock();
            let wait = match state.quota {
                Some((remaining, max)) => self.policy.next_wait_duration(remaining, max),
                None => self.policy.min_interval,
            };
            state
                .last_request
                .map_or(Duration::ZERO, |last| wait.saturating_sub(last.elapsed()))
        };

        if !delay.is_zero() {
            if delay > self.policy.min_interval {
                tracing::debug!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    quota = ?self.last_quota(),
                    "quota running low, slowing down"
                );
            }
            tokio::time::sleep(delay).await;
        }

        self.lock().last_request = Some(Instant::now());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PacerState> {
        // The state is plain data; a panic elsewhere cannot leave it invalid.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// A 429 waits for the duration the server asked for and repeats the same
/// request. Other transient errors back off exponentially from
/// `backoff_base_ms` with ±25 % jitter. Both waits are capped at
/// [`MAX_RETRY_DELAY`]. Non-retriable
/// errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ShopifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ShopifyError>>,
{
    let max_delay_ms = u64::try_from(MAX_RETRY_DELAY.as_millis()).unwrap_or(u64::MAX);
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retriable() || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;

                let delay = if let ShopifyError::RateLimited { retry_after, .. } = &err {
                    (*retry_after).min(MAX_RETRY_DELAY)
                } else {
                    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                    let capped = computed.min(max_delay_ms);
                    #[allow(
                        clippy::cast_possible_truncation,
                        clippy::cast_sign_loss,
                        clippy::cast_precision_loss
                    )]
                    let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                    Duration::from_millis(jittered)
                };

                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient Shopify error, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
