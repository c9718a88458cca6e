//! Bounded polling for asynchronously rendered UI state
//!
//! Every wait in the harness goes through a [`RetryPolicy`]: a fixed number
//! of attempts, a fixed interval between them and an optional total
//! deadline. Time is read through a [`Clock`] so the loops can be driven by
//! a [`ManualClock`] in tests.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Source of time for polling loops
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that only moves when slept on. Sleeping returns immediately.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Total time slept so far
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn advance(&self, duration: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += duration;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

/// A poll gave up without the condition holding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryExhausted {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Attempts, interval and deadline for one polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "millis")]
    pub interval: Duration,
    #[serde(default, with = "opt_millis")]
    pub deadline: Option<Duration>,
}

impl RetryPolicy {
    /// Up to `max_attempts` samples, `interval` apart
    pub fn attempts(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
            deadline: None,
        }
    }

    /// Sample every `interval` until `deadline` has elapsed
    pub fn until(deadline: Duration, interval: Duration) -> Self {
        Self {
            max_attempts: u32::MAX,
            interval,
            deadline: Some(deadline),
        }
    }

    /// Sample `probe` until it yields a value or the policy runs out.
    ///
    /// The first sample is taken immediately. After a failed sample the loop
    /// stops if the attempt budget is spent, otherwise it sleeps one
    /// interval and stops if the deadline has passed.
    pub async fn poll<T, F, Fut>(&self, clock: &dyn Clock, mut probe: F) -> Result<T, RetryExhausted>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let start = clock.now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            if let Some(value) = probe(attempts).await {
                return Ok(value);
            }

            if attempts >= self.max_attempts {
                break;
            }

            debug!("Attempt {} not ready, retrying in {:?}", attempts, self.interval);
            clock.sleep(self.interval).await;

            if let Some(deadline) = self.deadline {
                if clock.now().duration_since(start) >= deadline {
                    break;
                }
            }
        }

        Err(RetryExhausted {
            attempts,
            elapsed: clock.now().duration_since(start),
        })
    }
}

impl Default for RetryPolicy {
    /// Five samples two seconds apart
    fn default() -> Self {
        Self::attempts(5, Duration::from_secs(2))
    }
}

pub(crate) mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

mod opt_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}
