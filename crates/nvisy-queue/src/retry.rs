//! Backoff presets and the [`RetryExecutor`] that turns an attempt count into
//! a delay, plus the [`RetryExecutor::execute`] loop that actually drives
//! retries around a fallible operation.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Exponential backoff parameters for one class of retryable operation.
///
/// `max_retries` bounds retries after the first attempt, so a job governed
/// by this preset makes at most `max_retries + 1` total attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPreset {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

/// Named presets a queue can be configured with.
///
/// Each corresponds to one class of operation seen across this workspace's
/// job types; `addJob` callers pick the preset matching their job's failure
/// profile rather than hand-tuning backoff per job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum RetryPresetName {
    FileUpload,
    FileProcessing,
    Network,
    Database,
    ExternalApi,
}

impl RetryPresetName {
    pub fn preset(self) -> RetryPreset {
        match self {
            Self::FileUpload => RetryPreset {
                max_retries: 5,
                initial_delay: Duration::from_millis(2_000),
                max_delay: Duration::from_millis(60_000),
                backoff_multiplier: 2.0,
                jitter: true,
            },
            Self::FileProcessing => RetryPreset {
                max_retries: 3,
                initial_delay: Duration::from_millis(1_000),
                max_delay: Duration::from_millis(30_000),
                backoff_multiplier: 2.0,
                jitter: true,
            },
            Self::Network => RetryPreset {
                max_retries: 4,
                initial_delay: Duration::from_millis(500),
                max_delay: Duration::from_millis(10_000),
                backoff_multiplier: 1.5,
                jitter: true,
            },
            Self::Database => RetryPreset {
                max_retries: 2,
                initial_delay: Duration::from_millis(1_000),
                max_delay: Duration::from_millis(5_000),
                backoff_multiplier: 2.0,
                jitter: true,
            },
            Self::ExternalApi => RetryPreset {
                max_retries: 3,
                initial_delay: Duration::from_millis(1_500),
                max_delay: Duration::from_millis(20_000),
                backoff_multiplier: 2.0,
                jitter: true,
            },
        }
    }
}

/// Floor applied to every computed delay, regardless of preset.
const MIN_DELAY: Duration = Duration::from_millis(100);

/// Jitter applied as +/-10% of the computed delay.
const JITTER_FRACTION: f64 = 0.10;

/// Computes backoff delays for a fixed [`RetryPreset`].
#[derive(Debug, Clone, Copy)]
pub struct RetryExecutor {
    preset: RetryPreset,
}

impl RetryExecutor {
    pub fn new(preset: RetryPreset) -> Self {
        Self { preset }
    }

    pub fn from_preset_name(name: RetryPresetName) -> Self {
        Self::new(name.preset())
    }

    /// Total attempts permitted, including the first: `max_retries + 1`.
    pub fn max_attempts(&self) -> u32 {
        self.preset.max_retries + 1
    }

    /// Whether another attempt is permitted after `attempts_made`.
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts()
    }

    /// Delay before the next attempt, given the number of attempts already
    /// made (1-indexed: pass 1 after the first failure to get the delay
    /// before the second attempt): `min(initialDelay * multiplier^(a-1), maxDelay)`,
    /// then +/-10% jitter (when enabled) floored at [`MIN_DELAY`].
    pub fn next_delay(&self, attempts_made: u32) -> Duration {
        let exponent = attempts_made.saturating_sub(1) as i32;
        let scaled =
            self.preset.initial_delay.as_secs_f64() * self.preset.backoff_multiplier.powi(exponent);
        let capped = scaled.min(self.preset.max_delay.as_secs_f64());

        let jittered = if self.preset.jitter {
            let jitter = rand::thread_rng().gen_range(-JITTER_FRACTION..=JITTER_FRACTION);
            capped * (1.0 + jitter)
        } else {
            capped
        };

        Duration::from_secs_f64(jittered.max(0.0)).max(MIN_DELAY)
    }

    /// Runs `op` to completion, retrying on a retryable error up to
    /// `max_attempts`, sleeping [`Self::next_delay`] between attempts.
    ///
    /// `is_retryable` classifies each error `op` returns; an error it judges
    /// non-retryable (or the final attempt's error) is returned immediately.
    /// This is what lets a caller absorb an operation's own transient
    /// failures (a flaky download, say) into a single logical attempt rather
    /// than surfacing each retry to whatever is scheduling `op` in the first
    /// place.
    pub async fn execute<T, E, F, Fut>(&self, mut op: F, is_retryable: impl Fn(&E) -> bool) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts_made = 0u32;
        loop {
            attempts_made += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if is_retryable(&err) && self.should_retry(attempts_made) => {
                    tokio::time::sleep(self.next_delay(attempts_made)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_sequence_matches_spec_example_without_jitter() {
        let executor = RetryExecutor::new(RetryPreset {
            max_retries: 10,
            initial_delay: Duration::from_millis(1_000),
            max_delay: Duration::from_millis(5_000),
            backoff_multiplier: 2.0,
            jitter: false,
        });
        let delays: Vec<u64> = (1..=5).map(|a| executor.next_delay(a).as_millis() as u64).collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 5000, 5000]);
    }

    #[test]
    fn delay_never_drops_below_floor() {
        let executor = RetryExecutor::new(RetryPreset {
            max_retries: 1,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            backoff_multiplier: 1.0,
            jitter: false,
        });
        assert!(executor.next_delay(1) >= MIN_DELAY);
    }

    #[test]
    fn should_retry_honors_max_attempts() {
        let executor = RetryExecutor::from_preset_name(RetryPresetName::FileProcessing);
        assert_eq!(executor.max_attempts(), 4);
        assert!(executor.should_retry(3));
        assert!(!executor.should_retry(4));
    }

    #[test]
    fn preset_name_round_trips_camel_case() {
        use std::str::FromStr;
        assert_eq!(RetryPresetName::ExternalApi.to_string(), "externalApi");
        assert_eq!(
            RetryPresetName::from_str("fileUpload").unwrap(),
            RetryPresetName::FileUpload
        );
    }

    #[tokio::test]
    async fn execute_absorbs_retryable_failures_into_one_logical_attempt() {
        let executor = RetryExecutor::new(RetryPreset {
            max_retries: 5,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            backoff_multiplier: 1.0,
            jitter: false,
        });

        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: Result<&'static str, &'static str> = executor
            .execute(
                || {
                    let n = attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    async move { if n < 2 { Err("econnreset") } else { Ok("ok") } }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn execute_returns_immediately_on_non_retryable_error() {
        let executor = RetryExecutor::from_preset_name(RetryPresetName::Network);
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: Result<(), &'static str> = executor
            .execute(
                || {
                    attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    async { Err("bad request") }
                },
                |_| false,
            )
            .await;

        assert_eq!(result, Err("bad request"));
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn execute_stops_after_max_attempts() {
        let executor = RetryExecutor::new(RetryPreset {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
            backoff_multiplier: 1.0,
            jitter: false,
        });
        let attempts = std::sync::atomic::AtomicU32::new(0);
        let result: Result<(), &'static str> = executor
            .execute(
                || {
                    attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    async { Err("econnreset") }
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Err("econnreset"));
        assert_eq!(attempts.load(std::sync::atomic::Ordering::SeqCst), 3);
    }
}
