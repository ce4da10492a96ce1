//! Resilient send wrapper with configurable retry policy
//!
//! This module wraps a single logical request-send operation with retries.
//! Which outcomes get retried is a pure predicate over [`AttemptOutcome`]
//! held in the [`RetryPolicy`], so the decision logic is unit-testable
//! without any network I/O. The default predicate retries transport-level
//! failures and 5xx statuses; [`RetryPolicy::retry_on_status`] replaces it
//! wholesale (the classic demonstration retries on 401, a status that is
//! normally terminal, to show the policy is fully overridable).
//!
//! Retry state (attempt counter, backoff delay) is local to one
//! [`send_with_retry`] call. The policy itself is immutable and can back any
//! number of concurrent calls.
//!
//! # Examples
//!
//! ```rust,no_run
//! use chat_connector::{RetryPolicy, send_with_retry, HttpOutcome};
//! use std::time::Duration;
//!
//! # async fn example() -> chat_connector::Result<()> {
//! let policy = RetryPolicy::default()
//!     .with_max_attempts(3)
//!     .with_initial_delay(Duration::from_millis(100));
//!
//! let outcome = send_with_retry(&policy, None, || async {
//!     // Your send operation here
//!     Ok(HttpOutcome { status: 200, body: "{}".to_string() })
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// What one send attempt produced, as seen by the retry predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The server answered with this HTTP status
    Status(u16),
    /// The request failed below HTTP (connection refused, timeout, ...)
    Transport,
}

/// A successful HTTP exchange: status plus raw body
#[derive(Debug, Clone)]
pub struct HttpOutcome {
    pub status: u16,
    pub body: String,
}

/// Predicate deciding whether an outcome is retryable
pub type RetryPredicate = Arc<dyn Fn(&AttemptOutcome) -> bool + Send + Sync>;

/// Configuration for retry behavior.
///
/// Constructed once per client configuration and applied to every outbound
/// call; carries no mutable state between calls.
#[derive(Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,

    /// Initial delay before the first retry
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (e.g., 2.0 doubles the delay each time)
    pub backoff_multiplier: f64,

    /// Random jitter added to each delay to prevent thundering herd (0.0 to 1.0)
    pub jitter_factor: f64,

    predicate: RetryPredicate,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("initial_delay", &self.initial_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .field("jitter_factor", &self.jitter_factor)
            .field("predicate", &"<fn>")
            .finish()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
            predicate: Arc::new(default_predicate),
        }
    }
}

/// Default classification: transport failures and 5xx statuses are
/// transient; everything else is terminal.
fn default_predicate(outcome: &AttemptOutcome) -> bool {
    match outcome {
        AttemptOutcome::Transport => true,
        AttemptOutcome::Status(status) => (500..600).contains(status),
    }
}

impl RetryPolicy {
    /// Create a new retry policy with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum number of attempts
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set backoff multiplier
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Set jitter factor (0.0 to 1.0)
    pub fn with_jitter_factor(mut self, jitter: f64) -> Self {
        self.jitter_factor = jitter.clamp(0.0, 1.0);
        self
    }

    /// Replace the retry predicate
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&AttemptOutcome) -> bool + Send + Sync + 'static,
    {
        self.predicate = Arc::new(predicate);
        self
    }

    /// Replace the predicate with one that retries exactly the given HTTP
    /// status and nothing else
    pub fn retry_on_status(self, status: u16) -> Self {
        self.with_predicate(move |outcome| matches!(outcome, AttemptOutcome::Status(s) if *s == status))
    }

    /// Whether this policy would retry the given outcome
    pub fn is_retryable(&self, outcome: &AttemptOutcome) -> bool {
        (self.predicate)(outcome)
    }

    /// Calculate delay for a given attempt with exponential backoff and jitter
    fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_delay_ms = self.initial_delay.as_millis() as f64;
        let exponential_delay = base_delay_ms * self.backoff_multiplier.powi(attempt as i32);

        // Cap at max delay
        let capped_delay = exponential_delay.min(self.max_delay.as_millis() as f64);

        // Add jitter
        let jitter_range = capped_delay * self.jitter_factor;
        let jitter = rand::random::<f64>() * jitter_range;
        let final_delay = capped_delay + jitter - (jitter_range / 2.0);

        Duration::from_millis(final_delay.max(0.0) as u64)
    }
}

/// Send through the retry policy.
///
/// Calls `operation` up to `max_attempts` times. A 2xx outcome returns
/// immediately. A non-2xx status or transport-level failure is retried when
/// the policy's predicate says so and attempts remain; otherwise it becomes
/// the terminal error (`Api` for a non-retryable status, the original error
/// for a non-retryable failure, `RetryExhausted` once attempts run out on a
/// retryable outcome).
///
/// A raised `interrupt` flag surfaces as `Error::Cancelled`, which is never
/// retried. The flag is checked before every attempt, and both the send
/// await and the backoff sleep are raced against it, so a cancel raised
/// mid-wait aborts that wait instead of letting it run out. Each call owns
/// its attempt counter, so concurrent calls sharing one policy do not
/// interfere.
pub async fn send_with_retry<F, Fut>(
    policy: &RetryPolicy,
    interrupt: Option<&AtomicBool>,
    mut operation: F,
) -> Result<HttpOutcome>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<HttpOutcome>>,
{
    let mut last_outcome = None;

    for attempt in 0..policy.max_attempts {
        if interrupt.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            return Err(Error::Cancelled);
        }

        tracing::debug!(attempt = attempt + 1, max_attempts = policy.max_attempts, "sending request");

        let attempt_result = match interrupt {
            Some(flag) => tokio::select! {
                result = operation() => result,
                _ = interrupt_raised(flag) => return Err(Error::Cancelled),
            },
            None => operation().await,
        };

        let description = match attempt_result {
            Ok(result) if (200..300).contains(&result.status) => return Ok(result),
            Ok(result) => {
                if !policy.is_retryable(&AttemptOutcome::Status(result.status)) {
                    return Err(Error::api(result.status, result.body));
                }
                format!("status {}: {}", result.status, result.body)
            }
            // Cancellation propagates as-is; retrying it would be wrong
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(Error::Http(e)) => {
                if !policy.is_retryable(&AttemptOutcome::Transport) {
                    return Err(Error::Http(e));
                }
                format!("transport error: {}", e)
            }
            // Encoder/decoder errors are not send outcomes; surface immediately
            Err(e) => return Err(e),
        };

        tracing::warn!(
            attempt = attempt + 1,
            max_attempts = policy.max_attempts,
            outcome = %description,
            "request attempt failed with retryable outcome"
        );
        last_outcome = Some(description);

        // Don't sleep after the last attempt
        if attempt < policy.max_attempts - 1 {
            let delay = policy.calculate_delay(attempt);
            tracing::debug!(delay_ms = delay.as_millis() as u64, "backing off before retry");
            match interrupt {
                Some(flag) => tokio::select! {
                    _ = sleep(delay) => {}
                    _ = interrupt_raised(flag) => return Err(Error::Cancelled),
                },
                None => sleep(delay).await,
            }
        }
    }

    Err(Error::RetryExhausted {
        attempts: policy.max_attempts,
        last: last_outcome.unwrap_or_else(|| "no attempts were made".to_string()),
    })
}

/// How often a pending wait re-checks the interrupt flag
const INTERRUPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Resolves once the interrupt flag is raised.
///
/// Raced against the send await and the backoff sleep so a cancel wakes a
/// pending wait within the poll interval instead of letting it run out.
async fn interrupt_raised(flag: &AtomicBool) {
    while !flag.load(Ordering::SeqCst) {
        sleep(INTERRUPT_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new()
            .with_initial_delay(Duration::from_millis(1))
            .with_jitter_factor(0.0)
    }

    #[test]
    fn test_policy_builder() {
        let policy = RetryPolicy::new()
            .with_max_attempts(5)
            .with_initial_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(30))
            .with_backoff_multiplier(1.5)
            .with_jitter_factor(0.2);

        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
        assert_eq!(policy.backoff_multiplier, 1.5);
        assert_eq!(policy.jitter_factor, 0.2);
    }

    #[test]
    fn test_default_predicate() {
        let policy = RetryPolicy::default();
        assert!(policy.is_retryable(&AttemptOutcome::Transport));
        assert!(policy.is_retryable(&AttemptOutcome::Status(500)));
        assert!(policy.is_retryable(&AttemptOutcome::Status(503)));
        assert!(!policy.is_retryable(&AttemptOutcome::Status(400)));
        assert!(!policy.is_retryable(&AttemptOutcome::Status(401)));
        assert!(!policy.is_retryable(&AttemptOutcome::Status(200)));
    }

    #[test]
    fn test_retry_on_status_overrides_predicate() {
        let policy = RetryPolicy::default().retry_on_status(401);
        assert!(policy.is_retryable(&AttemptOutcome::Status(401)));
        assert!(!policy.is_retryable(&AttemptOutcome::Status(500)));
        assert!(!policy.is_retryable(&AttemptOutcome::Transport));
    }

    #[test]
    fn test_calculate_delay_grows() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_secs(1))
            .with_backoff_multiplier(2.0)
            .with_jitter_factor(0.0); // No jitter for predictable testing

        let delay0 = policy.calculate_delay(0);
        let delay1 = policy.calculate_delay(1);
        let delay2 = policy.calculate_delay(2);

        assert!(delay1 > delay0);
        assert!(delay2 > delay1);
    }

    #[test]
    fn test_calculate_delay_capped() {
        let policy = RetryPolicy::new()
            .with_initial_delay(Duration::from_secs(10))
            .with_max_delay(Duration::from_secs(15))
            .with_backoff_multiplier(10.0)
            .with_jitter_factor(0.0);

        assert_eq!(policy.calculate_delay(5), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicUsize::new(0);
        let result = send_with_retry(&fast_policy(), None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Ok(HttpOutcome {
                    status: 200,
                    body: "{}".to_string(),
                })
            }
        })
        .await;

        assert_eq!(result.unwrap().status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_on_401_exhausts_after_three_attempts() {
        let policy = fast_policy().with_max_attempts(3).retry_on_status(401);

        let calls = AtomicUsize::new(0);
        let result = send_with_retry(&policy, None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Ok(HttpOutcome {
                    status: 401,
                    body: "Unauthorized".to_string(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(Error::RetryExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(last.contains("401"));
            }
            other => panic!("expected RetryExhausted, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let policy = fast_policy().with_max_attempts(3);

        let calls = AtomicUsize::new(0);
        let result = send_with_retry(&policy, None, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Ok(HttpOutcome {
                        status: 503,
                        body: "Service Unavailable".to_string(),
                    })
                } else {
                    Ok(HttpOutcome {
                        status: 200,
                        body: "{}".to_string(),
                    })
                }
            }
        })
        .await;

        assert_eq!(result.unwrap().status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_status_fails_immediately() {
        let calls = AtomicUsize::new(0);
        let result = send_with_retry(&fast_policy(), None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Ok(HttpOutcome {
                    status: 400,
                    body: "Bad Request".to_string(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(Error::Api { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_non_send_errors_surface_immediately() {
        let policy = fast_policy().with_max_attempts(3);

        let calls = AtomicUsize::new(0);
        let result = send_with_retry(&policy, None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<HttpOutcome, _>(Error::invalid_argument("bad request body")) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_raised_interrupt_cancels_before_first_attempt() {
        let interrupt = AtomicBool::new(true);

        let calls = AtomicUsize::new(0);
        let result = send_with_retry(&fast_policy(), Some(&interrupt), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Ok(HttpOutcome {
                    status: 200,
                    body: "{}".to_string(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_interrupt_stops_retry_sequence() {
        let policy = fast_policy().with_max_attempts(5).retry_on_status(503);
        let interrupt = AtomicBool::new(false);

        let calls = AtomicUsize::new(0);
        let result = send_with_retry(&policy, Some(&interrupt), || {
            calls.fetch_add(1, Ordering::SeqCst);
            // Raise the flag during the first attempt
            interrupt.store(true, Ordering::SeqCst);
            async {
                Ok(HttpOutcome {
                    status: 503,
                    body: "Service Unavailable".to_string(),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_interrupt_aborts_pending_backoff_wait() {
        let policy = RetryPolicy::new()
            .with_max_attempts(3)
            .with_initial_delay(Duration::from_secs(2))
            .with_jitter_factor(0.0)
            .retry_on_status(503);
        let interrupt = Arc::new(AtomicBool::new(false));

        // Raise the flag while the first backoff sleep is pending
        let flag = Arc::clone(&interrupt);
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let started = std::time::Instant::now();
        let result = send_with_retry(&policy, Some(&*interrupt), || async {
            Ok(HttpOutcome {
                status: 503,
                body: "Service Unavailable".to_string(),
            })
        })
        .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        // The wait must be aborted well before the 2s backoff elapses
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_interrupt_aborts_in_flight_send() {
        let interrupt = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&interrupt);
        tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let started = std::time::Instant::now();
        let result = send_with_retry(&fast_policy(), Some(&*interrupt), || async {
            // A send that hangs far longer than the cancel
            sleep(Duration::from_secs(30)).await;
            Ok(HttpOutcome {
                status: 200,
                body: "{}".to_string(),
            })
        })
        .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_cancellation_is_never_retried() {
        let policy = fast_policy()
            .with_max_attempts(5)
            .with_predicate(|_| true);

        let calls = AtomicUsize::new(0);
        let result = send_with_retry(&policy, None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<HttpOutcome, _>(Error::Cancelled) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn test_concurrent_calls_have_independent_attempt_counters() {
        let policy = Arc::new(fast_policy().with_max_attempts(2).retry_on_status(503));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let policy = Arc::clone(&policy);
            handles.push(tokio::spawn(async move {
                let calls = AtomicUsize::new(0);
                let result = send_with_retry(&policy, None, || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async {
                        Ok(HttpOutcome {
                            status: 503,
                            body: "Service Unavailable".to_string(),
                        })
                    }
                })
                .await;
                (calls.load(Ordering::SeqCst), result)
            }));
        }

        for handle in handles {
            let (calls, result) = handle.await.unwrap();
            assert_eq!(calls, 2);
            assert!(matches!(
                result,
                Err(Error::RetryExhausted { attempts: 2, .. })
            ));
        }
    }
}
