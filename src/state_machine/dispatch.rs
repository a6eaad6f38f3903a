use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notify::{DeliveryResult, FailureKind, Status};

/// Tracks the lifecycle of a dispatch across attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Pending,
    InFlight,
    Delivered,
    Failed,
    /// Gated out by `on_success` / `on_warning` / `on_failure`.
    Skipped,
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Fixed wait between attempts, in seconds.
    pub retry_waitsec: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 10,
            retry_waitsec: 30,
        }
    }
}

impl RetryConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.retry_waitsec)
    }
}

/// Whether another attempt could succeed after this failure.
///
/// Network errors, 5xx and 429 are transient; config errors and other 4xx are not.
pub fn is_retryable(result: &DeliveryResult) -> bool {
    match result.failure {
        None => false,
        Some(FailureKind::Configuration) => false,
        Some(FailureKind::Transport { .. }) => true,
        Some(FailureKind::ServerRejection) => {
            matches!(result.status_code, Some(code) if code >= 500 || code == 429)
        }
    }
}

/// The decision taken after recording an attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Wait, then attempt again.
    Retry {
        retry: u32,
        wait: Duration,
        reason: String,
    },
    /// No more attempts: delivered, or failed for good.
    Complete(DispatchStatus),
}

/// One notification being delivered, possibly over several attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispatch {
    pub id: String,
    pub status: Status,
    pub state: DispatchStatus,
    pub attempts: u32,
    pub retry_config: RetryConfig,
    pub last_result: Option<DeliveryResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dispatch {
    pub fn new(status: Status, retry_config: RetryConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status,
            state: DispatchStatus::Pending,
            attempts: 0,
            retry_config,
            last_result: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn skip(&mut self) {
        self.state = DispatchStatus::Skipped;
        self.updated_at = Utc::now();
    }

    /// Record the result of an attempt and decide what happens next.
    ///
    /// A retryable failure is retried while `attempts <= max_retries`, so at most
    /// `max_retries + 1` attempts are made.
    pub fn record_attempt(&mut self, result: DeliveryResult) -> Transition {
        self.attempts += 1;
        self.updated_at = Utc::now();

        let transition = if result.succeeded {
            Transition::Complete(DispatchStatus::Delivered)
        } else if is_retryable(&result) && self.attempts <= self.retry_config.max_retries {
            Transition::Retry {
                retry: self.attempts,
                wait: self.retry_config.wait(),
                reason: result
                    .error_detail
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            }
        } else {
            Transition::Complete(DispatchStatus::Failed)
        };

        self.state = match &transition {
            Transition::Retry { .. } => DispatchStatus::InFlight,
            Transition::Complete(state) => *state,
        };
        self.last_result = Some(result);
        transition
    }

    /// Detail of the last failure, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_result
            .as_ref()
            .and_then(|r| r.error_detail.as_deref())
    }
}

/// Structured audit record produced when a dispatch finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRecord {
    pub dispatch_id: String,
    pub status: Status,
    pub outcome: DispatchStatus,
    pub attempts: u32,
    pub max_retries: u32,
    pub last_status_code: Option<u16>,
    pub last_error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl DispatchRecord {
    pub fn from_dispatch(dispatch: &Dispatch) -> Self {
        let now = Utc::now();
        Self {
            dispatch_id: dispatch.id.clone(),
            status: dispatch.status,
            outcome: dispatch.state,
            attempts: dispatch.attempts,
            max_retries: dispatch.retry_config.max_retries,
            last_status_code: dispatch.last_result.as_ref().and_then(|r| r.status_code),
            last_error: dispatch.last_error().map(str::to_string),
            started_at: dispatch.created_at,
            completed_at: now,
            duration_ms: (now - dispatch.created_at).num_milliseconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotifyError;

    fn make_dispatch(max_retries: u32) -> Dispatch {
        Dispatch::new(
            Status::Failure,
            RetryConfig {
                max_retries,
                retry_waitsec: 0,
            },
        )
    }

    fn rejected(code: u16) -> DeliveryResult {
        DeliveryResult::failed(&NotifyError::ServerRejection {
            code,
            reason: "test".into(),
        })
    }

    fn network_down() -> DeliveryResult {
        DeliveryResult {
            succeeded: false,
            status_code: None,
            error_detail: Some("transport error: connection refused".into()),
            failure: Some(FailureKind::Transport { timed_out: false }),
        }
    }

    #[test]
    fn dispatch_creation_defaults() {
        let dispatch = Dispatch::new(Status::Success, RetryConfig::default());
        assert_eq!(dispatch.state, DispatchStatus::Pending);
        assert_eq!(dispatch.attempts, 0);
        assert_eq!(dispatch.retry_config.max_retries, 10);
        assert_eq!(dispatch.retry_config.retry_waitsec, 30);
        assert!(dispatch.last_result.is_none());
    }

    #[test]
    fn retry_classification() {
        assert!(is_retryable(&network_down()));
        assert!(is_retryable(&rejected(500)));
        assert!(is_retryable(&rejected(503)));
        assert!(is_retryable(&rejected(429)));
        assert!(!is_retryable(&rejected(401)));
        assert!(!is_retryable(&rejected(404)));
        assert!(!is_retryable(&DeliveryResult::failed(&NotifyError::Config(
            "bad".into()
        ))));
        assert!(!is_retryable(&DeliveryResult::delivered(200)));
    }

    #[test]
    fn transient_failure_retries_then_fails() {
        let mut dispatch = make_dispatch(2);

        let t = dispatch.record_attempt(rejected(503));
        assert!(matches!(t, Transition::Retry { retry: 1, .. }));
        assert_eq!(dispatch.state, DispatchStatus::InFlight);

        let t = dispatch.record_attempt(network_down());
        assert!(matches!(t, Transition::Retry { retry: 2, .. }));

        let t = dispatch.record_attempt(rejected(502));
        assert_eq!(t, Transition::Complete(DispatchStatus::Failed));
        assert_eq!(dispatch.attempts, 3);
        assert_eq!(dispatch.last_error(), Some("Invalid server response 502: test"));
    }

    #[test]
    fn client_error_fails_immediately() {
        let mut dispatch = make_dispatch(5);
        let t = dispatch.record_attempt(rejected(401));
        assert_eq!(t, Transition::Complete(DispatchStatus::Failed));
        assert_eq!(dispatch.attempts, 1);
        assert_eq!(dispatch.state, DispatchStatus::Failed);
    }

    #[test]
    fn zero_retries_fails_on_first_error() {
        let mut dispatch = make_dispatch(0);
        let t = dispatch.record_attempt(network_down());
        assert_eq!(t, Transition::Complete(DispatchStatus::Failed));
    }

    #[test]
    fn retry_then_deliver() {
        let mut dispatch = make_dispatch(3);
        dispatch.record_attempt(network_down());
        let t = dispatch.record_attempt(DeliveryResult::delivered(200));
        assert_eq!(t, Transition::Complete(DispatchStatus::Delivered));
        assert_eq!(dispatch.attempts, 2);
        assert!(dispatch.last_error().is_none());
    }

    #[test]
    fn retry_reason_is_error_detail() {
        let mut dispatch = make_dispatch(1);
        match dispatch.record_attempt(rejected(500)) {
            Transition::Retry { reason, wait, .. } => {
                assert_eq!(reason, "Invalid server response 500: test");
                assert_eq!(wait, Duration::ZERO);
            }
            other => panic!("expected retry, got {other:?}"),
        }
    }

    #[test]
    fn record_from_dispatch() {
        let mut dispatch = make_dispatch(0);
        dispatch.record_attempt(rejected(500));
        let record = DispatchRecord::from_dispatch(&dispatch);

        assert_eq!(record.dispatch_id, dispatch.id);
        assert_eq!(record.outcome, DispatchStatus::Failed);
        assert_eq!(record.attempts, 1);
        assert_eq!(record.last_status_code, Some(500));
        assert!(record.duration_ms >= 0);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""outcome":"failed""#));
        assert!(json.contains(r#""status":"failure""#));
    }
}
