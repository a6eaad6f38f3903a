use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::RoomcastError;
use crate::notify::{
    DeliveryController, DeliveryResult, JobMetadata, LogSource, NotificationConfig,
    PayloadSender, Status,
};
use crate::state_machine::{Dispatch, DispatchRecord, DispatchStatus, RetryConfig, Transition};

/// Something that can make one delivery attempt. Called repeatedly by [`RetryDriver`].
pub trait AttemptDelivery {
    async fn attempt_delivery(&self) -> DeliveryResult;
}

/// A notification bound to its controller and inputs, ready to be attempted.
pub struct PendingNotification<'a, T, L: ?Sized> {
    pub controller: &'a DeliveryController<T>,
    pub config: &'a NotificationConfig,
    pub status: Status,
    pub meta: &'a JobMetadata,
    pub logs: &'a L,
}

impl<T, L> AttemptDelivery for PendingNotification<'_, T, L>
where
    T: PayloadSender,
    L: LogSource + ?Sized,
{
    async fn attempt_delivery(&self) -> DeliveryResult {
        self.controller
            .notify(self.status, self.meta, self.logs, self.config)
            .await
    }
}

/// Which job outcomes produce a notification at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyOn {
    pub on_success: bool,
    pub on_warning: bool,
    pub on_failure: bool,
}

impl Default for NotifyOn {
    fn default() -> Self {
        Self {
            on_success: true,
            on_warning: true,
            on_failure: true,
        }
    }
}

impl NotifyOn {
    /// Each flag also enables the more severe statuses.
    pub fn allows(&self, status: Status) -> bool {
        match status {
            Status::Success => self.on_success,
            Status::Warning => self.on_success || self.on_warning,
            Status::Failure => self.on_success || self.on_warning || self.on_failure,
        }
    }
}

/// Receives retry events, e.g. to update a terminal spinner.
pub trait DispatchObserver {
    fn retrying(&self, _retry: u32, _max: u32, _reason: &str, _wait: Duration) {}
}

impl DispatchObserver for () {}

/// Calls a single-attempt delivery until it succeeds or the retry budget runs out.
pub struct RetryDriver {
    name: String,
    retry: RetryConfig,
    notify_on: NotifyOn,
}

impl RetryDriver {
    pub fn new(name: impl Into<String>, retry: RetryConfig, notify_on: NotifyOn) -> Self {
        Self {
            name: name.into(),
            retry,
            notify_on,
        }
    }

    /// Deliver the notification for `status`, returning the dispatch record.
    ///
    /// Fails with [`RoomcastError::DeliveryFailed`] carrying the last observed
    /// error once attempts are exhausted or a non-retryable failure occurs.
    pub async fn perform<A, O>(
        &self,
        status: Status,
        attempt: &A,
        observer: &O,
    ) -> Result<DispatchRecord, RoomcastError>
    where
        A: AttemptDelivery,
        O: DispatchObserver + ?Sized,
    {
        let mut dispatch = Dispatch::new(status, self.retry.clone());

        if !self.notify_on.allows(status) {
            info!(notifier = %self.name, %status, "notification disabled for status, skipping");
            dispatch.skip();
            return Ok(DispatchRecord::from_dispatch(&dispatch));
        }

        loop {
            info!(notifier = %self.name, %status, "sending notification");
            let result = attempt.attempt_delivery().await;

            match dispatch.record_attempt(result) {
                Transition::Retry {
                    retry,
                    wait,
                    reason,
                } => {
                    warn!(
                        notifier = %self.name,
                        "Retry #{retry} of {}: {reason} (waiting {}s)",
                        self.retry.max_retries,
                        wait.as_secs()
                    );
                    observer.retrying(retry, self.retry.max_retries, &reason, wait);
                    sleep(wait).await;
                }
                Transition::Complete(DispatchStatus::Delivered) => {
                    info!(notifier = %self.name, attempts = dispatch.attempts, "notification delivered");
                    return Ok(DispatchRecord::from_dispatch(&dispatch));
                }
                Transition::Complete(_) => {
                    return Err(RoomcastError::DeliveryFailed {
                        notifier: self.name.clone(),
                        attempts: dispatch.attempts,
                        detail: dispatch.last_error().unwrap_or("unknown error").to_string(),
                    });
                }
            }
        }
    }
}
