use tracing::{debug, warn};

use super::composer::MessageComposer;
use super::payload::MultipartPayload;
use super::transport::{HttpTransport, PayloadSender};
use super::types::{DeliveryResult, JobMetadata, LogSource, NotificationConfig, Status};
use crate::state_machine::{AttemptTrace, DeliveryState};

/// Runs one delivery attempt: compose, package, send.
///
/// Retrying is the caller's business; see [`crate::driver::RetryDriver`].
pub struct DeliveryController<T = HttpTransport> {
    transport: T,
}

impl<T: PayloadSender> DeliveryController<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub async fn notify<L>(
        &self,
        status: Status,
        meta: &JobMetadata,
        logs: &L,
        config: &NotificationConfig,
    ) -> DeliveryResult
    where
        L: LogSource + ?Sized,
    {
        self.notify_traced(status, meta, logs, config).await.0
    }

    /// Same as [`notify`](Self::notify), also returning the states the attempt went through.
    pub async fn notify_traced<L>(
        &self,
        status: Status,
        meta: &JobMetadata,
        logs: &L,
        config: &NotificationConfig,
    ) -> (DeliveryResult, AttemptTrace)
    where
        L: LogSource + ?Sized,
    {
        let mut trace = AttemptTrace::new();

        trace.advance(DeliveryState::Composing);
        let message = MessageComposer::new(config.message_template()).compose(
            status,
            meta,
            logs,
            config.send_log_on(),
        );
        let with_log = message.attachment.is_some();

        trace.advance(DeliveryState::Packaging);
        let payload = MultipartPayload::build(message, config.room_id());

        trace.advance(DeliveryState::Sending);
        debug!(%status, label = %meta.label, with_log, "sending notification");
        let result = self
            .transport
            .send(payload, config.endpoint(), config.token())
            .await;

        if result.succeeded {
            trace.advance(DeliveryState::Delivered);
        } else {
            trace.advance(DeliveryState::Failed);
            warn!(
                %status,
                code = ?result.status_code,
                error = result.error_detail.as_deref().unwrap_or("unknown error"),
                "notification attempt failed"
            );
        }

        (result, trace)
    }
}
