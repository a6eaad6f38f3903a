//! Builds the notification text and the optional log attachment.
//!
//! Composition is pure: the same status, metadata and log lines always yield
//! byte-identical output.

use std::collections::BTreeSet;

use super::types::{ComposedMessage, JobMetadata, LogSource, Status};

pub const LOG_BEGIN_MARKER: &str = "---BEGIN LOG---";
pub const LOG_END_MARKER: &str = "---END LOG---";

/// Renders the headline template and job summary for a notification.
pub struct MessageComposer<'a> {
    template: &'a str,
}

impl<'a> MessageComposer<'a> {
    pub fn new(template: &'a str) -> Self {
        Self { template }
    }

    /// Compose the text and, when `status` is in `send_log_on`, the log attachment.
    ///
    /// The log source is only read when the attachment is produced.
    pub fn compose<L>(
        &self,
        status: Status,
        meta: &JobMetadata,
        logs: &L,
        send_log_on: &BTreeSet<Status>,
    ) -> ComposedMessage
    where
        L: LogSource + ?Sized,
    {
        let summary = summary(meta);
        let text = format!("{}\n{summary}", self.headline(status, meta));

        let attachment = send_log_on.contains(&status).then(|| {
            let mut body = summary;
            body.push_str("\n\n");
            body.push_str(LOG_BEGIN_MARKER);
            // Lines already carry their own line breaks.
            for line in logs.log_lines() {
                body.push_str(&line);
            }
            body.push_str(LOG_END_MARKER);
            body.into_bytes()
        });

        ComposedMessage { text, attachment }
    }

    /// Substitute `{status}`, `{label}` and `{trigger}` in the template.
    ///
    /// Single pass: placeholders inside substituted values are left as is.
    pub fn headline(&self, status: Status, meta: &JobMetadata) -> String {
        let status = status.to_string();
        let fields = [
            ("{status}", status.as_str()),
            ("{label}", meta.label.as_str()),
            ("{trigger}", meta.trigger.as_str()),
        ];

        let mut out = String::with_capacity(self.template.len());
        let mut rest = self.template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            rest = &rest[open..];
            match fields.iter().find(|(key, _)| rest.starts_with(key)) {
                Some((key, value)) => {
                    out.push_str(value);
                    rest = &rest[key.len()..];
                }
                None => {
                    out.push('{');
                    rest = &rest[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn summary(meta: &JobMetadata) -> String {
    format!(
        "Job: {} ({})\nStarted:  {}\nFinished: {}\nDuration: {}\n",
        meta.label,
        meta.trigger,
        meta.started_at.format(TIMESTAMP_FORMAT),
        meta.finished_at.format(TIMESTAMP_FORMAT),
        meta.elapsed_time()
    )
}
