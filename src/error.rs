use thiserror::Error;

use crate::notify::NotifyError;

#[derive(Debug, Error)]
pub enum RoomcastError {
    #[error("{notifier} failed after {attempts} attempt(s): {detail}")]
    DeliveryFailed {
        notifier: String,
        attempts: u32,
        detail: String,
    },

    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
