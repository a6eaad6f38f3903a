pub mod composer;
pub mod controller;
pub mod error;
pub mod payload;
pub mod transport;
pub mod types;

pub use composer::MessageComposer;
pub use controller::DeliveryController;
pub use error::NotifyError;
pub use payload::MultipartPayload;
pub use transport::{HttpTransport, PayloadSender};
pub use types::{
    ComposedMessage, DeliveryResult, FailureKind, JobMetadata, LogSource, NotificationConfig,
    Status,
};
