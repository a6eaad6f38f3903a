mod dispatch;
mod state;

pub use dispatch::{
    Dispatch, DispatchRecord, DispatchStatus, RetryConfig, Transition, is_retryable,
};
pub use state::{AttemptTrace, DeliveryState};
