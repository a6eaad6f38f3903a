//! Job status notifications delivered to chat rooms.
//!
//! A completed job's [`Status`](notify::Status) and metadata are composed into a
//! short message plus an optional log attachment, packaged as a multipart
//! request and posted to a `/v1/messages` endpoint. [`driver::RetryDriver`]
//! repeats single attempts until delivery succeeds or the retry budget is spent.

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod notify;
pub mod state_machine;
pub mod ui;
