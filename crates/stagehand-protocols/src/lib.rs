//! # Stagehand Protocols
//!
//! Shared data model and message contract for the Stagehand extension.
//!
//! ## Core Concepts
//!
//! - **Configuration**: the remotely published pipeline definition, cached by
//!   the background coordinator and handed to page contexts by value.
//! - **StageList**: a validated, non-empty sequence of pipeline stages.
//! - **Messages**: the request/response contract between page contexts and
//!   the background coordinator, plus the `request-completed` notification.
//! - **Time**: injectable clock and scheduler so retry loops and cache TTLs
//!   can be driven without real timers.

pub mod defaults;
pub mod error;
pub mod message;
pub mod port;
pub mod time;
pub mod types;

pub use error::ProtocolError;
pub use message::{BackgroundRequest, BackgroundResponse, MessageSender, PageMessage};
pub use port::BackgroundPort;
pub use time::{Clock, ManualClock, RetryPolicy, Scheduler, SystemClock, TokioScheduler};
pub use types::*;
