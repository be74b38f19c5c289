//! Per-session progress notification for generation jobs.
//!
//! This crate provides the side channel between generation workers and
//! WebSocket clients. Key features:
//!
//! - **Event types**: progress, completion and error events with a stable wire format
//! - **Session store**: one broadcast channel per session id, created on demand
//! - **Job tickets**: last-writer-wins job ownership per session
//! - **Expiry sweep**: idle sessions are reclaimed after a TTL
//!
//! # Example
//!
//! ```
//! use netmotif_events::{GenerationEvent, ProgressNotifier, SessionId};
//! use netmotif_graph::Progress;
//!
//! # tokio_test_runtime();
//! # fn tokio_test_runtime() {
//! # let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # runtime.block_on(async {
//! let notifier = ProgressNotifier::default();
//! let session = SessionId::parse("demo").unwrap();
//!
//! let mut subscription = notifier.subscribe(&session).await;
//! let ticket = notifier.begin_job(&session, 10).await;
//! notifier.publish_progress(&ticket, Progress { current: 5, total: 10 }).await;
//!
//! let event = subscription.recv().await.unwrap();
//! assert_eq!(event.event_type(), "generation_progress");
//! # });
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod notifier;
pub mod types;

// Re-export main types
pub use error::{Error, Result};
pub use event::GenerationEvent;
pub use notifier::{
    DEFAULT_CHANNEL_CAPACITY, EventSubscription, JobState, JobStatus, JobTicket, ProgressNotifier,
};
pub use types::{SESSION_ID_PATTERN, SessionId};
