//! Per-session progress notifier.
//!
//! Each session owns a broadcast channel, at most one active job and the
//! last terminal event. Starting a job in a session that already runs one
//! supersedes it: the old job's cancel flag is raised and every later
//! event from its ticket is dropped.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use netmotif_graph::{GraphData, MetricsReport, Progress};
use serde::Serialize;
use tokio::sync::{RwLock, broadcast};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::event::GenerationEvent;
use crate::types::SessionId;

/// Default per-session channel capacity
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Handle held by the worker running one job.
#[derive(Debug, Clone)]
pub struct JobTicket {
    session_id: SessionId,
    epoch: u64,
    cancelled: Arc<AtomicBool>,
}

impl JobTicket {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// True once a newer job replaced this one in its session.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Subscription handle for receiving one session's events.
pub struct EventSubscription {
    session_id: SessionId,
    replay: Option<GenerationEvent>,
    receiver: broadcast::Receiver<GenerationEvent>,
}

impl EventSubscription {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Receive the next event.
    ///
    /// A terminal event published before subscribing is returned first.
    /// Events skipped because the subscriber lagged are logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ChannelClosed`] when the session was removed.
    pub async fn recv(&mut self) -> Result<GenerationEvent> {
        if let Some(event) = self.replay.take() {
            return Ok(event);
        }
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Ok(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(session_id = %self.session_id, skipped, "Subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return Err(Error::ChannelClosed),
            }
        }
    }
}

/// Lifecycle state reported by [`ProgressNotifier::job_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Snapshot of a session for the status route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobStatus {
    pub session_id: String,
    pub state: JobState,
    pub current: usize,
    pub total: usize,
    pub progress: f64,
    pub subscribers: usize,
    pub started_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct ActiveJob {
    epoch: u64,
    cancelled: Arc<AtomicBool>,
    started_at: DateTime<Utc>,
}

#[derive(Debug)]
struct SessionSlot {
    sender: broadcast::Sender<GenerationEvent>,
    active: Option<ActiveJob>,
    /// Last progress accepted for the current or most recent job
    progress: Progress,
    started_at: Option<DateTime<Utc>>,
    last_terminal: Option<GenerationEvent>,
    last_activity: Instant,
}

impl SessionSlot {
    fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            active: None,
            progress: Progress { current: 0, total: 0 },
            started_at: None,
            last_terminal: None,
            last_activity: Instant::now(),
        }
    }

    fn owns(&self, ticket: &JobTicket) -> bool {
        self.active
            .as_ref()
            .is_some_and(|job| job.epoch == ticket.epoch)
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn send(&self, event: GenerationEvent) {
        // No receivers is not an error: late subscribers get the terminal replay
        let _ = self.sender.send(event);
    }
}

/// Keyed store of session channels and job records.
#[derive(Debug)]
pub struct ProgressNotifier {
    sessions: RwLock<HashMap<SessionId, SessionSlot>>,
    capacity: usize,
    next_epoch: AtomicU64,
}

impl Default for ProgressNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl ProgressNotifier {
    /// Create a notifier whose session channels hold `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
            next_epoch: AtomicU64::new(1),
        }
    }

    /// Subscribe to a session, creating it if needed.
    pub async fn subscribe(&self, session_id: &SessionId) -> EventSubscription {
        let mut sessions = self.sessions.write().await;
        let slot = sessions
            .entry(session_id.clone())
            .or_insert_with(|| SessionSlot::new(self.capacity));
        slot.touch();

        debug!(session_id = %session_id, "Subscriber attached");
        EventSubscription {
            session_id: session_id.clone(),
            replay: slot.last_terminal.clone(),
            receiver: slot.sender.subscribe(),
        }
    }

    /// Start a job in a session, superseding any job already running there.
    pub async fn begin_job(&self, session_id: &SessionId, total: usize) -> JobTicket {
        let mut sessions = self.sessions.write().await;
        let slot = sessions
            .entry(session_id.clone())
            .or_insert_with(|| SessionSlot::new(self.capacity));

        if let Some(previous) = slot.active.take() {
            previous.cancelled.store(true, Ordering::Relaxed);
            info!(session_id = %session_id, epoch = previous.epoch, "Superseding running job");
        }

        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));
        let started_at = Utc::now();
        slot.active = Some(ActiveJob {
            epoch,
            cancelled: Arc::clone(&cancelled),
            started_at,
        });
        slot.progress = Progress { current: 0, total };
        slot.started_at = Some(started_at);
        slot.last_terminal = None;
        slot.touch();

        info!(session_id = %session_id, epoch, total, "Job started");
        JobTicket {
            session_id: session_id.clone(),
            epoch,
            cancelled,
        }
    }

    /// Publish progress for a job. Returns whether the event was accepted.
    ///
    /// Dropped when the ticket is stale or `current` would go backwards.
    pub async fn publish_progress(&self, ticket: &JobTicket, progress: Progress) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(slot) = sessions.get_mut(&ticket.session_id) else {
            return false;
        };
        if !slot.owns(ticket) || progress.current < slot.progress.current {
            debug!(
                session_id = %ticket.session_id,
                epoch = ticket.epoch,
                current = progress.current,
                "Dropping progress event"
            );
            return false;
        }

        slot.progress = progress;
        slot.touch();
        slot.send(GenerationEvent::progress(&ticket.session_id, progress));
        true
    }

    /// Finish a job successfully. Returns whether the terminal event was sent.
    pub async fn complete(
        &self,
        ticket: &JobTicket,
        graph: GraphData,
        metrics: MetricsReport,
    ) -> bool {
        self.finish(
            ticket,
            GenerationEvent::complete(&ticket.session_id, graph, metrics),
        )
        .await
    }

    /// Finish a job with an error. Returns whether the terminal event was sent.
    pub async fn fail(&self, ticket: &JobTicket, error: impl Into<String>) -> bool {
        self.finish(ticket, GenerationEvent::error(&ticket.session_id, error))
            .await
    }

    async fn finish(&self, ticket: &JobTicket, event: GenerationEvent) -> bool {
        let mut sessions = self.sessions.write().await;
        let Some(slot) = sessions.get_mut(&ticket.session_id) else {
            return false;
        };
        if !slot.owns(ticket) {
            debug!(
                session_id = %ticket.session_id,
                epoch = ticket.epoch,
                "Dropping terminal event of superseded job"
            );
            return false;
        }

        slot.active = None;
        slot.touch();
        info!(
            session_id = %ticket.session_id,
            epoch = ticket.epoch,
            event_type = event.event_type(),
            "Job finished"
        );
        slot.last_terminal = Some(event.clone());
        slot.send(event);
        true
    }

    /// Snapshot of a session, `None` if unknown.
    pub async fn job_status(&self, session_id: &SessionId) -> Option<JobStatus> {
        let sessions = self.sessions.read().await;
        let slot = sessions.get(session_id)?;

        let (state, error) = match (&slot.active, &slot.last_terminal) {
            (Some(_), _) => (JobState::Running, None),
            (None, Some(GenerationEvent::GenerationError { error, .. })) => {
                (JobState::Failed, Some(error.clone()))
            }
            (None, Some(_)) => (JobState::Completed, None),
            (None, None) => (JobState::Idle, None),
        };

        let progress = match state {
            JobState::Idle => 0.0,
            _ => slot.progress.percentage(),
        };

        Some(JobStatus {
            session_id: session_id.to_string(),
            state,
            current: slot.progress.current,
            total: slot.progress.total,
            progress,
            subscribers: slot.sender.receiver_count(),
            started_at: slot
                .active
                .as_ref()
                .map(|job| job.started_at)
                .or(slot.started_at),
            error,
        })
    }

    /// Remove idle sessions: no active job, no subscribers and no activity
    /// for at least `ttl`. Returns the number removed.
    pub async fn sweep_expired(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, slot| {
            slot.active.is_some()
                || slot.sender.receiver_count() > 0
                || slot.last_activity.elapsed() < ttl
        });
        let removed = before.saturating_sub(sessions.len());
        if removed > 0 {
            debug!(removed, remaining = sessions.len(), "Swept expired sessions");
        }
        removed
    }

    /// Number of sessions currently held.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
