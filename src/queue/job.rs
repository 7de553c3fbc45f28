use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A render job handed from admission to a worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderJob {
    /// Short code of the link whose row receives the result
    pub short_code: String,
    /// Page to render; also the deduplication key
    pub original_url: String,
}

impl RenderJob {
    pub fn new(short_code: impl Into<String>, original_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: original_url.into(),
        }
    }
}

/// What happened to a submitted URL.
///
/// Purely informational: submission is fire-and-forget and callers that
/// need the outcome wait on the queue and re-read the link store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Buffered for a worker
    Queued,
    /// Another job for the same URL is already admitted
    AlreadyInFlight,
    /// Buffer full; the job was discarded and the URL released
    Dropped,
    /// The queue no longer dispatches work
    ShutDown,
}

/// Result of waiting for a URL's render to finish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Nothing in flight for the URL (never submitted, or already finished)
    NotInFlight,
    /// The in-flight job finished, successfully or not
    Completed,
    /// Gave up waiting; the render keeps running
    TimedOut,
}

/// Point-in-time view of the render queue for monitoring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QueueStatus {
    pub worker_count: usize,
    /// Jobs buffered and not yet picked up by a worker
    pub queue_length: usize,
    /// URLs admitted and not yet completed
    pub in_progress_count: usize,
    pub in_progress_urls: Vec<String>,
    /// Callers currently blocked waiting on a render
    pub waiting_callers: usize,
}
