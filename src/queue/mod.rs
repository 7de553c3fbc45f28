pub mod job;
pub mod render_queue;
mod worker;

pub use job::{Admission, QueueStatus, RenderJob, WaitOutcome};
pub use render_queue::RenderQueue;
