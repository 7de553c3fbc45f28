use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use crate::models::RenderStatus;
use crate::queue::{RenderJob, RenderQueue};
use crate::render::{RenderError, Renderer};
use crate::repositories::LinkStore;

/// Worker loop: pull jobs until the queue is shut down and drained
pub(crate) async fn run(
    worker_id: usize,
    queue: RenderQueue,
    store: Arc<dyn LinkStore>,
    renderer: Arc<dyn Renderer>,
) {
    tracing::info!(worker_id, "Render worker started");

    while let Some(job) = queue.next_job().await {
        process(worker_id, &queue, store.as_ref(), renderer.as_ref(), job).await;
    }

    tracing::info!(worker_id, "Render worker stopped (queue closed)");
}

async fn process(
    worker_id: usize,
    queue: &RenderQueue,
    store: &dyn LinkStore,
    renderer: &dyn Renderer,
    job: RenderJob,
) {
    let started = Instant::now();
    tracing::info!(
        worker_id,
        short_code = %job.short_code,
        url = %job.original_url,
        "Starting render job"
    );

    if let Err(e) = store
        .set_status(&job.short_code, RenderStatus::Rendering)
        .await
    {
        tracing::warn!(worker_id, short_code = %job.short_code, error = %e, "Failed to mark link as rendering");
    }

    let render_started = Instant::now();
    let result = AssertUnwindSafe(renderer.render(&job.original_url))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(RenderError::Panicked(panic_message(panic.as_ref()))));
    let render_ms = render_started.elapsed().as_millis() as u64;

    let (html, status) = match result {
        Ok(html) => {
            tracing::info!(
                worker_id,
                url = %job.original_url,
                render_ms,
                bytes = html.len(),
                "Rendered page"
            );
            (html, RenderStatus::Completed)
        }
        Err(e) => {
            tracing::warn!(
                worker_id,
                url = %job.original_url,
                render_ms,
                error = %e,
                "Render failed"
            );
            (String::new(), RenderStatus::Failed)
        }
    };

    if let Err(e) = store
        .set_content_and_status(&job.short_code, &html, status)
        .await
    {
        tracing::error!(
            worker_id,
            short_code = %job.short_code,
            status = %status,
            error = %e,
            "Failed to store render result"
        );
    }

    let notified = queue.complete(&job.original_url).await;

    tracing::info!(
        worker_id,
        short_code = %job.short_code,
        status = %status,
        notified,
        render_ms,
        total_ms = started.elapsed().as_millis() as u64,
        "Completed render job"
    );
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
