//! Progress reporting port for UI integration.

/// Events emitted while rendering a batch.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Rendering started for an output image.
    Started {
        /// Label being drawn.
        label: String,
        /// Position in the output sequence (0-based).
        index: usize,
        /// Total outputs planned.
        total: usize,
    },
    /// An output image was rendered.
    Completed {
        /// Label that was drawn.
        label: String,
        /// Source image name.
        source: String,
    },
    /// An output image was dropped because drawing failed.
    Skipped {
        /// Label that could not be drawn.
        label: String,
        /// Reason for skipping.
        reason: String,
    },
    /// The whole batch has been processed.
    Finished {
        /// Images rendered successfully.
        rendered: usize,
        /// Images skipped.
        skipped: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}

/// Progress sink that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_event(&self, _event: ProgressEvent) {}
}
