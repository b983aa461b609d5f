//! Background render task.
//!
//! Rendering is CPU-bound, so front ends run it on a worker thread and
//! collect the finished batch over a channel. There is no cancellation:
//! dropping the task discards the result once the worker finishes.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use tracing::debug;

use super::LabelRenderer;
use crate::domain::{LabelConfig, RenderedImage, SourceImage};
use crate::ports::ProgressSink;

/// A render running on a worker thread.
pub struct RenderTask {
    receiver: Receiver<Vec<RenderedImage>>,
    handle: Option<JoinHandle<()>>,
}

impl RenderTask {
    /// Starts rendering `images` with `config` on a new worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker thread cannot be spawned.
    pub fn spawn(
        renderer: LabelRenderer,
        images: Vec<SourceImage>,
        config: LabelConfig,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Self> {
        let (sender, receiver) = crossbeam_channel::bounded(1);

        let handle = thread::Builder::new()
            .name("marktext-render".to_string())
            .spawn(move || {
                let started = Instant::now();
                let rendered =
                    renderer.render_batch_with_progress(&images, &config, progress.as_ref());
                debug!(
                    "Rendered {} images in {:?}",
                    rendered.len(),
                    started.elapsed()
                );
                if sender.send(rendered).is_err() {
                    debug!("Render result discarded, task was dropped");
                }
            })
            .context("Failed to spawn render worker")?;

        Ok(Self {
            receiver,
            handle: Some(handle),
        })
    }

    /// Returns the result if the worker has finished, without blocking.
    ///
    /// The result is handed out once; later calls return `None`.
    #[must_use]
    pub fn try_result(&self) -> Option<Vec<RenderedImage>> {
        match self.receiver.try_recv() {
            Ok(rendered) => Some(rendered),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Waits up to `timeout` for the result.
    ///
    /// Returns `Ok(None)` if the worker is still running.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker exited without delivering a result.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<Option<Vec<RenderedImage>>> {
        match self.receiver.recv_timeout(timeout) {
            Ok(rendered) => Ok(Some(rendered)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(worker_gone()),
        }
    }

    /// Blocks until the worker finishes and returns its result.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker exited without delivering a result.
    pub fn wait(mut self) -> Result<Vec<RenderedImage>> {
        let result = self.receiver.recv().map_err(|_| worker_gone());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("Render worker panicked after delivering");
            }
        }
        result
    }
}

fn worker_gone() -> anyhow::Error {
    anyhow!("Render worker exited without a result")
}
