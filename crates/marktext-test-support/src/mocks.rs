//! Mock implementations of core port traits.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use marktext_core::domain::{RenderedImage, SourceImage};
use marktext_core::ports::{ImageSink, ImageSource, ProgressEvent, ProgressSink};

/// Mock implementation of `ImageSource` for testing.
///
/// Yields pre-built images and tracks iteration for assertions.
pub struct MockImageSource {
    images: Vec<SourceImage>,
    iteration_count: Arc<Mutex<usize>>,
}

impl MockImageSource {
    /// Creates a new mock source with the given images.
    #[must_use]
    pub fn new(images: Vec<SourceImage>) -> Self {
        Self {
            images,
            iteration_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an empty mock source.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Returns the number of times the source has been iterated.
    #[must_use]
    pub fn iteration_count(&self) -> usize {
        *self
            .iteration_count
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ImageSource for MockImageSource {
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<SourceImage>> + Send + '_> {
        if let Ok(mut c) = self.iteration_count.lock() {
            *c += 1;
        }
        Box::new(self.images.iter().cloned().map(Ok))
    }

    fn count_hint(&self) -> Option<usize> {
        Some(self.images.len())
    }
}

/// Mock implementation of `ImageSink` for testing.
///
/// Captures saved images and can be told to fail specific labels.
#[derive(Default)]
pub struct MockImageSink {
    saved: Arc<Mutex<Vec<RenderedImage>>>,
    fail_labels: Vec<String>,
}

impl MockImageSink {
    /// Creates a new sink that accepts everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `save` fail for images with exactly this label.
    #[must_use]
    pub fn failing_label(mut self, label: impl Into<String>) -> Self {
        self.fail_labels.push(label.into());
        self
    }

    /// Returns every image saved so far.
    #[must_use]
    pub fn saved(&self) -> Vec<RenderedImage> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the labels of every saved image, in order.
    #[must_use]
    pub fn saved_labels(&self) -> Vec<String> {
        self.saved().into_iter().map(|r| r.label).collect()
    }
}

impl ImageSink for MockImageSink {
    fn save(&self, image: &RenderedImage) -> anyhow::Result<PathBuf> {
        if self.fail_labels.contains(&image.label) {
            anyhow::bail!("mock sink refused {}", image.label);
        }
        let mut saved = self.saved.lock().unwrap_or_else(PoisonError::into_inner);
        saved.push(image.clone());
        Ok(PathBuf::from(format!("mock://{}/{}", saved.len(), image.label)))
    }
}

/// Mock implementation of `ProgressSink` for testing.
///
/// Captures events for later assertions.
pub struct MockProgressSink {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressSink {
    /// Creates a new mock progress sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of `Started` events.
    #[must_use]
    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Started { .. }))
            .count()
    }

    /// Returns the number of `Completed` events.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Completed { .. }))
            .count()
    }

    /// Returns the number of `Skipped` events.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Skipped { .. }))
            .count()
    }

    /// Returns the final counts from the `Finished` event, if any.
    #[must_use]
    pub fn finished_counts(&self) -> Option<(usize, usize)> {
        self.events().iter().find_map(|e| match e {
            ProgressEvent::Finished { rendered, skipped } => Some((*rendered, *skipped)),
            _ => None,
        })
    }
}

impl Default for MockProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for MockProgressSink {
    fn on_event(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
