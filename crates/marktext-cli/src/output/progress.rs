//! Progress bar adapter using indicatif.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use marktext_core::{ProgressEvent, ProgressSink};

/// Progress bar adapter for CLI output.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a new progress bar.
    ///
    /// # Arguments
    ///
    /// * `total` - Number of labeled photos planned
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show progress bar; otherwise only report skips
    #[must_use]
    pub fn new(total: u64, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = if show_bar {
            let bar = IndicatifBar::new(total);

            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar.set_message("Rendering, please wait");

            Some(bar)
        } else {
            None
        };

        Self { bar, quiet }
    }

    /// Advances the spinner while the worker is busy.
    pub fn tick(&self) {
        if let Some(bar) = &self.bar {
            bar.tick();
        }
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started {
                label,
                index,
                total,
            } => {
                if let Some(bar) = &self.bar {
                    bar.set_length(total as u64);
                    bar.set_position(index as u64);
                    bar.set_message(label);
                }
            }
            ProgressEvent::Completed { label, source } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                } else {
                    tracing::debug!("{source}: {label}");
                }
            }
            ProgressEvent::Skipped { label, reason } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                eprintln!("WARN: Skipping {label}: {reason}");
            }
            ProgressEvent::Finished { rendered, skipped } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "Done: {rendered} rendered, {skipped} skipped"
                    ));
                }
            }
        }
    }
}
