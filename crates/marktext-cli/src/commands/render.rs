//! Render command - draw labels onto a batch of photos.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, ValueEnum};
use marktext_adapters::{
    resolve_font, FsImageLibrary, FsImageSource, PreferenceStore, Preferences, RasterCanvasFactory,
    DEFAULT_BATCH_LIMIT,
};
use marktext_core::{
    plan_labels, ImageSink, ImageSource, LabelConfig, LabelRenderer, ProgressSink, RenderRecord,
    RenderTask, RenderedImage, SourceImage,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, ProgressBar};

/// Output format for the manifest.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// JSON Lines (one JSON object per line)
    #[default]
    Jsonl,
    /// Single JSON array
    Json,
}

/// Directory rendered photos land in when neither CLI nor config names one.
const DEFAULT_OUTPUT_DIR: &str = "marktext-out";

/// How often the spinner is refreshed while the worker renders.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Shared arguments for labeling a batch.
#[derive(Args, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderArgs {
    /// Photos or directories to label
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Maximum photos per batch (0 = unlimited)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Label prefix; with --multi-prefix, several prefixes separated by ';'
    #[arg(short, long, value_name = "TEXT", allow_hyphen_values = true)]
    pub prefix: Option<String>,

    /// Suffix for the selected photo
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    pub selected_suffix: Option<String>,

    /// Suffix for every other photo
    #[arg(long, value_name = "TEXT", allow_hyphen_values = true)]
    pub unselected_suffix: Option<String>,

    /// Number unselected photos 1, 2, 3, ...
    #[arg(long, overrides_with = "no_auto_index")]
    pub auto_index: bool,

    /// Do not number unselected photos
    #[arg(long, overrides_with = "auto_index")]
    pub no_auto_index: bool,

    /// Split the prefix on ';' and label the batch once per prefix
    #[arg(long, overrides_with = "no_multi_prefix")]
    pub multi_prefix: bool,

    /// Use the prefix text as a single prefix
    #[arg(long, overrides_with = "multi_prefix")]
    pub no_multi_prefix: bool,

    /// 0-based index of the selected photo, once per prefix
    #[arg(short, long, value_name = "INDEX", value_delimiter = ',')]
    pub selected: Vec<usize>,

    /// Directory to write labeled photos to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Bold font file used for labels
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Preference file (overrides default and config)
    #[arg(long, value_name = "FILE")]
    pub prefs: Option<PathBuf>,

    /// Do not remember the label settings of this run
    #[arg(long)]
    pub no_save_prefs: bool,

    /// Print the planned labels without rendering
    #[arg(long)]
    pub dry_run: bool,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Manifest format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,
}

impl RenderArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }
        args.limit = args.limit.or(config.general.limit);

        if args.font.is_none() {
            args.font.clone_from(&config.render.font);
        }
        if args.output_dir.is_none() {
            args.output_dir.clone_from(&config.output.dir);
        }
        if args.prefs.is_none() {
            args.prefs.clone_from(&config.preferences.path);
        }
        // CLI --no-save-prefs always wins
        if !args.no_save_prefs {
            args.no_save_prefs = !config.preferences.save.unwrap_or(true);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_ref()
                .and_then(|s| match s.as_str() {
                    "json" => Some(OutputFormat::Json),
                    "jsonl" => Some(OutputFormat::Jsonl),
                    _ => None,
                });
        }
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or(OutputFormat::Jsonl)
    }

    /// Get batch limit with fallback to the default.
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_BATCH_LIMIT)
    }

    fn output_dir(&self) -> &Path {
        self.output_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR))
    }

    fn preference_store(&self) -> PreferenceStore {
        self.prefs
            .as_ref()
            .map_or_else(PreferenceStore::open_default, PreferenceStore::at)
    }

    /// Label settings for this run: CLI flags over remembered values.
    fn label_settings(&self, stored: &Preferences) -> Preferences {
        let flag = |on: bool, off: bool| match (on, off) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        Preferences {
            prefix: Some(
                self.prefix
                    .clone()
                    .unwrap_or_else(|| stored.prefix().to_string()),
            ),
            selected_suffix: Some(
                self.selected_suffix
                    .clone()
                    .unwrap_or_else(|| stored.selected_suffix().to_string()),
            ),
            unselected_suffix: Some(
                self.unselected_suffix
                    .clone()
                    .unwrap_or_else(|| stored.unselected_suffix().to_string()),
            ),
            auto_index_on: Some(
                flag(self.auto_index, self.no_auto_index).unwrap_or_else(|| stored.auto_index_on()),
            ),
            multi_prefix: Some(
                flag(self.multi_prefix, self.no_multi_prefix)
                    .unwrap_or_else(|| stored.multi_prefix()),
            ),
        }
    }
}

/// Builds the label configuration from resolved settings.
fn label_config(settings: &Preferences, selected: &[usize]) -> LabelConfig {
    LabelConfig::from_input(
        settings.prefix(),
        settings.multi_prefix(),
        settings.selected_suffix(),
        settings.unselected_suffix(),
        settings.auto_index_on(),
        selected.to_vec(),
    )
}

/// Result of running the render command.
#[allow(dead_code)] // Fields exposed for programmatic use
pub struct RenderResult {
    /// Number of labeled photos written.
    pub saved: usize,
    /// Number of planned outputs that were not written.
    pub skipped: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

impl RenderResult {
    fn new(saved: usize, skipped: usize) -> Self {
        let exit_code = if skipped > 0 {
            ExitCode::Partial
        } else {
            ExitCode::Success
        };
        Self {
            saved,
            skipped,
            exit_code,
        }
    }
}

/// One planned label, as printed by `--dry-run`.
#[derive(Serialize)]
struct PlannedLabel<'a> {
    source: String,
    label: &'a str,
    prefix: &'a str,
    selected: bool,
}

/// Run the render command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &RenderArgs) -> Result<RenderResult> {
    info!("Running render command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let store = args.preference_store();
    let settings = args.label_settings(&store.load());
    let config = label_config(&settings, &args.selected);
    debug!(
        "Labeling with {} prefix block(s), auto index {}",
        config.block_count(),
        config.auto_index
    );

    let source = FsImageSource::new(args.paths.clone(), args.recursive).with_limit(args.limit());
    let output = JsonOutput::stdout();

    if args.dry_run {
        return dry_run(&source, &config, &output, args);
    }

    if args.no_save_prefs {
        debug!("Not saving preferences");
    } else if let Err(e) = store.save(&settings) {
        warn!("Failed to save preferences: {e:#}");
    }

    let (images, loaded, unreadable) = load_images(&source);
    if images.is_empty() {
        warn!("No images to label");
        return Ok(RenderResult::new(0, unreadable));
    }
    // Selections name photos by file position; re-aim them at what loaded
    let config = config.with_selected(remap_selected(&args.selected, &loaded));
    let planned = images.len() * config.block_count();

    let font = resolve_font(args.font.as_deref())?;
    let factory = RasterCanvasFactory::from_file(&font)?;
    let library = FsImageLibrary::open(args.output_dir())?;

    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress = Arc::new(ProgressBar::new(planned as u64, args.quiet, show_progress));

    let renderer = LabelRenderer::new(Arc::new(factory));
    let task = RenderTask::spawn(
        renderer,
        images,
        config,
        Arc::clone(&progress) as Arc<dyn ProgressSink>,
    )?;

    let rendered = loop {
        if let Some(rendered) = task.wait_timeout(POLL_INTERVAL)? {
            break rendered;
        }
        progress.tick();
    };

    let records = save_images(&library, &rendered);
    write_records(&output, &records, args)?;

    let skipped = unreadable + (planned - records.len());
    info!(
        "Saved {} labeled photos to {}",
        records.len(),
        library.dir().display()
    );

    Ok(RenderResult::new(records.len(), skipped))
}

/// Decodes every photo, skipping the ones that fail.
///
/// Also returns the file position of each decoded photo.
fn load_images(source: &FsImageSource) -> (Vec<SourceImage>, Vec<usize>, usize) {
    let mut images = Vec::new();
    let mut loaded = Vec::new();
    let mut unreadable = 0usize;

    for (index, image_result) in source.images().enumerate() {
        match image_result {
            Ok(image) => {
                images.push(image);
                loaded.push(index);
            }
            Err(e) => {
                // Note: error message contains the path via anyhow context
                warn!("Skipping image {index}: {e:#}");
                unreadable += 1;
            }
        }
    }

    (images, loaded, unreadable)
}

/// Maps selected file positions onto positions among the decoded photos.
///
/// A selection whose photo failed to decode becomes out of range, so that
/// block has no selected photo.
fn remap_selected(selected: &[usize], loaded: &[usize]) -> Vec<usize> {
    selected
        .iter()
        .map(|file_index| {
            loaded
                .iter()
                .position(|i| i == file_index)
                .unwrap_or(loaded.len())
        })
        .collect()
}

/// Prints the label plan without decoding or writing anything.
fn dry_run(
    source: &FsImageSource,
    config: &LabelConfig,
    output: &JsonOutput,
    args: &RenderArgs,
) -> Result<RenderResult> {
    let files = source.collect_files();
    let plan = plan_labels(files.len(), config);

    let entries: Vec<PlannedLabel<'_>> = plan
        .iter()
        .map(|p| PlannedLabel {
            source: files[p.source_index].to_string_lossy().into_owned(),
            label: &p.text,
            prefix: &p.prefix,
            selected: p.selected,
        })
        .collect();

    match args.format() {
        OutputFormat::Jsonl => {
            for entry in &entries {
                output.write(entry)?;
            }
        }
        OutputFormat::Json => output.write_array(&entries, args.pretty)?,
    }
    output.flush()?;

    Ok(RenderResult::new(0, 0))
}

/// Writes rendered photos to the library, logging failures.
fn save_images(library: &FsImageLibrary, rendered: &[RenderedImage]) -> Vec<RenderRecord> {
    let mut records = Vec::with_capacity(rendered.len());

    for image in rendered {
        match library.save(image) {
            Ok(path) => records.push(RenderRecord {
                source: image.source_name.clone(),
                output: path.to_string_lossy().into_owned(),
                label: image.label.clone(),
                prefix: image.prefix.clone(),
                selected: image.selected,
                width: image.width(),
                height: image.height(),
                timestamp: iso_timestamp(),
            }),
            Err(e) => warn!("Failed to save {}: {e:#}", image.label),
        }
    }

    records
}

fn write_records(output: &JsonOutput, records: &[RenderRecord], args: &RenderArgs) -> Result<()> {
    match args.format() {
        OutputFormat::Jsonl => {
            for record in records {
                output.write(record)?;
            }
        }
        OutputFormat::Json => output.write_array(records, args.pretty)?,
    }
    output.flush()
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn parse(argv: &[&str]) -> RenderArgs {
        let mut full = vec!["marktext"];
        full.extend_from_slice(argv);
        Harness::parse_from(full).args
    }

    #[test]
    fn test_cli_values_override_stored() {
        let args = parse(&["a.jpg", "-p", "Class1-Ann", "--selected-suffix", "-S"]);
        let stored = Preferences {
            prefix: Some("old".to_string()),
            selected_suffix: Some("-old".to_string()),
            unselected_suffix: Some("-U".to_string()),
            auto_index_on: Some(true),
            multi_prefix: None,
        };

        let settings = args.label_settings(&stored);
        assert_eq!(settings.prefix(), "Class1-Ann");
        assert_eq!(settings.selected_suffix(), "-S");
        assert_eq!(settings.unselected_suffix(), "-U");
        assert!(settings.auto_index_on());
        assert!(!settings.multi_prefix());
    }

    #[test]
    fn test_no_flags_disable_stored_switches() {
        let args = parse(&["a.jpg", "--no-auto-index", "--no-multi-prefix"]);
        let stored = Preferences {
            auto_index_on: Some(true),
            multi_prefix: Some(true),
            ..Preferences::default()
        };

        let settings = args.label_settings(&stored);
        assert!(!settings.auto_index_on());
        assert!(!settings.multi_prefix());
    }

    #[test]
    fn test_later_switch_wins() {
        let args = parse(&["a.jpg", "--auto-index", "--no-auto-index"]);
        assert!(!args.label_settings(&Preferences::default()).auto_index_on());

        let args = parse(&["a.jpg", "--no-auto-index", "--auto-index"]);
        assert!(args.label_settings(&Preferences::default()).auto_index_on());
    }

    #[test]
    fn test_defaults_when_nothing_stored() {
        let args = parse(&["a.jpg"]);
        let settings = args.label_settings(&Preferences::default());
        assert_eq!(settings.prefix(), marktext_core::DEFAULT_PREFIX);
        assert_eq!(settings.selected_suffix(), "");
        assert!(!settings.auto_index_on());
    }

    #[test]
    fn test_selected_accepts_list_and_repeats() {
        let args = parse(&["a.jpg", "-s", "2,0", "--selected", "1"]);
        assert_eq!(args.selected, vec![2, 0, 1]);
    }

    #[test]
    fn test_label_config_splits_multi_prefix() {
        let args = parse(&["a.jpg", "-p", "X;Y", "--multi-prefix"]);
        let settings = args.label_settings(&Preferences::default());
        let config = label_config(&settings, &args.selected);
        assert_eq!(config.prefixes(), ["X".to_string(), "Y".to_string()]);
    }

    #[test]
    fn test_with_config_fills_unset_values() {
        let config: AppConfig = toml::from_str(
            r"
[general]
limit = 3
recursive = true

[output]
dir = 'out'
format = 'json'

[preferences]
save = false
",
        )
        .unwrap_or_default();

        let args = RenderArgs::with_config(parse(&["a.jpg"]), &config);
        assert_eq!(args.limit(), 3);
        assert!(args.recursive);
        assert_eq!(args.output_dir(), Path::new("out"));
        assert!(matches!(args.format(), OutputFormat::Json));
        assert!(args.no_save_prefs);
    }

    #[test]
    fn test_cli_beats_config() {
        let config: AppConfig = toml::from_str(
            r"
[general]
limit = 3

[output]
dir = 'out'
",
        )
        .unwrap_or_default();

        let args = RenderArgs::with_config(
            parse(&["a.jpg", "--limit", "0", "-o", "mine"]),
            &config,
        );
        assert_eq!(args.limit(), 0);
        assert_eq!(args.output_dir(), Path::new("mine"));
    }

    #[test]
    fn test_accessor_defaults() {
        let args = parse(&["a.jpg"]);
        assert_eq!(args.limit(), DEFAULT_BATCH_LIMIT);
        assert_eq!(args.output_dir(), Path::new(DEFAULT_OUTPUT_DIR));
        assert!(matches!(args.format(), OutputFormat::Jsonl));
    }

    #[test]
    fn test_remap_selected_skips_unreadable_files() {
        // File 1 failed to decode
        let loaded = [0, 2, 3];
        assert_eq!(remap_selected(&[2], &loaded), vec![1]);
        assert_eq!(remap_selected(&[0, 3], &loaded), vec![0, 2]);
        assert_eq!(remap_selected(&[1], &loaded), vec![3]);
        assert_eq!(remap_selected(&[9], &loaded), vec![3]);
        assert!(remap_selected(&[], &loaded).is_empty());
    }

    #[test]
    fn test_remapped_selection_labels_the_chosen_photo() {
        let loaded = [0, 2, 3];
        let config = LabelConfig::single("X")
            .with_suffixes("-S", "-U")
            .with_auto_index(true)
            .with_selected(remap_selected(&[1], &loaded));
        let labels: Vec<String> = plan_labels(loaded.len(), &config)
            .into_iter()
            .map(|p| p.text)
            .collect();
        assert_eq!(labels, ["X-U1", "X-U2", "X-U3"]);
    }

    #[test]
    fn test_render_result_exit_code() {
        assert_eq!(RenderResult::new(3, 0).exit_code, ExitCode::Success);
        assert_eq!(RenderResult::new(2, 1).exit_code, ExitCode::Partial);
    }
}
