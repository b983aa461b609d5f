//! Integration tests for batch rendering through the canvas port.

#![allow(clippy::unwrap_used, clippy::float_cmp)]

use std::sync::Arc;

use marktext_core::domain::{BACKGROUND_COLOR, TEXT_COLOR};
use marktext_core::{
    FontSpec, ImageSink, ImageSource, LabelConfig, LabelLayout, LabelRenderer, RenderTask,
};
use marktext_test_support::{
    DrawCall, FailingCanvasFactory, MockImageSink, MockImageSource, MockProgressSink,
    RecordingCanvasFactory, SyntheticImageBuilder,
};

fn labels(out: &[marktext_core::RenderedImage]) -> Vec<&str> {
    out.iter().map(|r| r.label.as_str()).collect()
}

#[test]
fn test_single_prefix_output_length_matches_input() {
    let images = SyntheticImageBuilder::batch(5, 100, 80);
    let renderer = LabelRenderer::new(Arc::new(RecordingCanvasFactory::new()));

    let out = renderer.render_batch(&images, &LabelConfig::single("X"));
    assert_eq!(out.len(), images.len());
}

#[test]
fn test_selected_and_auto_index_example() {
    let images = SyntheticImageBuilder::batch(3, 100, 80);
    let config = LabelConfig::single("X")
        .with_suffixes("-S", "-U")
        .with_auto_index(true)
        .with_selected(vec![1]);
    let factory = Arc::new(RecordingCanvasFactory::new());
    let renderer = LabelRenderer::new(factory.clone());

    let out = renderer.render_batch(&images, &config);

    assert_eq!(labels(&out), ["X-U1", "X-S", "X-U2"]);
    assert!(out[1].selected);
    assert_eq!(factory.drawn_texts(), ["X-U1", "X-S", "X-U2"]);
}

#[test]
fn test_multi_prefix_blocks_in_prefix_order() {
    let images = SyntheticImageBuilder::batch(3, 60, 60);
    let config = LabelConfig::from_input("X;Y", true, "-S", "-U", false, vec![0]);
    let renderer = LabelRenderer::new(Arc::new(RecordingCanvasFactory::new()));

    let out = renderer.render_batch(&images, &config);

    assert_eq!(out.len(), 2 * images.len());
    assert_eq!(labels(&out), ["X-S", "X-U", "X-U", "Y-S", "Y-U", "Y-U"]);
    let blocks: Vec<usize> = out.iter().map(|r| r.block_index).collect();
    assert_eq!(blocks, [0, 0, 0, 1, 1, 1]);
    let sources: Vec<usize> = out.iter().map(|r| r.source_index).collect();
    assert_eq!(sources, [0, 1, 2, 0, 1, 2]);
    assert_eq!(out[4].prefix, "Y");
}

#[test]
fn test_outputs_keep_source_dimensions() {
    let images = vec![
        SyntheticImageBuilder::uniform_gray(120, 40, 10),
        SyntheticImageBuilder::rgb_uniform(33, 77, 1, 2, 3),
        SyntheticImageBuilder::checkerboard(64, 64, 4),
    ];
    let renderer = LabelRenderer::new(Arc::new(RecordingCanvasFactory::new()));

    let out = renderer.render_batch(&images, &LabelConfig::from_input("A;B", true, "", "", true, vec![]));

    assert_eq!(out.len(), 6);
    for r in &out {
        let src = &images[r.source_index];
        assert_eq!((r.width(), r.height()), (src.width, src.height));
    }
}

#[test]
fn test_drawing_commands_follow_layout() {
    let images = vec![SyntheticImageBuilder::uniform_gray(400, 300, 128)];
    let factory = Arc::new(RecordingCanvasFactory::new());
    let renderer = LabelRenderer::new(factory.clone());

    let out = renderer.render_batch(&images, &LabelConfig::single("ABCD"));
    assert_eq!(out.len(), 1);

    let font = FontSpec::bold(20.0);
    let text = RecordingCanvasFactory::text_size("ABCD", &font);
    let expected = LabelLayout::compute(400, 300, text, 20.0);

    let calls = factory.calls();
    assert_eq!(
        calls[0],
        DrawCall::Create {
            width: 400,
            height: 300
        }
    );
    assert!(matches!(calls[1], DrawCall::DrawImage { .. }));
    assert_eq!(
        calls[2],
        DrawCall::MeasureText {
            text: "ABCD".into(),
            font
        }
    );
    assert_eq!(
        calls[3],
        DrawCall::FillRoundedRect {
            rect: expected.background,
            radius: 20.0,
            color: BACKGROUND_COLOR,
        }
    );
    assert_eq!(
        calls[4],
        DrawCall::DrawText {
            text: "ABCD".into(),
            at: expected.text_origin,
            font,
            color: TEXT_COLOR,
        }
    );
    assert_eq!(calls[5], DrawCall::Snapshot);

    // 4 chars * 10px = 40 wide, 20 tall
    assert_eq!(expected.background.x, (400.0 - 40.0 - 10.0) / 2.0);
    assert_eq!(expected.background.width, 80.0);
    assert_eq!(expected.background.height, 40.0);
}

#[test]
fn test_each_image_gets_its_own_canvas() {
    let images = SyntheticImageBuilder::batch(4, 20, 20);
    let factory = Arc::new(RecordingCanvasFactory::new());
    let renderer = LabelRenderer::new(factory.clone());

    let config = LabelConfig::from_input("A;B", true, "", "", false, vec![]);
    let _ = renderer.render_batch(&images, &config);

    assert_eq!(factory.canvas_count(), 8);
}

#[test]
fn test_measure_failure_drops_single_output() {
    let images = SyntheticImageBuilder::batch(3, 50, 50);
    let config = LabelConfig::single("X")
        .with_suffixes("-bad", "-ok")
        .with_auto_index(true)
        .with_selected(vec![1]);
    let renderer = LabelRenderer::new(Arc::new(FailingCanvasFactory::new().failing_text("bad")));
    let progress = MockProgressSink::new();

    let out = renderer.render_batch_with_progress(&images, &config, &progress);

    assert_eq!(labels(&out), ["X-ok1", "X-ok2"]);
    assert_eq!(progress.started_count(), 3);
    assert_eq!(progress.completed_count(), 2);
    assert_eq!(progress.skipped_count(), 1);
    assert_eq!(progress.finished_counts(), Some((2, 1)));
}

#[test]
fn test_canvas_creation_failure_drops_single_output() {
    let images = vec![
        SyntheticImageBuilder::uniform_gray(10, 10, 0),
        SyntheticImageBuilder::uniform_gray(13, 10, 0),
        SyntheticImageBuilder::uniform_gray(10, 10, 0),
    ];
    let renderer = LabelRenderer::new(Arc::new(FailingCanvasFactory::new().failing_width(13)));

    let out = renderer.render_batch(&images, &LabelConfig::single("X").with_auto_index(true));

    // The counter is assigned before drawing, so the failed image still used slot 2.
    assert_eq!(labels(&out), ["X1", "X3"]);
}

#[test]
fn test_empty_batch_reports_finished() {
    let renderer = LabelRenderer::new(Arc::new(RecordingCanvasFactory::new()));
    let progress = MockProgressSink::new();

    let out = renderer.render_batch_with_progress(&[], &LabelConfig::single("X"), &progress);

    assert!(out.is_empty());
    assert_eq!(progress.finished_counts(), Some((0, 0)));
}

#[test]
fn test_render_task_delivers_batch() {
    let images = SyntheticImageBuilder::batch(3, 40, 30);
    let config = LabelConfig::single("X").with_auto_index(true);
    let renderer = LabelRenderer::new(Arc::new(RecordingCanvasFactory::new()));
    let progress = Arc::new(MockProgressSink::new());

    let task = RenderTask::spawn(renderer, images, config, progress.clone()).unwrap();
    let out = task.wait().unwrap();

    assert_eq!(labels(&out), ["X1", "X2", "X3"]);
    assert_eq!(progress.completed_count(), 3);
}

#[test]
fn test_dropped_task_does_not_block() {
    let images = SyntheticImageBuilder::batch(2, 40, 30);
    let renderer = LabelRenderer::new(Arc::new(RecordingCanvasFactory::new()));

    let task = RenderTask::spawn(
        renderer,
        images,
        LabelConfig::single("X"),
        Arc::new(MockProgressSink::new()),
    )
    .unwrap();
    drop(task);
}

#[test]
fn test_source_to_sink_pipeline() {
    let source = MockImageSource::new(vec![
        SyntheticImageBuilder::named("a.jpg", 50, 40),
        SyntheticImageBuilder::transparent(30, 30),
        SyntheticImageBuilder::named("c.png", 20, 60),
    ]);
    let images: Vec<_> = source.images().map(Result::unwrap).collect();
    let config = LabelConfig::single("Ann")
        .with_suffixes("*", "#")
        .with_auto_index(true)
        .with_selected(vec![2]);
    let renderer = LabelRenderer::new(Arc::new(RecordingCanvasFactory::new()));
    let sink = MockImageSink::new().failing_label("Ann#2");

    let rendered = renderer.render_batch(&images, &config);
    let saved: Vec<_> = rendered.iter().filter_map(|r| sink.save(r).ok()).collect();

    assert_eq!(source.iteration_count(), 1);
    assert_eq!(saved.len(), 2);
    assert_eq!(sink.saved_labels(), ["Ann#1", "Ann*"]);
    assert_eq!(sink.saved()[1].source_name, "c.png");
    assert_eq!((sink.saved()[1].width(), sink.saved()[1].height()), (20, 60));
}
