//! AnalysisOptions builder tests.

use std::sync::Arc;

use freezeframe::{
    AnalysisOptions, CancellationToken, DEFAULT_DUPLICATE_THRESHOLD, DEFAULT_PIXEL_THRESHOLD,
    DEFAULT_TARGET_FPS, ProgressCallback, ProgressInfo,
};

struct Silent;

impl ProgressCallback for Silent {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

#[test]
fn defaults() {
    let options = AnalysisOptions::new();

    assert_eq!(options.target_fps(), DEFAULT_TARGET_FPS);
    assert_eq!(options.target_fps(), 30.0);
    assert_eq!(options.pixel_threshold(), DEFAULT_PIXEL_THRESHOLD);
    assert_eq!(options.pixel_threshold(), 30);
    assert_eq!(options.duplicate_threshold(), DEFAULT_DUPLICATE_THRESHOLD);
    assert_eq!(options.duplicate_threshold(), 0.9999);
}

#[test]
fn default_trait_matches_new() {
    let from_default = AnalysisOptions::default();
    let from_new = AnalysisOptions::new();

    assert_eq!(from_default.target_fps(), from_new.target_fps());
    assert_eq!(from_default.pixel_threshold(), from_new.pixel_threshold());
    assert_eq!(from_default.duplicate_threshold(), from_new.duplicate_threshold());
}

#[test]
fn builder_chain() {
    let options = AnalysisOptions::new()
        .with_target_fps(23.976)
        .with_pixel_threshold(12)
        .with_duplicate_threshold(0.995)
        .with_progress(Arc::new(Silent))
        .with_cancellation(CancellationToken::new())
        .with_batch_size(8);

    assert_eq!(options.target_fps(), 23.976);
    assert_eq!(options.pixel_threshold(), 12);
    assert_eq!(options.duplicate_threshold(), 0.995);
}

#[test]
fn invalid_values_are_accepted_until_run() {
    // Validation happens when a session starts, not in the builder.
    let options = AnalysisOptions::new()
        .with_target_fps(0.0)
        .with_duplicate_threshold(2.0);

    assert_eq!(options.target_fps(), 0.0);
    assert_eq!(options.duplicate_threshold(), 2.0);
}

#[test]
fn debug_output_hides_the_callback() {
    let options = AnalysisOptions::new()
        .with_progress(Arc::new(Silent))
        .with_cancellation(CancellationToken::new());

    let rendered = format!("{options:?}");

    assert!(rendered.contains("AnalysisOptions"));
    assert!(rendered.contains("target_fps: 30.0"));
    assert!(rendered.contains("has_cancellation: true"));
    assert!(!rendered.contains("Silent"));
}

#[test]
fn clones_share_the_cancellation_token() {
    let token = CancellationToken::new();
    let options = AnalysisOptions::new().with_cancellation(token.clone());
    let cloned = options.clone();

    token.cancel();

    assert!(format!("{cloned:?}").contains("has_cancellation: true"));
    assert!(token.is_cancelled());
}
