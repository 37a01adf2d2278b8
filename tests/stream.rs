//! Async analysis stream tests.

#![cfg(feature = "async")]

mod common;

use common::{SyntheticSource, always_changing, frozen_middle, static_frame};
use freezeframe::{AnalysisEvent, AnalysisOptions, AnalysisStream, CancellationToken, FreezeFrameError};
use tokio_stream::StreamExt;

async fn collect(mut stream: AnalysisStream) -> Vec<Result<AnalysisEvent, FreezeFrameError>> {
    let mut events = Vec::new();
    while let Some(event) = stream.next().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn progress_events_precede_the_result() {
    let stream = AnalysisStream::spawn(
        SyntheticSource::new(2.0, 10.0, frozen_middle),
        AnalysisOptions::new().with_target_fps(10.0),
    );

    let mut events = collect(stream).await;

    let last = events.pop().unwrap().unwrap();
    let AnalysisEvent::Completed(result) = last else {
        panic!("expected a terminal result, got {last:?}");
    };
    assert_eq!(result.duplicate_indices, vec![5, 6, 7, 8]);

    assert_eq!(events.len() as u64, result.total_frames);
    let percentages: Vec<f64> = events
        .into_iter()
        .map(|event| match event {
            Ok(AnalysisEvent::Progress(info)) => info.percentage,
            other => panic!("unexpected event: {other:?}"),
        })
        .collect();
    assert!(percentages.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(percentages.iter().all(|&percentage| percentage <= 99.0));
}

#[tokio::test]
async fn failure_is_the_terminal_item() {
    let stream = AnalysisStream::spawn(
        SyntheticSource::new(5.0, 10.0, always_changing).failing_on(37),
        AnalysisOptions::new().with_target_fps(10.0),
    );

    let mut events = collect(stream).await;

    assert!(matches!(
        events.pop(),
        Some(Err(FreezeFrameError::DecodeError { .. }))
    ));
    assert_eq!(events.len(), 36);
    assert!(events.iter().all(|event| matches!(event, Ok(AnalysisEvent::Progress(_)))));
}

#[tokio::test]
async fn invalid_options_fail_immediately() {
    let stream = AnalysisStream::spawn(
        SyntheticSource::new(2.0, 10.0, static_frame),
        AnalysisOptions::new().with_target_fps(0.0),
    );

    let events = collect(stream).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Err(FreezeFrameError::InvalidParameter(_))));
}

#[tokio::test]
async fn caller_token_is_respected() {
    let token = CancellationToken::new();
    token.cancel();

    let stream = AnalysisStream::spawn(
        SyntheticSource::new(2.0, 10.0, static_frame),
        AnalysisOptions::new()
            .with_target_fps(10.0)
            .with_cancellation(token.clone()),
    );
    assert!(stream.cancellation_token().is_cancelled());

    let events = collect(stream).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Err(FreezeFrameError::Cancelled)));
}

#[tokio::test]
async fn cancel_stops_a_running_analysis() {
    let mut stream = AnalysisStream::spawn_with_capacity(
        SyntheticSource::new(60.0, 10.0, static_frame),
        AnalysisOptions::new().with_target_fps(10.0),
        1,
    );

    let first = stream.next().await;
    assert!(matches!(first, Some(Ok(AnalysisEvent::Progress(_)))));
    stream.cancel();

    let mut rest = Vec::new();
    while let Some(event) = stream.next().await {
        rest.push(event);
    }

    assert!(matches!(rest.last(), Some(Err(FreezeFrameError::Cancelled))));
    assert!(rest.len() < 600);
}

#[tokio::test]
async fn dropping_the_stream_cancels_it() {
    let stream = AnalysisStream::spawn(
        SyntheticSource::new(60.0, 10.0, static_frame),
        AnalysisOptions::new().with_target_fps(10.0),
    );
    let token = stream.cancellation_token();

    drop(stream);

    assert!(token.is_cancelled());
}
