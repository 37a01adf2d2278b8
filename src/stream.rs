//! Background analysis with an async event stream.
//!
//! [`AnalysisStream`] runs an [`AnalysisSession`] on a Tokio blocking thread
//! and streams its progress back through a bounded channel. Decoding and
//! differencing are CPU-heavy, so they stay off the async worker threads.
//!
//! The stream yields zero or more [`AnalysisEvent::Progress`] items, then
//! exactly one terminal item: [`AnalysisEvent::Completed`] on success, or an
//! `Err` on failure. Dropping the stream cancels the run.
//!
//! # Example
//!
//! ```no_run
//! use tokio_stream::StreamExt;
//!
//! use freezeframe::{AnalysisEvent, AnalysisOptions, AnalysisStream, FreezeFrameError, MediaFile};
//!
//! # async fn example() -> Result<(), FreezeFrameError> {
//! let source = MediaFile::open("input.mp4")?;
//! let mut stream = AnalysisStream::spawn(source, AnalysisOptions::new().with_target_fps(30.0));
//!
//! while let Some(event) = stream.next().await {
//!     match event? {
//!         AnalysisEvent::Progress(info) => println!("{:.0}%", info.percentage),
//!         AnalysisEvent::Completed(result) => println!("{} duplicates", result.duplicate_count),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;

use crate::configuration::AnalysisOptions;
use crate::error::FreezeFrameError;
use crate::progress::{CancellationToken, ProgressCallback, ProgressInfo};
use crate::report::AnalysisResult;
use crate::session::AnalysisSession;
use crate::source::FrameSource;

/// Default bounded-channel capacity for [`AnalysisStream`].
const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// One item produced by an [`AnalysisStream`].
#[derive(Debug, Clone)]
pub enum AnalysisEvent {
    /// A progress snapshot.
    Progress(ProgressInfo),
    /// The run finished. Always the last item.
    Completed(AnalysisResult),
}

type EventSender = Sender<Result<AnalysisEvent, FreezeFrameError>>;

/// Forwards progress snapshots into the event channel.
struct ChannelProgress {
    sender: EventSender,
}

impl ProgressCallback for ChannelProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        // The receiver may already be gone; cancellation handles that.
        let _ = self
            .sender
            .blocking_send(Ok(AnalysisEvent::Progress(info.clone())));
    }
}

/// A running analysis whose events can be awaited.
///
/// Implements [`futures_core::Stream`], so it works with
/// [`tokio_stream::StreamExt`] combinators.
pub struct AnalysisStream {
    receiver: Receiver<Result<AnalysisEvent, FreezeFrameError>>,
    cancellation: CancellationToken,
    #[allow(dead_code)]
    handle: JoinHandle<()>,
}

impl AnalysisStream {
    /// Start analyzing `source` on a blocking thread.
    ///
    /// Any progress callback in `options` is replaced by the stream's own
    /// forwarder. A cancellation token in `options` is kept and shared with
    /// [`cancel`](AnalysisStream::cancel).
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn<S>(source: S, options: AnalysisOptions) -> Self
    where
        S: FrameSource + Send + 'static,
    {
        Self::spawn_with_capacity(source, options, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Like [`spawn`](AnalysisStream::spawn) with a custom channel capacity.
    ///
    /// A full channel blocks the worker until the consumer catches up.
    pub fn spawn_with_capacity<S>(source: S, options: AnalysisOptions, capacity: usize) -> Self
    where
        S: FrameSource + Send + 'static,
    {
        let (sender, receiver) = tokio::sync::mpsc::channel(capacity.max(1));
        let cancellation = options.cancellation.clone().unwrap_or_default();

        let options = options
            .with_cancellation(cancellation.clone())
            .with_progress(Arc::new(ChannelProgress {
                sender: sender.clone(),
            }));

        let handle = tokio::task::spawn_blocking(move || {
            let mut session = AnalysisSession::new(source, options);
            let terminal = session.run().map(AnalysisEvent::Completed);
            // The receiver may have been dropped.
            let _ = sender.blocking_send(terminal);
        });

        Self {
            receiver,
            cancellation,
            handle,
        }
    }

    /// Abandon the run. The stream then ends with
    /// [`FreezeFrameError::Cancelled`].
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// A clone of the token controlling this run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }
}

impl Stream for AnalysisStream {
    type Item = Result<AnalysisEvent, FreezeFrameError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for AnalysisStream {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
