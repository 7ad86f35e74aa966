//! In-memory clients for unit tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::sink;
use tokio::sync::mpsc;

use crate::domain::{Client, FrameSink};
use crate::error::RelayError;

/// A sink that forwards every frame into an unbounded channel.
pub(crate) fn channel_sink() -> (FrameSink, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let sink = sink::unfold(tx, |tx, frame: String| async move {
        tx.send(frame)
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        Ok::<_, RelayError>(tx)
    });
    (Box::pin(sink), rx)
}

/// A client whose deliveries can be read back from the receiver.
pub(crate) fn channel_client() -> (Arc<Client>, mpsc::UnboundedReceiver<String>) {
    let (sink, rx) = channel_sink();
    (Arc::new(Client::new(sink)), rx)
}

/// A client whose every write fails.
pub(crate) fn failing_client() -> Arc<Client> {
    let sink = sink::unfold((), |(), _frame: String| async move {
        Err::<(), _>(RelayError::Transport("connection reset".to_string()))
    });
    Arc::new(Client::new(Box::pin(sink)))
}

/// Drains every frame currently buffered for a client.
pub(crate) fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}

/// Write log of a client whose sink emits each frame in two halves with a
/// suspension point between them.
#[derive(Debug, Default)]
pub(crate) struct SplitWriteLog {
    fragments: Mutex<Vec<String>>,
    writing: AtomicBool,
    overlapped: AtomicBool,
}

impl SplitWriteLog {
    /// Frames rebuilt from consecutive half pairs, in write order.
    pub(crate) fn frames(&self) -> Vec<String> {
        let fragments = self.fragments.lock().unwrap_or_else(PoisonError::into_inner);
        fragments.chunks(2).map(|pair| pair.concat()).collect()
    }

    /// Whether a write ever started while another was still in progress.
    pub(crate) fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::Acquire)
    }

    fn push(&self, fragment: &str) {
        self.fragments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(fragment.to_string());
    }
}

/// A client whose writes yield halfway through, recording any overlap.
pub(crate) fn split_write_client() -> (Arc<Client>, Arc<SplitWriteLog>) {
    let log = Arc::new(SplitWriteLog::default());
    let sink = sink::unfold(Arc::clone(&log), |log, frame: String| async move {
        if log.writing.swap(true, Ordering::AcqRel) {
            log.overlapped.store(true, Ordering::Release);
        }
        let (head, tail) = frame.split_at(frame.len() / 2);
        log.push(head);
        tokio::task::yield_now().await;
        log.push(tail);
        log.writing.store(false, Ordering::Release);
        Ok::<_, RelayError>(log)
    });
    (Arc::new(Client::new(Box::pin(sink))), log)
}
