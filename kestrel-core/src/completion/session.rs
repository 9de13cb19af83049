use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{completions, Candidate, CompletionSources};
use crate::keymap::BindingTrie;
use crate::mode::ModeState;

/// Candidates between two batch updates.
pub const BATCH_SIZE: usize = 100;

/// Receives the progress of a completion session, on the worker thread.
pub trait CompletionListener: Send + Sync {
    /// Called once, before the first update.
    fn first(&self, has_results: bool);

    /// Called after every batch, and once more with `done` when the
    /// candidates are exhausted. Never called with `done` for a cancelled
    /// session.
    fn update(&self, buffer: &CompletionBuffer, done: bool);
}

/// Candidates found so far. Only the worker appends.
#[derive(Debug, Clone, Default)]
pub struct CompletionBuffer(Arc<Mutex<Vec<Candidate>>>);

impl CompletionBuffer {
    fn push(&self, candidate: Candidate) {
        self.0.lock().push(candidate);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Candidate> {
        self.0.lock().clone()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Candidate> {
        self.0.lock().get(index).cloned()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// A running completion. Dropping it cancels the worker.
#[derive(Debug)]
pub struct CompletionSession {
    cancel: watch::Sender<bool>,
    buffer: CompletionBuffer,
}

impl CompletionSession {
    /// Spawn a worker producing the candidates of `state`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        state: ModeState,
        trie: Arc<BindingTrie>,
        sources: Arc<CompletionSources>,
        listener: Arc<dyn CompletionListener>,
    ) -> (Self, JoinHandle<()>) {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let buffer = CompletionBuffer::default();
        let output = buffer.clone();

        let handle = tokio::task::spawn_blocking(move || {
            let mut notified = false;
            let notify = |done: bool, notified: &mut bool| {
                if !*notified {
                    *notified = true;
                    listener.first(!output.is_empty());
                }
                listener.update(&output, done);
            };

            for (i, candidate) in completions(&state, &trie, &sources).enumerate() {
                if *cancel_rx.borrow() {
                    log::debug!("completion cancelled after {i} candidate(s)");
                    return;
                }
                output.push(candidate);
                if i % BATCH_SIZE == 0 {
                    notify(false, &mut notified);
                }
            }

            if *cancel_rx.borrow() {
                log::debug!("completion cancelled before the final update");
                return;
            }
            notify(true, &mut notified);
        });

        log::debug!("completion session started");
        (
            Self {
                cancel: cancel_tx,
                buffer,
            },
            handle,
        )
    }

    /// Ask the worker to stop. Does not wait for it.
    pub fn cancel(&self) {
        if !self.cancel.send_replace(true) {
            log::debug!("completion session cancelled");
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    #[must_use]
    pub fn buffer(&self) -> &CompletionBuffer {
        &self.buffer
    }
}

impl Drop for CompletionSession {
    fn drop(&mut self) {
        self.cancel();
    }
}
