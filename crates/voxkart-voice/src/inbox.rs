//! Phrase inbox - hand-off from the recognizer thread
//!
//! The recognizer may call back from any thread at any time. It only gets a
//! [`PhraseSender`]; the simulation drains the inbox on its own frame tick
//! before anything touches vehicle state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use thiserror::Error;
use tracing::warn;

/// Default number of phrases that can wait for the next frame
pub const DEFAULT_INBOX_CAPACITY: usize = 32;

/// Inbox errors, reported to the recognizer side only
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InboxError {
    #[error("Phrase inbox full, dropped {0:?}")]
    Full(String),

    #[error("Phrase inbox closed")]
    Closed,
}

/// Sending half, handed to the recognizer. Cheap to clone.
#[derive(Clone, Debug)]
pub struct PhraseSender {
    tx: Sender<String>,
    dropped: Arc<AtomicU64>,
}

impl PhraseSender {
    /// Queue a recognized phrase. Never blocks.
    pub fn send(&self, phrase: impl Into<String>) -> Result<(), InboxError> {
        match self.tx.try_send(phrase.into()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(phrase)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(phrase = %phrase, "phrase inbox full, dropping phrase");
                Err(InboxError::Full(phrase))
            }
            Err(TrySendError::Disconnected(_)) => Err(InboxError::Closed),
        }
    }
}

/// Receiving half, owned by the simulation
#[derive(Debug)]
pub struct PhraseInbox {
    tx: Sender<String>,
    rx: Receiver<String>,
    dropped: Arc<AtomicU64>,
}

impl PhraseInbox {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        PhraseInbox {
            tx,
            rx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a sender for a recognizer callback
    pub fn sender(&self) -> PhraseSender {
        PhraseSender {
            tx: self.tx.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// Take every phrase queued so far, in arrival order
    pub fn drain(&self) -> Vec<String> {
        self.rx.try_iter().collect()
    }

    /// Phrases waiting for the next drain
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Phrases dropped because the inbox was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for PhraseInbox {
    fn default() -> Self {
        Self::new(DEFAULT_INBOX_CAPACITY)
    }
}
