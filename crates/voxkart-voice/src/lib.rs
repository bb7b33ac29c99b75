//! VOXKART Voice - From loudness and phrases to command events
//!
//! This is NOT speech recognition. Recognition happens elsewhere and
//! delivers finished phrase strings; this crate turns them into
//! intensity-weighted commands.
//!
//! # Pipeline
//!
//! ```text
//! loudness (every frame) ──► VoiceEnvelopeTracker
//!                                   │ volume_ago(lookback)
//! phrase (any thread) ──► PhraseInbox ──► CommandDispatcher ──► CommandBus ──► subscribers
//! ```
//!
//! Key concepts:
//! - Intensity is read from the past: a phrase is recognized after it was
//!   spoken, so the dispatcher looks back roughly to when it started
//! - Fan-out is synchronous and in subscription order
//! - Foreign threads only ever touch the inbox

pub mod bus;
pub mod dispatcher;
pub mod envelope;
pub mod inbox;
pub mod vocabulary;

pub use bus::*;
pub use dispatcher::*;
pub use envelope::*;
pub use inbox::*;
pub use vocabulary::*;
