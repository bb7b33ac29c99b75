//! Command dispatcher - recognized phrase to command event
//!
//! Recognition completes after the phrase was spoken. Longer phrases take
//! longer to say, so the loudness is read further back, approximating the
//! moment the speaker started the command.

use tracing::{debug, warn};
use voxkart_core::{CommandEvent, CommandKind};

use crate::{CommandBus, CommandVocabulary, VoiceEnvelopeTracker};

/// Lookback applied to every phrase
pub const LOOKBACK_BASE_SECS: f32 = 0.5;

/// Additional lookback per character of the phrase
pub const LOOKBACK_PER_CHAR_SECS: f32 = 0.05;

/// Seconds to look back for the loudness of `phrase`
pub fn lookback_for(phrase: &str) -> f32 {
    LOOKBACK_BASE_SECS + phrase.chars().count() as f32 * LOOKBACK_PER_CHAR_SECS
}

/// Dispatch counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Phrases turned into published events
    pub dispatched: u64,
    /// Phrases outside the vocabulary
    pub rejected: u64,
    /// Dispatched events by kind, in `CommandKind::ALL` order
    pub by_kind: [u64; 7],
}

impl DispatchStats {
    pub fn count(&self, kind: CommandKind) -> u64 {
        self.by_kind[kind_slot(kind)]
    }
}

fn kind_slot(kind: CommandKind) -> usize {
    kind.to_byte() as usize - 1
}

/// Command dispatcher
pub struct CommandDispatcher {
    vocabulary: CommandVocabulary,
    bus: CommandBus,
    stats: DispatchStats,
}

impl CommandDispatcher {
    pub fn new(vocabulary: CommandVocabulary, bus: CommandBus) -> Self {
        CommandDispatcher {
            vocabulary,
            bus,
            stats: DispatchStats::default(),
        }
    }

    /// Turn a recognized phrase into a command event and publish it.
    ///
    /// A phrase outside the vocabulary means the recognizer was configured
    /// with phrases this dispatcher does not know. It is logged and dropped.
    pub fn dispatch(
        &mut self,
        phrase: &str,
        tracker: &VoiceEnvelopeTracker,
    ) -> Option<CommandEvent> {
        let Some(kind) = self.vocabulary.lookup(phrase) else {
            self.stats.rejected += 1;
            warn!(phrase, "recognized phrase is not in the command vocabulary");
            return None;
        };

        let lookback = lookback_for(phrase);
        let event = CommandEvent::new(kind, tracker.volume_ago(lookback));

        debug!(
            phrase,
            command = %kind,
            lookback,
            intensity = event.intensity(),
            "dispatching voice command"
        );

        self.stats.dispatched += 1;
        self.stats.by_kind[kind_slot(kind)] += 1;
        self.bus.publish(event);
        Some(event)
    }

    pub fn vocabulary(&self) -> &CommandVocabulary {
        &self.vocabulary
    }

    pub fn bus(&self) -> &CommandBus {
        &self.bus
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}
