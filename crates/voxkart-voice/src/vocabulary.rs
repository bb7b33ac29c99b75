//! Command vocabulary - phrase to command kind mapping
//!
//! The exact phrase strings belong to whoever configures the recognizer;
//! the vocabulary only has to agree with it. Read-only after construction.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use voxkart_core::{CommandKind, VoxError, VoxResult};

/// One phrase bound to a command kind
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseBinding {
    pub phrase: String,
    pub kind: CommandKind,
}

/// Static phrase -> command kind mapping
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PhraseBinding>", into = "Vec<PhraseBinding>")]
pub struct CommandVocabulary {
    phrases: BTreeMap<String, CommandKind>,
}

impl CommandVocabulary {
    /// Build a vocabulary from (phrase, kind) pairs.
    /// Fails on empty or duplicate phrases.
    pub fn from_pairs<'a, I>(pairs: I) -> VoxResult<Self>
    where
        I: IntoIterator<Item = (&'a str, CommandKind)>,
    {
        let mut phrases = BTreeMap::new();
        for (phrase, kind) in pairs {
            if phrase.trim().is_empty() {
                return Err(VoxError::EmptyPhrase);
            }
            if phrases.insert(phrase.to_string(), kind).is_some() {
                return Err(VoxError::DuplicatePhrase(phrase.to_string()));
            }
        }
        Ok(CommandVocabulary { phrases })
    }

    /// English vocabulary, one phrase per command
    pub fn english() -> Self {
        Self::single_phrases([
            ("accelerate", CommandKind::Accelerate),
            ("brake", CommandKind::Brake),
            ("left", CommandKind::Left),
            ("right", CommandKind::Right),
            ("straight", CommandKind::Straight),
            ("stop", CommandKind::Stop),
            ("pause", CommandKind::Pause),
        ])
    }

    /// Spanish vocabulary
    pub fn spanish() -> Self {
        Self::single_phrases([
            ("acelera", CommandKind::Accelerate),
            ("frena", CommandKind::Brake),
            ("izquierda", CommandKind::Left),
            ("derecha", CommandKind::Right),
            ("recto", CommandKind::Straight),
            ("para", CommandKind::Stop),
            ("pausa", CommandKind::Pause),
        ])
    }

    fn single_phrases(pairs: [(&str, CommandKind); 7]) -> Self {
        CommandVocabulary {
            phrases: pairs
                .into_iter()
                .map(|(phrase, kind)| (phrase.to_string(), kind))
                .collect(),
        }
    }

    /// Look up the command kind for an exact phrase
    pub fn lookup(&self, phrase: &str) -> Option<CommandKind> {
        self.phrases.get(phrase).copied()
    }

    /// First phrase (in sorted order) bound to a kind
    pub fn phrase_for(&self, kind: CommandKind) -> Option<&str> {
        self.phrases
            .iter()
            .find(|(_, k)| **k == kind)
            .map(|(p, _)| p.as_str())
    }

    /// All phrases, for configuring the recognizer
    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.phrases.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl Default for CommandVocabulary {
    fn default() -> Self {
        Self::english()
    }
}

impl TryFrom<Vec<PhraseBinding>> for CommandVocabulary {
    type Error = VoxError;

    fn try_from(bindings: Vec<PhraseBinding>) -> Result<Self, Self::Error> {
        Self::from_pairs(bindings.iter().map(|b| (b.phrase.as_str(), b.kind)))
    }
}

impl From<CommandVocabulary> for Vec<PhraseBinding> {
    fn from(vocabulary: CommandVocabulary) -> Self {
        vocabulary
            .phrases
            .into_iter()
            .map(|(phrase, kind)| PhraseBinding { phrase, kind })
            .collect()
    }
}
