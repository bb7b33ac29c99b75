//! Command definitions
//!
//! A command event is the only thing that crosses from the voice side to the
//! vehicle side: which command was spoken, and how loud the speaker was when
//! they started saying it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Command kind recognized from speech
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CommandKind {
    Accelerate = 0x01,
    Brake = 0x02,
    Left = 0x03,
    Right = 0x04,
    Straight = 0x05,
    Stop = 0x06,
    Pause = 0x07,
}

impl CommandKind {
    /// Every command kind, in vocabulary order
    pub const ALL: [CommandKind; 7] = [
        CommandKind::Accelerate,
        CommandKind::Brake,
        CommandKind::Left,
        CommandKind::Right,
        CommandKind::Straight,
        CommandKind::Stop,
        CommandKind::Pause,
    ];

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0x01 => Some(CommandKind::Accelerate),
            0x02 => Some(CommandKind::Brake),
            0x03 => Some(CommandKind::Left),
            0x04 => Some(CommandKind::Right),
            0x05 => Some(CommandKind::Straight),
            0x06 => Some(CommandKind::Stop),
            0x07 => Some(CommandKind::Pause),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Does this command drive the vehicle (vs. session control)?
    pub fn is_driving(self) -> bool {
        !matches!(self, CommandKind::Pause)
    }

    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Accelerate => "accelerate",
            CommandKind::Brake => "brake",
            CommandKind::Left => "left",
            CommandKind::Right => "right",
            CommandKind::Straight => "straight",
            CommandKind::Stop => "stop",
            CommandKind::Pause => "pause",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Command event - a recognized command weighted by voice intensity
///
/// Immutable and fire-and-forget. Intensity is always in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CommandEvent {
    kind: CommandKind,
    intensity: f32,
}

impl CommandEvent {
    /// Create a command event. Intensity is clamped to [0, 1];
    /// a non-finite intensity becomes 0.
    pub fn new(kind: CommandKind, intensity: f32) -> Self {
        let intensity = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        CommandEvent { kind, intensity }
    }

    #[inline]
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    #[inline]
    pub fn intensity(&self) -> f32 {
        self.intensity
    }
}
