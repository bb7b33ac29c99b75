//! Race phase machine
//!
//! ```text
//! PreStart ──start──► Countdown ──(countdown elapsed)──► Running ◄──toggle──► Paused
//!                                                           │                   │
//!                                                           └──────finish───────┴──► Finished
//! ```
//!
//! The race timer only runs while `Running`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of countdown beats: "3", "2", "1", "GO!"
pub const COUNTDOWN_BEATS: usize = 4;

const COUNTDOWN_LABELS: [&str; COUNTDOWN_BEATS] = ["3", "2", "1", "GO!"];

/// Race phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RacePhase {
    PreStart,
    Countdown,
    Running,
    Paused,
    Finished,
}

impl RacePhase {
    /// Physics and envelope sampling run in every phase but `Paused`
    pub fn simulates(self) -> bool {
        self != RacePhase::Paused
    }

    /// Phases in which the vehicle controller accepts commands
    pub fn controls_enabled(self) -> bool {
        matches!(self, RacePhase::Running | RacePhase::Paused)
    }

    pub fn name(self) -> &'static str {
        match self {
            RacePhase::PreStart => "pre_start",
            RacePhase::Countdown => "countdown",
            RacePhase::Running => "running",
            RacePhase::Paused => "paused",
            RacePhase::Finished => "finished",
        }
    }
}

impl fmt::Display for RacePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Phase, countdown and race timer
#[derive(Clone, Debug)]
pub struct RaceState {
    phase: RacePhase,
    countdown_secs: f32,
    countdown_elapsed: f32,
    race_time: f64,
    transitions: u64,
}

impl RaceState {
    /// Negative or non-finite countdowns count as zero
    pub fn new(countdown_secs: f32) -> Self {
        RaceState {
            phase: RacePhase::PreStart,
            countdown_secs: if countdown_secs.is_finite() {
                countdown_secs.max(0.0)
            } else {
                0.0
            },
            countdown_elapsed: 0.0,
            race_time: 0.0,
            transitions: 0,
        }
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    /// Seconds spent `Running`
    pub fn race_time(&self) -> f64 {
        self.race_time
    }

    /// Race time as `mm:ss`
    pub fn race_time_label(&self) -> String {
        format_race_time(self.race_time)
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn countdown_remaining(&self) -> f32 {
        match self.phase {
            RacePhase::PreStart => self.countdown_secs,
            RacePhase::Countdown => (self.countdown_secs - self.countdown_elapsed).max(0.0),
            _ => 0.0,
        }
    }

    /// Beat currently shown during the countdown
    pub fn countdown_label(&self) -> Option<&'static str> {
        if self.phase != RacePhase::Countdown || self.countdown_secs <= 0.0 {
            return None;
        }
        let beat = self.countdown_secs / COUNTDOWN_BEATS as f32;
        let index = ((self.countdown_elapsed / beat) as usize).min(COUNTDOWN_BEATS - 1);
        Some(COUNTDOWN_LABELS[index])
    }

    fn change(&mut self, next: RacePhase) -> bool {
        if self.phase == next {
            return false;
        }
        debug!(from = %self.phase, to = %next, "race phase changed");
        self.phase = next;
        self.transitions += 1;
        true
    }

    /// Begin the countdown. Only valid from `PreStart`.
    pub fn start(&mut self) -> bool {
        if self.phase != RacePhase::PreStart {
            return false;
        }
        self.countdown_elapsed = 0.0;
        self.change(RacePhase::Countdown)
    }

    /// Advance by one frame. Returns the new phase if it changed.
    pub fn advance(&mut self, dt: f32) -> Option<RacePhase> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        match self.phase {
            RacePhase::Countdown => {
                self.countdown_elapsed += dt;
                if self.countdown_elapsed >= self.countdown_secs {
                    let overshoot = self.countdown_elapsed - self.countdown_secs;
                    self.countdown_elapsed = self.countdown_secs;
                    self.race_time += f64::from(overshoot);
                    self.change(RacePhase::Running);
                    return Some(RacePhase::Running);
                }
                None
            }
            RacePhase::Running => {
                self.race_time += f64::from(dt);
                None
            }
            _ => None,
        }
    }

    pub fn pause(&mut self) -> bool {
        self.phase == RacePhase::Running && self.change(RacePhase::Paused)
    }

    pub fn resume(&mut self) -> bool {
        self.phase == RacePhase::Paused && self.change(RacePhase::Running)
    }

    /// Running pauses, Paused resumes, anything else is left alone
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            RacePhase::Running => self.pause(),
            RacePhase::Paused => self.resume(),
            _ => false,
        }
    }

    pub fn finish(&mut self) -> bool {
        self.phase != RacePhase::Finished && self.change(RacePhase::Finished)
    }
}

impl Default for RaceState {
    fn default() -> Self {
        Self::new(4.0)
    }
}

/// Format seconds as `mm:ss`, truncating to whole seconds
pub fn format_race_time(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_lifecycle() {
        let mut race = RaceState::new(4.0);
        assert_eq!(race.phase(), RacePhase::PreStart);
        assert_eq!(race.advance(1.0), None);

        assert!(race.start());
        assert!(!race.start());
        assert_eq!(race.countdown_label(), Some("3"));

        assert_eq!(race.advance(2.5), None);
        assert_eq!(race.countdown_label(), Some("1"));
        assert_eq!(race.countdown_remaining(), 1.5);

        assert_eq!(race.advance(2.0), Some(RacePhase::Running));
        assert_eq!(race.race_time(), 0.5);

        race.advance(1.0);
        assert!(race.finish());
        assert!(!race.finish());
        assert_eq!(race.phase(), RacePhase::Finished);
        assert_eq!(race.race_time(), 1.5);
        assert_eq!(race.transitions(), 3);
    }

    #[test]
    fn test_zero_countdown_goes_live_on_first_advance() {
        let mut race = RaceState::new(0.0);
        race.start();
        assert_eq!(race.countdown_label(), None);
        assert_eq!(race.advance(0.0), Some(RacePhase::Running));
    }

    #[test]
    fn test_pause_stops_timer() {
        let mut race = RaceState::new(0.0);
        race.start();
        race.advance(0.0);

        race.advance(1.0);
        assert!(race.toggle_pause());
        assert_eq!(race.phase(), RacePhase::Paused);
        race.advance(5.0);
        assert_eq!(race.race_time(), 1.0);

        assert!(race.toggle_pause());
        assert_eq!(race.phase(), RacePhase::Running);
        race.advance(1.0);
        assert_eq!(race.race_time(), 2.0);
    }

    #[test]
    fn test_toggle_ignored_outside_race() {
        let mut race = RaceState::new(3.0);
        assert!(!race.toggle_pause());
        race.start();
        assert!(!race.toggle_pause());
        assert_eq!(race.phase(), RacePhase::Countdown);
    }

    #[test]
    fn test_phase_flags() {
        assert!(!RacePhase::Paused.simulates());
        assert!(RacePhase::Countdown.simulates());
        assert!(RacePhase::Paused.controls_enabled());
        assert!(!RacePhase::Countdown.controls_enabled());
        assert!(!RacePhase::Finished.controls_enabled());
    }

    #[test]
    fn test_format_race_time() {
        assert_eq!(format_race_time(0.0), "00:00");
        assert_eq!(format_race_time(59.99), "00:59");
        assert_eq!(format_race_time(61.0), "01:01");
        assert_eq!(format_race_time(3600.0), "60:00");
        assert_eq!(format_race_time(-3.0), "00:00");
        assert_eq!(format_race_time(f64::NAN), "00:00");
    }
}
