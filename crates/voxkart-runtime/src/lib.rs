//! VOXKART Runtime - Drive session orchestration and frame loop
//!
//! A [`DriveSession`] owns every core component and runs them in a fixed
//! order on each frame:
//! 1. Sample loudness into the envelope tracker
//! 2. Drain phrases queued by the recognizer
//! 3. Dispatch phrases into command events
//! 4. Apply pause toggles
//! 5. Advance the race phase and timer
//! 6. Run zero or more fixed ticks: controller, wheels in order, integrate
//!
//! While paused, steps 1, 5 and 6 are frozen. Phrases are still dispatched
//! so that a second `pause` resumes the race.

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod race;
pub mod session;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use race::*;
pub use session::*;
