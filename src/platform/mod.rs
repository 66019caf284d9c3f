//! Platform abstraction layer
//!
//! Handles the outside-world seams the simulation is driven through:
//! - Time/ticks (wall clock, frame pacing, simulated time for tests)
//! - Input events

pub mod input;
pub mod time;

pub use input::{InputEvent, InputSource, InputState, ScriptedInput};
pub use time::{Clock, FrameLimiter, ManualClock, SystemClock};
