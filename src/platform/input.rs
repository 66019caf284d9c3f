//! Discrete input events and per-tick input assembly

use std::collections::VecDeque;

use crate::sim::TickInput;

/// Events an input device can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Jump,
    MoveLeft,
    MoveRight,
    /// Level-triggered: stays in effect until released
    FastFallHeld(bool),
    TogglePause,
    Quit,
}

/// Something that can be polled once per tick
pub trait InputSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Folds polled events into a `TickInput`. Fast-fall is remembered between
/// ticks; everything else only lasts for the tick it arrived in.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    fast_fall: bool,
    autopilot: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tick gets `autopilot` set
    pub fn with_autopilot(autopilot: bool) -> Self {
        Self {
            autopilot,
            ..Self::default()
        }
    }

    pub fn apply(&mut self, events: &[InputEvent]) -> TickInput {
        let mut input = TickInput {
            autopilot: self.autopilot,
            ..Default::default()
        };
        for event in events {
            match *event {
                InputEvent::Jump => input.jump = true,
                InputEvent::MoveLeft => input.move_left = true,
                InputEvent::MoveRight => input.move_right = true,
                InputEvent::FastFallHeld(held) => self.fast_fall = held,
                InputEvent::TogglePause => input.toggle_pause = !input.toggle_pause,
                InputEvent::Quit => input.quit = true,
            }
        }
        input.fast_fall = self.fast_fall;
        input
    }
}

/// Replays a fixed list of per-tick event batches, then reports nothing
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(frames: Vec<Vec<InputEvent>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Queue `events` after `idle_ticks` empty ticks
    pub fn then_after(mut self, idle_ticks: usize, events: Vec<InputEvent>) -> Self {
        self.frames.extend(std::iter::repeat_n(Vec::new(), idle_ticks));
        self.frames.push_back(events);
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        self.frames.pop_front().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_fall_is_held() {
        let mut state = InputState::new();
        let input = state.apply(&[InputEvent::FastFallHeld(true), InputEvent::Jump]);
        assert!(input.fast_fall);
        assert!(input.jump);

        let input = state.apply(&[]);
        assert!(input.fast_fall);
        assert!(!input.jump);

        let input = state.apply(&[InputEvent::FastFallHeld(false)]);
        assert!(!input.fast_fall);
    }

    #[test]
    fn test_double_toggle_cancels() {
        let mut state = InputState::new();
        let input = state.apply(&[InputEvent::TogglePause, InputEvent::TogglePause]);
        assert!(!input.toggle_pause);
        let input = state.apply(&[InputEvent::TogglePause, InputEvent::Quit]);
        assert!(input.toggle_pause);
        assert!(input.quit);
    }

    #[test]
    fn test_autopilot_flag() {
        let mut state = InputState::with_autopilot(true);
        assert!(state.apply(&[]).autopilot);
    }

    #[test]
    fn test_scripted_input() {
        let mut script = ScriptedInput::new(vec![vec![InputEvent::Jump]])
            .then_after(2, vec![InputEvent::MoveLeft, InputEvent::MoveLeft]);
        assert_eq!(script.remaining(), 4);
        assert_eq!(script.poll(), vec![InputEvent::Jump]);
        assert!(script.poll().is_empty());
        assert!(script.poll().is_empty());
        assert_eq!(script.poll().len(), 2);
        assert!(script.poll().is_empty());
    }
}
