//! Fixed-tick game loop
//!
//! Each tick: read the clock, poll input, advance the session, hand the
//! frame to the renderer, then carry out whatever effects the tick asked
//! for. The loop ends on the first `Finished` effect.

use std::path::Path;

use crate::audio::AudioDriver;
use crate::error::Result;
use crate::highscores::{DEFAULT_TOP_SCORES, LeaderboardEntry, LeaderboardQuery};
use crate::persistence::ScorePersistence;
use crate::platform::{Clock, InputSource, InputState};
use crate::sim::{FrameSnapshot, SessionEffect, SessionOutcome, SessionState, TickInput, tick};

/// Consumer of per-tick frames and the final outcome. Never touches the
/// session itself.
pub trait RenderSink {
    fn frame(&mut self, snapshot: &FrameSnapshot);
    fn outcome(&mut self, outcome: &SessionOutcome, top_scores: &[LeaderboardEntry]);
}

/// Headless renderer that logs a summary line every `interval` frames
#[derive(Debug, Clone)]
pub struct LogRenderer {
    interval: u64,
    frames: u64,
    last: Option<FrameSnapshot>,
}

impl LogRenderer {
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            frames: 0,
            last: None,
        }
    }

    /// Most recent frame received
    pub fn last_frame(&self) -> Option<&FrameSnapshot> {
        self.last.as_ref()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSink for LogRenderer {
    fn frame(&mut self, snapshot: &FrameSnapshot) {
        if self.frames % self.interval == 0 {
            log::debug!(
                "frame {}: {:?} score={} speed={:.1} player=({:.0}, {:.0}) platforms={}",
                self.frames,
                snapshot.phase,
                snapshot.score,
                snapshot.scroll_speed,
                snapshot.player.pos.x,
                snapshot.player.pos.y,
                snapshot.platforms.len()
            );
        }
        self.frames += 1;
        self.last = Some(snapshot.clone());
    }

    fn outcome(&mut self, outcome: &SessionOutcome, top_scores: &[LeaderboardEntry]) {
        log::info!("Outcome {:?}, score {}", outcome, outcome.score());
        for (rank, entry) in top_scores.iter().enumerate() {
            log::info!("  #{} {} {}", rank + 1, entry.player, entry.score);
        }
    }
}

/// Drives one session against injected collaborators
pub struct GameRunner<C, I, A, S, R> {
    clock: C,
    input: I,
    audio: A,
    scores: S,
    render: R,
    player: String,
    input_state: InputState,
    tick_limit: Option<u64>,
}

impl<C, I, A, S, R> GameRunner<C, I, A, S, R>
where
    C: Clock,
    I: InputSource,
    A: AudioDriver,
    S: ScorePersistence + LeaderboardQuery,
    R: RenderSink,
{
    pub fn new(player: &str, clock: C, input: I, audio: A, scores: S, render: R) -> Self {
        Self {
            clock,
            input,
            audio,
            scores,
            render,
            player: player.to_string(),
            input_state: InputState::new(),
            tick_limit: None,
        }
    }

    /// Steer the player automatically every tick
    pub fn with_autopilot(mut self, autopilot: bool) -> Self {
        self.input_state = InputState::with_autopilot(autopilot);
        self
    }

    /// Quit after `ticks` loop iterations if nothing else ended the session
    pub fn with_tick_limit(mut self, ticks: u64) -> Self {
        self.tick_limit = Some(ticks);
        self
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn scores(&self) -> &S {
        &self.scores
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    /// Run `state` until it produces an outcome
    pub fn run(&mut self, state: &mut SessionState) -> Result<SessionOutcome> {
        match state.config.level(&state.level) {
            Some(level) => self.audio.load_track(Path::new(&level.file))?,
            None => log::warn!("No track for level {:?}, playing silently", state.level),
        }

        let mut iterations = 0u64;
        loop {
            let now = self.clock.now();
            let events = self.input.poll();
            let mut input: TickInput = self.input_state.apply(&events);
            if self.tick_limit.is_some_and(|limit| iterations >= limit) {
                log::warn!("Tick limit reached, quitting");
                input.quit = true;
            }

            let effects = tick(state, &input, now);
            self.render.frame(&state.snapshot());

            for effect in effects {
                if let Some(outcome) = self.apply(state, effect) {
                    return Ok(outcome);
                }
            }

            iterations += 1;
            self.clock.end_frame();
        }
    }

    fn apply(&mut self, state: &SessionState, effect: SessionEffect) -> Option<SessionOutcome> {
        match effect {
            SessionEffect::PlayMusic { looped } => self.audio.play(looped),
            SessionEffect::PauseMusic => self.audio.pause(),
            SessionEffect::ResumeMusic => self.audio.resume(),
            SessionEffect::StopMusic => self.audio.stop(),
            SessionEffect::Finished(outcome) => {
                if outcome.is_recorded() {
                    let result = self.scores.record_result(
                        &self.player,
                        &state.level,
                        state.mode,
                        outcome.score(),
                        outcome.is_cleared(),
                    );
                    // A failed write loses the record but not the session
                    if let Err(e) = result {
                        log::error!("Failed to record result for {}: {}", self.player, e);
                    }
                }
                let top = self
                    .scores
                    .top_scores(&state.level, state.mode, DEFAULT_TOP_SCORES);
                self.render.outcome(&outcome, &top);
                return Some(outcome);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TempoTrack;
    use crate::audio::SilentAudio;
    use crate::highscores::Leaderboard;
    use crate::persistence::RecordRow;
    use crate::platform::{InputEvent, ManualClock, ScriptedInput};
    use crate::settings::{GameConfig, Mode};

    /// In-memory scores
    #[derive(Default)]
    struct MemoryScores {
        board: Leaderboard,
        recorded: Vec<(String, u64, bool)>,
    }

    impl ScorePersistence for MemoryScores {
        fn record_result(
            &mut self,
            player: &str,
            level: &str,
            mode: Mode,
            score: u64,
            cleared: bool,
        ) -> Result<()> {
            self.board.add(player, &RecordRow::now(level, score, mode, cleared));
            self.recorded.push((player.to_string(), score, cleared));
            Ok(())
        }
    }

    impl LeaderboardQuery for MemoryScores {
        fn top_scores(&self, level: &str, mode: Mode, limit: usize) -> Vec<LeaderboardEntry> {
            self.board.top_scores(level, mode, limit)
        }
    }

    fn runner(
        input: ScriptedInput,
    ) -> GameRunner<ManualClock, ScriptedInput, SilentAudio, MemoryScores, LogRenderer> {
        GameRunner::new(
            "tester",
            ManualClock::new(0.0, 1.0 / 60.0),
            input,
            SilentAudio::new(),
            MemoryScores::default(),
            LogRenderer::new(60),
        )
    }

    fn session(duration: f64) -> SessionState {
        SessionState::new(
            GameConfig::default(),
            "Tutorial - Lofi",
            Mode::Normal,
            TempoTrack::default(),
            duration,
            3,
        )
    }

    #[test]
    fn test_quit_is_not_recorded() {
        let input =
            ScriptedInput::new(vec![vec![InputEvent::Jump]]).then_after(10, vec![InputEvent::Quit]);
        let mut runner = runner(input);
        let outcome = runner.run(&mut session(30.0)).unwrap();

        assert!(matches!(outcome, SessionOutcome::Aborted { .. }));
        assert!(runner.scores().recorded.is_empty());
        assert_eq!(runner.render().frames(), 12);
        assert_eq!(runner.audio().track(), Some(Path::new("Lofi.wav")));
    }

    #[test]
    fn test_tick_limit_ends_idle_session() {
        let mut runner = runner(ScriptedInput::default()).with_tick_limit(5);
        let mut state = session(30.0);
        let outcome = runner.run(&mut state).unwrap();
        assert_eq!(outcome, SessionOutcome::Aborted { elapsed: 0.0 });
        assert!(state.is_over());
    }

    #[test]
    fn test_autopilot_session_is_recorded() {
        let mut runner = runner(ScriptedInput::default())
            .with_autopilot(true)
            .with_tick_limit(60 * 60);
        let outcome = runner.run(&mut session(5.0)).unwrap();

        assert!(outcome.is_recorded());
        let recorded = &runner.scores().recorded;
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, "tester");
        assert_eq!(recorded[0].1, outcome.score());
        assert_eq!(recorded[0].2, outcome.is_cleared());
    }
}
