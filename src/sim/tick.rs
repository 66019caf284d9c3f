//! Fixed timestep session tick
//!
//! Advances a session by one frame. Pure state transition: anything that
//! must touch the outside world (music, records) comes back as a
//! `SessionEffect` for the caller to perform.

use super::player::{BodyStatus, JumpOutcome};
use super::scroll::scroll_speed;
use super::state::{GamePhase, SessionOutcome, SessionState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub jump: bool,
    /// Horizontal movement held this tick
    pub move_left: bool,
    pub move_right: bool,
    /// Fast-fall held this tick
    pub fast_fall: bool,
    /// Pause toggle
    pub toggle_pause: bool,
    pub quit: bool,
    /// Demo mode - the player is steered automatically
    pub autopilot: bool,
}

/// Side effects requested by a tick, in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEffect {
    PlayMusic { looped: bool },
    PauseMusic,
    ResumeMusic,
    StopMusic,
    /// Terminal; emitted once per session
    Finished(SessionOutcome),
}

/// Advance the session by one tick at wall-clock time `now` (seconds)
pub fn tick(state: &mut SessionState, input: &TickInput, now: f64) -> Vec<SessionEffect> {
    let mut effects = Vec::new();

    if state.phase == GamePhase::Over {
        return effects;
    }

    if input.quit {
        let elapsed = state.clock.elapsed(now);
        finish(state, SessionOutcome::Aborted { elapsed }, &mut effects);
        return effects;
    }

    // Handle pause toggle
    if input.toggle_pause {
        if state.phase == GamePhase::Paused {
            state.clock.resume(now);
            state.phase = if state.player.has_jumped_once {
                GamePhase::Playing
            } else {
                GamePhase::Ready
            };
            effects.push(SessionEffect::ResumeMusic);
            log::info!("Resumed at {:.2}s", state.clock.elapsed(now));
        } else {
            state.clock.pause(now);
            state.phase = GamePhase::Paused;
            effects.push(SessionEffect::PauseMusic);
            log::info!("Paused at {:.2}s", state.clock.elapsed(now));
        }
    }

    // Paused ticks change nothing else
    if state.phase == GamePhase::Paused {
        return effects;
    }

    let mut input = input.clone();
    if input.autopilot {
        steer(state, &mut input);
    }
    let input = &input;

    // Reaching the end of the track ends the run before any movement
    if state.phase == GamePhase::Playing {
        let elapsed = state.clock.elapsed(now);
        if elapsed >= state.track_duration {
            finish(state, SessionOutcome::Cleared { elapsed }, &mut effects);
            return effects;
        }
    }

    let step = state.config.move_step;
    if input.move_left {
        state.player.move_horizontal(-step);
    }
    if input.move_right {
        state.player.move_horizontal(step);
    }

    if input.jump && state.player.jump(now, &state.config) == JumpOutcome::FirstJump {
        state.clock.start(now);
        state.phase = GamePhase::Playing;
        effects.push(SessionEffect::PlayMusic { looped: true });
        log::info!("First jump, run started");
    }

    let playing = state.phase == GamePhase::Playing;
    let elapsed = state.clock.elapsed(now);
    state.elapsed = elapsed;

    let mut speed = scroll_speed(&state.scroll_params(), elapsed);
    if let Some(max) = state.config.max_scroll_speed {
        speed = speed.min(max);
    }
    state.scroll_speed = speed;

    if playing {
        state.field.advance(speed);
        state.field.prune(state.config.screen_height);
    }

    let status = state
        .player
        .tick(state.field.platforms(), input.fast_fall, &state.config);
    if status == BodyStatus::Lost {
        finish(state, SessionOutcome::Lost { elapsed }, &mut effects);
        return effects;
    }

    if playing {
        state.field.replenish(&state.config);
    }

    state.time_ticks += 1;
    effects
}

fn finish(state: &mut SessionState, outcome: SessionOutcome, effects: &mut Vec<SessionEffect>) {
    state.phase = GamePhase::Over;
    state.elapsed = outcome.elapsed();
    state.outcome = Some(outcome);
    effects.push(SessionEffect::StopMusic);
    effects.push(SessionEffect::Finished(outcome));
    log::info!("Session over: {:?} (score {})", outcome, outcome.score());
}

/// Demo steering: jump whenever standing, drift toward the closest platform
/// above (or, failing that, below) the player
fn steer(state: &SessionState, input: &mut TickInput) {
    let player = &state.player;
    if player.is_grounded() {
        input.jump = true;
    }

    let center = player.rect.center();
    let bottom = player.rect.bottom();
    let distance = |top: f32| {
        if top < bottom {
            bottom - top
        } else {
            // Prefer anything above to anything below
            (top - bottom) + state.config.screen_height
        }
    };

    let target = state
        .field
        .platforms()
        .iter()
        .filter(|p| (p.rect.top() - bottom).abs() > f32::EPSILON)
        .min_by(|a, b| {
            distance(a.rect.top())
                .partial_cmp(&distance(b.rect.top()))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(platform) = target {
        let dx = platform.rect.center().x - center.x;
        if dx.abs() > state.config.move_step {
            input.move_left = dx < 0.0;
            input.move_right = dx > 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TempoTrack;
    use crate::consts::TICK_DT;
    use crate::settings::{GameConfig, Mode};
    use crate::sim::Platform;

    fn still_session(duration: f64) -> SessionState {
        // Unknown level with zero base speed: nothing scrolls
        let config = GameConfig {
            normal_base_speed: 0.0,
            ..GameConfig::default()
        };
        SessionState::new(config, "Still", Mode::Normal, TempoTrack::default(), duration, 1)
    }

    fn jump() -> TickInput {
        TickInput {
            jump: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_ready_until_first_jump() {
        let mut state = SessionState::new(
            GameConfig::default(),
            "Hard - Beat Saber",
            Mode::Normal,
            TempoTrack::default(),
            30.0,
            5,
        );
        let before = state.field.platforms().to_vec();

        for i in 0..30 {
            let effects = tick(&mut state, &TickInput::default(), i as f64 * TICK_DT);
            assert!(effects.is_empty());
        }
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.field.platforms(), &before[..]);
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.scroll_speed, 12.0);

        let effects = tick(&mut state, &jump(), 1.0);
        assert_eq!(effects, vec![SessionEffect::PlayMusic { looped: true }]);
        assert_eq!(state.phase, GamePhase::Playing);
        // Platforms moved by the scroll speed on the first live tick
        assert_eq!(state.field.platforms()[0].rect.top(), before[0].rect.top() + 12.0);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut state = still_session(30.0);
        tick(&mut state, &jump(), 0.0);
        tick(&mut state, &TickInput::default(), 1.0);
        let player_y = state.player.rect.top();

        let pause = TickInput {
            toggle_pause: true,
            ..Default::default()
        };
        let effects = tick(&mut state, &pause, 2.0);
        assert_eq!(effects, vec![SessionEffect::PauseMusic]);
        assert_eq!(state.phase, GamePhase::Paused);

        // Input besides the toggle is ignored while paused
        let busy = TickInput {
            jump: true,
            move_left: true,
            fast_fall: true,
            ..Default::default()
        };
        let ticks = state.time_ticks;
        assert!(tick(&mut state, &busy, 5.0).is_empty());
        assert_eq!(state.player.rect.top(), player_y);
        assert_eq!(state.time_ticks, ticks);

        let effects = tick(&mut state, &pause, 12.0);
        assert_eq!(effects, vec![SessionEffect::ResumeMusic]);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!((state.elapsed - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_before_first_jump_returns_to_ready() {
        let mut state = still_session(30.0);
        let pause = TickInput {
            toggle_pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, 0.0);
        tick(&mut state, &pause, 1.0);
        assert_eq!(state.phase, GamePhase::Ready);
    }

    #[test]
    fn test_cleared_at_track_end() {
        let mut state = still_session(30.0);
        let mut now = 0.0;
        let mut outcome = None;
        let mut input = jump();

        for _ in 0..(31 * 60) {
            for effect in tick(&mut state, &input, now) {
                if let SessionEffect::Finished(o) = effect {
                    assert!(outcome.is_none());
                    outcome = Some(o);
                }
            }
            if outcome.is_some() {
                break;
            }
            input = TickInput::default();
            now += TICK_DT;
        }

        let outcome = outcome.expect("session should clear");
        assert!(outcome.is_cleared());
        assert_eq!(outcome.score(), 30);
        assert!(outcome.elapsed() < 30.0 + 2.0 * TICK_DT);
        assert!(state.is_over());

        // Nothing happens after the end
        assert!(tick(&mut state, &jump(), now + 1.0).is_empty());
    }

    #[test]
    fn test_lost_reports_elapsed_at_crossing() {
        let mut state = still_session(30.0);
        state.field.clear();
        let mut now = 10.0;
        let effects = tick(&mut state, &jump(), now);
        assert_eq!(effects, vec![SessionEffect::PlayMusic { looped: true }]);

        let mut lost = None;
        for _ in 0..600 {
            now += TICK_DT;
            let effects = tick(&mut state, &TickInput::default(), now);
            if let Some(SessionEffect::Finished(outcome)) = effects.last() {
                assert_eq!(effects[0], SessionEffect::StopMusic);
                lost = Some((*outcome, now));
                break;
            }
        }

        let (outcome, at) = lost.expect("player should fall");
        assert!(matches!(outcome, SessionOutcome::Lost { .. }));
        assert!((outcome.elapsed() - (at - 10.0)).abs() < 1e-9);
        assert!(state.player.rect.top() >= 750.0);
    }

    #[test]
    fn test_cleared_tick_does_not_move_player() {
        let mut state = still_session(1.0);
        tick(&mut state, &jump(), 0.0);
        let x = state.player.rect.left();
        let y = state.player.rect.top();

        let right = TickInput {
            move_right: true,
            fast_fall: true,
            ..Default::default()
        };
        let effects = tick(&mut state, &right, 1.0);
        assert!(matches!(
            effects.last(),
            Some(SessionEffect::Finished(SessionOutcome::Cleared { .. }))
        ));
        assert_eq!(state.player.rect.left(), x);
        assert_eq!(state.player.rect.top(), y);
    }

    /// Still session whose rows always spawn as one platform at x=300,
    /// directly under the default player column (350..450)
    fn fixed_row_session() -> SessionState {
        let config = GameConfig {
            normal_base_speed: 0.0,
            spawn_margin_left: 300.0,
            spawn_margin_right: 500.0,
            platforms_per_row: (1, 1),
            ..GameConfig::default()
        };
        let mut state =
            SessionState::new(config, "Still", Mode::Normal, TempoTrack::default(), 30.0, 4);
        tick(&mut state, &jump(), 0.0);
        assert_eq!(state.phase, GamePhase::Playing);

        // Falling, bottom 5px above where the next row will spawn (y=0)
        state.field.clear();
        state.player.rect.pos.y = -105.0;
        state.player.velocity_y = 10.0;
        state.player.is_jumping = true;
        state
    }

    #[test]
    fn test_spawned_row_misses_same_tick_collision() {
        let mut state = fixed_row_session();
        tick(&mut state, &TickInput::default(), TICK_DT);

        // The row appeared, but only after the player had moved
        assert_eq!(state.field.len(), 1);
        assert_eq!(state.field.platforms()[0].rect.top(), 0.0);
        assert_eq!(state.field.platforms()[0].rect.left(), 300.0);
        assert!(state.player.is_jumping);
        assert_eq!(state.player.velocity_y, 11.0);
        assert_eq!(state.player.rect.bottom(), 6.0);

        // Had the row been there already, the same step would have landed
        let mut control = fixed_row_session();
        control.field.push(Platform::new(300.0, 0.0, 150.0, 20.0));
        tick(&mut control, &TickInput::default(), TICK_DT);
        assert!(!control.player.is_jumping);
        assert_eq!(control.player.velocity_y, 0.0);
        assert_eq!(control.player.rect.bottom(), 0.0);
    }

    #[test]
    fn test_quit_aborts() {
        let mut state = still_session(30.0);
        tick(&mut state, &jump(), 0.0);
        let quit = TickInput {
            quit: true,
            ..Default::default()
        };
        let effects = tick(&mut state, &quit, 4.0);
        assert_eq!(
            effects,
            vec![
                SessionEffect::StopMusic,
                SessionEffect::Finished(SessionOutcome::Aborted { elapsed: 4.0 })
            ]
        );
        assert!(tick(&mut state, &quit, 5.0).is_empty());
    }

    #[test]
    fn test_rhythm_speed_is_capped() {
        let mut state = SessionState::new(
            GameConfig::default(),
            "GOD - Camelia",
            Mode::Rhythm,
            TempoTrack::new(1.0, vec![600.0]),
            30.0,
            9,
        );
        tick(&mut state, &jump(), 0.0);
        // 600 * 1.4 / 12 = 70, capped at 30
        assert_eq!(state.scroll_speed, 30.0);
    }

    #[test]
    fn test_replenish_keeps_field_populated() {
        let mut state = SessionState::new(
            GameConfig::default(),
            "GOD - Camelia",
            Mode::Normal,
            TempoTrack::default(),
            1000.0,
            11,
        );
        let mut now = 0.0;
        tick(&mut state, &jump(), now);
        for _ in 0..40 {
            now += TICK_DT;
            tick(&mut state, &TickInput::default(), now);
            if state.is_over() {
                break;
            }
            assert!(!state.field.is_empty());
            assert!(state.field.topmost_top().unwrap() <= 200.0);
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = SessionState::new(
            GameConfig::default(),
            "Easy - Next To You",
            Mode::Normal,
            TempoTrack::default(),
            60.0,
            77,
        );
        let mut b = a.clone();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for i in 0..300 {
            let now = i as f64 * TICK_DT;
            assert_eq!(tick(&mut a, &input, now), tick(&mut b, &input, now));
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
