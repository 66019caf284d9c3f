//! Rhythm Climb command line
//!
//! Runs headless sessions against a synthetic click track and queries the
//! record files.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rhythm_climb::analysis::{click_track, duration_seconds};
use rhythm_climb::audio::SilentAudio;
use rhythm_climb::highscores::{DEFAULT_TOP_SCORES, LeaderboardQuery, personal_bests};
use rhythm_climb::persistence::RecordStore;
use rhythm_climb::platform::{Clock, ManualClock, ScriptedInput, SystemClock};
use rhythm_climb::runner::LogRenderer;
use rhythm_climb::sim::SessionState;
use rhythm_climb::{
    Error, GameConfig, GameRunner, Leaderboard, Mode, Result, TempoEstimator, TempoTrack,
};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };

    match cli.command {
        Commands::Play(args) => run_play(&config, &args, &cli.records_dir),
        Commands::Tempo(track) => {
            let tempo = estimate(&config, &track).0;
            println!("{}", serde_json::to_string_pretty(&tempo)?);
            Ok(())
        }
        Commands::Leaderboard { limit } => {
            print_leaderboard(&Leaderboard::load(&RecordStore::new(&cli.records_dir)), limit);
            Ok(())
        }
        Commands::Best { player } => {
            print_bests(&RecordStore::new(&cli.records_dir), &player);
            Ok(())
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Endless-runner rhythm game engine", long_about = None)]
struct Cli {
    /// JSON config file; defaults are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the per-player record files
    #[arg(long, global = true, default_value = "records")]
    records_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play one autopiloted session and record the result
    Play(PlayArgs),
    /// Estimate the tempo track of a synthetic click track and print it as JSON
    Tempo(TrackArgs),
    /// Top scores for every level and mode
    Leaderboard {
        #[arg(short, long, default_value_t = DEFAULT_TOP_SCORES)]
        limit: usize,
    },
    /// Personal bests of one player
    Best {
        #[arg(short, long)]
        player: String,
    },
}

#[derive(clap::Args, Debug)]
struct TrackArgs {
    /// Beats per minute of the click track
    #[arg(long, default_value_t = 120.0)]
    bpm: f32,

    /// Track length in seconds
    #[arg(long, default_value_t = 30.0)]
    duration: f32,

    #[arg(long, default_value_t = 22_050, value_parser = clap::value_parser!(u32).range(1..))]
    sample_rate: u32,
}

#[derive(clap::Args, Debug)]
struct PlayArgs {
    #[arg(short, long, default_value = "Tutorial - Lofi")]
    level: String,

    #[arg(short, long, default_value = "normal", value_parser = parse_mode)]
    mode: Mode,

    #[arg(short, long, default_value = "player")]
    player: String,

    /// Platform layout seed; the current time when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Pace ticks with the wall clock instead of running as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Print the final frame as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    track: TrackArgs,
}

fn parse_mode(s: &str) -> std::result::Result<Mode, String> {
    Mode::from_str(s).ok_or_else(|| format!("unknown mode {s:?}, expected normal or rhythm"))
}

fn estimate(config: &GameConfig, track: &TrackArgs) -> (TempoTrack, f64) {
    let waveform = click_track(track.bpm, track.duration, track.sample_rate);
    let tempo = TempoEstimator::with_fallback(config.fallback_tempo).estimate(
        &waveform,
        track.sample_rate,
        config.segment_duration,
    );
    log::info!(
        "Estimated {} segments for a {} BPM click track",
        tempo.len(),
        track.bpm
    );
    (tempo, duration_seconds(&waveform, track.sample_rate))
}

fn run_play(config: &GameConfig, args: &PlayArgs, records_dir: &Path) -> Result<()> {
    if config.level(&args.level).is_none() {
        return Err(Error::UnknownLevel(args.level.clone()));
    }

    let (tempo, duration) = estimate(config, &args.track);
    let seed = args
        .seed
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().unsigned_abs());
    let mut state =
        SessionState::new(config.clone(), &args.level, args.mode, tempo, duration, seed);

    // Generous bound; an autopiloted session ends long before this
    let tick_limit = ((duration + 10.0) * config.tick_rate as f64) as u64;
    let store = RecordStore::new(records_dir);

    if args.realtime {
        play_with(SystemClock::new(config.tick_rate), &mut state, args, store, tick_limit)
    } else {
        let clock = ManualClock::new(0.0, config.tick_dt());
        play_with(clock, &mut state, args, store, tick_limit)
    }
}

fn play_with<C: Clock>(
    clock: C,
    state: &mut SessionState,
    args: &PlayArgs,
    store: RecordStore,
    tick_limit: u64,
) -> Result<()> {
    let mut runner = GameRunner::new(
        &args.player,
        clock,
        ScriptedInput::default(),
        SilentAudio::new(),
        store,
        LogRenderer::new(state.config.tick_rate as u64),
    )
    .with_autopilot(true)
    .with_tick_limit(tick_limit);

    let outcome = runner.run(state)?;
    println!(
        "{} on {} ({}): {:?}, score {}",
        args.player,
        state.level,
        state.mode,
        outcome,
        outcome.score()
    );
    let top = runner
        .scores()
        .top_scores(&state.level, state.mode, DEFAULT_TOP_SCORES);
    for (rank, entry) in top.iter().enumerate() {
        println!("  #{} {:<16} {:>5}", rank + 1, entry.player, entry.score);
    }

    if args.json {
        if let Some(frame) = runner.render().last_frame() {
            println!("{}", serde_json::to_string_pretty(frame)?);
        }
    }
    Ok(())
}

fn print_leaderboard(board: &Leaderboard, limit: usize) {
    if board.is_empty() {
        println!("No records yet");
        return;
    }
    for (level, mode, entries) in board.general(limit) {
        println!("{level} ({mode})");
        for (rank, entry) in entries.iter().enumerate() {
            let cleared = if entry.cleared { " cleared" } else { "" };
            println!("  #{} {:<16} {:>5}{}", rank + 1, entry.player, entry.score, cleared);
        }
    }
}

fn print_bests(store: &RecordStore, player: &str) -> usize {
    let bests = personal_bests(&store.history(player));
    if bests.is_empty() {
        println!("No records for {player}");
        return 0;
    }
    for ((level, mode), best) in &bests {
        let cleared = if best.cleared { "Yes" } else { "No" };
        println!("{level} ({mode}): {} cleared={cleared}", best.best_score);
    }
    bests.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sample_rate_is_rejected() {
        assert!(Cli::try_parse_from(["rhythm-climb", "tempo", "--sample-rate", "0"]).is_err());
        let cli = Cli::try_parse_from(["rhythm-climb", "tempo", "--sample-rate", "8000"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Tempo(TrackArgs {
                sample_rate: 8000,
                ..
            })
        ));
    }

    #[test]
    fn test_mode_argument() {
        let cli = Cli::try_parse_from(["rhythm-climb", "play", "--mode", "Rythm"]).unwrap();
        assert!(matches!(cli.command, Commands::Play(PlayArgs { mode: Mode::Rhythm, .. })));
        assert!(Cli::try_parse_from(["rhythm-climb", "play", "--mode", "fast"]).is_err());
    }

    #[test]
    fn test_bests_survive_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("zoe.csv"), "name;points\nzoe;3\n").unwrap();
        let store = RecordStore::new(dir.path());
        assert_eq!(print_bests(&store, "zoe"), 0);
        assert_eq!(print_bests(&store, "nobody"), 0);
    }
}
