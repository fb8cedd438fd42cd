pub mod color;
pub mod palette;
pub mod scoring;
pub mod timer;

use crate::error::EngineError;
use color::{color_distance, PickClass};
use palette::{
    generate_palette, variance_bound, Palette, PaletteStats, RandomSource, MAX_GRID_SIZE,
    MIN_GRID_SIZE,
};
use scoring::{apply_accuracy, evaluate_pick};
use std::time::Duration;
use timer::{RoundTimer, TickOutcome, TimerToken};
use tracing::{debug, info, trace};

pub const ROUND_SECONDS: u32 = 30;
pub const PICK_PAUSE: Duration = Duration::from_millis(1000);
pub const TIMEOUT_PAUSE: Duration = Duration::from_millis(2000);
const TIME_WARNING_SECONDS: u32 = 10;
const GRID_GROWTH_INTERVAL: u32 = 3;
const DIFFICULTY_PER_LEVEL: u32 = 5;
const MAX_DIFFICULTY: u32 = 100;
const START_ACCURACY: f64 = 100.0;

/// Grid size reached when a game arrives at `level` without restarts.
pub fn grid_size_for_level(level: u32) -> usize
{
    (MIN_GRID_SIZE + (level / GRID_GROWTH_INTERVAL) as usize).min(MAX_GRID_SIZE)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineSettings
{
    pub round_seconds: u32,
    pub pick_pause: Duration,
    pub timeout_pause: Duration,
}

impl Default for EngineSettings
{
    fn default() -> Self
    {
        Self {
            round_seconds: ROUND_SECONDS,
            pick_pause: PICK_PAUSE,
            timeout_pause: TIMEOUT_PAUSE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RoundState
{
    pub level: u32,
    pub grid_size: usize,
    pub time_budget_seconds: u32,
    pub time_left: u32,
    pub variance_bound: i32,
    pub streak: u32,
    pub highest_streak: u32,
    pub score: u64,
    pub accuracy: f64,
    pub perfect_picks: u32,
    pub missed_count: u32,
    pub difficulty: u32,
}

impl RoundState
{
    pub fn initial(round_seconds: u32) -> Self
    {
        Self {
            level: 1,
            grid_size: MIN_GRID_SIZE,
            time_budget_seconds: round_seconds,
            time_left: round_seconds,
            variance_bound: variance_bound(1),
            streak: 0,
            highest_streak: 0,
            score: 0,
            accuracy: START_ACCURACY,
            perfect_picks: 0,
            missed_count: 0,
            difficulty: 0,
        }
    }

    fn advance_level(&mut self)
    {
        self.level = self.level.saturating_add(1);
        if self.level % GRID_GROWTH_INTERVAL == 0 && self.grid_size < MAX_GRID_SIZE {
            self.grid_size += 1;
        }
        self.difficulty = self.level.saturating_mul(DIFFICULTY_PER_LEVEL).min(MAX_DIFFICULTY);
        self.variance_bound = variance_bound(self.level);
    }

    pub fn summary(&self) -> GameSummary
    {
        GameSummary {
            score: self.score,
            highest_streak: self.highest_streak,
            perfect_picks: self.perfect_picks,
            level: self.level,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase
{
    Playing,
    Intermission,
    GameOver,
}

/// Everything the presentation layer shows next to the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Scoreboard
{
    pub score: u64,
    pub level: u32,
    pub time_left: u32,
    pub accuracy: f64,
    pub perfect_picks: u32,
    pub missed_count: u32,
    pub streak: u32,
    pub highest_streak: u32,
    pub difficulty: u32,
    pub grid_size: usize,
    pub max_pairwise_distance: f64,
    pub hue_range: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameSummary
{
    pub score: u64,
    pub highest_streak: u32,
    pub perfect_picks: u32,
    pub level: u32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Feedback
{
    Pick {
        index: usize,
        class: PickClass,
        distance: f64,
        streak: u32,
        bonus: u64,
    },
    TimeUp,
}

/// Instructions for the rendering adapter, in the order they should be applied.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayUpdate
{
    Round(Palette),
    Scoreboard(Scoreboard),
    Feedback(Feedback),
    TimeWarning,
    NextRoundIn(Duration),
    GameOver(GameSummary),
}

pub struct RoundEngine<R>
{
    rng: R,
    settings: EngineSettings,
    state: RoundState,
    palette: Palette,
    stats: PaletteStats,
    timer: RoundTimer,
    phase: Phase,
    warned: bool,
}

impl<R: RandomSource> RoundEngine<R>
{
    /// Creates the engine with round 1 already running.
    pub fn start(mut rng: R, settings: EngineSettings) -> (Self, Vec<DisplayUpdate>)
    {
        let state = RoundState::initial(settings.round_seconds);
        let palette = generate_palette(state.level, state.grid_size, &mut rng);
        let stats = palette.stats();
        let mut engine = Self {
            rng,
            settings,
            state,
            palette,
            stats,
            timer: RoundTimer::new(),
            phase: Phase::Intermission,
            warned: false,
        };
        let updates = engine.open_round(false);
        (engine, updates)
    }

    pub fn state(&self) -> &RoundState
    {
        &self.state
    }

    pub fn palette(&self) -> &Palette
    {
        &self.palette
    }

    pub fn phase(&self) -> Phase
    {
        self.phase
    }

    /// Token the tick source must present; `None` outside a running round.
    pub fn timer_token(&self) -> Option<TimerToken>
    {
        self.timer.token()
    }

    pub fn scoreboard(&self) -> Scoreboard
    {
        Scoreboard {
            score: self.state.score,
            level: self.state.level,
            time_left: self.state.time_left,
            accuracy: self.state.accuracy,
            perfect_picks: self.state.perfect_picks,
            missed_count: self.state.missed_count,
            streak: self.state.streak,
            highest_streak: self.state.highest_streak,
            difficulty: self.state.difficulty,
            grid_size: self.state.grid_size,
            max_pairwise_distance: self.stats.max_pairwise_distance,
            hue_range: self.stats.hue_range,
        }
    }

    pub fn pick(&mut self, index: usize) -> Result<Vec<DisplayUpdate>, EngineError>
    {
        if self.phase != Phase::Playing {
            return Err(EngineError::RoundNotActive(self.phase));
        }
        let picked = self.palette.get(index).ok_or(EngineError::InvalidPick {
            index,
            cells: self.palette.len(),
        })?;

        self.timer.cancel();

        let distance = color_distance(picked, self.palette.target_color());
        let class = PickClass::from_distance(distance);
        let score = evaluate_pick(class, distance, self.state.level, self.state.streak);

        self.state.score = self.state.score.saturating_add(score.score_delta);
        self.state.streak = score.new_streak;
        self.state.accuracy = apply_accuracy(self.state.accuracy, score.accuracy_delta);
        debug!(
            index,
            ?class,
            distance,
            score_delta = score.score_delta,
            streak = score.new_streak,
            "pick scored"
        );

        let feedback = DisplayUpdate::Feedback(Feedback::Pick {
            index,
            class,
            distance,
            streak: score.new_streak,
            bonus: score.streak_bonus,
        });

        if class == PickClass::Wrong {
            self.state.missed_count = self.state.missed_count.saturating_add(1);
            self.phase = Phase::GameOver;
            let summary = self.state.summary();
            info!(
                score = summary.score,
                level = summary.level,
                highest_streak = summary.highest_streak,
                "game over"
            );
            return Ok(vec![
                feedback,
                DisplayUpdate::Scoreboard(self.scoreboard()),
                DisplayUpdate::GameOver(summary),
            ]);
        }

        if class == PickClass::Perfect {
            self.state.perfect_picks = self.state.perfect_picks.saturating_add(1);
        }
        self.state.highest_streak = self.state.highest_streak.max(self.state.streak);
        self.state.advance_level();
        self.phase = Phase::Intermission;

        Ok(vec![
            feedback,
            DisplayUpdate::Scoreboard(self.scoreboard()),
            DisplayUpdate::NextRoundIn(self.settings.pick_pause),
        ])
    }

    /// Counts one elapsed second of the running round.
    pub fn tick(&mut self, token: TimerToken) -> Vec<DisplayUpdate>
    {
        match self.timer.tick(token) {
            TickOutcome::Stale => {
                trace!(?token, "ignoring stale tick");
                Vec::new()
            }
            TickOutcome::Running { remaining } => {
                self.state.time_left = remaining;
                let mut updates = vec![DisplayUpdate::Scoreboard(self.scoreboard())];
                if remaining <= TIME_WARNING_SECONDS && !self.warned {
                    self.warned = true;
                    updates.push(DisplayUpdate::TimeWarning);
                }
                updates
            }
            TickOutcome::Expired => {
                self.state.time_left = 0;
                self.state.missed_count = self.state.missed_count.saturating_add(1);
                self.phase = Phase::Intermission;
                debug!(level = self.state.level, missed = self.state.missed_count, "round timed out");
                vec![
                    DisplayUpdate::Feedback(Feedback::TimeUp),
                    DisplayUpdate::Scoreboard(self.scoreboard()),
                    DisplayUpdate::NextRoundIn(self.settings.timeout_pause),
                ]
            }
        }
    }

    /// Starts the round queued by the last pick or timeout.
    pub fn begin_round(&mut self) -> Result<Vec<DisplayUpdate>, EngineError>
    {
        if self.phase != Phase::Intermission {
            return Err(EngineError::NoPendingRound(self.phase));
        }
        Ok(self.open_round(true))
    }

    /// Resets everything to the initial state and starts round 1.
    pub fn acknowledge_game_over(&mut self) -> Result<Vec<DisplayUpdate>, EngineError>
    {
        if self.phase != Phase::GameOver {
            return Err(EngineError::GameNotOver(self.phase));
        }
        self.state = RoundState::initial(self.settings.round_seconds);
        info!("game reset");
        Ok(self.open_round(true))
    }

    fn open_round(&mut self, regenerate: bool) -> Vec<DisplayUpdate>
    {
        if regenerate {
            self.palette = generate_palette(self.state.level, self.state.grid_size, &mut self.rng);
            self.stats = self.palette.stats();
        }
        self.state.variance_bound = self.palette.variance();
        self.state.time_budget_seconds = self.settings.round_seconds;
        self.state.time_left = self.settings.round_seconds;
        self.warned = false;
        self.timer.start(self.settings.round_seconds);
        self.phase = Phase::Playing;

        info!(
            level = self.state.level,
            grid_size = self.state.grid_size,
            variance = self.state.variance_bound,
            target = self.palette.target(),
            "round started"
        );

        vec![
            DisplayUpdate::Round(self.palette.clone()),
            DisplayUpdate::Scoreboard(self.scoreboard()),
        ]
    }
}
