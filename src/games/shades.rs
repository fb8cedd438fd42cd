use super::TerminalGuard;
use crate::config::GameConfig;
use crate::engine::color::{PickClass, Rgb};
use crate::engine::palette::{Palette, RandomSource};
use crate::engine::{DisplayUpdate, Feedback, GameSummary, Phase, RoundEngine, Scoreboard};
use crate::error::{EngineError, GameError};
use crossterm::cursor::MoveTo;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use std::io::{Stdout, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

const TICK_MS: u64 = 33;
const SECOND: Duration = Duration::from_secs(1);
const SWATCH_WIDTH: usize = 6;
const METER_WIDTH: usize = 20;
const DIRECT_PICK_MAX_GRID: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Input
{
    Quit,
    Move(i32, i32),
    PickCursor,
    PickIndex(usize),
    Restart,
}

#[derive(Default)]
struct View
{
    palette: Option<Palette>,
    board: Option<Scoreboard>,
    cursor: usize,
    marked: Option<(usize, PickClass)>,
    message: String,
    time_warning: bool,
    summary: Option<GameSummary>,
}

impl View
{
    fn apply(&mut self, update: DisplayUpdate)
    {
        match update {
            DisplayUpdate::Round(palette) => {
                self.cursor = self.cursor.min(palette.len().saturating_sub(1));
                self.marked = None;
                self.time_warning = false;
                self.summary = None;
                self.message = "Find the target shade.".to_string();
                self.palette = Some(palette);
            }
            DisplayUpdate::Scoreboard(board) => self.board = Some(board),
            DisplayUpdate::Feedback(Feedback::Pick {
                index,
                class,
                streak,
                bonus,
                ..
            }) => {
                self.marked = Some((index, class));
                self.message = pick_message(class, streak, bonus);
            }
            DisplayUpdate::Feedback(Feedback::TimeUp) => {
                self.message = "Time's up!".to_string();
            }
            DisplayUpdate::TimeWarning => self.time_warning = true,
            DisplayUpdate::NextRoundIn(delay) => {
                self.message = format!("{}  Next round in {:.1}s", self.message, delay.as_secs_f32());
            }
            DisplayUpdate::GameOver(summary) => self.summary = Some(summary),
        }
    }

    fn grid_size(&self) -> usize
    {
        self.palette.as_ref().map_or(0, Palette::grid_size)
    }
}

/// Adapter-side timers: the next one-second tick and the next round start.
/// Setting one clears the other so only one countdown is ever pending.
#[derive(Default)]
struct Schedule
{
    next_tick: Option<Instant>,
    next_round: Option<Instant>,
}

fn dispatch(view: &mut View, schedule: &mut Schedule, updates: Vec<DisplayUpdate>, now: Instant)
{
    for update in updates {
        match &update {
            DisplayUpdate::Round(_) => {
                schedule.next_round = None;
                schedule.next_tick = Some(now + SECOND);
            }
            DisplayUpdate::NextRoundIn(delay) => {
                schedule.next_tick = None;
                schedule.next_round = Some(now + *delay);
            }
            DisplayUpdate::GameOver(_) => {
                schedule.next_tick = None;
                schedule.next_round = None;
            }
            _ => {}
        }
        view.apply(update);
    }
}

pub fn run<R: RandomSource>(rng: R, config: &GameConfig) -> Result<(), GameError>
{
    let mut term = TerminalGuard::enter()?;
    let (mut engine, updates) = RoundEngine::start(rng, config.engine_settings());
    info!(seed = ?config.seed, round_seconds = config.round_seconds, "session started");

    let mut view = View::default();
    let mut schedule = Schedule::default();
    dispatch(&mut view, &mut schedule, updates, Instant::now());
    let mut last_draw: Option<Instant> = None;

    loop {
        let inputs = read_inputs(view.grid_size())?;
        if inputs.contains(&Input::Quit) {
            break;
        }

        for input in inputs {
            let now = Instant::now();
            match input {
                Input::Move(dx, dy) => {
                    view.cursor = move_cursor(view.cursor, view.grid_size(), dx, dy);
                }
                Input::PickCursor | Input::PickIndex(_) => {
                    let index = if let Input::PickIndex(index) = input { index } else { view.cursor };
                    match engine.pick(index) {
                        Ok(updates) => dispatch(&mut view, &mut schedule, updates, now),
                        Err(EngineError::RoundNotActive(phase)) => {
                            trace!(?phase, index, "pick outside a running round");
                        }
                        Err(err) => {
                            warn!(%err, "pick rejected");
                            view.message = err.to_string();
                        }
                    }
                }
                Input::Restart => {
                    if engine.phase() == Phase::GameOver {
                        let updates = engine.acknowledge_game_over()?;
                        debug!("restarted after game over");
                        dispatch(&mut view, &mut schedule, updates, now);
                    }
                }
                Input::Quit => {}
            }
        }

        let now = Instant::now();
        if let (Some(due), Some(token)) = (schedule.next_tick, engine.timer_token()) {
            if now >= due {
                schedule.next_tick = Some(due + SECOND);
                let updates = engine.tick(token);
                dispatch(&mut view, &mut schedule, updates, now);
            }
        }
        if let Some(due) = schedule.next_round {
            if now >= due {
                let updates = engine.begin_round()?;
                dispatch(&mut view, &mut schedule, updates, now);
            }
        }

        if last_draw.is_none_or(|at| at.elapsed() >= Duration::from_millis(TICK_MS)) {
            match view.summary {
                Some(summary) => draw_summary(term.stdout(), &summary)?,
                None => draw_ui(term.stdout(), &view)?,
            }
            last_draw = Some(Instant::now());
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    info!(score = engine.state().score, level = engine.state().level, "session ended");
    Ok(())
}

fn read_inputs(grid_size: usize) -> Result<Vec<Input>, GameError>
{
    let mut inputs = Vec::new();
    while event::poll(Duration::from_millis(0))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Release {
                continue;
            }
            if let Some(input) = map_key(key, grid_size) {
                inputs.push(input);
            }
        }
    }
    Ok(inputs)
}

fn map_key(key: KeyEvent, grid_size: usize) -> Option<Input>
{
    let KeyEvent { code, modifiers, .. } = key;
    match code {
        KeyCode::Esc => Some(Input::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Input::Quit),
        KeyCode::Char('q') => Some(Input::Quit),
        KeyCode::Left | KeyCode::Char('h') => Some(Input::Move(-1, 0)),
        KeyCode::Right | KeyCode::Char('l') => Some(Input::Move(1, 0)),
        KeyCode::Up | KeyCode::Char('k') => Some(Input::Move(0, -1)),
        KeyCode::Down | KeyCode::Char('j') => Some(Input::Move(0, 1)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Input::PickCursor),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Input::Restart),
        KeyCode::Char(ch) if grid_size <= DIRECT_PICK_MAX_GRID => {
            let digit = ch.to_digit(10)? as usize;
            (1..=grid_size * grid_size)
                .contains(&digit)
                .then(|| Input::PickIndex(digit - 1))
        }
        _ => None,
    }
}

fn move_cursor(cursor: usize, grid_size: usize, dx: i32, dy: i32) -> usize
{
    if grid_size == 0 {
        return 0;
    }
    let max = grid_size as i32 - 1;
    let row = (cursor / grid_size) as i32;
    let col = (cursor % grid_size) as i32;
    let row = (row + dy).clamp(0, max) as usize;
    let col = (col + dx).clamp(0, max) as usize;
    row * grid_size + col
}

fn pick_message(class: PickClass, streak: u32, bonus: u64) -> String
{
    match class {
        PickClass::Perfect => format!("Perfect Match! {streak}x Combo! +{bonus} bonus!"),
        PickClass::Close => format!("Close enough! {streak}x Combo! +{bonus} bonus!"),
        PickClass::Wrong => "Game Over!".to_string(),
    }
}

fn draw_ui(stdout: &mut Stdout, view: &View) -> Result<(), GameError>
{
    let mut lines = Vec::new();
    lines.push("Shade Hunter - Color Perception".to_string());

    if let Some(board) = &view.board {
        let timer = format!("{:>2}s", board.time_left);
        let timer = if view.time_warning {
            format!("{}{}\x1b[0m", ansi_fg(Rgb::new(255, 51, 51)), timer)
        } else {
            timer
        };
        lines.push(format!(
            "Score: {}  Level: {}  Time: {}  Accuracy: {}%",
            board.score,
            board.level,
            timer,
            board.accuracy.floor() as u32
        ));
        lines.push(format!(
            "Perfect: {}  Missed: {}  Streak: {}x (best {}x)",
            board.perfect_picks, board.missed_count, board.streak, board.highest_streak
        ));
        lines.push(format!(
            "Difficulty: [{}] {:>3}%  RGB spread: {}  Hue range: {}",
            difficulty_meter(board.difficulty),
            board.difficulty,
            board.max_pairwise_distance.floor() as u32,
            board.hue_range.floor() as u32
        ));
    }
    lines.push(String::new());

    if let Some(palette) = &view.palette {
        let target = palette.target_color();
        lines.push(format!("Target: {}", swatch(target, SWATCH_WIDTH * 2)));
        lines.push(String::new());
        lines.extend(render_grid(palette, view.cursor, view.marked));
    }

    lines.push(String::new());
    lines.push(view.message.clone());
    lines.push(controls_hint(view.grid_size()));

    write_screen(stdout, &lines)
}

fn draw_summary(stdout: &mut Stdout, summary: &GameSummary) -> Result<(), GameError>
{
    let lines = vec![
        "Game Over!".to_string(),
        String::new(),
        format!("Final Score: {}", summary.score),
        format!("Highest Streak: {}x", summary.highest_streak),
        format!("Perfect Picks: {}", summary.perfect_picks),
        format!("Level Reached: {}", summary.level),
        String::new(),
        "Press R to play again, ESC to quit.".to_string(),
    ];
    write_screen(stdout, &lines)
}

fn write_screen(stdout: &mut Stdout, lines: &[String]) -> Result<(), GameError>
{
    let output = format!("{}\r\n", lines.join("\r\n"));
    queue!(stdout, MoveTo(0, 0), Clear(ClearType::All))?;
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn render_grid(palette: &Palette, cursor: usize, marked: Option<(usize, PickClass)>) -> Vec<String>
{
    let grid_size = palette.grid_size();
    let mut lines = Vec::with_capacity(grid_size * 2);
    for (row, cells) in palette.colors().chunks(grid_size).enumerate() {
        let mut top = String::new();
        let mut bottom = String::new();
        for (col, &color) in cells.iter().enumerate() {
            let index = row * grid_size + col;
            let (open, close) = if index == cursor { ('[', ']') } else { (' ', ' ') };
            let label = match marked {
                Some((picked, class)) if picked == index => Some(mark_for(class)),
                _ => None,
            };

            top.push(open);
            top.push_str(&swatch(color, SWATCH_WIDTH));
            top.push(close);

            bottom.push(open);
            match label {
                Some(mark) => bottom.push_str(&labeled_swatch(color, SWATCH_WIDTH, mark)),
                None => bottom.push_str(&swatch(color, SWATCH_WIDTH)),
            }
            bottom.push(close);
        }
        lines.push(top);
        lines.push(bottom);
    }
    lines
}

/// Plain-text palette listing for `shades preview`.
pub fn render_preview(palette: &Palette) -> Vec<String>
{
    let stats = palette.stats();
    let mut lines = vec![format!(
        "Grid {}x{}  variance +/-{}  target #{}  RGB spread {:.1}  hue range {:.1}",
        palette.grid_size(),
        palette.grid_size(),
        palette.variance(),
        palette.target() + 1,
        stats.max_pairwise_distance,
        stats.hue_range
    )];
    for (index, &color) in palette.colors().iter().enumerate() {
        let marker = if index == palette.target() { " <- target" } else { "" };
        lines.push(format!(
            "{:>3}. {} rgb({:>3}, {:>3}, {:>3}){}",
            index + 1,
            swatch(color, SWATCH_WIDTH),
            color.r,
            color.g,
            color.b,
            marker
        ));
    }
    lines
}

fn mark_for(class: PickClass) -> char
{
    match class {
        PickClass::Perfect => '*',
        PickClass::Close => '~',
        PickClass::Wrong => 'x',
    }
}

// digit picks only exist while every cell has a single-digit number
fn controls_hint(grid_size: usize) -> String
{
    let direct = if grid_size <= DIRECT_PICK_MAX_GRID { ", 1-9 direct pick" } else { "" };
    format!("Controls: arrows/hjkl move, enter/space pick{direct}, q/ESC to quit")
}

fn difficulty_meter(difficulty: u32) -> String
{
    let filled = (difficulty.min(100) as usize * METER_WIDTH) / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(METER_WIDTH - filled))
}

fn swatch(color: Rgb, width: usize) -> String
{
    format!("{}{}\x1b[0m", ansi_bg(color), " ".repeat(width))
}

fn labeled_swatch(color: Rgb, width: usize, mark: char) -> String
{
    let left = width.saturating_sub(1) / 2;
    let right = width.saturating_sub(left + 1);
    format!(
        "{}{}{}{}{}\x1b[0m",
        ansi_bg(color),
        ansi_fg(contrast(color)),
        " ".repeat(left),
        mark,
        " ".repeat(right)
    )
}

// black text on light swatches, white on dark
fn contrast(color: Rgb) -> Rgb
{
    let luma = 0.299 * color.r as f32 + 0.587 * color.g as f32 + 0.114 * color.b as f32;
    if luma > 140.0 {
        Rgb::new(0, 0, 0)
    } else {
        Rgb::new(255, 255, 255)
    }
}

fn ansi_bg(color: Rgb) -> String
{
    format!("\x1b[48;2;{};{};{}m", color.r, color.g, color.b)
}

fn ansi_fg(color: Rgb) -> String
{
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::engine::palette::{generate_palette, ScriptedSource};
    use crate::engine::{EngineSettings, PICK_PAUSE};

    fn key(code: KeyCode) -> KeyEvent
    {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn gray_palette_values() -> Vec<i32>
    {
        let mut values = vec![120, 120, 120];
        values.extend(std::iter::repeat(0).take(27));
        values.push(4);
        values
    }

    fn gray_palette() -> Palette
    {
        generate_palette(1, 3, &mut ScriptedSource::new(gray_palette_values()))
    }

    #[test]
    fn keys_map_to_inputs()
    {
        assert_eq!(map_key(key(KeyCode::Esc), 3), Some(Input::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), 3),
            Some(Input::Quit)
        );
        assert_eq!(map_key(key(KeyCode::Left), 3), Some(Input::Move(-1, 0)));
        assert_eq!(map_key(key(KeyCode::Char('j')), 3), Some(Input::Move(0, 1)));
        assert_eq!(map_key(key(KeyCode::Enter), 3), Some(Input::PickCursor));
        assert_eq!(map_key(key(KeyCode::Char('r')), 3), Some(Input::Restart));
        assert_eq!(map_key(key(KeyCode::Tab), 3), None);
    }

    #[test]
    fn digits_pick_directly_on_small_grids_only()
    {
        assert_eq!(map_key(key(KeyCode::Char('1')), 3), Some(Input::PickIndex(0)));
        assert_eq!(map_key(key(KeyCode::Char('9')), 3), Some(Input::PickIndex(8)));
        assert_eq!(map_key(key(KeyCode::Char('0')), 3), None);
        assert_eq!(map_key(key(KeyCode::Char('5')), 4), None);
    }

    #[test]
    fn controls_hint_matches_key_map()
    {
        let small = controls_hint(3);
        assert!(small.contains("1-9 direct pick"));
        assert!(small.contains("q/ESC to quit"));

        let large = controls_hint(4);
        assert!(!large.contains("1-9"));
        assert!(large.contains("q/ESC to quit"));

        assert_eq!(map_key(key(KeyCode::Char('q')), 4), Some(Input::Quit));
        assert_eq!(map_key(key(KeyCode::Char('1')), 4), None);
    }

    #[test]
    fn cursor_stays_inside_the_grid()
    {
        assert_eq!(move_cursor(0, 3, -1, 0), 0);
        assert_eq!(move_cursor(0, 3, 1, 0), 1);
        assert_eq!(move_cursor(2, 3, 1, 0), 2);
        assert_eq!(move_cursor(2, 3, 0, 1), 5);
        assert_eq!(move_cursor(8, 3, 0, 1), 8);
        assert_eq!(move_cursor(15, 4, -1, -1), 10);
        assert_eq!(move_cursor(3, 0, 1, 1), 0);
    }

    #[test]
    fn combo_messages()
    {
        assert_eq!(
            pick_message(PickClass::Perfect, 3, 150),
            "Perfect Match! 3x Combo! +150 bonus!"
        );
        assert_eq!(pick_message(PickClass::Close, 2, 30), "Close enough! 2x Combo! +30 bonus!");
        assert_eq!(pick_message(PickClass::Wrong, 0, 0), "Game Over!");
    }

    #[test]
    fn view_tracks_round_feedback()
    {
        let mut view = View::default();
        view.cursor = 20;
        view.apply(DisplayUpdate::Round(gray_palette()));
        assert_eq!(view.cursor, 8);
        assert_eq!(view.grid_size(), 3);

        view.apply(DisplayUpdate::Feedback(Feedback::Pick {
            index: 4,
            class: PickClass::Perfect,
            distance: 0.0,
            streak: 1,
            bonus: 50,
        }));
        assert_eq!(view.marked, Some((4, PickClass::Perfect)));
        assert!(view.message.starts_with("Perfect Match!"));

        view.apply(DisplayUpdate::TimeWarning);
        assert!(view.time_warning);
        view.apply(DisplayUpdate::Round(gray_palette()));
        assert!(!view.time_warning);
        assert_eq!(view.marked, None);
    }

    #[test]
    fn schedule_follows_engine_updates()
    {
        let (mut engine, updates) = RoundEngine::start(
            ScriptedSource::new(gray_palette_values()),
            EngineSettings::default(),
        );
        let mut view = View::default();
        let mut schedule = Schedule::default();
        let now = Instant::now();

        dispatch(&mut view, &mut schedule, updates, now);
        assert_eq!(schedule.next_tick, Some(now + SECOND));
        assert_eq!(schedule.next_round, None);

        let updates = engine.pick(4).unwrap();
        dispatch(&mut view, &mut schedule, updates, now);
        assert_eq!(schedule.next_tick, None);
        assert_eq!(schedule.next_round, Some(now + PICK_PAUSE));
        assert!(view.message.contains("Next round in 1.0s"));
    }

    #[test]
    fn game_over_clears_the_schedule()
    {
        let mut view = View::default();
        let mut schedule = Schedule {
            next_tick: Some(Instant::now()),
            next_round: None,
        };
        let summary = GameSummary {
            score: 10,
            highest_streak: 1,
            perfect_picks: 0,
            level: 2,
        };
        dispatch(&mut view, &mut schedule, vec![DisplayUpdate::GameOver(summary)], Instant::now());
        assert_eq!(schedule.next_tick, None);
        assert_eq!(view.summary, Some(summary));
    }

    #[test]
    fn grid_rows_mark_cursor_and_pick()
    {
        let palette = gray_palette();
        let lines = render_grid(&palette, 1, Some((4, PickClass::Close)));
        assert_eq!(lines.len(), 6);
        // escape sequences contain '[' but never ']'
        assert!(lines[0].contains(']'));
        assert!(!lines[2].contains(']'));
        assert!(lines[3].contains('~'));
    }

    #[test]
    fn preview_lists_every_cell()
    {
        let lines = render_preview(&gray_palette());
        assert_eq!(lines.len(), 10);
        assert!(lines[0].starts_with("Grid 3x3"));
        assert!(lines[5].ends_with("<- target"));
        assert!(lines[1].contains("rgb(120, 120, 120)"));
    }

    #[test]
    fn meter_fills_proportionally()
    {
        assert_eq!(difficulty_meter(0), "-".repeat(20));
        assert_eq!(difficulty_meter(50), format!("{}{}", "#".repeat(10), "-".repeat(10)));
        assert_eq!(difficulty_meter(250), "#".repeat(20));
    }
}
