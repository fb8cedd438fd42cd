use super::color::PickClass;

const PERFECT_LEVEL_POINTS: f64 = 100.0;
const PERFECT_STREAK_FACTOR: f64 = 0.5;
const PERFECT_STREAK_POINTS: f64 = 100.0;
const CLOSE_LEVEL_POINTS: f64 = 50.0;
const CLOSE_STREAK_FACTOR: f64 = 0.3;
const CLOSE_STREAK_POINTS: f64 = 50.0;
const CLOSE_RANGE: f64 = 10.0;

pub const PERFECT_ACCURACY_GAIN: f64 = 5.0;
pub const CLOSE_ACCURACY_LOSS: f64 = 5.0;
pub const WRONG_ACCURACY_LOSS: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickScore
{
    pub score_delta: u64,
    pub streak_bonus: u64,
    pub new_streak: u32,
    pub accuracy_delta: f64,
}

/// Scores one pick. The float expressions keep the operand order of the
/// published formulas so floors land on the same integers.
pub fn evaluate_pick(class: PickClass, distance: f64, level: u32, streak: u32) -> PickScore
{
    match class {
        PickClass::Perfect => {
            let new_streak = streak.saturating_add(1);
            let streak_bonus =
                (new_streak as f64 * PERFECT_STREAK_FACTOR * PERFECT_STREAK_POINTS).floor();
            let base = PERFECT_LEVEL_POINTS * level as f64;
            PickScore {
                score_delta: to_points(base + streak_bonus),
                streak_bonus: to_points(streak_bonus),
                new_streak,
                accuracy_delta: PERFECT_ACCURACY_GAIN,
            }
        }
        PickClass::Close => {
            let new_streak = streak.saturating_add(1);
            let streak_bonus =
                (new_streak as f64 * CLOSE_STREAK_FACTOR * CLOSE_STREAK_POINTS).floor();
            let base = (CLOSE_LEVEL_POINTS * level as f64 * (1.0 - distance / CLOSE_RANGE)).floor();
            PickScore {
                score_delta: to_points(base) + to_points(streak_bonus),
                streak_bonus: to_points(streak_bonus),
                new_streak,
                accuracy_delta: -CLOSE_ACCURACY_LOSS,
            }
        }
        PickClass::Wrong => PickScore {
            score_delta: 0,
            streak_bonus: 0,
            new_streak: 0,
            accuracy_delta: -WRONG_ACCURACY_LOSS,
        },
    }
}

// negative or NaN points never reach the score
fn to_points(value: f64) -> u64
{
    if value.is_nan() || value <= 0.0 {
        0
    } else {
        value as u64
    }
}

/// Applies an accuracy delta, keeping the result in [0, 100].
pub fn apply_accuracy(accuracy: f64, delta: f64) -> f64
{
    (accuracy + delta).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn first_perfect_pick_at_level_one()
    {
        let score = evaluate_pick(PickClass::Perfect, 0.0, 1, 0);
        assert_eq!(score.score_delta, 150);
        assert_eq!(score.streak_bonus, 50);
        assert_eq!(score.new_streak, 1);
        assert_eq!(score.accuracy_delta, 5.0);
    }

    #[test]
    fn close_pick_with_running_streak()
    {
        let score = evaluate_pick(PickClass::Close, 5.0, 2, 3);
        assert_eq!(score.score_delta, 110);
        assert_eq!(score.streak_bonus, 60);
        assert_eq!(score.new_streak, 4);
        assert_eq!(score.accuracy_delta, -5.0);
    }

    #[test]
    fn close_pick_base_shrinks_with_distance()
    {
        let near = evaluate_pick(PickClass::Close, 1.0, 4, 3);
        let far = evaluate_pick(PickClass::Close, 5.0, 4, 3);
        // base 180 vs 100, same bonus
        assert_eq!(near.score_delta - far.score_delta, 80);
    }

    #[test]
    fn close_bonus_floors_like_the_float_formula()
    {
        // 3 * 0.3 * 50 evaluates just below 45
        let score = evaluate_pick(PickClass::Close, 5.0, 1, 2);
        assert_eq!(score.streak_bonus, 44);
        assert_eq!(score.score_delta, 25 + 44);
    }

    #[test]
    fn wrong_pick_resets_everything()
    {
        let score = evaluate_pick(PickClass::Wrong, 42.0, 9, 17);
        assert_eq!(score.score_delta, 0);
        assert_eq!(score.new_streak, 0);
        assert_eq!(score.accuracy_delta, -10.0);
    }

    #[test]
    fn perfect_bonus_grows_with_streak()
    {
        let score = evaluate_pick(PickClass::Perfect, 0.0, 3, 5);
        assert_eq!(score.score_delta, 300 + 300);
    }

    #[test]
    fn accuracy_is_clamped()
    {
        assert_eq!(apply_accuracy(100.0, 5.0), 100.0);
        assert_eq!(apply_accuracy(98.0, 5.0), 100.0);
        assert_eq!(apply_accuracy(7.0, -10.0), 0.0);
        assert_eq!(apply_accuracy(50.0, -5.0), 45.0);
    }
}
