use std::time::Duration;

use super::mode::ModeRules;

/// True when `score` has just landed on a level threshold.
pub fn reaches_level_up(score: u32, rules: &ModeRules) -> bool {
    match rules.score_per_level {
        Some(step) if step > 0 => score > 0 && score % step == 0,
        _ => false,
    }
}

/// `base - level * speedup`, divided by the boost factor while boosted, and
/// never below the mode's minimum interval.
pub fn tick_interval(rules: &ModeRules, level: u32, speed_boost_active: bool) -> Duration {
    let mut interval = match rules.level_speedup {
        Some(speedup) => rules.base_tick_interval.saturating_sub(speedup * level),
        None => rules.base_tick_interval,
    };

    if speed_boost_active && rules.speed_boost_factor > 1.0 {
        interval = interval.div_f32(rules.speed_boost_factor);
    }

    interval.max(rules.min_tick_interval)
}

/// Burns one tick off the clock and credits the bonus for every food eaten.
pub fn count_down(time_left: u32, foods_eaten: u32, rules: &ModeRules) -> u32 {
    time_left
        .saturating_sub(1)
        .saturating_add(rules.time_bonus_ticks.saturating_mul(foods_eaten))
}

pub fn ramp_difficulty(difficulty: f32, foods_eaten: u32, rules: &ModeRules) -> f32 {
    difficulty + rules.difficulty_per_tick + rules.difficulty_per_food * foods_eaten as f32
}
