use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::settings::SnakeSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    Classic,
    NoBorders,
    Hardcore,
    TimeAttack,
    Survival,
    Multiplayer,
    PowerUps,
}

impl GameMode {
    pub const ALL: [GameMode; 7] = [
        GameMode::Classic,
        GameMode::NoBorders,
        GameMode::Hardcore,
        GameMode::TimeAttack,
        GameMode::Survival,
        GameMode::Multiplayer,
        GameMode::PowerUps,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::NoBorders => "no-borders",
            GameMode::Hardcore => "hardcore",
            GameMode::TimeAttack => "time-attack",
            GameMode::Survival => "survival",
            GameMode::Multiplayer => "multiplayer",
            GameMode::PowerUps => "power-ups",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        GameMode::ALL
            .into_iter()
            .find(|mode| mode.name() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = GameMode::ALL.iter().map(|m| m.name()).collect();
                format!("Unknown game mode '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

/// Everything that differs between modes, resolved once at game start.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeRules {
    pub mode: GameMode,
    pub wrap: bool,
    pub base_tick_interval: Duration,
    pub min_tick_interval: Duration,
    /// Interval shaved off per level; `None` keeps the pace fixed.
    pub level_speedup: Option<Duration>,
    pub speed_boost_factor: f32,
    pub speed_boost_duration: Duration,
    pub uses_time_limit: bool,
    pub time_limit_ticks: u32,
    pub time_bonus_ticks: u32,
    pub uses_difficulty_ramp: bool,
    pub difficulty_per_tick: f32,
    pub difficulty_per_food: f32,
    pub spawns_power_ups: bool,
    pub spawns_obstacles: bool,
    pub power_up_ttl_ticks: Option<u32>,
    pub player_count: usize,
    pub allows_diagonals: bool,
    pub score_per_level: Option<u32>,
}

impl ModeRules {
    pub fn for_mode(mode: GameMode, settings: &SnakeSettings) -> Self {
        let mut rules = Self {
            mode,
            wrap: false,
            base_tick_interval: settings.base_tick_interval(),
            min_tick_interval: settings.min_tick_interval(),
            level_speedup: Some(Duration::from_millis(settings.level_speedup_ms)),
            speed_boost_factor: settings.speed_boost_factor,
            speed_boost_duration: settings.speed_boost_duration(),
            uses_time_limit: false,
            time_limit_ticks: settings.time_limit_ticks,
            time_bonus_ticks: settings.time_bonus_ticks,
            uses_difficulty_ramp: false,
            difficulty_per_tick: settings.difficulty_per_tick,
            difficulty_per_food: settings.difficulty_per_food,
            spawns_power_ups: false,
            spawns_obstacles: false,
            power_up_ttl_ticks: settings.power_up_ttl_ticks,
            player_count: 1,
            allows_diagonals: settings.allow_diagonals,
            score_per_level: Some(settings.score_per_level),
        };

        match mode {
            GameMode::Classic => {}
            GameMode::NoBorders => {
                rules.wrap = true;
            }
            GameMode::Hardcore => {
                rules.base_tick_interval /= 2;
                rules.min_tick_interval = rules.min_tick_interval.min(rules.base_tick_interval);
            }
            GameMode::TimeAttack => {
                rules.uses_time_limit = true;
                rules.level_speedup = None;
                rules.score_per_level = None;
            }
            GameMode::Survival => {
                rules.uses_difficulty_ramp = true;
                rules.spawns_obstacles = true;
                rules.level_speedup = None;
                rules.score_per_level = None;
            }
            GameMode::Multiplayer => {
                rules.player_count = 2;
            }
            GameMode::PowerUps => {
                rules.spawns_power_ups = true;
                rules.spawns_obstacles = true;
            }
        }

        rules
    }
}
