use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Validate;
use super::grid::Grid;
use super::types::Cell;

/// Tunables shared by every mode. Missing YAML keys fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeSettings {
    pub grid_width: u32,
    pub grid_height: u32,
    pub base_tick_interval_ms: u64,
    pub min_tick_interval_ms: u64,
    pub level_speedup_ms: u64,
    pub speed_boost_factor: f32,
    pub speed_boost_duration_ms: u64,
    pub time_limit_ticks: u32,
    pub time_bonus_ticks: u32,
    pub difficulty_per_tick: f32,
    pub difficulty_per_food: f32,
    pub score_per_level: u32,
    pub power_up_ttl_ticks: Option<u32>,
    pub allow_diagonals: bool,
    pub initial_food: Option<Cell>,
}

impl Default for SnakeSettings {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            base_tick_interval_ms: 200,
            min_tick_interval_ms: 40,
            level_speedup_ms: 5,
            speed_boost_factor: 2.0,
            speed_boost_duration_ms: 5000,
            time_limit_ticks: 300,
            time_bonus_ticks: 5,
            difficulty_per_tick: 0.01,
            difficulty_per_food: 0.5,
            score_per_level: 5,
            power_up_ttl_ticks: Some(50),
            allow_diagonals: false,
            initial_food: None,
        }
    }
}

impl SnakeSettings {
    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width as i32, self.grid_height as i32)
    }

    pub fn base_tick_interval(&self) -> Duration {
        Duration::from_millis(self.base_tick_interval_ms)
    }

    pub fn min_tick_interval(&self) -> Duration {
        Duration::from_millis(self.min_tick_interval_ms)
    }

    pub fn speed_boost_duration(&self) -> Duration {
        Duration::from_millis(self.speed_boost_duration_ms)
    }
}

impl Validate for SnakeSettings {
    fn validate(&self) -> Result<(), String> {
        if !(5..=200).contains(&self.grid_width) {
            return Err("Grid width must be between 5 and 200".to_string());
        }
        if !(5..=200).contains(&self.grid_height) {
            return Err("Grid height must be between 5 and 200".to_string());
        }
        if !(20..=5000).contains(&self.base_tick_interval_ms) {
            return Err("Base tick interval must be between 20ms and 5000ms".to_string());
        }
        if self.min_tick_interval_ms == 0 || self.min_tick_interval_ms > self.base_tick_interval_ms {
            return Err("Minimum tick interval must be positive and not above the base interval".to_string());
        }
        if !(self.speed_boost_factor >= 1.0 && self.speed_boost_factor <= 10.0) {
            return Err("Speed boost factor must be between 1.0 and 10.0".to_string());
        }
        if self.time_limit_ticks == 0 {
            return Err("Time limit must be at least one tick".to_string());
        }
        if self.score_per_level == 0 {
            return Err("Score per level must be at least 1".to_string());
        }
        if !(self.difficulty_per_tick >= 0.0 && self.difficulty_per_food >= 0.0) {
            return Err("Difficulty increments must not be negative".to_string());
        }
        if self.power_up_ttl_ticks == Some(0) {
            return Err("Power-up lifetime must be at least one tick".to_string());
        }
        if let Some(food) = self.initial_food
            && !self.grid().contains(food)
        {
            return Err(format!("Initial food {} is outside the grid", food));
        }
        Ok(())
    }
}
