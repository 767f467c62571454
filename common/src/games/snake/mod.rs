mod bot_controller;
mod collision;
mod direction;
mod engine;
mod entity;
mod game_state;
mod grid;
mod mode;
mod progression;
mod session;
mod settings;
mod snapshot;
mod spawn;
mod types;

pub use bot_controller::{BotController, BotStrategy};
pub use collision::{Collision, classify};
pub use direction::{KeyEvent, PressedKeys, RawKey, resolve_heading};
pub use engine::{MAX_LEVEL, SnakeEngine, TickOutcome};
pub use entity::Snake;
pub use game_state::{SnakeGameState, TickEvent};
pub use grid::Grid;
pub use mode::{GameMode, ModeRules};
pub use progression::{count_down, ramp_difficulty, reaches_level_up, tick_interval};
pub use session::{InputState, MAX_PLAYERS, SessionController, SnakeSession, SnakeSessionState};
pub use settings::SnakeSettings;
pub use snapshot::{GameOverSummary, GameSnapshot, SnakeView};
pub use spawn::SpawnPlanner;
pub use types::{Cell, EndReason, GameStatus, Heading, Item, ItemKind, PowerUpType};
