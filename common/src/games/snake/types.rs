use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Screen convention: `y` grows downwards, so `Up` is `dy = -1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Heading {
    pub const CARDINALS: [Heading; 4] = [Heading::Up, Heading::Down, Heading::Left, Heading::Right];

    pub const ALL: [Heading; 8] = [
        Heading::Up,
        Heading::Down,
        Heading::Left,
        Heading::Right,
        Heading::UpLeft,
        Heading::UpRight,
        Heading::DownLeft,
        Heading::DownRight,
    ];

    pub fn opposite(&self) -> Heading {
        match self {
            Heading::Up => Heading::Down,
            Heading::Down => Heading::Up,
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
            Heading::UpLeft => Heading::DownRight,
            Heading::UpRight => Heading::DownLeft,
            Heading::DownLeft => Heading::UpRight,
            Heading::DownRight => Heading::UpLeft,
        }
    }

    pub fn is_opposite(&self, other: &Heading) -> bool {
        self.opposite() == *other
    }

    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            Heading::UpLeft | Heading::UpRight | Heading::DownLeft | Heading::DownRight
        )
    }

    /// Integer step per tick. Diagonals move one whole cell on each axis.
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Heading::Up => (0, -1),
            Heading::Down => (0, 1),
            Heading::Left => (-1, 0),
            Heading::Right => (1, 0),
            Heading::UpLeft => (-1, -1),
            Heading::UpRight => (1, -1),
            Heading::DownLeft => (-1, 1),
            Heading::DownRight => (1, 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpType {
    Speed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Food,
    PowerUp(PowerUpType),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub position: Cell,
    pub kind: ItemKind,
    /// Remaining ticks before the item disappears; `None` never expires.
    pub ttl: Option<u32>,
}

impl Item {
    pub fn food(position: Cell) -> Self {
        Self {
            position,
            kind: ItemKind::Food,
            ttl: None,
        }
    }

    pub fn power_up(position: Cell, power_up: PowerUpType, ttl: Option<u32>) -> Self {
        Self {
            position,
            kind: ItemKind::PowerUp(power_up),
            ttl,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    Wall,
    SelfCollision,
    ObstacleCollision,
    OtherSnakeCollision,
    TimeExpired,
    /// No free cell left for food: the board is full, which ends the game as a win.
    BoardFilled,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EndReason::Wall => "hit a wall",
            EndReason::SelfCollision => "ran into itself",
            EndReason::ObstacleCollision => "hit an obstacle",
            EndReason::OtherSnakeCollision => "ran into the other snake",
            EndReason::TimeExpired => "time expired",
            EndReason::BoardFilled => "board filled",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Running,
    GameOver(EndReason),
}

impl GameStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, GameStatus::Running)
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        match self {
            GameStatus::Running => None,
            GameStatus::GameOver(reason) => Some(*reason),
        }
    }
}
