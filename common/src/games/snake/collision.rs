use std::collections::HashSet;

use super::types::{Cell, EndReason};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Collision {
    None,
    Obstacle,
    SelfBody,
    OtherSnake,
}

impl Collision {
    pub fn end_reason(&self) -> Option<EndReason> {
        match self {
            Collision::None => None,
            Collision::Obstacle => Some(EndReason::ObstacleCollision),
            Collision::SelfBody => Some(EndReason::SelfCollision),
            Collision::OtherSnake => Some(EndReason::OtherSnakeCollision),
        }
    }
}

/// Classifies the cell a head is about to enter. Walls are not checked here.
///
/// `own_body` is the snake's occupancy before the move, old head included.
/// `vacated_tail` is the tail cell leaving this tick (`None` when the snake
/// grows), so following your own tail is legal. Obstacles win over self hits,
/// which win over hits on `other_bodies`.
pub fn classify(
    new_head: Cell,
    own_body: &HashSet<Cell>,
    vacated_tail: Option<Cell>,
    obstacles: &HashSet<Cell>,
    other_bodies: &[&HashSet<Cell>],
) -> Collision {
    if obstacles.contains(&new_head) {
        return Collision::Obstacle;
    }

    if own_body.contains(&new_head) && vacated_tail != Some(new_head) {
        return Collision::SelfBody;
    }

    if other_bodies.iter().any(|body| body.contains(&new_head)) {
        return Collision::OtherSnake;
    }

    Collision::None
}
