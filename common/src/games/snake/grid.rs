use serde::{Deserialize, Serialize};

use super::types::{Cell, EndReason, Heading};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    pub fn wrap(&self, cell: Cell) -> Cell {
        Cell::new(cell.x.rem_euclid(self.width), cell.y.rem_euclid(self.height))
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }

    /// Row-major walk over every cell.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x, y)))
    }

    pub fn center(&self) -> Cell {
        Cell::new(self.width / 2, self.height / 2)
    }

    /// Moves `head` one step along `heading`. A bounded grid refuses steps
    /// that leave it; a toroidal one re-enters from the opposite edge.
    pub fn advance(&self, head: Cell, heading: Heading, wrap: bool) -> Result<Cell, EndReason> {
        let (dx, dy) = heading.delta();
        let next = head.offset(dx, dy);

        if wrap {
            Ok(self.wrap(next))
        } else if self.contains(next) {
            Ok(next)
        } else {
            Err(EndReason::Wall)
        }
    }
}
