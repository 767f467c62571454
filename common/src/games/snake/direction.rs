use serde::{Deserialize, Serialize};

use super::types::Heading;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawKey {
    Up,
    Down,
    Left,
    Right,
}

impl RawKey {
    /// Maps a platform key name to a directional key. Anything that is not an
    /// arrow (or its WASD twin) is not ours and yields `None`.
    pub fn from_key_name(name: &str) -> Option<RawKey> {
        match name {
            "ArrowUp" | "Up" | "up" | "w" | "W" => Some(RawKey::Up),
            "ArrowDown" | "Down" | "down" | "s" | "S" => Some(RawKey::Down),
            "ArrowLeft" | "Left" | "left" | "a" | "A" => Some(RawKey::Left),
            "ArrowRight" | "Right" | "right" | "d" | "D" => Some(RawKey::Right),
            _ => None,
        }
    }

    fn bit(&self) -> u8 {
        match self {
            RawKey::Up => 0b0001,
            RawKey::Down => 0b0010,
            RawKey::Left => 0b0100,
            RawKey::Right => 0b1000,
        }
    }
}

impl From<Heading> for PressedKeys {
    fn from(heading: Heading) -> Self {
        let keys: &[RawKey] = match heading {
            Heading::Up => &[RawKey::Up],
            Heading::Down => &[RawKey::Down],
            Heading::Left => &[RawKey::Left],
            Heading::Right => &[RawKey::Right],
            Heading::UpLeft => &[RawKey::Up, RawKey::Left],
            Heading::UpRight => &[RawKey::Up, RawKey::Right],
            Heading::DownLeft => &[RawKey::Down, RawKey::Left],
            Heading::DownRight => &[RawKey::Down, RawKey::Right],
        };
        PressedKeys::from_keys(keys)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Press(RawKey),
    Release(RawKey),
}

/// The set of directional keys currently held down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PressedKeys(u8);

impl PressedKeys {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn from_keys(keys: &[RawKey]) -> Self {
        let mut pressed = Self::new();
        for key in keys {
            pressed.press(*key);
        }
        pressed
    }

    pub fn press(&mut self, key: RawKey) {
        self.0 |= key.bit();
    }

    pub fn release(&mut self, key: RawKey) {
        self.0 &= !key.bit();
    }

    pub fn apply(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Press(key) => self.press(key),
            KeyEvent::Release(key) => self.release(key),
        }
    }

    pub fn contains(&self, key: RawKey) -> bool {
        self.0 & key.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

/// Resolves the held keys into the heading to commit for the next tick.
///
/// Opposite keys on one axis cancel out. With two orthogonal keys held the
/// result is a diagonal when `allow_diagonals` is set; otherwise the key that
/// turns off the committed axis wins. A reversal of `committed` is refused,
/// and nothing else is.
pub fn resolve_heading(
    pressed: PressedKeys,
    committed: Heading,
    allow_diagonals: bool,
) -> Option<Heading> {
    let vertical = match (pressed.contains(RawKey::Up), pressed.contains(RawKey::Down)) {
        (true, false) => Some(Heading::Up),
        (false, true) => Some(Heading::Down),
        _ => None,
    };
    let horizontal = match (pressed.contains(RawKey::Left), pressed.contains(RawKey::Right)) {
        (true, false) => Some(Heading::Left),
        (false, true) => Some(Heading::Right),
        _ => None,
    };

    let candidate = match (vertical, horizontal) {
        (None, None) => return None,
        (Some(v), None) => v,
        (None, Some(h)) => h,
        (Some(v), Some(h)) if allow_diagonals => diagonal(v, h),
        (Some(v), Some(h)) => {
            let (committed_dx, _) = committed.delta();
            if committed_dx == 0 { h } else { v }
        }
    };

    if candidate.is_opposite(&committed) {
        None
    } else {
        Some(candidate)
    }
}

fn diagonal(vertical: Heading, horizontal: Heading) -> Heading {
    match (vertical, horizontal) {
        (Heading::Up, Heading::Left) => Heading::UpLeft,
        (Heading::Up, _) => Heading::UpRight,
        (_, Heading::Left) => Heading::DownLeft,
        _ => Heading::DownRight,
    }
}
