//! Relative lane indicator.

use std::fmt;

/// Which lane, relative to a vehicle's current lane, an operation refers to.
///
/// A platoon overtakes to the `Left` and returns to the `Right`; `Same` is
/// the current lane.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    #[default]
    Left,
    Right,
    Same,
}

impl Direction {
    /// Swap left and right.  `Same` maps to `Left`.
    #[inline]
    pub fn flip(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            _ => Direction::Left,
        }
    }

    /// Lane index delta: `+1` left, `-1` right, `0` same.
    #[inline]
    pub fn signed_step(self) -> i32 {
        match self {
            Direction::Left  => 1,
            Direction::Right => -1,
            Direction::Same  => 0,
        }
    }

    /// One-letter label used in area names (`FL`, `RR`, …).
    pub fn short(self) -> char {
        match self {
            Direction::Left  => 'L',
            Direction::Right => 'R',
            Direction::Same  => 'S',
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left  => "left",
            Direction::Right => "right",
            Direction::Same  => "same",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
