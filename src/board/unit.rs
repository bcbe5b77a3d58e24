//! Nations, unit types, and the units themselves.
//!
//! Units live in the world's unit arena and are referred to by [`UnitId`].
//! A unit belongs to exactly one board; carrying it into the next board
//! creates a new arena entry at the new coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::location::Location;

/// One of the seven great powers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Nation {
    England,
    Germany,
    Russia,
    Turkey,
    Austria,
    Italy,
    France,
}

pub const ALL_NATIONS: [Nation; 7] = [
    Nation::England,
    Nation::Germany,
    Nation::Russia,
    Nation::Turkey,
    Nation::Austria,
    Nation::Italy,
    Nation::France,
];

impl fmt::Display for Nation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitType {
    Army,
    Fleet,
}

/// Index of a unit in the world's unit arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub usize);

/// A military unit on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Unit {
    pub owner: Nation,
    pub unit_type: UnitType,
    pub location: Location,
    /// Set when the unit was dislodged and has not retreated yet.
    pub must_retreat: bool,
}

impl Unit {
    pub const fn new(owner: Nation, unit_type: UnitType, location: Location) -> Self {
        Self {
            owner,
            unit_type,
            location,
            must_retreat: false,
        }
    }

    pub const fn army(owner: Nation, location: Location) -> Self {
        Self::new(owner, UnitType::Army, location)
    }

    pub const fn fleet(owner: Nation, location: Location) -> Self {
        Self::new(owner, UnitType::Fleet, location)
    }

    pub const fn is_army(&self) -> bool {
        matches!(self.unit_type, UnitType::Army)
    }

    pub const fn is_fleet(&self) -> bool {
        matches!(self.unit_type, UnitType::Fleet)
    }

    /// A copy of this unit standing at `location`, no longer retreating.
    pub const fn relocated(&self, location: Location) -> Unit {
        Unit::new(self.owner, self.unit_type, location)
    }
}
