//! Coordinates in the multiverse.
//!
//! A board is identified by its timeline, year and phase. A location pins a
//! region onto one of those boards, so the same region on two boards gives
//! two distinct locations.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a region inside a [`RegionMap`](super::map::RegionMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u16);

impl RegionId {
    /// Returns the region's position in the map's region table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A season of the game year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    Spring,
    Fall,
    Winter,
}

impl Phase {
    /// Ordinal position within the year: Spring = 0, Fall = 1, Winter = 2.
    pub const fn index(self) -> i32 {
        match self {
            Phase::Spring => 0,
            Phase::Fall => 1,
            Phase::Winter => 2,
        }
    }

    /// Returns the phase that follows this one, wrapping Winter to Spring.
    pub const fn next(self) -> Phase {
        match self {
            Phase::Spring => Phase::Fall,
            Phase::Fall => Phase::Winter,
            Phase::Winter => Phase::Spring,
        }
    }

    pub const fn is_winter(self) -> bool {
        matches!(self, Phase::Winter)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Spring => "Spring",
            Phase::Fall => "Fall",
            Phase::Winter => "Winter",
        };
        f.write_str(name)
    }
}

/// Identifies a single board: one timeline at one point in time.
///
/// Boards order by their position on the time axis first and by timeline
/// second, which is the order in which the executor advances them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardKey {
    pub timeline: i32,
    pub year: i32,
    pub phase: Phase,
}

impl BoardKey {
    pub const fn new(timeline: i32, year: i32, phase: Phase) -> Self {
        Self {
            timeline,
            year,
            phase,
        }
    }

    /// Position of this board along the time axis, ignoring its timeline.
    pub const fn ordinal(self) -> i32 {
        3 * self.year + self.phase.index()
    }

    /// The key of the board that follows this one in the same timeline.
    pub const fn next(self) -> BoardKey {
        match self.phase {
            Phase::Winter => BoardKey::new(self.timeline, self.year + 1, Phase::Spring),
            phase => BoardKey::new(self.timeline, self.year, phase.next()),
        }
    }

    /// Places a region on this board.
    pub const fn location(self, region: RegionId) -> Location {
        Location::new(self.timeline, self.year, self.phase, region)
    }
}

impl Ord for BoardKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ordinal()
            .cmp(&other.ordinal())
            .then(self.timeline.cmp(&other.timeline))
    }
}

impl PartialOrd for BoardKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{} {} {}", self.timeline, self.phase, self.year)
    }
}

/// A region on a specific board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub timeline: i32,
    pub year: i32,
    pub phase: Phase,
    pub region: RegionId,
}

impl Location {
    pub const fn new(timeline: i32, year: i32, phase: Phase, region: RegionId) -> Self {
        Self {
            timeline,
            year,
            phase,
            region,
        }
    }

    /// The board this location lies on.
    pub const fn board(self) -> BoardKey {
        BoardKey::new(self.timeline, self.year, self.phase)
    }

    /// The same board coordinates with a different region.
    pub const fn with_region(self, region: RegionId) -> Location {
        Location::new(self.timeline, self.year, self.phase, region)
    }

    /// True if both locations lie on the same board.
    pub fn same_board(self, other: Location) -> bool {
        self.board() == other.board()
    }
}
