//! Orders and their resolution status.
//!
//! Every order names the unit it commands and the location it is issued
//! from. Supports and convoys name the supported or convoyed unit by its
//! location (the midpoint), never by reference.

use serde::{Deserialize, Serialize};

use super::location::Location;
use super::unit::UnitId;

/// The variant-specific part of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderKind {
    Hold,
    Move {
        destination: Location,
    },
    /// Support to hold when `midpoint == destination`.
    Support {
        midpoint: Location,
        destination: Location,
    },
    Convoy {
        midpoint: Location,
        destination: Location,
    },
    Build,
    Disband,
}

impl OrderKind {
    pub const fn name(&self) -> &'static str {
        match self {
            OrderKind::Hold => "Hold",
            OrderKind::Move { .. } => "Move",
            OrderKind::Support { .. } => "Support",
            OrderKind::Convoy { .. } => "Convoy",
            OrderKind::Build => "Build",
            OrderKind::Disband => "Disband",
        }
    }

    pub const fn destination(&self) -> Option<Location> {
        match *self {
            OrderKind::Move { destination }
            | OrderKind::Support { destination, .. }
            | OrderKind::Convoy { destination, .. } => Some(destination),
            _ => None,
        }
    }

    pub const fn midpoint(&self) -> Option<Location> {
        match *self {
            OrderKind::Support { midpoint, .. } | OrderKind::Convoy { midpoint, .. } => {
                Some(midpoint)
            }
            _ => None,
        }
    }

    /// Hold, move, support and convoy: the orders the movement resolver handles.
    pub const fn is_movement(&self) -> bool {
        matches!(
            self,
            OrderKind::Hold | OrderKind::Move { .. } | OrderKind::Support { .. } | OrderKind::Convoy { .. }
        )
    }
}

/// Resolution status of an order.
///
/// Movement orders go from `New` to `Success`, `Failure` or `Invalid`;
/// retreat orders follow the parallel `Retreat*` track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    New,
    Success,
    Failure,
    Invalid,
    RetreatNew,
    RetreatSuccess,
    RetreatFailure,
    RetreatInvalid,
}

impl OrderStatus {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::New | OrderStatus::RetreatNew)
    }

    pub const fn is_retreat(self) -> bool {
        matches!(
            self,
            OrderStatus::RetreatNew
                | OrderStatus::RetreatSuccess
                | OrderStatus::RetreatFailure
                | OrderStatus::RetreatInvalid
        )
    }

    /// Success on either track.
    pub const fn is_success(self) -> bool {
        matches!(self, OrderStatus::Success | OrderStatus::RetreatSuccess)
    }
}

/// Provable bounds on a strength while some contributions are undecided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OrderStrength {
    pub min: i32,
    pub max: i32,
}

impl OrderStrength {
    pub const ZERO: OrderStrength = OrderStrength { min: 0, max: 0 };

    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: i32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub const fn is_determined(self) -> bool {
        self.min == self.max
    }
}

/// An order issued to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Order {
    pub kind: OrderKind,
    /// For builds, the unit that would be created. It is not on any board.
    pub unit: UnitId,
    pub location: Location,
    pub status: OrderStatus,
}

impl Order {
    pub const fn new(kind: OrderKind, unit: UnitId, location: Location) -> Self {
        Self {
            kind,
            unit,
            location,
            status: OrderStatus::New,
        }
    }

    pub const fn hold(unit: UnitId, location: Location) -> Self {
        Self::new(OrderKind::Hold, unit, location)
    }

    pub const fn movement(unit: UnitId, location: Location, destination: Location) -> Self {
        Self::new(OrderKind::Move { destination }, unit, location)
    }

    pub const fn support(unit: UnitId, location: Location, midpoint: Location, destination: Location) -> Self {
        Self::new(
            OrderKind::Support {
                midpoint,
                destination,
            },
            unit,
            location,
        )
    }

    pub const fn convoy(unit: UnitId, location: Location, midpoint: Location, destination: Location) -> Self {
        Self::new(
            OrderKind::Convoy {
                midpoint,
                destination,
            },
            unit,
            location,
        )
    }

    pub const fn build(unit: UnitId, location: Location) -> Self {
        Self::new(OrderKind::Build, unit, location)
    }

    pub const fn disband(unit: UnitId, location: Location) -> Self {
        Self::new(OrderKind::Disband, unit, location)
    }

    pub const fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub const fn is_move(&self) -> bool {
        matches!(self.kind, OrderKind::Move { .. })
    }

    pub const fn is_retreat(&self) -> bool {
        self.status.is_retreat()
    }

    pub const fn destination(&self) -> Option<Location> {
        self.kind.destination()
    }

    pub const fn midpoint(&self) -> Option<Location> {
        self.kind.midpoint()
    }
}
