//! World state: boards, the unit arena, and the order list.
//!
//! The world is a graph of boards keyed by `(timeline, year, phase)`. Boards
//! are never mutated into the future; advancing a board appends its
//! successor, and changing history appends a board in a new timeline.

use super::location::{BoardKey, Location, RegionId};
use super::order::{Order, OrderKind, OrderStatus};
use super::unit::{Nation, Unit, UnitId};

/// A supply centre and its current owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Centre {
    pub region: RegionId,
    pub owner: Option<Nation>,
}

/// A snapshot of one timeline at one year and phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub key: BoardKey,
    pub units: Vec<UnitId>,
    pub centres: Vec<Centre>,
    /// Timelines forked off from this board.
    pub child_timelines: Vec<i32>,
    /// Set when this board must be considered by the executor.
    pub might_advance: bool,
}

impl Board {
    pub fn new(key: BoardKey, centres: Vec<Centre>) -> Self {
        Self {
            key,
            units: Vec::new(),
            centres,
            child_timelines: Vec::new(),
            might_advance: false,
        }
    }

    pub fn location(&self, region: RegionId) -> Location {
        self.key.location(region)
    }

    pub fn centre(&self, region: RegionId) -> Option<&Centre> {
        self.centres.iter().find(|c| c.region == region)
    }

    /// Number of centres owned by `nation` on this board.
    pub fn centre_count(&self, nation: Nation) -> usize {
        self.centres.iter().filter(|c| c.owner == Some(nation)).count()
    }
}

/// The aggregate root owning every board, unit and order of a game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct World {
    pub boards: Vec<Board>,
    pub units: Vec<Unit>,
    pub orders: Vec<Order>,
    /// Number of adjudications run so far.
    pub iteration: u32,
    pub winner: Option<Nation>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self, key: BoardKey) -> Option<&Board> {
        self.boards.iter().find(|b| b.key == key)
    }

    pub fn board_mut(&mut self, key: BoardKey) -> Option<&mut Board> {
        self.boards.iter_mut().find(|b| b.key == key)
    }

    pub fn unit(&self, id: UnitId) -> &Unit {
        &self.units[id.0]
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut Unit {
        &mut self.units[id.0]
    }

    /// Adds a unit to the arena without placing it on a board.
    pub fn add_unit(&mut self, unit: Unit) -> UnitId {
        self.units.push(unit);
        UnitId(self.units.len() - 1)
    }

    /// Adds a unit to the arena and lists it on the board at its location.
    ///
    /// Returns `None` when that board does not exist.
    pub fn place_unit(&mut self, unit: Unit) -> Option<UnitId> {
        let key = unit.location.board();
        let index = self.boards.iter().position(|b| b.key == key)?;
        let id = self.add_unit(unit);
        self.boards[index].units.push(id);
        Some(id)
    }

    pub fn add_order(&mut self, order: Order) -> usize {
        self.orders.push(order);
        self.orders.len() - 1
    }

    /// A board is active when no later board exists in its timeline.
    pub fn is_active(&self, key: BoardKey) -> bool {
        !self
            .boards
            .iter()
            .any(|b| b.key.timeline == key.timeline && b.key.ordinal() > key.ordinal())
    }

    pub fn active_boards(&self) -> impl Iterator<Item = &Board> + '_ {
        self.boards.iter().filter(|b| self.is_active(b.key))
    }

    /// True while any unit on any board still has to retreat.
    pub fn has_retreats(&self) -> bool {
        self.boards
            .iter()
            .flat_map(|b| b.units.iter())
            .any(|&id| self.unit(id).must_retreat)
    }

    /// Units listed on the board with the given key.
    pub fn board_units(&self, key: BoardKey) -> impl Iterator<Item = (UnitId, &Unit)> + '_ {
        self.board(key)
            .into_iter()
            .flat_map(|b| b.units.iter())
            .map(move |&id| (id, self.unit(id)))
    }

    /// The unit standing exactly at `location`, if any.
    pub fn unit_at(&self, location: Location) -> Option<UnitId> {
        self.board_units(location.board())
            .find(|(_, u)| u.location == location)
            .map(|(id, _)| id)
    }

    /// Orders issued to `unit`, in submission order.
    pub fn orders_for(&self, unit: UnitId) -> impl Iterator<Item = &Order> + '_ {
        self.orders.iter().filter(move |o| o.unit == unit)
    }

    /// True if the unit left its square: a successful move or disband.
    pub fn has_left(&self, unit: UnitId) -> bool {
        self.orders_for(unit).any(|o| {
            o.status.is_success() && (o.is_move() || matches!(o.kind, OrderKind::Disband))
        })
    }

    /// True if the unit moved away successfully.
    pub fn has_moved(&self, unit: UnitId) -> bool {
        self.orders_for(unit)
            .any(|o| o.is_move() && o.status == OrderStatus::Success)
    }

    /// The most recent board of a timeline.
    pub fn latest_board(&self, timeline: i32) -> Option<&Board> {
        self.boards
            .iter()
            .filter(|b| b.key.timeline == timeline)
            .max_by_key(|b| b.key.ordinal())
    }
}
