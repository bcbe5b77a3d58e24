//! JSON records for worlds and orders.
//!
//! Records name regions by their map code and units by owner and type, so a
//! world can be written out, edited by hand and read back against the same
//! region map. Field names are camelCase.

use serde::{Deserialize, Serialize};

use crate::board::{
    Board, BoardKey, Centre, Location, Nation, Order, OrderKind, OrderStatus, Phase, RegionMap, Unit, UnitType, World,
};

/// Errors raised while turning records back into a world.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown region {0}")]
    UnknownRegion(String),
    #[error("board {0} is listed twice")]
    DuplicateBoard(BoardKey),
    #[error("no board {0}")]
    UnknownBoard(BoardKey),
    #[error("no {owner} {unit_type:?} at {region} on {board}")]
    NoUnit {
        owner: Nation,
        unit_type: UnitType,
        region: String,
        board: BoardKey,
    },
    #[error("{0:?} order without a {1}")]
    MissingField(OrderType, &'static str),
}

/// The kind of an order, without its locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Hold,
    Move,
    Support,
    Convoy,
    Build,
    Disband,
}

impl From<&OrderKind> for OrderType {
    fn from(kind: &OrderKind) -> Self {
        match kind {
            OrderKind::Hold => OrderType::Hold,
            OrderKind::Move { .. } => OrderType::Move,
            OrderKind::Support { .. } => OrderType::Support,
            OrderKind::Convoy { .. } => OrderType::Convoy,
            OrderKind::Build => OrderType::Build,
            OrderKind::Disband => OrderType::Disband,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRecord {
    pub timeline: i32,
    pub year: i32,
    pub phase: Phase,
    pub region_id: String,
}

impl LocationRecord {
    pub fn from_location(map: &RegionMap, location: Location) -> Self {
        Self {
            timeline: location.timeline,
            year: location.year,
            phase: location.phase,
            region_id: map.code(location.region).to_string(),
        }
    }

    pub fn board(&self) -> BoardKey {
        BoardKey::new(self.timeline, self.year, self.phase)
    }

    pub fn to_location(&self, map: &RegionMap) -> Result<Location, RecordError> {
        let region = map
            .lookup(&self.region_id)
            .ok_or_else(|| RecordError::UnknownRegion(self.region_id.clone()))?;
        Ok(self.board().location(region))
    }
}

/// The unit an order commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitRecord {
    pub owner: Nation,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardUnitRecord {
    pub region_id: String,
    pub owner: Nation,
    #[serde(rename = "type")]
    pub unit_type: UnitType,
    #[serde(default)]
    pub must_retreat: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentreRecord {
    pub region_id: String,
    pub owner: Option<Nation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRecord {
    pub timeline: i32,
    pub year: i32,
    pub phase: Phase,
    pub centres: Vec<CentreRecord>,
    pub units: Vec<BoardUnitRecord>,
    #[serde(default)]
    pub child_timelines: Vec<i32>,
    #[serde(default)]
    pub might_advance: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default = "new_status")]
    pub status: OrderStatus,
    #[serde(default)]
    pub is_retreat: bool,
    pub unit: UnitRecord,
    pub location: LocationRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub midpoint: Option<LocationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<LocationRecord>,
}

fn new_status() -> OrderStatus {
    OrderStatus::New
}

impl OrderRecord {
    pub fn from_order(world: &World, map: &RegionMap, order: &Order) -> Self {
        let unit = world.unit(order.unit);
        let record = |location: Location| LocationRecord::from_location(map, location);
        Self {
            order_type: OrderType::from(&order.kind),
            status: order.status,
            is_retreat: order.status.is_retreat() || (order.status == OrderStatus::New && unit.must_retreat),
            unit: UnitRecord {
                owner: unit.owner,
                unit_type: unit.unit_type,
            },
            location: record(order.location),
            midpoint: order.midpoint().map(record),
            destination: order.destination().map(record),
        }
    }

    /// Rebuilds the order against `world`.
    ///
    /// The commanded unit must stand at the order's location, except for
    /// builds, which get a fresh unit that is not on any board yet.
    pub fn to_order(&self, world: &mut World, map: &RegionMap) -> Result<Order, RecordError> {
        let location = self.location.to_location(map)?;
        let field = |value: &Option<LocationRecord>, name: &'static str| -> Result<Location, RecordError> {
            value
                .as_ref()
                .ok_or(RecordError::MissingField(self.order_type, name))?
                .to_location(map)
        };

        let kind = match self.order_type {
            OrderType::Hold => OrderKind::Hold,
            OrderType::Move => OrderKind::Move {
                destination: field(&self.destination, "destination")?,
            },
            OrderType::Support => OrderKind::Support {
                midpoint: field(&self.midpoint, "midpoint")?,
                destination: field(&self.destination, "destination")?,
            },
            OrderType::Convoy => OrderKind::Convoy {
                midpoint: field(&self.midpoint, "midpoint")?,
                destination: field(&self.destination, "destination")?,
            },
            OrderType::Build => OrderKind::Build,
            OrderType::Disband => OrderKind::Disband,
        };

        let unit = if kind == OrderKind::Build {
            world.add_unit(Unit::new(self.unit.owner, self.unit.unit_type, location))
        } else {
            world
                .unit_at(location)
                .filter(|&id| {
                    let unit = world.unit(id);
                    unit.owner == self.unit.owner && unit.unit_type == self.unit.unit_type
                })
                .ok_or_else(|| RecordError::NoUnit {
                    owner: self.unit.owner,
                    unit_type: self.unit.unit_type,
                    region: self.location.region_id.clone(),
                    board: location.board(),
                })?
        };
        Ok(Order::new(kind, unit, location).with_status(self.status))
    }
}

/// A whole world: boards, units, orders and the game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldRecord {
    pub iteration: u32,
    #[serde(default)]
    pub winner: Option<Nation>,
    pub boards: Vec<BoardRecord>,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
}

impl WorldRecord {
    pub fn from_world(world: &World, map: &RegionMap) -> Self {
        let boards = world
            .boards
            .iter()
            .map(|board| BoardRecord {
                timeline: board.key.timeline,
                year: board.key.year,
                phase: board.key.phase,
                centres: board
                    .centres
                    .iter()
                    .map(|c| CentreRecord {
                        region_id: map.code(c.region).to_string(),
                        owner: c.owner,
                    })
                    .collect(),
                units: board
                    .units
                    .iter()
                    .map(|&id| {
                        let unit = world.unit(id);
                        BoardUnitRecord {
                            region_id: map.code(unit.location.region).to_string(),
                            owner: unit.owner,
                            unit_type: unit.unit_type,
                            must_retreat: unit.must_retreat,
                        }
                    })
                    .collect(),
                child_timelines: board.child_timelines.clone(),
                might_advance: board.might_advance,
            })
            .collect();
        let orders = world
            .orders
            .iter()
            .map(|order| OrderRecord::from_order(world, map, order))
            .collect();

        Self {
            iteration: world.iteration,
            winner: world.winner,
            boards,
            orders,
        }
    }

    pub fn to_world(&self, map: &RegionMap) -> Result<World, RecordError> {
        let region = |code: &str| map.lookup(code).ok_or_else(|| RecordError::UnknownRegion(code.to_string()));

        let mut world = World::new();
        world.iteration = self.iteration;
        world.winner = self.winner;
        for record in &self.boards {
            let key = BoardKey::new(record.timeline, record.year, record.phase);
            if world.board(key).is_some() {
                return Err(RecordError::DuplicateBoard(key));
            }
            let centres = record
                .centres
                .iter()
                .map(|c| {
                    Ok(Centre {
                        region: region(&c.region_id)?,
                        owner: c.owner,
                    })
                })
                .collect::<Result<Vec<_>, RecordError>>()?;
            let mut board = Board::new(key, centres);
            board.child_timelines = record.child_timelines.clone();
            board.might_advance = record.might_advance;
            world.boards.push(board);

            for unit in &record.units {
                let mut placed = Unit::new(unit.owner, unit.unit_type, key.location(region(&unit.region_id)?));
                placed.must_retreat = unit.must_retreat;
                world.place_unit(placed).ok_or(RecordError::UnknownBoard(key))?;
            }
        }

        for record in &self.orders {
            if world.board(record.location.board()).is_none() {
                return Err(RecordError::UnknownBoard(record.location.board()));
            }
            let order = record.to_order(&mut world, map)?;
            world.add_order(order);
        }
        Ok(world)
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, RecordError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::WorldFactory;

    #[test]
    fn default_world_survives_a_round_trip() {
        let map = RegionMap::standard().unwrap();
        let factory = WorldFactory::standard(&map).unwrap();
        let mut world = factory.default_world();
        let unit = world.boards[0].units[0];
        let location = world.unit(unit).location;
        world.add_order(Order::hold(unit, location).with_status(OrderStatus::Success));

        let json = WorldRecord::from_world(&world, &map).to_json().unwrap();
        let back = WorldRecord::from_json(&json).unwrap().to_world(&map).unwrap();
        assert_eq!(back, world);
    }

    #[test]
    fn order_without_unit_is_rejected() {
        let map = RegionMap::standard().unwrap();
        let json = r#"{
            "iteration": 0,
            "boards": [{"timeline": 1, "year": 1901, "phase": "Spring", "centres": [], "units": []}],
            "orders": [{
                "type": "Hold",
                "unit": {"owner": "France", "type": "Army"},
                "location": {"timeline": 1, "year": 1901, "phase": "Spring", "regionId": "Par"}
            }]
        }"#;
        let record = WorldRecord::from_json(json).unwrap();
        assert!(matches!(record.to_world(&map), Err(RecordError::NoUnit { .. })));
    }

    #[test]
    fn move_needs_a_destination() {
        let map = RegionMap::standard().unwrap();
        let json = r#"{
            "iteration": 0,
            "boards": [{"timeline": 1, "year": 1901, "phase": "Spring", "centres": [],
                        "units": [{"regionId": "Par", "owner": "France", "type": "Army"}]}],
            "orders": [{
                "type": "Move",
                "unit": {"owner": "France", "type": "Army"},
                "location": {"timeline": 1, "year": 1901, "phase": "Spring", "regionId": "Par"}
            }]
        }"#;
        let record = WorldRecord::from_json(json).unwrap();
        assert!(matches!(
            record.to_world(&map),
            Err(RecordError::MissingField(OrderType::Move, "destination"))
        ));
    }
}
