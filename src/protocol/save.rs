//! Saved games.
//!
//! A save file is the order history of a game plus the number of
//! adjudications it went through. Loading starts from the default world and
//! replays the orders batch by batch, so the file never has to carry boards.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::board::{Location, OrderStatus, RegionMap, World, WorldFactory};
use crate::engine::{Adjudicator, AdjudicatorOptions};
use crate::resolve::Chooser;

use super::json::{OrderRecord, OrderType, RecordError};

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("malformed save file: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("{left} orders were never replayed after {iteration} adjudications")]
    Unreplayed { iteration: u32, left: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveFile {
    pub iteration: u32,
    #[serde(default)]
    pub has_strict_adjacencies: bool,
    pub orders: Vec<OrderRecord>,
}

impl SaveFile {
    pub fn from_world(world: &World, map: &RegionMap, strict_adjacencies: bool) -> Self {
        Self {
            iteration: world.iteration,
            has_strict_adjacencies: strict_adjacencies,
            orders: world
                .orders
                .iter()
                .map(|order| OrderRecord::from_order(world, map, order))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Options the saved game was played with.
    pub fn options(&self) -> AdjudicatorOptions {
        AdjudicatorOptions {
            strict_adjacencies: self.has_strict_adjacencies,
            ..AdjudicatorOptions::default()
        }
    }

    /// Rebuilds the saved world by replaying its orders.
    ///
    /// Each adjudication receives the records whose retreat flag matches the
    /// world's state and whose board can still take orders. Disbands the
    /// engine adds by itself are skipped; the replay produces them again.
    pub fn replay<C: Chooser + ?Sized>(
        &self,
        map: &RegionMap,
        factory: &WorldFactory,
        chooser: &mut C,
    ) -> Result<World, SaveError> {
        let adjudicator = Adjudicator::new(map, factory, self.options());
        let mut world = factory.default_world();
        let mut consumed: Vec<bool> = self.orders.iter().map(is_generated).collect();

        for _ in 0..self.iteration {
            let retreats = world.has_retreats();
            let mut taken: Vec<Location> = Vec::new();
            let mut batch = 0;
            for (i, record) in self.orders.iter().enumerate() {
                if consumed[i] || record.is_retreat != retreats {
                    continue;
                }
                let location = record.location.to_location(map)?;
                if !accepts(&world, record, location, retreats) {
                    continue;
                }
                consumed[i] = true;
                if taken.contains(&location) {
                    debug!(region = %record.location.region_id, board = %location.board(), "duplicate order dropped");
                    continue;
                }
                taken.push(location);

                let mut order = record.to_order(&mut world, map)?;
                order.status = if retreats {
                    OrderStatus::RetreatNew
                } else {
                    OrderStatus::New
                };
                world.add_order(order);
                batch += 1;
            }
            debug!(iteration = world.iteration + 1, orders = batch, retreats, "replaying batch");
            adjudicator.adjudicate(&mut world, chooser);
        }

        let left = consumed.iter().filter(|&&done| !done).count();
        if left > 0 {
            return Err(SaveError::Unreplayed {
                iteration: self.iteration,
                left,
            });
        }
        info!(iteration = world.iteration, boards = world.boards.len(), "save replayed");
        Ok(world)
    }
}

/// Disbands the engine adds after failed or missing retreats.
fn is_generated(record: &OrderRecord) -> bool {
    record.order_type == OrderType::Disband && record.status == OrderStatus::RetreatSuccess
}

fn accepts(world: &World, record: &OrderRecord, location: Location, retreats: bool) -> bool {
    if retreats {
        return world
            .unit_at(location)
            .is_some_and(|id| world.unit(id).must_retreat);
    }
    let board = location.board();
    if !world.is_active(board) || world.board(board).is_none() {
        return false;
    }
    match record.order_type {
        OrderType::Build | OrderType::Disband => board.phase.is_winter(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardKey, Order, Phase};
    use crate::resolve::FirstChoice;

    struct Fixture {
        map: RegionMap,
        factory: WorldFactory,
    }

    impl Fixture {
        fn new() -> Self {
            let map = RegionMap::standard().unwrap();
            let factory = WorldFactory::standard(&map).unwrap();
            Self { map, factory }
        }

        fn at(&self, key: BoardKey, code: &str) -> Location {
            key.location(self.map.lookup(code).unwrap())
        }

        fn play(&self, world: &mut World) {
            Adjudicator::new(&self.map, &self.factory, AdjudicatorOptions::default())
                .adjudicate(world, &mut FirstChoice);
        }
    }

    #[test]
    fn replay_reproduces_a_played_game() {
        let f = Fixture::new();
        let mut world = f.factory.default_world();
        let spring = BoardKey::new(1, 1901, Phase::Spring);
        let par = world.unit_at(f.at(spring, "Par")).unwrap();
        world.add_order(Order::movement(par, f.at(spring, "Par"), f.at(spring, "Bur")));
        f.play(&mut world);

        let fall = BoardKey::new(1, 1901, Phase::Fall);
        let bur = world.unit_at(f.at(fall, "Bur")).unwrap();
        world.add_order(Order::movement(bur, f.at(fall, "Bur"), f.at(fall, "Bel")));
        f.play(&mut world);

        let save = SaveFile::from_world(&world, &f.map, false);
        let json = save.to_json().unwrap();
        let loaded = SaveFile::from_json(&json)
            .unwrap()
            .replay(&f.map, &f.factory, &mut FirstChoice)
            .unwrap();
        assert_eq!(loaded.iteration, 2);
        assert_eq!(loaded.boards.len(), world.boards.len());
        let winter = BoardKey::new(1, 1901, Phase::Winter);
        assert!(loaded.unit_at(f.at(winter, "Bel")).is_some());
        assert_eq!(SaveFile::from_world(&loaded, &f.map, false), save);
    }

    #[test]
    fn orders_beyond_the_saved_iterations_are_reported() {
        let f = Fixture::new();
        let mut world = f.factory.default_world();
        f.play(&mut world);
        let mut save = SaveFile::from_world(&world, &f.map, false);
        save.iteration = 0;
        let err = save.replay(&f.map, &f.factory, &mut FirstChoice).unwrap_err();
        assert!(matches!(err, SaveError::Unreplayed { iteration: 0, left: 22 }));
    }
}
