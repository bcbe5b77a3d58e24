//! Scenario builder shared by the adjudication test suites.
#![allow(dead_code)]

use multiversal::board::{
    Board, BoardKey, Centre, Location, Nation, Order, OrderStatus, Phase, RegionMap, Unit, UnitId, UnitType, World,
    WorldFactory,
};
use multiversal::engine::{AdjudicationReport, Adjudicator, AdjudicatorOptions};
use multiversal::resolve::FirstChoice;

pub const SPRING_1901: BoardKey = BoardKey::new(1, 1901, Phase::Spring);
pub const FALL_1901: BoardKey = BoardKey::new(1, 1901, Phase::Fall);
pub const WINTER_1901: BoardKey = BoardKey::new(1, 1901, Phase::Winter);
pub const SPRING_1902: BoardKey = BoardKey::new(1, 1902, Phase::Spring);

/// A unit as listed on a board: owner, type, region code, must retreat.
pub type Listing = (Nation, UnitType, String, bool);

pub fn listing(owner: Nation, unit_type: UnitType, code: &str, must_retreat: bool) -> Listing {
    (owner, unit_type, code.to_string(), must_retreat)
}

pub struct Game {
    pub map: RegionMap,
    pub factory: WorldFactory,
    pub world: World,
    pub options: AdjudicatorOptions,
}

impl Game {
    /// A world with a single empty Spring 1901 board.
    pub fn new() -> Self {
        let mut game = Self::empty();
        game.board(SPRING_1901);
        game
    }

    /// A world without boards.
    pub fn empty() -> Self {
        let map = RegionMap::standard().unwrap();
        let factory = WorldFactory::standard(&map).unwrap();
        Self {
            map,
            factory,
            world: World::new(),
            options: AdjudicatorOptions::default(),
        }
    }

    pub fn strict(mut self) -> Self {
        self.options.strict_adjacencies = true;
        self
    }

    pub fn board(&mut self, key: BoardKey) -> BoardKey {
        self.world.boards.push(Board::new(key, Vec::new()));
        key
    }

    pub fn centre(&mut self, key: BoardKey, owner: Nation, code: &str) {
        let region = self.map.lookup(code).unwrap();
        self.world
            .board_mut(key)
            .unwrap()
            .centres
            .push(Centre { region, owner: Some(owner) });
    }

    pub fn at(&self, key: BoardKey, code: &str) -> Location {
        key.location(self.map.lookup(code).unwrap())
    }

    pub fn army(&mut self, key: BoardKey, owner: Nation, code: &str) -> Location {
        self.place(key, owner, UnitType::Army, code)
    }

    pub fn fleet(&mut self, key: BoardKey, owner: Nation, code: &str) -> Location {
        self.place(key, owner, UnitType::Fleet, code)
    }

    fn place(&mut self, key: BoardKey, owner: Nation, unit_type: UnitType, code: &str) -> Location {
        let at = self.at(key, code);
        self.world.place_unit(Unit::new(owner, unit_type, at)).unwrap();
        at
    }

    pub fn unit(&self, at: Location) -> UnitId {
        self.world
            .unit_at(at)
            .unwrap_or_else(|| panic!("no unit at {}", self.map.code(at.region)))
    }

    pub fn hold(&mut self, at: Location) -> usize {
        let unit = self.unit(at);
        self.world.add_order(Order::hold(unit, at))
    }

    pub fn moves(&mut self, at: Location, to: Location) -> usize {
        let unit = self.unit(at);
        self.world.add_order(Order::movement(unit, at, to))
    }

    pub fn supports(&mut self, at: Location, midpoint: Location, destination: Location) -> usize {
        let unit = self.unit(at);
        self.world.add_order(Order::support(unit, at, midpoint, destination))
    }

    pub fn supports_hold(&mut self, at: Location, target: Location) -> usize {
        self.supports(at, target, target)
    }

    pub fn convoys(&mut self, at: Location, midpoint: Location, destination: Location) -> usize {
        let unit = self.unit(at);
        self.world.add_order(Order::convoy(unit, at, midpoint, destination))
    }

    pub fn build(&mut self, key: BoardKey, owner: Nation, unit_type: UnitType, code: &str) -> usize {
        let at = self.at(key, code);
        let unit = self.world.add_unit(Unit::new(owner, unit_type, at));
        self.world.add_order(Order::build(unit, at))
    }

    pub fn disband(&mut self, at: Location) -> usize {
        let unit = self.unit(at);
        self.world.add_order(Order::disband(unit, at))
    }

    pub fn adjudicate(&mut self) -> AdjudicationReport {
        let adjudicator = Adjudicator::new(&self.map, &self.factory, self.options);
        let report = adjudicator.adjudicate(&mut self.world, &mut FirstChoice);
        assert_eq!(report.forced, 0, "orders were left undecided");
        self.assert_resolved();
        report
    }

    /// Marks an order as already adjudicated.
    pub fn settled(&mut self, order: usize, status: OrderStatus) -> usize {
        self.world.orders[order].status = status;
        order
    }

    pub fn retreating(&mut self, at: Location) {
        let unit = self.unit(at);
        self.world.unit_mut(unit).must_retreat = true;
    }

    /// Codes of the first `count` provinces on the map, skipping coasts.
    pub fn provinces(&self, count: usize) -> Vec<String> {
        self.map
            .regions()
            .iter()
            .filter(|r| r.parent.is_none())
            .take(count)
            .map(|r| r.code.clone())
            .collect()
    }

    pub fn status(&self, order: usize) -> OrderStatus {
        self.world.orders[order].status
    }

    pub fn must_retreat(&self, at: Location) -> bool {
        self.world.unit(self.unit(at)).must_retreat
    }

    pub fn has_board(&self, key: BoardKey) -> bool {
        self.world.board(key).is_some()
    }

    /// Units on a board, sorted.
    pub fn units(&self, key: BoardKey) -> Vec<Listing> {
        assert!(self.has_board(key), "no board {key}");
        let mut units: Vec<Listing> = self
            .world
            .board_units(key)
            .map(|(_, u)| {
                listing(u.owner, u.unit_type, self.map.code(u.location.region), u.must_retreat)
            })
            .collect();
        units.sort();
        units
    }

    pub fn assert_units(&self, key: BoardKey, mut expected: Vec<Listing>) {
        expected.sort();
        assert_eq!(self.units(key), expected, "units on {key}");
    }

    pub fn assert_resolved(&self) {
        for (i, order) in self.world.orders.iter().enumerate() {
            assert!(order.status.is_terminal(), "order {i} is still {:?}", order.status);
        }
    }
}
