//! Board progression, timeline forks and the victory check.
//!
//! After orders are resolved, every board flagged `might_advance` produces a
//! draft of its successor. The draft is appended when the board has no
//! successor yet, ignored when it matches one, and turned into a new timeline
//! when it differs from all of them.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;

use crate::board::{
    Board, BoardKey, Centre, Nation, OrderKind, Phase, RegionId, RegionMap, Unit, UnitType, World,
};

/// Boards created by one execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub created: Vec<BoardKey>,
    /// Timelines opened by forks, as `(parent board, new timeline)`.
    pub forked: Vec<(BoardKey, i32)>,
}

/// A successor board that has not been added to the world yet.
#[derive(Debug, Clone)]
struct Draft {
    key: BoardKey,
    centres: Vec<Centre>,
    units: Vec<Unit>,
}

impl Draft {
    fn centre_signature(&self) -> Vec<(RegionId, Option<Nation>)> {
        centre_signature(&self.centres)
    }

    fn unit_signature(&self) -> Vec<(RegionId, Nation, UnitType, bool)> {
        unit_signature(self.units.iter())
    }
}

fn centre_signature(centres: &[Centre]) -> Vec<(RegionId, Option<Nation>)> {
    let mut signature: Vec<_> = centres.iter().map(|c| (c.region, c.owner)).collect();
    signature.sort();
    signature
}

fn unit_signature<'a>(units: impl Iterator<Item = &'a Unit>) -> Vec<(RegionId, Nation, UnitType, bool)> {
    let mut signature: Vec<_> = units
        .map(|u| (u.location.region, u.owner, u.unit_type, u.must_retreat))
        .collect();
    signature.sort();
    signature
}

/// Advances every flagged board. Does nothing while retreats are pending.
pub fn execute(world: &mut World, map: &RegionMap) -> ExecutionOutcome {
    let mut outcome = ExecutionOutcome::default();
    if world.has_retreats() {
        return outcome;
    }

    let mut keys: Vec<BoardKey> = world
        .boards
        .iter()
        .filter(|b| b.might_advance)
        .map(|b| b.key)
        .collect();
    keys.sort();

    for key in keys {
        if let Some(board) = world.board_mut(key) {
            board.might_advance = false;
        }
        let Some(draft) = draft_next(world, key, map) else {
            continue;
        };
        advance(world, key, draft, &mut outcome);
    }
    outcome
}

fn draft_next(world: &World, key: BoardKey, map: &RegionMap) -> Option<Draft> {
    let board = world.board(key)?;
    let next = key.next();
    let carried = |unit: &Unit| unit.relocated(next.location(unit.location.region));

    let mut units: Vec<Unit> = board
        .units
        .iter()
        .filter(|&&id| !world.has_left(id) && !world.unit(id).must_retreat)
        .map(|&id| carried(world.unit(id)))
        .collect();

    let arrivals = world.orders.iter().filter(|o| o.status.is_success());
    if key.phase == Phase::Winter {
        units.extend(
            arrivals
                .filter(|o| o.kind == OrderKind::Build && o.location.board() == key)
                .map(|o| world.unit(o.unit).relocated(next.location(o.location.region))),
        );
    } else {
        units.extend(arrivals.filter_map(|o| match o.kind {
            OrderKind::Move { destination } if destination.board() == key => {
                Some(world.unit(o.unit).relocated(next.location(destination.region)))
            }
            _ => None,
        }));
    }

    let mut centres = board.centres.clone();
    if next.phase == Phase::Winter {
        for centre in &mut centres {
            if let Some(unit) = units
                .iter()
                .find(|u| map.parent_or_self(u.location.region) == centre.region)
            {
                centre.owner = Some(unit.owner);
            }
        }
    }

    Some(Draft {
        key: next,
        centres,
        units,
    })
}

fn advance(world: &mut World, parent: BoardKey, draft: Draft, outcome: &mut ExecutionOutcome) {
    let children = world
        .board(parent)
        .map(|b| b.child_timelines.clone())
        .unwrap_or_default();
    let existing: Vec<&Board> = world
        .boards
        .iter()
        .filter(|b| b.key.year == draft.key.year && b.key.phase == draft.key.phase)
        .filter(|b| b.key.timeline == parent.timeline || children.contains(&b.key.timeline))
        .collect();

    if existing.is_empty() {
        materialize(world, draft, outcome);
        return;
    }

    let centres = draft.centre_signature();
    let units = draft.unit_signature();
    let matches = existing.iter().any(|b| {
        centre_signature(&b.centres) == centres
            && unit_signature(b.units.iter().map(|&id| world.unit(id))) == units
    });
    if matches {
        return;
    }

    let timeline = world.boards.iter().map(|b| b.key.timeline).max().unwrap_or(0) + 1;
    if let Some(board) = world.board_mut(parent) {
        board.child_timelines.push(timeline);
    }
    info!(parent = %parent, timeline, "history changed, forking timeline");
    outcome.forked.push((parent, timeline));

    let key = BoardKey::new(timeline, draft.key.year, draft.key.phase);
    let units = draft
        .units
        .iter()
        .map(|u| u.relocated(key.location(u.location.region)))
        .collect();
    materialize(
        world,
        Draft {
            key,
            centres: draft.centres,
            units,
        },
        outcome,
    );
}

fn materialize(world: &mut World, draft: Draft, outcome: &mut ExecutionOutcome) {
    world.boards.push(Board::new(draft.key, draft.centres));
    for unit in draft.units {
        let _ = world.place_unit(unit);
    }
    outcome.created.push(draft.key);
}

/// The nation holding at least `victory_centres` distinct centres across the
/// active boards, with strictly more than any rival.
pub fn find_winner(world: &World, map: &RegionMap, victory_centres: usize) -> Option<Nation> {
    let mut owned: BTreeMap<Nation, BTreeSet<RegionId>> = BTreeMap::new();
    for board in world.active_boards() {
        for centre in &board.centres {
            if let Some(owner) = centre.owner {
                owned
                    .entry(owner)
                    .or_default()
                    .insert(map.parent_or_self(centre.region));
            }
        }
    }

    let mut counts: Vec<(usize, Nation)> = owned.into_iter().map(|(n, r)| (r.len(), n)).collect();
    counts.sort_by(|a, b| b.0.cmp(&a.0));
    match counts.as_slice() {
        [(best, nation), rest @ ..] if *best >= victory_centres => {
            let tied = rest.first().is_some_and(|(next, _)| next == best);
            (!tied).then_some(*nation)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Location, Order, OrderStatus, UnitId};

    struct Fixture {
        map: RegionMap,
        world: World,
        key: BoardKey,
    }

    impl Fixture {
        fn new(phase: Phase) -> Self {
            let map = RegionMap::standard().unwrap();
            let key = BoardKey::new(1, 1901, phase);
            let centres = ["Mun", "Ber", "Vie"]
                .iter()
                .map(|code| Centre {
                    region: map.lookup(code).unwrap(),
                    owner: None,
                })
                .collect();
            let mut world = World::new();
            let mut board = Board::new(key, centres);
            board.might_advance = true;
            world.boards.push(board);
            Self { map, world, key }
        }

        fn at(&self, key: BoardKey, code: &str) -> Location {
            key.location(self.map.lookup(code).unwrap())
        }

        fn army(&mut self, owner: Nation, code: &str) -> UnitId {
            let at = self.at(self.key, code);
            self.world.place_unit(Unit::army(owner, at)).unwrap()
        }

        fn units_on(&self, key: BoardKey) -> Vec<(String, Nation)> {
            let mut units: Vec<_> = self
                .world
                .board_units(key)
                .map(|(_, u)| (self.map.code(u.location.region).to_string(), u.owner))
                .collect();
            units.sort();
            units
        }
    }

    #[test]
    fn fall_board_takes_centres_for_occupants() {
        let mut f = Fixture::new(Phase::Fall);
        let tyr = f.army(Nation::Germany, "Tyr");
        let (from, to) = (f.at(f.key, "Tyr"), f.at(f.key, "Vie"));
        f.world
            .add_order(Order::movement(tyr, from, to).with_status(OrderStatus::Success));

        let outcome = execute(&mut f.world, &f.map);
        let winter = BoardKey::new(1, 1901, Phase::Winter);
        assert_eq!(outcome.created, vec![winter]);
        assert_eq!(f.units_on(winter), vec![("Vie".to_string(), Nation::Germany)]);
        let vie = f.map.lookup("Vie").unwrap();
        assert_eq!(f.world.board(winter).unwrap().centre(vie).unwrap().owner, Some(Nation::Germany));
        assert!(!f.world.board(f.key).unwrap().might_advance);
    }

    #[test]
    fn changed_history_forks_a_new_timeline() {
        let mut f = Fixture::new(Phase::Spring);
        f.army(Nation::Germany, "Mun");
        execute(&mut f.world, &f.map);
        let fall = BoardKey::new(1, 1901, Phase::Fall);
        assert_eq!(f.units_on(fall), vec![("Mun".to_string(), Nation::Germany)]);

        // Re-advancing with the same units finds the existing successor.
        f.world.board_mut(f.key).unwrap().might_advance = true;
        let outcome = execute(&mut f.world, &f.map);
        assert!(outcome.created.is_empty());

        // A unit that was not there before changes the draft.
        f.army(Nation::Austria, "Ber");
        f.world.board_mut(f.key).unwrap().might_advance = true;
        let outcome = execute(&mut f.world, &f.map);
        let forked = BoardKey::new(2, 1901, Phase::Fall);
        assert_eq!(outcome.forked, vec![(f.key, 2)]);
        assert_eq!(outcome.created, vec![forked]);
        assert_eq!(f.world.board(f.key).unwrap().child_timelines, vec![2]);
        assert_eq!(
            f.units_on(forked),
            vec![("Ber".to_string(), Nation::Austria), ("Mun".to_string(), Nation::Germany)]
        );
    }

    #[test]
    fn nothing_advances_during_retreats() {
        let mut f = Fixture::new(Phase::Spring);
        let mun = f.army(Nation::Germany, "Mun");
        f.world.unit_mut(mun).must_retreat = true;
        assert_eq!(execute(&mut f.world, &f.map), ExecutionOutcome::default());
        assert!(f.world.board(f.key).unwrap().might_advance);
    }

    #[test]
    fn winner_needs_a_strict_lead() {
        let map = RegionMap::standard().unwrap();
        let key = BoardKey::new(1, 1901, Phase::Spring);
        let regions: Vec<RegionId> = ["Mun", "Ber", "Kie", "Vie"]
            .iter()
            .map(|code| map.lookup(code).unwrap())
            .collect();
        let centres = |owners: [Option<Nation>; 4]| {
            regions
                .iter()
                .zip(owners)
                .map(|(&region, owner)| Centre { region, owner })
                .collect::<Vec<_>>()
        };
        let g = Some(Nation::Germany);
        let a = Some(Nation::Austria);

        let mut world = World::new();
        world.boards.push(Board::new(key, centres([g, g, g, a])));
        assert_eq!(find_winner(&world, &map, 3), Some(Nation::Germany));
        assert_eq!(find_winner(&world, &map, 4), None);

        // A second timeline where Austria holds the same German centres:
        // each region counts once per nation.
        world
            .boards
            .push(Board::new(BoardKey::new(2, 1901, Phase::Spring), centres([a, a, a, a])));
        assert_eq!(find_winner(&world, &map, 3), Some(Nation::Austria));
        world.boards[1].centres = centres([a, a, g, None]);
        assert_eq!(find_winner(&world, &map, 3), None);
    }
}
