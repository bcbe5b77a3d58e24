//! Convoy route search.

use crate::board::{Location, Unit};

use super::adjacency::AdjacencyValidator;

/// A convoy order offered to the route search.
#[derive(Debug, Clone, Copy)]
pub struct ConvoyLeg {
    /// Caller-side index of the convoy order, returned in the route.
    pub index: usize,
    pub fleet: Unit,
    pub location: Location,
    pub midpoint: Location,
    pub destination: Location,
}

/// Depth-first search over chained convoy orders.
pub struct ConvoyPathValidator<'a> {
    adjacency: &'a AdjacencyValidator<'a>,
}

impl<'a> ConvoyPathValidator<'a> {
    pub fn new(adjacency: &'a AdjacencyValidator<'a>) -> Self {
        Self { adjacency }
    }

    /// Returns the indices of the convoys forming the first route found from
    /// `from` to `to`, or an empty vector when no route exists.
    ///
    /// Callers pass only convoys that may still carry the army; legs whose
    /// midpoint and destination do not match the move are ignored here.
    pub fn possible_convoys(&self, unit: &Unit, from: Location, to: Location, convoys: &[ConvoyLeg]) -> Vec<usize> {
        let map = self.adjacency.map();
        if unit.is_fleet() || from == to || !map.is_coastal(from.region) || !map.is_coastal(to.region) {
            return Vec::new();
        }

        let candidates: Vec<&ConvoyLeg> = convoys
            .iter()
            .filter(|c| c.midpoint == from && c.destination == to)
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }

        let mut path = Vec::new();
        if self.search(from, to, &candidates, &mut path) {
            path.iter().map(|&i| candidates[i].index).collect()
        } else {
            Vec::new()
        }
    }

    fn search(&self, current: Location, to: Location, candidates: &[&ConvoyLeg], path: &mut Vec<usize>) -> bool {
        for (i, leg) in candidates.iter().enumerate() {
            if path.contains(&i) {
                continue;
            }
            if !self
                .adjacency
                .is_valid_direct_move(&leg.fleet, leg.location, current, false, true)
            {
                continue;
            }
            path.push(i);
            if self
                .adjacency
                .is_valid_direct_move(&leg.fleet, leg.location, to, false, true)
            {
                return true;
            }
            if self.search(leg.location, to, candidates, path) {
                return true;
            }
            path.pop();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardKey, Nation, Phase, RegionMap};

    struct Fixture {
        map: RegionMap,
        key: BoardKey,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                map: RegionMap::standard().unwrap(),
                key: BoardKey::new(1, 1901, Phase::Spring),
            }
        }

        fn at(&self, code: &str) -> Location {
            self.key.location(self.map.lookup(code).unwrap())
        }

        fn leg(&self, index: usize, sea: &str, from: &str, to: &str) -> ConvoyLeg {
            let location = self.at(sea);
            ConvoyLeg {
                index,
                fleet: Unit::fleet(Nation::England, location),
                location,
                midpoint: self.at(from),
                destination: self.at(to),
            }
        }
    }

    #[test]
    fn single_fleet_convoy() {
        let f = Fixture::new();
        let adjacency = AdjacencyValidator::new(&f.map, false);
        let validator = ConvoyPathValidator::new(&adjacency);
        let army = Unit::army(Nation::England, f.at("Lon"));
        let legs = [f.leg(7, "NTH", "Lon", "Nwy")];
        assert_eq!(validator.possible_convoys(&army, f.at("Lon"), f.at("Nwy"), &legs), vec![7]);
    }

    #[test]
    fn chained_convoy_skips_unrelated_legs() {
        let f = Fixture::new();
        let adjacency = AdjacencyValidator::new(&f.map, false);
        let validator = ConvoyPathValidator::new(&adjacency);
        let army = Unit::army(Nation::England, f.at("Lon"));
        let legs = [
            f.leg(0, "NWG", "Lon", "Stp"),
            f.leg(1, "BAR", "Lon", "Stp"),
            f.leg(2, "NTH", "Lon", "Stp"),
            f.leg(3, "SKA", "Lon", "Swe"),
        ];
        let mut path = validator.possible_convoys(&army, f.at("Lon"), f.at("Stp"), &legs);
        path.sort_unstable();
        assert_eq!(path, vec![0, 1, 2]);
    }

    #[test]
    fn broken_chain_has_no_route() {
        let f = Fixture::new();
        let adjacency = AdjacencyValidator::new(&f.map, false);
        let validator = ConvoyPathValidator::new(&adjacency);
        let army = Unit::army(Nation::England, f.at("Lon"));
        let legs = [f.leg(0, "NTH", "Lon", "Stp"), f.leg(1, "BAR", "Lon", "Stp")];
        assert!(validator.possible_convoys(&army, f.at("Lon"), f.at("Stp"), &legs).is_empty());
    }

    #[test]
    fn fleets_and_inland_regions_are_never_convoyed() {
        let f = Fixture::new();
        let adjacency = AdjacencyValidator::new(&f.map, false);
        let validator = ConvoyPathValidator::new(&adjacency);
        let fleet = Unit::fleet(Nation::England, f.at("Lon"));
        let legs = [f.leg(0, "NTH", "Lon", "Nwy")];
        assert!(validator.possible_convoys(&fleet, f.at("Lon"), f.at("Nwy"), &legs).is_empty());

        let army = Unit::army(Nation::Germany, f.at("Mun"));
        let legs = [f.leg(0, "NTH", "Mun", "Nwy")];
        assert!(validator.possible_convoys(&army, f.at("Mun"), f.at("Nwy"), &legs).is_empty());
    }
}
