//! Direct-move legality across boards.
//!
//! A move stays on one board, or crosses to a neighbouring board one step
//! away in time or in timeline (never both). Coast children and their land
//! parent count as the same place for combat, which is what
//! [`AdjacencyValidator::equals_or_is_related`] expresses.

use crate::board::{Location, RegionId, RegionMap, Unit};

/// Answers reachability questions against a region map.
#[derive(Debug, Clone, Copy)]
pub struct AdjacencyValidator<'a> {
    map: &'a RegionMap,
    strict: bool,
}

impl<'a> AdjacencyValidator<'a> {
    /// With `strict` set, moves between boards must keep their region.
    pub fn new(map: &'a RegionMap, strict: bool) -> Self {
        Self { map, strict }
    }

    pub fn map(&self) -> &'a RegionMap {
        self.map
    }

    /// Returns true if `unit` can move from `from` to `to` without a convoy.
    ///
    /// `allow_sibling` accepts any coast of the destination's province, as
    /// needed for supports. `allow_child` accepts a coast of the destination
    /// when the destination itself is the parent region.
    pub fn is_valid_direct_move(
        &self,
        unit: &Unit,
        from: Location,
        to: Location,
        allow_sibling: bool,
        allow_child: bool,
    ) -> bool {
        if from.phase.is_winter() || to.phase.is_winter() {
            return false;
        }
        if from.same_board(to) {
            return self.is_valid_intra_board_move(unit, from, to, allow_sibling, allow_child);
        }
        !unit.must_retreat && self.is_valid_inter_board_move(unit, from, to, allow_sibling, allow_child)
    }

    fn is_valid_inter_board_move(
        &self,
        unit: &Unit,
        from: Location,
        to: Location,
        allow_sibling: bool,
        allow_child: bool,
    ) -> bool {
        if self.strict && from.region != to.region {
            return false;
        }
        if !self.is_valid_intra_board_move(unit, from, to, allow_sibling, allow_child) {
            return false;
        }
        let time = (2 * (to.year - from.year) + (to.phase.index() - from.phase.index())).abs();
        let timelines = (to.timeline - from.timeline).abs();
        time <= 1 && timelines <= 1 && (time == 0 || timelines == 0)
    }

    /// Region-level legality, ignoring which boards the endpoints lie on.
    pub fn is_valid_intra_board_move(
        &self,
        unit: &Unit,
        from: Location,
        to: Location,
        allow_sibling: bool,
        allow_child: bool,
    ) -> bool {
        if from == to {
            return false;
        }
        if from.region == to.region {
            return true;
        }
        if allow_sibling {
            let province = self.map.parent_or_self(to.region);
            return self.can_reach(unit, from.region, province)
                || self
                    .map
                    .region(province)
                    .children
                    .iter()
                    .any(|&child| self.can_reach(unit, from.region, child));
        }
        self.can_reach(unit, from.region, to.region)
            || (allow_child
                && self
                    .map
                    .region(to.region)
                    .children
                    .iter()
                    .any(|&child| self.can_reach(unit, from.region, child)))
    }

    fn can_reach(&self, unit: &Unit, from: RegionId, to: RegionId) -> bool {
        self.map
            .connection(from, to)
            .is_some_and(|kind| kind.allows(unit.unit_type))
    }

    /// Equal locations, or two regions of the same province on one board.
    pub fn equals_or_is_related(&self, a: Location, b: Location) -> bool {
        a == b || self.parent_location(a) == self.parent_location(b)
    }

    /// Replaces a coast with its parent region; other locations are unchanged.
    pub fn parent_location(&self, location: Location) -> Location {
        location.with_region(self.map.parent_or_self(location.region))
    }

    /// Same-board locations the unit could move to directly.
    pub fn adjacent_locations(&self, unit: &Unit) -> Vec<Location> {
        self.map
            .region(unit.location.region)
            .connections
            .iter()
            .filter(|&&(_, kind)| kind.allows(unit.unit_type))
            .map(|&(region, _)| unit.location.with_region(region))
            .collect()
    }
}
