//! Order legality checks.
//!
//! The validator is a one-shot pre-pass over the orders of an adjudication.
//! Orders that can never succeed are marked `Invalid` (or `RetreatInvalid`)
//! before the resolver sees them; retreat orders are moved onto the retreat
//! track.

pub mod adjacency;
pub mod convoy;

use std::collections::HashSet;

use tracing::debug;

use crate::board::{Location, Order, OrderKind, OrderStatus, RegionType, UnitType, World, WorldFactory};

pub use adjacency::AdjacencyValidator;
pub use convoy::{ConvoyLeg, ConvoyPathValidator};

/// Marks illegal orders before resolution.
pub struct Validator<'a> {
    adjacency: &'a AdjacencyValidator<'a>,
    factory: &'a WorldFactory,
}

impl<'a> Validator<'a> {
    pub fn new(adjacency: &'a AdjacencyValidator<'a>, factory: &'a WorldFactory) -> Self {
        Self { adjacency, factory }
    }

    /// Validates every non-terminal order among `orders` (indices into
    /// `world.orders`).
    ///
    /// While any unit must retreat, only that unit's retreat orders are
    /// legal. Otherwise moves are checked first, then supports and convoys
    /// against the surviving moves, then builds and disbands.
    pub fn validate(&self, world: &mut World, orders: &[usize], has_retreats: bool) {
        let pending: Vec<usize> = orders
            .iter()
            .copied()
            .filter(|&i| !world.orders[i].status.is_terminal())
            .collect();

        if has_retreats {
            for &i in &pending {
                let status = self.retreat_status(world, &world.orders[i]);
                world.orders[i].status = status;
            }
            return;
        }

        for &i in &pending {
            let order = world.orders[i];
            if order.kind != OrderKind::Build && world.unit(order.unit).location != order.location {
                world.orders[i].status = OrderStatus::Invalid;
            } else if order.kind.is_movement() && order.location.phase.is_winter() {
                world.orders[i].status = OrderStatus::Invalid;
            }
        }

        let moves = still_new(world, &pending, |k| matches!(k, OrderKind::Move { .. }));
        let convoys = still_new(world, &pending, |k| matches!(k, OrderKind::Convoy { .. }));
        let legs: Vec<ConvoyLeg> = convoys
            .iter()
            .filter_map(|&i| {
                let order = &world.orders[i];
                let (midpoint, destination) = match order.kind {
                    OrderKind::Convoy { midpoint, destination } => (midpoint, destination),
                    _ => return None,
                };
                Some(ConvoyLeg {
                    index: i,
                    fleet: *world.unit(order.unit),
                    location: order.location,
                    midpoint,
                    destination,
                })
            })
            .collect();
        let convoy_paths = ConvoyPathValidator::new(self.adjacency);
        for &i in &moves {
            let order = world.orders[i];
            let unit = *world.unit(order.unit);
            let Some(destination) = order.destination() else { continue };
            let valid = self
                .adjacency
                .is_valid_direct_move(&unit, order.location, destination, false, false)
                || !convoy_paths
                    .possible_convoys(&unit, order.location, destination, &legs)
                    .is_empty();
            if !valid {
                world.orders[i].status = OrderStatus::Invalid;
            }
        }

        for i in still_new(world, &pending, |k| matches!(k, OrderKind::Support { .. })) {
            if !self.is_valid_support(world, orders, &world.orders[i]) {
                world.orders[i].status = OrderStatus::Invalid;
            }
        }

        for &i in &convoys {
            if !self.is_valid_convoy(world, orders, &world.orders[i]) {
                world.orders[i].status = OrderStatus::Invalid;
            }
        }

        let mut built = HashSet::new();
        for i in still_new(world, &pending, |k| matches!(k, OrderKind::Build)) {
            let order = world.orders[i];
            let province = self.adjacency.parent_location(order.location);
            if !self.is_valid_build(world, &order) || !built.insert(province) {
                world.orders[i].status = OrderStatus::Invalid;
            }
        }

        let mut disbanded = HashSet::new();
        for i in still_new(world, &pending, |k| matches!(k, OrderKind::Disband)) {
            let order = world.orders[i];
            let on_active_winter = order.location.phase.is_winter() && world.is_active(order.location.board());
            if !on_active_winter || !disbanded.insert(order.unit) {
                world.orders[i].status = OrderStatus::Invalid;
            }
        }

        for i in still_new(world, &pending, |k| matches!(k, OrderKind::Hold)) {
            if world.orders[i].location.phase.is_winter() {
                world.orders[i].status = OrderStatus::Invalid;
            }
        }

        let invalid = pending
            .iter()
            .filter(|&&i| world.orders[i].status == OrderStatus::Invalid)
            .count();
        debug!(checked = pending.len(), invalid, "validated orders");
    }

    fn retreat_status(&self, world: &World, order: &Order) -> OrderStatus {
        let unit = world.unit(order.unit);
        if !unit.must_retreat || unit.location != order.location {
            return if order.status.is_retreat() {
                OrderStatus::RetreatInvalid
            } else {
                OrderStatus::Invalid
            };
        }
        match order.kind {
            OrderKind::Move { destination } => {
                if self
                    .adjacency
                    .is_valid_direct_move(unit, order.location, destination, false, false)
                {
                    OrderStatus::RetreatNew
                } else {
                    OrderStatus::RetreatInvalid
                }
            }
            OrderKind::Disband => OrderStatus::RetreatNew,
            _ => OrderStatus::RetreatInvalid,
        }
    }

    fn is_valid_support(&self, world: &World, scope: &[usize], order: &Order) -> bool {
        let OrderKind::Support { midpoint, destination } = order.kind else {
            return false;
        };
        let unit = world.unit(order.unit);
        if !self
            .adjacency
            .is_valid_direct_move(unit, order.location, destination, true, false)
        {
            return false;
        }

        let mut others = scope.iter().map(|&i| &world.orders[i]);
        if midpoint == destination {
            others.any(|o| {
                self.adjacency.equals_or_is_related(o.location, destination)
                    && match o.kind {
                        OrderKind::Hold | OrderKind::Support { .. } | OrderKind::Convoy { .. } => true,
                        OrderKind::Move { .. } => o.status == OrderStatus::Invalid,
                        _ => false,
                    }
            })
        } else {
            others.any(|o| match o.kind {
                OrderKind::Move { destination: target } => {
                    o.status != OrderStatus::Invalid
                        && o.location == midpoint
                        && self.adjacency.equals_or_is_related(target, destination)
                }
                _ => false,
            })
        }
    }

    fn is_valid_convoy(&self, world: &World, scope: &[usize], order: &Order) -> bool {
        let OrderKind::Convoy { midpoint, destination } = order.kind else {
            return false;
        };
        let map = self.adjacency.map();
        if !world.unit(order.unit).is_fleet()
            || !map.is_sea(order.location.region)
            || !map.is_coastal(midpoint.region)
            || !map.is_coastal(destination.region)
        {
            return false;
        }
        scope.iter().map(|&i| &world.orders[i]).any(|o| {
            o.status != OrderStatus::Invalid
                && o.location == midpoint
                && o.destination() == Some(destination)
                && o.is_move()
        })
    }

    fn is_valid_build(&self, world: &World, order: &Order) -> bool {
        let location = order.location;
        if !location.phase.is_winter() || !world.is_active(location.board()) {
            return false;
        }
        let Some(board) = world.board(location.board()) else {
            return false;
        };
        let map = self.adjacency.map();
        let unit = world.unit(order.unit);
        let province = map.parent_or_self(location.region);

        let owns_home = board
            .centre(province)
            .is_some_and(|c| c.owner == Some(unit.owner))
            && self.factory.is_home_centre(unit.owner, province);
        if !owns_home {
            return false;
        }

        let occupied = board
            .units
            .iter()
            .any(|&id| map.parent_or_self(world.unit(id).location.region) == province);
        if occupied {
            return false;
        }

        let region = map.region(location.region);
        match unit.unit_type {
            UnitType::Army => region.region_type != RegionType::Sea && region.parent.is_none(),
            UnitType::Fleet => region.region_type == RegionType::Coast,
        }
    }
}

fn still_new(world: &World, pending: &[usize], kind: fn(&OrderKind) -> bool) -> Vec<usize> {
    pending
        .iter()
        .copied()
        .filter(|&i| world.orders[i].status == OrderStatus::New && kind(&world.orders[i].kind))
        .collect()
}

/// Locations an order touches, used to group orders that interact.
pub fn touched_locations(order: &Order) -> Vec<Location> {
    match order.kind {
        OrderKind::Hold | OrderKind::Build | OrderKind::Disband => vec![order.location],
        OrderKind::Move { destination } => vec![order.location, destination],
        OrderKind::Support { midpoint, destination } | OrderKind::Convoy { midpoint, destination } => {
            vec![order.location, midpoint, destination]
        }
    }
}
