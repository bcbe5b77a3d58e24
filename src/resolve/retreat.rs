//! Retreat-phase resolution.
//!
//! Retreats never receive support, so there is nothing to chase: a retreat
//! succeeds when its square is open and no other retreat aims at it. A unit
//! whose retreat fails, or that was given no retreat at all, is disbanded.

use tracing::debug;

use crate::board::{Location, Order, OrderKind, OrderStatus, UnitId, World};
use crate::validate::AdjacencyValidator;

use super::movement::is_open_square;

/// Outcome of one retreat evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetreatOutcome {
    pub retreated: Vec<UnitId>,
    pub disbanded: Vec<UnitId>,
}

/// Resolves the pending retreat orders among `touched` and clears every
/// `must_retreat` flag.
pub fn evaluate(world: &mut World, touched: &[usize], adjacency: &AdjacencyValidator<'_>) -> RetreatOutcome {
    let mut outcome = RetreatOutcome::default();
    let mut decided: Vec<UnitId> = Vec::new();

    let pending: Vec<usize> = touched
        .iter()
        .copied()
        .filter(|&i| world.orders[i].status == OrderStatus::RetreatNew)
        .collect();
    let destinations: Vec<Location> = pending
        .iter()
        .filter_map(|&i| world.orders[i].destination())
        .collect();

    for &i in &pending {
        let order = world.orders[i];
        if decided.contains(&order.unit) {
            world.orders[i].status = OrderStatus::RetreatInvalid;
            continue;
        }
        decided.push(order.unit);

        match order.kind {
            OrderKind::Disband if !order.location.phase.is_winter() => {
                world.orders[i].status = OrderStatus::RetreatSuccess;
                outcome.disbanded.push(order.unit);
            }
            OrderKind::Move { destination } => {
                let contested = destinations
                    .iter()
                    .filter(|&&d| adjacency.equals_or_is_related(d, destination))
                    .count()
                    > 1;
                let origin = attacker_origin(world, order.location, adjacency);
                if contested || !is_open_square(world, destination, origin, adjacency) {
                    world.orders[i].status = OrderStatus::RetreatFailure;
                    world.add_order(Order::disband(order.unit, order.location).with_status(OrderStatus::RetreatSuccess));
                    outcome.disbanded.push(order.unit);
                } else {
                    world.orders[i].status = OrderStatus::RetreatSuccess;
                    outcome.retreated.push(order.unit);
                }
            }
            _ => world.orders[i].status = OrderStatus::RetreatInvalid,
        }
    }

    let stranded: Vec<UnitId> = world
        .boards
        .iter()
        .flat_map(|b| b.units.iter().copied())
        .filter(|&id| world.unit(id).must_retreat)
        .filter(|id| !outcome.retreated.contains(id) && !outcome.disbanded.contains(id))
        .collect();
    for unit in stranded {
        let location = world.unit(unit).location;
        world.add_order(Order::disband(unit, location).with_status(OrderStatus::RetreatSuccess));
        outcome.disbanded.push(unit);
    }

    for unit in outcome.retreated.iter().chain(&outcome.disbanded) {
        world.unit_mut(*unit).must_retreat = false;
    }

    debug!(
        retreated = outcome.retreated.len(),
        disbanded = outcome.disbanded.len(),
        "retreats evaluated"
    );
    outcome
}

/// Origin of the successful move that dislodged the unit at `location`.
fn attacker_origin(world: &World, location: Location, adjacency: &AdjacencyValidator<'_>) -> Option<Location> {
    world
        .orders
        .iter()
        .filter(|o| o.is_move() && o.status == OrderStatus::Success)
        .find(|o| o.destination().is_some_and(|d| adjacency.equals_or_is_related(d, location)))
        .map(|o| o.location)
}
