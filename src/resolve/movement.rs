//! Movement phase evaluation.
//!
//! Resolves the touched orders, then works out which units were dislodged.
//! A dislodged unit that has somewhere to go is flagged `must_retreat`; one
//! with no escape is disbanded on the spot.

use tracing::debug;

use crate::board::{Location, Order, OrderKind, OrderStatus, UnitId, World};
use crate::validate::AdjacencyValidator;

use super::kruijswijk::resolve_orders;

/// Outcome of one movement evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementOutcome {
    /// Units now waiting for a retreat order.
    pub retreating: Vec<UnitId>,
    /// Units disbanded because they had nowhere to retreat to.
    pub disbanded: Vec<UnitId>,
}

/// Resolves `touched` and records the dislodgements it causes.
pub fn evaluate(world: &mut World, touched: &[usize], adjacency: &AdjacencyValidator<'_>) -> MovementOutcome {
    resolve_orders(world, touched, adjacency);

    let mut outcome = MovementOutcome::default();
    let winning_moves: Vec<(Location, Location)> = touched
        .iter()
        .map(|&i| &world.orders[i])
        .filter(|o| o.is_move() && o.status == OrderStatus::Success)
        .filter_map(|o| o.destination().map(|d| (o.location, d)))
        .collect();

    for (origin, destination) in winning_moves {
        let victims: Vec<UnitId> = world
            .board_units(destination.board())
            .filter(|(_, u)| adjacency.equals_or_is_related(u.location, destination))
            .map(|(id, _)| id)
            .collect();
        for unit in victims {
            if world.has_moved(unit) || has_retreated(world, unit) || world.unit(unit).must_retreat {
                continue;
            }
            if outcome.disbanded.contains(&unit) {
                continue;
            }
            if can_escape(world, unit, origin, adjacency) {
                world.unit_mut(unit).must_retreat = true;
                outcome.retreating.push(unit);
            } else {
                let location = world.unit(unit).location;
                world.add_order(Order::disband(unit, location).with_status(OrderStatus::RetreatSuccess));
                outcome.disbanded.push(unit);
            }
        }
    }

    debug!(
        retreating = outcome.retreating.len(),
        disbanded = outcome.disbanded.len(),
        "movement evaluated"
    );
    outcome
}

fn has_retreated(world: &World, unit: UnitId) -> bool {
    world
        .orders_for(unit)
        .any(|o| o.status.is_retreat() && o.status != OrderStatus::RetreatNew)
}

/// Moves resolved on the board of `location` with the given status.
fn moves_on_board(world: &World, location: Location, status: OrderStatus) -> impl Iterator<Item = &Order> + '_ {
    let board = location.board();
    world.orders.iter().filter(move |o| {
        o.status == status
            && matches!(o.kind, OrderKind::Move { destination } if destination.board() == board)
    })
}

/// Whether a dislodged unit may retreat into `target`.
///
/// A square is closed when a unit stays there, a move entered it, at least
/// two moves bounced there, or the attacker that dislodged the unit came
/// from it.
pub(crate) fn is_open_square(
    world: &World,
    target: Location,
    attacker_origin: Option<Location>,
    adjacency: &AdjacencyValidator<'_>,
) -> bool {
    let related = |a: Location| adjacency.equals_or_is_related(a, target);

    let occupied = world
        .board_units(target.board())
        .any(|(id, u)| related(u.location) && !world.has_left(id));
    if occupied {
        return false;
    }
    if moves_on_board(world, target, OrderStatus::Success).any(|o| o.destination().is_some_and(related)) {
        return false;
    }
    let bounced = moves_on_board(world, target, OrderStatus::Failure)
        .filter(|o| o.destination().is_some_and(related))
        .count();
    if bounced >= 2 {
        return false;
    }
    !attacker_origin.is_some_and(related)
}

fn can_escape(world: &World, unit: UnitId, attacker_origin: Location, adjacency: &AdjacencyValidator<'_>) -> bool {
    adjacency
        .adjacent_locations(world.unit(unit))
        .into_iter()
        .any(|target| is_open_square(world, target, Some(attacker_origin), adjacency))
}
