//! Finds the orders an adjudication has to consider together.
//!
//! Two orders interact when they touch the same province on the same board.
//! Starting from the newly submitted orders, the finder follows that
//! relation through the whole order history, so a move into an earlier board
//! drags the orders already resolved there back into play.

use std::collections::HashMap;

use crate::board::{Location, OrderStatus, World};
use crate::validate::{touched_locations, AdjacencyValidator};

/// Expands `new_orders` to every connected order and flags the boards they
/// touch with `might_advance`.
///
/// During retreats only undecided retreat orders are pulled in, and only the
/// boards they are given on are flagged. Otherwise earlier hold, move, support
/// and convoy orders are. Returns indices into `world.orders`, sorted.
pub fn find_touched(
    world: &mut World,
    new_orders: &[usize],
    adjacency: &AdjacencyValidator<'_>,
    has_retreats: bool,
) -> Vec<usize> {
    let mut is_new = vec![false; world.orders.len()];
    for &i in new_orders {
        is_new[i] = true;
    }
    let eligible = |i: usize| {
        let order = &world.orders[i];
        is_new[i]
            || if has_retreats {
                order.status == OrderStatus::RetreatNew
            } else {
                order.kind.is_movement() && !order.status.is_retreat()
            }
    };

    let mut lookup: HashMap<Location, Vec<usize>> = HashMap::new();
    for i in (0..world.orders.len()).filter(|&i| eligible(i)) {
        for location in touched_locations(&world.orders[i]) {
            lookup
                .entry(adjacency.parent_location(location))
                .or_default()
                .push(i);
        }
    }

    let mut seen = vec![false; world.orders.len()];
    let mut stack: Vec<usize> = new_orders.to_vec();
    let mut touched = Vec::new();
    while let Some(i) = stack.pop() {
        if seen[i] {
            continue;
        }
        seen[i] = true;
        touched.push(i);
        for location in touched_locations(&world.orders[i]) {
            if let Some(next) = lookup.get(&adjacency.parent_location(location)) {
                stack.extend(next.iter().copied().filter(|&j| !seen[j]));
            }
        }
    }
    touched.sort_unstable();

    for &i in &touched {
        let order = world.orders[i];
        // Retreats never leave their board.
        let locations = if has_retreats {
            vec![order.location]
        } else {
            touched_locations(&order)
        };
        for location in locations {
            if let Some(board) = world.board_mut(location.board()) {
                board.might_advance = true;
            }
        }
    }
    touched
}
