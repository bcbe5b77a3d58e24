//! Which orders an undecided order is waiting on.

use crate::board::OrderKind;

use super::arena::Arena;

/// Orders whose outcome order `i` depends on, in the order the set resolver
/// should chase them.
pub fn dependencies(arena: &Arena, i: usize) -> Vec<usize> {
    let location = arena.orders[i].location;
    let mut deps: Vec<usize> = match arena.orders[i].kind {
        OrderKind::Hold => arena
            .moves_into(location)
            .chain(arena.supports[i].iter().copied())
            .collect(),
        OrderKind::Move { destination } => {
            let target = arena.order_at(destination);
            let competing: Vec<usize> = arena.moves_into(destination).filter(|&m| m != i).collect();
            let competing_legs = competing.iter().flat_map(|&m| arena.convoy_path[m].iter().copied());
            let competing_supports = competing.iter().flat_map(|&m| arena.supports[m].iter().copied());
            // A target that stays put is held by its supports.
            let holding_supports = target
                .filter(|&t| !arena.is_move(t))
                .into_iter()
                .flat_map(|t| arena.supports[t].iter().copied());
            target
                .filter(|&t| arena.is_move(t))
                .into_iter()
                .chain(arena.supports[i].iter().copied())
                .chain(arena.convoy_path[i].iter().copied())
                .chain(competing_legs)
                .chain(holding_supports)
                .chain(competing_supports)
                .collect()
        }
        OrderKind::Support { destination, .. } => {
            let opposing = arena.moves_into(location).filter(|&m| {
                arena.direct[m] && arena.related(arena.orders[m].location, destination)
            });
            let attacking_legs = arena
                .moves_into(location)
                .flat_map(|m| arena.convoy_path[m].iter().copied());
            arena.supports[i]
                .iter()
                .copied()
                .chain(opposing)
                .chain(arena.moves_into(location))
                .chain(attacking_legs)
                .collect()
        }
        OrderKind::Convoy { .. } => arena
            .moves_into(location)
            .chain(arena.supports[i].iter().copied())
            .collect(),
        OrderKind::Build | OrderKind::Disband => Vec::new(),
    };
    let mut seen = Vec::with_capacity(deps.len());
    deps.retain(|&d| {
        if d == i || seen.contains(&d) {
            false
        } else {
            seen.push(d);
            true
        }
    });
    deps
}
