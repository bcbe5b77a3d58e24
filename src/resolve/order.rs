//! Single-order resolution.
//!
//! [`try_resolve`] decides an order only when the current strength bounds
//! prove the outcome; otherwise the order stays `New` for the set resolver
//! to chase through its dependencies.

use crate::board::{Location, OrderKind, OrderStatus, OrderStrength};

use super::arena::Arena;

/// Attempts to give order `i` a terminal status.
pub fn try_resolve(arena: &mut Arena, i: usize) {
    if arena.status[i] != OrderStatus::New {
        return;
    }
    match arena.orders[i].kind {
        OrderKind::Hold => resolve_hold(arena, i),
        OrderKind::Move { .. } => resolve_move(arena, i),
        OrderKind::Support { destination, .. } => resolve_support(arena, i, destination),
        OrderKind::Convoy { .. } => resolve_convoy(arena, i),
        OrderKind::Build | OrderKind::Disband => {}
    }
}

fn is_failed(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Failure | OrderStatus::Invalid)
}

fn attackers(arena: &Arena, i: usize) -> Vec<usize> {
    arena
        .moves_into(arena.orders[i].location)
        .filter(|&m| m != i && arena.is_active_move(m))
        .collect()
}

fn resolve_hold(arena: &mut Arena, i: usize) {
    let attackers = attackers(arena, i);
    if attackers.iter().any(|&m| arena.status[m] == OrderStatus::Success) {
        arena.status[i] = OrderStatus::Failure;
    } else if attackers.iter().all(|&m| is_failed(arena.status[m])) {
        arena.status[i] = OrderStatus::Success;
    }
}

fn resolve_move(arena: &mut Arena, i: usize) {
    let Some(destination) = arena.move_destination(i) else {
        return;
    };
    let attack = arena.attack[i];
    let competitors: Vec<usize> = arena
        .moves_into(destination)
        .filter(|&m| m != i && arena.is_active_move(m))
        .collect();
    let prevent = competitors.iter().fold(OrderStrength::ZERO, |acc, &m| {
        OrderStrength::new(acc.min.max(arena.prevent[m].min), acc.max.max(arena.prevent[m].max))
    });
    let beats_prevent = attack.min > prevent.max;
    let loses_prevent = attack.max <= prevent.min;

    if let Some(opposing) = arena.opposing[i].filter(|&o| !arena.szykman_hold[o]) {
        let defend = arena.defend[opposing];
        if beats_prevent && attack.min > defend.max {
            arena.status[i] = OrderStatus::Success;
        } else if loses_prevent || attack.max <= defend.min {
            arena.status[i] = OrderStatus::Failure;
        }
        return;
    }

    // A friendly unit in a head-to-head at the destination: this move follows
    // it in once it wins, and stays out if it loses.
    if let Some(target) = arena.order_at(destination) {
        if let Some(rival) = arena.opposing[target] {
            let follows = arena.is_move(target)
                && arena.owner(target) == arena.owner(i)
                && !competitors.is_empty()
                && competitors.iter().all(|&m| m == rival);
            if follows {
                match arena.status[target] {
                    OrderStatus::Success => arena.status[i] = OrderStatus::Success,
                    OrderStatus::Failure => arena.status[i] = OrderStatus::Failure,
                    _ => {}
                }
                return;
            }
        }
    }

    let hold = arena
        .order_at(destination)
        .map(|t| arena.hold[t])
        .unwrap_or(OrderStrength::ZERO);
    if beats_prevent && attack.min > hold.max {
        arena.status[i] = OrderStatus::Success;
    } else if loses_prevent || attack.max <= hold.min {
        arena.status[i] = OrderStatus::Failure;
    }
}

fn resolve_support(arena: &mut Arena, i: usize, destination: Location) {
    let owner = arena.owner(i);
    let attackers = attackers(arena, i);
    let from_target = |arena: &Arena, m: usize| arena.related(arena.orders[m].location, destination);
    let convoyed = |arena: &Arena, m: usize| !arena.convoy_path[m].is_empty();
    let stranded = |arena: &Arena, m: usize| {
        if convoyed(arena, m) {
            arena.convoy_path[m].iter().any(|&c| !arena.can_provide_path[c])
        } else {
            !arena.direct[m]
        }
    };

    let harmless = attackers.iter().all(|&m| {
        arena.owner(m) == owner
            || (from_target(arena, m) && is_failed(arena.status[m]))
            || stranded(arena, m)
    });
    if harmless {
        arena.status[i] = OrderStatus::Success;
        return;
    }

    if attackers.iter().any(|&m| arena.status[m] == OrderStatus::Success) {
        arena.status[i] = OrderStatus::Failure;
        return;
    }

    let cuts = attackers.iter().any(|&m| {
        if arena.owner(m) == owner || from_target(arena, m) {
            return false;
        }
        if convoyed(arena, m) {
            arena.convoy_path[m]
                .iter()
                .all(|&c| arena.status[c] == OrderStatus::Success)
        } else {
            arena.direct[m]
        }
    });
    if cuts {
        arena.status[i] = OrderStatus::Failure;
    }
}

fn resolve_convoy(arena: &mut Arena, i: usize) {
    let location = arena.orders[i].location;
    let attackers: Vec<usize> = (0..arena.len())
        .filter(|&m| arena.is_active_move(m) && arena.move_destination(m) == Some(location))
        .collect();
    if attackers.iter().any(|&m| arena.status[m] == OrderStatus::Success) {
        arena.status[i] = OrderStatus::Failure;
        arena.can_provide_path[i] = false;
    } else if attackers.iter().all(|&m| is_failed(arena.status[m])) {
        arena.status[i] = OrderStatus::Success;
    }
}
