//! Kruijswijk guess-and-check resolution of simultaneous orders.
//!
//! Repeated passes decide every order whose outcome the strength bounds
//! already prove. Whatever is left is chased through its dependencies;
//! a dependency cycle is broken by the backup rule, which tries both
//! outcomes for the order at the bottom of the cycle and keeps the one
//! that is consistent, falling back to circular movement or the Szykman
//! convoy paradox rule when both are.

use tracing::{debug, trace};

use crate::board::{OrderKind, OrderStatus, World};
use crate::validate::AdjacencyValidator;

use super::arena::Arena;
use super::dependency::dependencies;
use super::order::try_resolve;
use super::strength::update_strengths;

/// Resolves one set of movement orders.
///
/// Allocate per adjudication; the resolver owns its working copy of the
/// orders and writes statuses back only when asked.
pub struct OrderSetResolver<'a> {
    arena: Arena<'a>,
}

impl<'a> OrderSetResolver<'a> {
    /// Copies the movement orders among `indices` out of `world`.
    pub fn new(world: &World, indices: &[usize], adjacency: &'a AdjacencyValidator<'a>) -> Self {
        Self {
            arena: Arena::new(world, indices, adjacency),
        }
    }

    pub fn arena(&self) -> &Arena<'a> {
        &self.arena
    }

    /// Gives every order a terminal status.
    pub fn resolve(&mut self) {
        self.run_passes();

        let mut unresolved = self.arena.unresolved();
        while !unresolved.is_empty() {
            for &i in &unresolved {
                let mut stack = Vec::new();
                self.resolve_order(i, &mut stack);
                self.run_passes();
            }
            let remaining = self.arena.unresolved();
            if remaining == unresolved {
                // No dependency chain closed on itself; guess the first one.
                debug!(count = remaining.len(), "resolver made no progress");
                self.backup_rule(&remaining[..1]);
                unresolved = self.arena.unresolved();
                continue;
            }
            unresolved = remaining;
        }

        self.update_dependent_orders();
    }

    /// Copies the statuses back onto the world's orders.
    pub fn write_back(&self, world: &mut World) {
        self.arena.write_back(world);
    }

    fn pass(&mut self) {
        self.arena.update_convoy_paths();
        self.arena.update_opposing();
        update_strengths(&mut self.arena);
        for i in 0..self.arena.len() {
            try_resolve(&mut self.arena, i);
        }
        self.fail_self_attacking_supports();
    }

    fn run_passes(&mut self) {
        loop {
            let before = self.arena.snapshot();
            self.pass();
            if self.arena.snapshot() == before {
                break;
            }
        }
    }

    /// A support for an attack on a unit of the supporter's own side that
    /// stays in place can never take effect.
    fn fail_self_attacking_supports(&mut self) {
        for s in 0..self.arena.len() {
            if self.arena.status[s] != OrderStatus::New {
                continue;
            }
            let OrderKind::Support { midpoint, destination } = self.arena.orders[s].kind else {
                continue;
            };
            if self.arena.related(midpoint, destination) {
                continue;
            }
            let Some(target) = self.arena.order_at(destination) else {
                continue;
            };
            let stays = !self.arena.is_move(target)
                || matches!(self.arena.status[target], OrderStatus::Failure | OrderStatus::Invalid);
            if stays && self.arena.owner(target) == self.arena.owner(s) {
                self.arena.status[s] = OrderStatus::Failure;
            }
        }
    }

    fn resolve_order(&mut self, i: usize, stack: &mut Vec<usize>) {
        if self.arena.status[i] != OrderStatus::New {
            return;
        }
        if stack.contains(&i) {
            self.backup_rule(stack);
            return;
        }

        self.pass();
        if self.arena.status[i] != OrderStatus::New {
            return;
        }

        stack.push(i);
        for dep in dependencies(&self.arena, i) {
            self.resolve_order(dep, stack);
            if self.arena.status[i] != OrderStatus::New {
                break;
            }
        }
        stack.pop();
        self.pass();
    }

    fn backup_rule(&mut self, stack: &[usize]) {
        let Some(&guessed) = stack.first() else {
            return;
        };
        if self.arena.status[guessed] != OrderStatus::New {
            return;
        }

        let succeeds = self.is_consistent_guess(guessed, OrderStatus::Success);
        let fails = self.is_consistent_guess(guessed, OrderStatus::Failure);
        debug!(order = guessed, depth = stack.len(), succeeds, fails, "backup rule");

        match (succeeds, fails) {
            (true, false) => self.arena.status[guessed] = OrderStatus::Success,
            (false, true) => self.arena.status[guessed] = OrderStatus::Failure,
            (true, true) if self.is_circular(stack) => {
                self.arena.status[guessed] = OrderStatus::Success;
            }
            _ => {
                if !self.apply_szykman_rule(stack) {
                    trace!(order = guessed, "no convoy in cycle, failing first order");
                    self.arena.status[guessed] = OrderStatus::Failure;
                }
            }
        }
        self.run_passes();
        if self.arena.status[guessed] == OrderStatus::New {
            self.resolve_order(guessed, &mut Vec::new());
        }
    }

    /// Assumes `guess` for order `i`, settles everything else, then checks
    /// whether `i` would reach the same outcome by itself. Staying
    /// undecided does not count.
    fn is_consistent_guess(&mut self, i: usize, guess: OrderStatus) -> bool {
        let snapshot = self.arena.snapshot();
        self.arena.status[i] = guess;
        self.run_passes();

        self.arena.status[i] = OrderStatus::New;
        self.arena.update_convoy_paths();
        self.arena.update_opposing();
        update_strengths(&mut self.arena);
        try_resolve(&mut self.arena, i);
        let outcome = self.arena.status[i];

        self.arena.restore(&snapshot);
        outcome == guess
    }

    /// Every move on the stack enters a square another move on the stack
    /// leaves.
    fn is_circular(&self, stack: &[usize]) -> bool {
        let moves: Vec<usize> = stack.iter().copied().filter(|&i| self.arena.is_move(i)).collect();
        !moves.is_empty()
            && moves.iter().all(|&m| {
                self.arena.move_destination(m).is_some_and(|to| {
                    moves
                        .iter()
                        .any(|&other| self.arena.related(self.arena.orders[other].location, to))
                })
            })
    }

    /// Convoys caught in a paradox fail and the armies they carry hold.
    fn apply_szykman_rule(&mut self, stack: &[usize]) -> bool {
        let mut changed = false;
        for &i in stack {
            if self.arena.status[i] != OrderStatus::New {
                continue;
            }
            match self.arena.orders[i].kind {
                OrderKind::Convoy { .. } => {
                    self.arena.status[i] = OrderStatus::Failure;
                    self.arena.can_provide_path[i] = false;
                    changed = true;
                }
                OrderKind::Move { .. } if !self.arena.convoy_path[i].is_empty() => {
                    self.arena.status[i] = OrderStatus::Failure;
                    self.arena.szykman_hold[i] = true;
                    for leg in self.arena.convoy_path[i].clone() {
                        if self.arena.status[leg] == OrderStatus::New {
                            self.arena.status[leg] = OrderStatus::Failure;
                        }
                        self.arena.can_provide_path[leg] = false;
                    }
                    changed = true;
                }
                _ => {}
            }
        }
        if changed {
            debug!(depth = stack.len(), "convoy paradox broken");
        }
        changed
    }

    /// Supports of failed holds and moves fail with them, as do convoys of
    /// failed moves.
    fn update_dependent_orders(&mut self) {
        for i in 0..self.arena.len() {
            if self.arena.status[i] != OrderStatus::Failure {
                continue;
            }
            match self.arena.orders[i].kind {
                OrderKind::Hold => {
                    for s in self.arena.supports[i].clone() {
                        self.arena.status[s] = OrderStatus::Failure;
                    }
                }
                OrderKind::Move { destination } => {
                    for s in self.arena.supports[i].clone() {
                        if let OrderKind::Support { destination: d, .. } = self.arena.orders[s].kind {
                            if self.arena.related(d, destination) {
                                self.arena.status[s] = OrderStatus::Failure;
                            }
                        }
                    }
                    let location = self.arena.orders[i].location;
                    for c in 0..self.arena.len() {
                        if let OrderKind::Convoy { midpoint, destination: d } = self.arena.orders[c].kind {
                            let carries = self.arena.related(midpoint, location)
                                && self.arena.related(d, destination);
                            if carries && self.arena.status[c] != OrderStatus::Invalid {
                                self.arena.status[c] = OrderStatus::Failure;
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Resolves the movement orders among `indices` and writes their statuses
/// back onto `world`.
pub fn resolve_orders(world: &mut World, indices: &[usize], adjacency: &AdjacencyValidator<'_>) {
    let mut resolver = OrderSetResolver::new(world, indices, adjacency);
    resolver.resolve();
    resolver.write_back(world);
}
