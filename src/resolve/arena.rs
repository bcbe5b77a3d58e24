//! Working copy of the orders under resolution.
//!
//! The resolver never touches the world while it runs. Movement orders are
//! copied into flat, index-addressed tables; statuses live in their own
//! vector so a guess can be taken back by restoring one snapshot.

use crate::board::{Location, Nation, OrderKind, OrderStatus, OrderStrength, Unit, World};
use crate::validate::{AdjacencyValidator, ConvoyLeg, ConvoyPathValidator};

/// A movement order copied out of the world.
#[derive(Debug, Clone, Copy)]
pub struct ArenaOrder {
    pub kind: OrderKind,
    pub location: Location,
    pub unit: Unit,
    /// Index of the order in `world.orders`.
    pub source: usize,
}

impl ArenaOrder {
    pub const fn is_move(&self) -> bool {
        matches!(self.kind, OrderKind::Move { .. })
    }
}

/// Statuses and convoy availability captured before a guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    status: Vec<OrderStatus>,
    can_provide_path: Vec<bool>,
}

/// Index-addressed resolution state for one adjudication.
pub struct Arena<'a> {
    pub(crate) adjacency: &'a AdjacencyValidator<'a>,
    pub orders: Vec<ArenaOrder>,
    pub status: Vec<OrderStatus>,
    /// Non-invalid supports whose midpoint is this order's location.
    pub supports: Vec<Vec<usize>>,
    /// Convoys currently carrying this move.
    pub convoy_path: Vec<Vec<usize>>,
    /// The move swapping places with this one, if any.
    pub opposing: Vec<Option<usize>>,
    /// Whether a move can reach its destination without a convoy.
    pub direct: Vec<bool>,
    /// Convoyed moves broken by the paradox rule behave as holds.
    pub szykman_hold: Vec<bool>,
    pub can_provide_path: Vec<bool>,
    pub hold: Vec<OrderStrength>,
    pub attack: Vec<OrderStrength>,
    pub defend: Vec<OrderStrength>,
    pub prevent: Vec<OrderStrength>,
}

impl<'a> Arena<'a> {
    /// Copies the movement orders among `indices` out of `world`.
    pub fn new(world: &World, indices: &[usize], adjacency: &'a AdjacencyValidator<'a>) -> Self {
        let orders: Vec<ArenaOrder> = indices
            .iter()
            .map(|&i| (i, &world.orders[i]))
            .filter(|(_, o)| o.kind.is_movement())
            .map(|(i, o)| ArenaOrder {
                kind: o.kind,
                location: o.location,
                unit: *world.unit(o.unit),
                source: i,
            })
            .collect();
        let n = orders.len();
        let status = orders.iter().map(|o| world.orders[o.source].status).collect();
        let direct = orders
            .iter()
            .map(|o| match o.kind {
                OrderKind::Move { destination } => {
                    adjacency.is_valid_direct_move(&o.unit, o.location, destination, false, false)
                }
                _ => false,
            })
            .collect();

        let mut arena = Arena {
            adjacency,
            orders,
            status,
            supports: vec![Vec::new(); n],
            convoy_path: vec![Vec::new(); n],
            opposing: vec![None; n],
            direct,
            szykman_hold: vec![false; n],
            can_provide_path: vec![true; n],
            hold: vec![OrderStrength::ZERO; n],
            attack: vec![OrderStrength::ZERO; n],
            defend: vec![OrderStrength::ZERO; n],
            prevent: vec![OrderStrength::ZERO; n],
        };
        arena.link_supports();
        arena
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Copies the resolved statuses back onto the world's orders.
    pub fn write_back(&self, world: &mut World) {
        for (order, &status) in self.orders.iter().zip(&self.status) {
            world.orders[order.source].status = status;
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            status: self.status.clone(),
            can_provide_path: self.can_provide_path.clone(),
        }
    }

    /// Restores a snapshot verbatim, without propagating anything.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.status.clone_from(&snapshot.status);
        self.can_provide_path.clone_from(&snapshot.can_provide_path);
    }

    pub fn related(&self, a: Location, b: Location) -> bool {
        self.adjacency.equals_or_is_related(a, b)
    }

    pub fn is_move(&self, i: usize) -> bool {
        self.orders[i].is_move()
    }

    pub fn owner(&self, i: usize) -> Nation {
        self.orders[i].unit.owner
    }

    /// Destination of a move; `None` for every other kind.
    pub fn move_destination(&self, i: usize) -> Option<Location> {
        match self.orders[i].kind {
            OrderKind::Move { destination } => Some(destination),
            _ => None,
        }
    }

    /// The order issued from `location` or another coast of its province.
    pub fn order_at(&self, location: Location) -> Option<usize> {
        (0..self.len()).find(|&i| self.related(self.orders[i].location, location))
    }

    /// Moves whose destination is `location` or related to it.
    pub fn moves_into(&self, location: Location) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| {
            self.move_destination(i)
                .is_some_and(|d| self.related(d, location))
        })
    }

    /// Moves that still take part in combat: not invalid, not held by the
    /// paradox rule.
    pub fn is_active_move(&self, i: usize) -> bool {
        self.is_move(i) && !self.szykman_hold[i] && self.status[i] != OrderStatus::Invalid
    }

    fn link_supports(&mut self) {
        for i in 0..self.len() {
            let location = self.orders[i].location;
            let linked: Vec<usize> = (0..self.len())
                .filter(|&s| self.status[s] != OrderStatus::Invalid)
                .filter(|&s| match self.orders[s].kind {
                    OrderKind::Support { midpoint, .. } => self.related(midpoint, location),
                    _ => false,
                })
                .collect();
            self.supports[i] = linked;
        }
    }

    /// Recomputes routes for every move still in play. A move left with
    /// neither a route nor a direct connection fails, even one already
    /// marked successful.
    pub fn update_convoy_paths(&mut self) {
        let legs: Vec<ConvoyLeg> = (0..self.len())
            .filter(|&c| self.status[c] != OrderStatus::Invalid && self.can_provide_path[c])
            .filter_map(|c| match self.orders[c].kind {
                OrderKind::Convoy { midpoint, destination } => Some(ConvoyLeg {
                    index: c,
                    fleet: self.orders[c].unit,
                    location: self.orders[c].location,
                    midpoint,
                    destination,
                }),
                _ => None,
            })
            .collect();
        let validator = ConvoyPathValidator::new(self.adjacency);

        for i in 0..self.len() {
            if self.status[i] == OrderStatus::Invalid || self.szykman_hold[i] {
                continue;
            }
            let Some(destination) = self.move_destination(i) else {
                continue;
            };
            let order = self.orders[i];
            let path = validator.possible_convoys(&order.unit, order.location, destination, &legs);
            if path.is_empty() && !self.direct[i] && self.status[i] != OrderStatus::Failure {
                self.status[i] = OrderStatus::Failure;
            }
            self.convoy_path[i] = path;
        }
    }

    /// Pairs up direct moves that swap places.
    pub fn update_opposing(&mut self) {
        for i in 0..self.len() {
            self.opposing[i] = None;
            if !self.is_head_to_head_candidate(i) {
                continue;
            }
            let (from, to) = match self.orders[i].kind {
                OrderKind::Move { destination } => (self.orders[i].location, destination),
                _ => continue,
            };
            self.opposing[i] = (0..self.len()).find(|&j| {
                j != i
                    && self.is_head_to_head_candidate(j)
                    && self
                        .move_destination(j)
                        .is_some_and(|d| self.related(d, from) && self.related(to, self.orders[j].location))
            });
        }
    }

    fn is_head_to_head_candidate(&self, i: usize) -> bool {
        self.is_move(i) && self.status[i] != OrderStatus::Invalid && self.convoy_path[i].is_empty()
    }

    /// Indices of orders still undecided.
    pub fn unresolved(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.status[i] == OrderStatus::New)
            .collect()
    }
}
