//! Adjudication entry point.
//!
//! The [`Adjudicator`] owns the static collaborators (region map, world
//! factory, options) and runs one full adjudication over a world: implicit
//! holds, the touched-order search, validation, the phase evaluators, the
//! safety sweep, board execution and the victory check.

use tracing::{debug, info, warn};

use crate::board::{BoardKey, Nation, Order, OrderStatus, RegionMap, UnitId, World, WorldFactory};
use crate::resolve::{self, find_touched, Chooser};
use crate::validate::{AdjacencyValidator, Validator};

/// Supply centres needed to win on the standard map.
pub const DEFAULT_VICTORY_CENTRES: usize = 18;

/// Rule switches for an adjudicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjudicatorOptions {
    /// Moves between boards must keep their region.
    pub strict_adjacencies: bool,
    pub victory_centres: usize,
}

impl Default for AdjudicatorOptions {
    fn default() -> Self {
        Self {
            strict_adjacencies: false,
            victory_centres: DEFAULT_VICTORY_CENTRES,
        }
    }
}

/// Summary of one adjudication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjudicationReport {
    /// Orders considered, including earlier orders that were re-adjudicated.
    pub orders: usize,
    /// Orders the safety sweep had to force to a failure.
    pub forced: usize,
    pub retreating: Vec<UnitId>,
    pub created: Vec<BoardKey>,
    pub forked: Vec<(BoardKey, i32)>,
    pub winner: Option<Nation>,
}

/// Runs adjudications against a fixed map and rule set.
pub struct Adjudicator<'a> {
    map: &'a RegionMap,
    factory: &'a WorldFactory,
    options: AdjudicatorOptions,
}

impl<'a> Adjudicator<'a> {
    pub fn new(map: &'a RegionMap, factory: &'a WorldFactory, options: AdjudicatorOptions) -> Self {
        Self { map, factory, options }
    }

    pub fn options(&self) -> &AdjudicatorOptions {
        &self.options
    }

    /// Adjudicates every submitted order, advancing the world by one phase.
    ///
    /// `chooser` settles over-building and missing disbands; movement and
    /// retreats never consult it.
    pub fn adjudicate<C: Chooser + ?Sized>(&self, world: &mut World, chooser: &mut C) -> AdjudicationReport {
        let mut report = AdjudicationReport::default();
        if let Some(winner) = world.winner {
            world.orders.retain(|o| o.status != OrderStatus::New);
            report.winner = Some(winner);
            return report;
        }

        world.iteration += 1;
        let adjacency = AdjacencyValidator::new(self.map, self.options.strict_adjacencies);
        let has_retreats = world.has_retreats();

        let active: Vec<BoardKey> = world.active_boards().map(|b| b.key).collect();
        for key in active {
            if let Some(board) = world.board_mut(key) {
                board.might_advance = true;
            }
        }
        let stale = if has_retreats {
            Vec::new()
        } else {
            let stale = reject_inactive_orders(world);
            add_implicit_holds(world);
            stale
        };

        let new_orders: Vec<usize> = (0..world.orders.len())
            .filter(|&i| world.orders[i].status == OrderStatus::New)
            .collect();
        let mut touched = find_touched(world, &new_orders, &adjacency, has_retreats);
        // Rejected orders stay rejected even when a live order reaches them.
        touched.retain(|i| !stale.contains(i));
        if !has_retreats {
            for &i in &touched {
                world.orders[i].status = OrderStatus::New;
            }
        }
        debug!(new = new_orders.len(), touched = touched.len(), "collected orders");

        Validator::new(&adjacency, self.factory).validate(world, &touched, has_retreats);

        if has_retreats {
            resolve::retreat::evaluate(world, &touched, &adjacency);
        } else {
            let movement = resolve::movement::evaluate(world, &touched, &adjacency);
            report.retreating = movement.retreating;
            resolve::build::evaluate(world, &touched, chooser);
        }

        report.orders = touched.len();
        report.forced = safety_sweep(world);

        let execution = resolve::execute(world, self.map);
        report.created = execution.created;
        report.forked = execution.forked;

        world.winner = resolve::find_winner(world, self.map, self.options.victory_centres);
        report.winner = world.winner;

        info!(
            iteration = world.iteration,
            orders = report.orders,
            boards = report.created.len(),
            forks = report.forked.len(),
            retreating = report.retreating.len(),
            winner = ?report.winner,
            "adjudicated"
        );
        report
    }

    /// Adjudicates with the thread-local random generator.
    pub fn adjudicate_with_rng(&self, world: &mut World) -> AdjudicationReport {
        self.adjudicate(world, &mut rand::thread_rng())
    }
}

/// New orders may only be given on the latest board of each timeline.
/// Returns the indices of the orders it rejected.
fn reject_inactive_orders(world: &mut World) -> Vec<usize> {
    let stale: Vec<usize> = (0..world.orders.len())
        .filter(|&i| {
            let order = &world.orders[i];
            order.status == OrderStatus::New && !world.is_active(order.location.board())
        })
        .collect();
    for &i in &stale {
        world.orders[i].status = OrderStatus::Invalid;
    }
    if !stale.is_empty() {
        debug!(count = stale.len(), "rejected orders on inactive boards");
    }
    stale
}

/// Orders every idle unit on an active, non-winter board to hold.
fn add_implicit_holds(world: &mut World) {
    let idle: Vec<UnitId> = world
        .active_boards()
        .filter(|b| !b.key.phase.is_winter())
        .flat_map(|b| b.units.iter().copied())
        .filter(|&id| world.orders_for(id).next().is_none())
        .collect();
    for id in idle {
        let location = world.unit(id).location;
        world.add_order(Order::hold(id, location));
    }
}

/// Forces any order left undecided to a failure.
fn safety_sweep(world: &mut World) -> usize {
    let mut forced = 0;
    for (i, order) in world.orders.iter_mut().enumerate() {
        let status = match order.status {
            OrderStatus::New => OrderStatus::Failure,
            OrderStatus::RetreatNew => OrderStatus::RetreatFailure,
            _ => continue,
        };
        warn!(order = i, kind = order.kind.name(), location = ?order.location, "order left undecided");
        order.status = status;
        forced += 1;
    }
    forced
}
