//! Winter adjustments: builds and disbands.
//!
//! Each nation may build up to its surplus of centres over units and must
//! disband down to its centre count. When more orders are submitted than
//! allowed, or a nation fails to disband enough units, the choice is made at
//! random through a [`Chooser`], so tests can pin it down.

use tracing::debug;

use crate::board::{BoardKey, Nation, Order, OrderKind, OrderStatus, UnitId, World, ALL_NATIONS};

/// Source of the random picks made during adjustments.
pub trait Chooser {
    /// Picks `count` distinct indices out of `0..len`.
    ///
    /// A `count` of zero or less picks nothing; a `count` of `len` or more
    /// picks everything.
    fn choose(&mut self, len: usize, count: i32) -> Vec<usize>;
}

impl<R: rand::RngCore + ?Sized> Chooser for R {
    fn choose(&mut self, len: usize, count: i32) -> Vec<usize> {
        match usize::try_from(count) {
            Ok(0) | Err(_) => Vec::new(),
            Ok(count) if count >= len => (0..len).collect(),
            Ok(count) => rand::seq::index::sample(self, len, count).into_vec(),
        }
    }
}

/// Deterministic chooser that always takes the first candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChoice;

impl Chooser for FirstChoice {
    fn choose(&mut self, len: usize, count: i32) -> Vec<usize> {
        let count = usize::try_from(count).unwrap_or(0);
        (0..len.min(count)).collect()
    }
}

/// Totals of one adjustment evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjustmentOutcome {
    pub built: usize,
    pub disbanded: usize,
    /// Disbands added for nations that did not order enough.
    pub forced_disbands: usize,
}

/// Settles the builds and disbands among `touched` on every active winter
/// board.
pub fn evaluate<C: Chooser + ?Sized>(world: &mut World, touched: &[usize], chooser: &mut C) -> AdjustmentOutcome {
    let keys: Vec<BoardKey> = world
        .active_boards()
        .filter(|b| b.key.phase.is_winter())
        .map(|b| b.key)
        .collect();

    let mut outcome = AdjustmentOutcome::default();
    for key in keys {
        for nation in ALL_NATIONS {
            adjust(world, key, nation, touched, chooser, &mut outcome);
        }
    }
    debug!(
        built = outcome.built,
        disbanded = outcome.disbanded,
        forced = outcome.forced_disbands,
        "adjustments evaluated"
    );
    outcome
}

fn adjust<C: Chooser + ?Sized>(
    world: &mut World,
    key: BoardKey,
    nation: Nation,
    touched: &[usize],
    chooser: &mut C,
    outcome: &mut AdjustmentOutcome,
) {
    let Some(board) = world.board(key) else {
        return;
    };
    let centres = board.centre_count(nation) as i32;
    let units: Vec<UnitId> = world
        .board_units(key)
        .filter(|(_, u)| u.owner == nation)
        .map(|(id, _)| id)
        .collect();
    let adjustment = centres - units.len() as i32;

    let submitted = |kind: OrderKind| -> Vec<usize> {
        touched
            .iter()
            .copied()
            .filter(|&i| {
                let order = &world.orders[i];
                order.status == OrderStatus::New
                    && order.kind == kind
                    && order.location.board() == key
                    && world.unit(order.unit).owner == nation
            })
            .collect()
    };
    let builds = submitted(OrderKind::Build);
    let disbands = submitted(OrderKind::Disband);

    outcome.built += settle(world, &builds, adjustment, chooser);
    outcome.disbanded += settle(world, &disbands, -adjustment, chooser);

    let missing = -adjustment - disbands.len() as i32;
    if missing > 0 {
        let candidates: Vec<UnitId> = units
            .into_iter()
            .filter(|&id| !disbands.iter().any(|&i| world.orders[i].unit == id))
            .collect();
        for pick in chooser.choose(candidates.len(), missing) {
            let unit = candidates[pick];
            let location = world.unit(unit).location;
            world.add_order(Order::disband(unit, location).with_status(OrderStatus::Success));
            outcome.forced_disbands += 1;
        }
    }
}

/// Lets `count` of `orders` succeed and fails the rest.
fn settle<C: Chooser + ?Sized>(world: &mut World, orders: &[usize], count: i32, chooser: &mut C) -> usize {
    let chosen = chooser.choose(orders.len(), count);
    for (n, &i) in orders.iter().enumerate() {
        world.orders[i].status = if chosen.contains(&n) {
            OrderStatus::Success
        } else {
            OrderStatus::Failure
        };
    }
    chosen.len()
}
