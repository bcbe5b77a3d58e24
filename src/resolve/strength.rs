//! Hold, attack, defend and prevent strengths.
//!
//! Each strength is a `{min, max}` range. A successful support adds to both
//! bounds, an undecided one to `max` only, so bounds only ever narrow as the
//! resolver decides more orders.

use crate::board::{OrderStatus, OrderStrength};

use super::arena::Arena;

/// Recomputes all four strengths of every order.
pub fn update_strengths(arena: &mut Arena) {
    for i in 0..arena.len() {
        let hold = hold_strength(arena, i);
        let (attack, defend, prevent) = if arena.is_move(i) {
            (
                attack_strength(arena, i),
                defend_strength(arena, i),
                prevent_strength(arena, i),
            )
        } else {
            (OrderStrength::ZERO, OrderStrength::ZERO, OrderStrength::ZERO)
        };
        arena.hold[i] = hold;
        arena.attack[i] = attack;
        arena.defend[i] = defend;
        arena.prevent[i] = prevent;
    }
}

fn add_support(strength: &mut OrderStrength, status: OrderStatus, max_only: bool) {
    match status {
        OrderStatus::Success => {
            if !max_only {
                strength.min += 1;
            }
            strength.max += 1;
        }
        OrderStatus::New => strength.max += 1,
        _ => {}
    }
}

fn with_supports(arena: &Arena, i: usize, base: OrderStrength) -> OrderStrength {
    let mut strength = base;
    for &s in &arena.supports[i] {
        add_support(&mut strength, arena.status[s], false);
    }
    strength
}

/// Strength with which an order keeps its own square.
pub fn hold_strength(arena: &Arena, i: usize) -> OrderStrength {
    if !arena.is_move(i) {
        return with_supports(arena, i, OrderStrength::fixed(1));
    }
    match arena.status[i] {
        OrderStatus::Success => OrderStrength::ZERO,
        OrderStatus::Invalid => with_supports(arena, i, OrderStrength::fixed(1)),
        OrderStatus::New => OrderStrength::new(0, 1),
        _ => OrderStrength::fixed(1),
    }
}

/// Strength with which a move resists the move swapping places with it.
pub fn defend_strength(arena: &Arena, i: usize) -> OrderStrength {
    with_supports(arena, i, OrderStrength::fixed(1))
}

/// Strength with which a move tries to enter its destination.
///
/// Supports from the owner of the unit being attacked never help dislodge
/// it, and a unit can never be dislodged by its own side.
pub fn attack_strength(arena: &Arena, i: usize) -> OrderStrength {
    if matches!(arena.status[i], OrderStatus::Invalid | OrderStatus::Failure) {
        return OrderStrength::ZERO;
    }

    let mut strength = OrderStrength::fixed(1);
    let legs = &arena.convoy_path[i];
    if legs.iter().any(|&c| arena.status[c] == OrderStatus::New) {
        strength.min = 0;
        if legs.iter().any(|&c| arena.status[c] == OrderStatus::Failure) {
            strength.max = 0;
            return strength;
        }
    }

    let Some(destination) = arena.move_destination(i) else {
        return OrderStrength::ZERO;
    };
    let Some(target) = arena.order_at(destination) else {
        return with_supports(arena, i, strength);
    };
    let target_status = arena.status[target];
    let target_moves = arena.is_move(target);

    if arena.owner(target) == arena.owner(i) {
        if !target_moves || matches!(target_status, OrderStatus::Failure | OrderStatus::Invalid) {
            return OrderStrength::ZERO;
        }
        let mut strength = with_supports(arena, i, strength);
        if target_status == OrderStatus::New {
            strength.min = 0;
        }
        return strength;
    }

    if target_moves && target_status == OrderStatus::Success {
        return with_supports(arena, i, strength);
    }
    // A target still being carried away by a live convoy is not defended.
    if target_moves && arena.convoy_path[target].iter().any(|&c| arena.can_provide_path[c]) {
        return with_supports(arena, i, strength);
    }

    let target_owner = arena.owner(target);
    let stays = !target_moves || matches!(target_status, OrderStatus::Failure | OrderStatus::Invalid);
    for &s in &arena.supports[i] {
        if arena.owner(s) != target_owner {
            add_support(&mut strength, arena.status[s], false);
        } else if !stays {
            add_support(&mut strength, arena.status[s], true);
        }
    }
    strength
}

/// Strength with which a move keeps other moves out of its destination.
pub fn prevent_strength(arena: &Arena, i: usize) -> OrderStrength {
    if arena.status[i] == OrderStatus::Invalid {
        return OrderStrength::ZERO;
    }
    let legs = &arena.convoy_path[i];
    if !arena.direct[i] && !legs.iter().any(|&c| arena.can_provide_path[c]) {
        return OrderStrength::ZERO;
    }

    let mut strength = with_supports(arena, i, OrderStrength::fixed(1));
    if legs.iter().any(|&c| arena.status[c] == OrderStatus::New) {
        strength.min = 0;
        if legs.iter().any(|&c| arena.status[c] == OrderStatus::Failure) {
            strength.max = 0;
        }
        return strength;
    }

    if let Some(opposing) = arena.opposing[i] {
        match arena.status[opposing] {
            OrderStatus::Success => return OrderStrength::ZERO,
            OrderStatus::New => strength.min = 0,
            _ => {}
        }
    }
    strength
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, BoardKey, Location, Nation, Order, Phase, RegionMap, Unit, UnitId, World};
    use crate::validate::AdjacencyValidator;

    struct Fixture {
        map: RegionMap,
        world: World,
        key: BoardKey,
    }

    impl Fixture {
        fn new() -> Self {
            let key = BoardKey::new(1, 1901, Phase::Spring);
            let mut world = World::new();
            world.boards.push(Board::new(key, Vec::new()));
            Self {
                map: RegionMap::standard().unwrap(),
                world,
                key,
            }
        }

        fn at(&self, code: &str) -> Location {
            self.key.location(self.map.lookup(code).unwrap())
        }

        fn army(&mut self, owner: Nation, code: &str) -> UnitId {
            let at = self.at(code);
            self.world.place_unit(Unit::army(owner, at)).unwrap()
        }

        fn fleet(&mut self, owner: Nation, code: &str) -> UnitId {
            let at = self.at(code);
            self.world.place_unit(Unit::fleet(owner, at)).unwrap()
        }
    }

    #[test]
    fn supported_attack_counts_foreign_supports_only() {
        let mut f = Fixture::new();
        let mun = f.army(Nation::Germany, "Mun");
        let tyr = f.army(Nation::Germany, "Tyr");
        let boh = f.army(Nation::Austria, "Boh");
        let sil = f.army(Nation::Austria, "Sil");
        let orders = [
            Order::movement(mun, f.at("Mun"), f.at("Boh")),
            Order::support(tyr, f.at("Tyr"), f.at("Mun"), f.at("Boh")),
            Order::hold(boh, f.at("Boh")),
            Order::support(sil, f.at("Sil"), f.at("Mun"), f.at("Boh")),
        ];
        for order in orders {
            f.world.add_order(order);
        }
        let adjacency = AdjacencyValidator::new(&f.map, false);
        let mut arena = Arena::new(&f.world, &[0, 1, 2, 3], &adjacency);
        arena.status[1] = OrderStatus::Success;
        arena.status[3] = OrderStatus::Success;
        update_strengths(&mut arena);

        assert_eq!(arena.attack[0], OrderStrength::fixed(2));
        assert_eq!(arena.prevent[0], OrderStrength::fixed(3));
        assert_eq!(arena.hold[2], OrderStrength::fixed(1));
    }

    #[test]
    fn undecided_move_has_uncertain_hold_strength() {
        let mut f = Fixture::new();
        let mun = f.army(Nation::Germany, "Mun");
        f.world.add_order(Order::movement(mun, f.at("Mun"), f.at("Boh")));
        let adjacency = AdjacencyValidator::new(&f.map, false);
        let mut arena = Arena::new(&f.world, &[0], &adjacency);
        update_strengths(&mut arena);
        assert_eq!(arena.hold[0], OrderStrength::new(0, 1));
        assert_eq!(arena.attack[0], OrderStrength::fixed(1));

        arena.status[0] = OrderStatus::Success;
        update_strengths(&mut arena);
        assert_eq!(arena.hold[0], OrderStrength::ZERO);
    }

    #[test]
    fn cannot_attack_own_unit_that_stays() {
        let mut f = Fixture::new();
        let mun = f.army(Nation::Germany, "Mun");
        let boh = f.army(Nation::Germany, "Boh");
        f.world.add_order(Order::movement(mun, f.at("Mun"), f.at("Boh")));
        f.world.add_order(Order::hold(boh, f.at("Boh")));
        let adjacency = AdjacencyValidator::new(&f.map, false);
        let mut arena = Arena::new(&f.world, &[0, 1], &adjacency);
        update_strengths(&mut arena);
        assert_eq!(arena.attack[0], OrderStrength::ZERO);
        assert_eq!(arena.prevent[0], OrderStrength::fixed(1));
    }

    #[test]
    fn attack_on_convoyed_unit_counts_all_supports() {
        let mut f = Fixture::new();
        let bre = f.army(Nation::France, "Bre");
        let eng = f.fleet(Nation::France, "ENG");
        let par = f.army(Nation::Germany, "Par");
        let gas = f.army(Nation::France, "Gas");
        let orders = [
            Order::movement(bre, f.at("Bre"), f.at("Lon")),
            Order::convoy(eng, f.at("ENG"), f.at("Bre"), f.at("Lon")),
            Order::movement(par, f.at("Par"), f.at("Bre")),
            Order::support(gas, f.at("Gas"), f.at("Par"), f.at("Bre")),
        ];
        for order in orders {
            f.world.add_order(order);
        }
        let adjacency = AdjacencyValidator::new(&f.map, false);
        let mut arena = Arena::new(&f.world, &[0, 1, 2, 3], &adjacency);
        arena.status[3] = OrderStatus::Success;
        arena.update_convoy_paths();
        update_strengths(&mut arena);

        assert_eq!(arena.convoy_path[0], vec![1]);
        assert_eq!(arena.attack[2], OrderStrength::fixed(2));
    }
}
