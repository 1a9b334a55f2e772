//! The CPU's move choice: uniform over the moves that still have PP.

use crate::model::Combatant;
use rand::seq::SliceRandom;
use rand::Rng;

/// Picks one usable move index at random, or `None` when every move is spent.
pub fn choose_move<R: Rng + ?Sized>(combatant: &Combatant, rng: &mut R) -> Option<usize> {
    combatant.usable_moves().choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Move, Stats};
    use crate::types::PokemonType;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn combatant(moves: Vec<Move>) -> Combatant {
        Combatant::new(
            "Cpu",
            PokemonType::Normal,
            Stats {
                max_hp: 500,
                attack: 10,
                defense: 10,
                speed: 10,
            },
            moves,
        )
        .unwrap()
    }

    fn drain(c: &mut Combatant, index: usize, target: &mut Combatant, rng: &mut SmallRng) {
        while c.moves()[index].can_use() {
            c.use_move(index, target, rng).unwrap();
        }
    }

    #[test]
    fn returns_none_when_all_moves_are_spent() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut cpu = combatant(vec![
            Move::new("A", PokemonType::Normal, 10, 2),
            Move::new("B", PokemonType::Normal, 10, 1),
        ]);
        let mut target = combatant(vec![Move::new("T", PokemonType::Normal, 10, 1)]);
        drain(&mut cpu, 0, &mut target, &mut rng);
        drain(&mut cpu, 1, &mut target, &mut rng);
        assert_eq!(choose_move(&cpu, &mut rng), None);
    }

    #[test]
    fn never_picks_a_spent_move() {
        let mut rng = SmallRng::seed_from_u64(8);
        let mut cpu = combatant(vec![
            Move::new("Spent", PokemonType::Normal, 10, 1),
            Move::new("Fresh", PokemonType::Normal, 10, 30),
            Move::new("Also spent", PokemonType::Normal, 10, 1),
        ]);
        let mut target = combatant(vec![Move::new("T", PokemonType::Normal, 10, 1)]);
        drain(&mut cpu, 0, &mut target, &mut rng);
        drain(&mut cpu, 2, &mut target, &mut rng);
        for _ in 0..100 {
            assert_eq!(choose_move(&cpu, &mut rng), Some(1));
        }
    }

    #[test]
    fn spreads_choices_over_usable_moves() {
        let mut rng = SmallRng::seed_from_u64(21);
        let cpu = combatant(vec![
            Move::new("A", PokemonType::Normal, 10, 5),
            Move::new("B", PokemonType::Normal, 10, 5),
            Move::new("C", PokemonType::Normal, 10, 5),
            Move::new("D", PokemonType::Normal, 10, 5),
        ]);
        let mut counts = [0usize; 4];
        for _ in 0..4000 {
            let idx = choose_move(&cpu, &mut rng).unwrap();
            counts[idx] += 1;
        }
        for count in counts {
            assert!((800..=1200).contains(&count), "skewed choice counts {counts:?}");
        }
    }
}
