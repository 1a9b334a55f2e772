use crate::battle::compute_damage;
use crate::error::{BattleError, BattleResult, InvalidMove};
use crate::types::{Effectiveness, PokemonType};
use rand::Rng;
use serde::Serialize;
use std::fmt;

pub const MAX_MOVES: usize = 4;
const HP_BAR_CELLS: u32 = 20;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Stats {
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
}

/// A usable action with a finite number of uses (PP).
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    name: String,
    move_type: PokemonType,
    power: u32,
    max_pp: u32,
    pp: u32,
}

/// What an applied move did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveOutcome {
    pub damage: u32,
    pub multiplier: f64,
    pub stab: bool,
}

impl MoveOutcome {
    pub fn effectiveness(&self) -> Effectiveness {
        Effectiveness::from_multiplier(self.multiplier)
    }
}

/// The parts of a combatant that matter when it attacks.
///
/// Split out so a move can be applied while its owner's move list is borrowed mutably.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attacker {
    pub kind: PokemonType,
    pub attack: u32,
}

impl Move {
    pub fn new(name: impl Into<String>, move_type: PokemonType, power: u32, max_pp: u32) -> Self {
        Move {
            name: name.into(),
            move_type,
            power,
            max_pp,
            pp: max_pp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn move_type(&self) -> PokemonType {
        self.move_type
    }

    pub fn power(&self) -> u32 {
        self.power
    }

    pub fn pp(&self) -> u32 {
        self.pp
    }

    pub fn max_pp(&self) -> u32 {
        self.max_pp
    }

    pub fn can_use(&self) -> bool {
        self.pp > 0
    }

    /// Spends one use and hits `defender`.
    ///
    /// Fails with [`BattleError::IllegalState`] and changes nothing when the move has no
    /// uses left.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        attacker: Attacker,
        defender: &mut Combatant,
        rng: &mut R,
    ) -> BattleResult<MoveOutcome> {
        if !self.can_use() {
            return Err(BattleError::IllegalState(format!(
                "{} has no PP left",
                self.name
            )));
        }
        self.pp -= 1;
        let roll = compute_damage(attacker, defender.kind(), defender.stats(), self, rng);
        log::debug!(
            "{} -> {}: {} damage (x{} effectiveness, stab={}, variance={:.3})",
            self.name,
            defender.name(),
            roll.damage,
            roll.multiplier,
            roll.stab,
            roll.variance
        );
        defender.take_damage(roll.damage);
        Ok(MoveOutcome {
            damage: roll.damage,
            multiplier: roll.multiplier,
            stab: roll.stab,
        })
    }

    pub fn view(&self) -> MoveView {
        MoveView {
            name: self.name.clone(),
            move_type: self.move_type,
            power: self.power,
            pp: self.pp,
            max_pp: self.max_pp,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]  Pwr {}  PP {}/{}",
            self.name, self.move_type, self.power, self.pp, self.max_pp
        )
    }
}

#[derive(Debug, Clone)]
pub struct Combatant {
    name: String,
    kind: PokemonType,
    stats: Stats,
    hp: u32,
    moves: Vec<Move>,
}

impl Combatant {
    /// Builds a combatant at full health.
    pub fn new(
        name: impl Into<String>,
        kind: PokemonType,
        stats: Stats,
        moves: Vec<Move>,
    ) -> BattleResult<Self> {
        let name = name.into();
        if moves.is_empty() || moves.len() > MAX_MOVES {
            return Err(BattleError::InvalidTemplate(format!(
                "{name} must know between 1 and {MAX_MOVES} moves, got {}",
                moves.len()
            )));
        }
        if let Some(mv) = moves.iter().find(|m| m.power == 0 || m.max_pp == 0) {
            return Err(BattleError::InvalidTemplate(format!(
                "{name}: move {} needs positive power and PP",
                mv.name
            )));
        }
        if stats.max_hp == 0 || stats.attack == 0 || stats.defense == 0 || stats.speed == 0 {
            return Err(BattleError::InvalidTemplate(format!(
                "{name} has a zero stat: {stats:?}"
            )));
        }
        Ok(Combatant {
            name,
            kind,
            hp: stats.max_hp,
            stats,
            moves,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PokemonType {
        self.kind
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.stats.max_hp
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    pub fn as_attacker(&self) -> Attacker {
        Attacker {
            kind: self.kind,
            attack: self.stats.attack,
        }
    }

    /// Indices of the moves that still have uses left.
    pub fn usable_moves(&self) -> Vec<usize> {
        self.moves
            .iter()
            .enumerate()
            .filter(|(_, m)| m.can_use())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Looks up a move the caller wants to submit, rejecting bad indices and spent moves.
    pub fn check_move(&self, index: usize) -> Result<&Move, InvalidMove> {
        let mv = self.moves.get(index).ok_or(InvalidMove::IndexOutOfRange {
            index,
            len: self.moves.len(),
        })?;
        if !mv.can_use() {
            return Err(InvalidMove::NoUsesLeft {
                name: mv.name.clone(),
            });
        }
        Ok(mv)
    }

    /// Applies this combatant's move at `index` against `defender`.
    pub fn use_move<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        defender: &mut Combatant,
        rng: &mut R,
    ) -> BattleResult<MoveOutcome> {
        let attacker = self.as_attacker();
        let len = self.moves.len();
        let mv = self
            .moves
            .get_mut(index)
            .ok_or(InvalidMove::IndexOutOfRange { index, len })?;
        mv.apply(attacker, defender, rng)
    }

    pub fn view(&self) -> CombatantView {
        CombatantView {
            name: self.name.clone(),
            kind: self.kind,
            hp: self.hp,
            max_hp: self.stats.max_hp,
            moves: self.moves.iter().map(Move::view).collect(),
        }
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled = (u64::from(self.hp) * u64::from(HP_BAR_CELLS)
            / u64::from(self.stats.max_hp)) as usize;
        let empty = (HP_BAR_CELLS as usize).saturating_sub(filled);
        write!(
            f,
            "{} [{}] HP: {}/{} |{}{}|",
            self.name,
            self.kind,
            self.hp,
            self.stats.max_hp,
            "█".repeat(filled),
            " ".repeat(empty)
        )
    }
}

/// Read-only snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombatantView {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PokemonType,
    pub hp: u32,
    pub max_hp: u32,
    pub moves: Vec<MoveView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveView {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: PokemonType,
    pub power: u32,
    pub pp: u32,
    pub max_pp: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn stats(max_hp: u32, attack: u32, defense: u32, speed: u32) -> Stats {
        Stats {
            max_hp,
            attack,
            defense,
            speed,
        }
    }

    fn dummy(name: &str, kind: PokemonType, moves: Vec<Move>) -> Combatant {
        Combatant::new(name, kind, stats(100, 50, 50, 50), moves).unwrap()
    }

    #[test]
    fn move_starts_with_full_pp() {
        let mv = Move::new("Ember", PokemonType::Fire, 40, 25);
        assert_eq!(mv.pp(), 25);
        assert!(mv.can_use());
    }

    #[test]
    fn apply_reports_stab_and_effectiveness() {
        let mut rng = SmallRng::seed_from_u64(1);
        let user = dummy("Blaze", PokemonType::Fire, vec![Move::new("Scratch", PokemonType::Normal, 40, 35)]);
        let mut target = Combatant::new(
            "Leafy",
            PokemonType::Grass,
            stats(500, 50, 50, 50),
            vec![Move::new("Tackle", PokemonType::Normal, 40, 35)],
        )
        .unwrap();
        let mut ember = Move::new("Ember", PokemonType::Fire, 40, 25);

        let outcome = ember.apply(user.as_attacker(), &mut target, &mut rng).unwrap();
        assert!(outcome.stab);
        assert_eq!(outcome.multiplier, 2.0);
        assert_eq!(outcome.effectiveness(), Effectiveness::SuperEffective);
        assert_eq!(ember.pp(), 24);
        assert_eq!(target.hp(), 500 - outcome.damage);
        // (50 / 50) * 40 * 1.5 * 2.0, then variance in [0.85, 1.0]
        assert!((102..=120).contains(&outcome.damage));
    }

    #[test]
    fn single_use_move_is_spent_after_one_apply() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut attacker = dummy("A", PokemonType::Fire, vec![Move::new("Once", PokemonType::Fire, 40, 1)]);
        let mut defender = dummy("B", PokemonType::Normal, vec![Move::new("Tackle", PokemonType::Normal, 40, 35)]);

        attacker.use_move(0, &mut defender, &mut rng).unwrap();
        assert_eq!(attacker.moves()[0].pp(), 0);
        assert!(!attacker.moves()[0].can_use());

        let hp_before = defender.hp();
        let err = attacker.use_move(0, &mut defender, &mut rng).unwrap_err();
        assert!(matches!(err, BattleError::IllegalState(_)));
        assert_eq!(defender.hp(), hp_before);
        assert_eq!(attacker.moves()[0].pp(), 0);
    }

    #[test]
    fn take_damage_floors_at_zero() {
        let mut c = dummy("A", PokemonType::Normal, vec![Move::new("Tackle", PokemonType::Normal, 40, 35)]);
        c.take_damage(30);
        assert_eq!(c.hp(), 70);
        assert!(!c.is_fainted());
        c.take_damage(500);
        assert_eq!(c.hp(), 0);
        assert!(c.is_fainted());
    }

    #[test]
    fn rejects_bad_move_lists_and_stats() {
        let empty = Combatant::new("Empty", PokemonType::Normal, stats(10, 1, 1, 1), vec![]);
        assert!(matches!(empty, Err(BattleError::InvalidTemplate(_))));

        let five = (0..5)
            .map(|i| Move::new(format!("M{i}"), PokemonType::Normal, 10, 1))
            .collect();
        let crowded = Combatant::new("Crowded", PokemonType::Normal, stats(10, 1, 1, 1), five);
        assert!(matches!(crowded, Err(BattleError::InvalidTemplate(_))));

        let weak = Combatant::new(
            "Weak",
            PokemonType::Normal,
            stats(10, 0, 1, 1),
            vec![Move::new("Tackle", PokemonType::Normal, 40, 35)],
        );
        assert!(matches!(weak, Err(BattleError::InvalidTemplate(_))));

        let powerless = Combatant::new(
            "Powerless",
            PokemonType::Normal,
            stats(10, 1, 1, 1),
            vec![Move::new("Splash", PokemonType::Normal, 0, 40)],
        );
        assert!(matches!(powerless, Err(BattleError::InvalidTemplate(_))));

        let no_pp = Combatant::new(
            "Tired",
            PokemonType::Normal,
            stats(10, 1, 1, 1),
            vec![
                Move::new("Tackle", PokemonType::Normal, 40, 35),
                Move::new("Struggle", PokemonType::Normal, 50, 0),
            ],
        );
        assert!(matches!(no_pp, Err(BattleError::InvalidTemplate(_))));
    }

    #[test]
    fn check_move_reports_index_and_pp_problems() {
        let mut c = dummy("A", PokemonType::Normal, vec![Move::new("Once", PokemonType::Normal, 40, 1)]);
        assert_eq!(
            c.check_move(3).unwrap_err(),
            InvalidMove::IndexOutOfRange { index: 3, len: 1 }
        );
        let mut target = dummy("B", PokemonType::Normal, vec![Move::new("Tackle", PokemonType::Normal, 40, 35)]);
        c.use_move(0, &mut target, &mut SmallRng::seed_from_u64(0)).unwrap();
        assert_eq!(
            c.check_move(0).unwrap_err(),
            InvalidMove::NoUsesLeft {
                name: "Once".to_string()
            }
        );
    }

    #[test]
    fn reading_state_does_not_mutate() {
        let c = dummy("A", PokemonType::Water, vec![Move::new("Bubble", PokemonType::Water, 40, 30)]);
        let before = c.view();
        let _ = c.to_string();
        let _ = c.usable_moves();
        let _ = c.moves()[0].can_use();
        assert_eq!(c.view(), before);
    }

    #[test]
    fn renders_health_bar() {
        let mut c = dummy("Eevee", PokemonType::Normal, vec![Move::new("Swift", PokemonType::Normal, 60, 20)]);
        c.take_damage(50);
        assert_eq!(
            c.to_string(),
            format!("Eevee [Normal] HP: 50/100 |{}{}|", "█".repeat(10), " ".repeat(10))
        );
    }

    #[test]
    fn health_bar_handles_huge_max_hp() {
        let mut c = Combatant::new(
            "Giant",
            PokemonType::Normal,
            stats(300_000_000, 50, 50, 50),
            vec![Move::new("Tackle", PokemonType::Normal, 40, 35)],
        )
        .unwrap();
        assert!(c.to_string().ends_with(&format!("|{}|", "█".repeat(20))));
        c.take_damage(150_000_000);
        assert_eq!(
            c.to_string(),
            format!(
                "Giant [Normal] HP: 150000000/300000000 |{}{}|",
                "█".repeat(10),
                " ".repeat(10)
            )
        );
    }
}
