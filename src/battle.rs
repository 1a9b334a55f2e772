use crate::ai::choose_move;
use crate::catalog::Catalog;
use crate::error::{BattleResult, InvalidMove};
use crate::model::{Attacker, Combatant, Move, Stats};
use crate::types::{type_effectiveness, Effectiveness, PokemonType};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;

pub const STAB_MULTIPLIER: f64 = 1.5;
pub const MIN_VARIANCE: f64 = 0.85;
/// Auto-played battles that run longer than this are scored as a draw.
pub const MAX_TURNS: u32 = 500;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Human,
    Cpu,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Human => Side::Cpu,
            Side::Cpu => Side::Human,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Human => 0,
            Side::Cpu => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    InProgress,
    Concluded { winner: Side },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageRoll {
    pub damage: u32,
    pub multiplier: f64,
    pub stab: bool,
    pub variance: f64,
}

/// Damage dealt by `move_def` used by `attacker` against a defender of the given type and stats.
///
/// `(attack / defense) * power`, scaled by STAB, type effectiveness and a uniform variance in
/// `[0.85, 1.0]`, truncated, and never less than 1.
pub fn compute_damage<R: Rng + ?Sized>(
    attacker: Attacker,
    defender_type: PokemonType,
    defender_stats: &Stats,
    move_def: &Move,
    rng: &mut R,
) -> DamageRoll {
    let stab = if move_def.move_type() == attacker.kind {
        STAB_MULTIPLIER
    } else {
        1.0
    };
    let multiplier = type_effectiveness(move_def.move_type(), defender_type);
    let variance = rng.gen_range(MIN_VARIANCE..=1.0);
    let base = (attacker.attack as f64 / defender_stats.defense as f64) * move_def.power() as f64;
    let damage = ((base * stab * multiplier * variance) as u32).max(1);
    DamageRoll {
        damage,
        multiplier,
        stab: stab > 1.0,
        variance,
    }
}

pub fn compute_damage_preview(
    attacker: &Combatant,
    defender: &Combatant,
    move_def: &Move,
    seed: u64,
) -> u32 {
    let mut rng = SmallRng::seed_from_u64(seed);
    compute_damage(
        attacker.as_attacker(),
        defender.kind(),
        defender.stats(),
        move_def,
        &mut rng,
    )
    .damage
}

/// Acting order for one turn: faster first, exact speed ties settled by comparing one fresh
/// uniform draw per combatant.
pub fn turn_order<R: Rng + ?Sized>(human: &Combatant, cpu: &Combatant, rng: &mut R) -> [Side; 2] {
    let mut planned = [
        (Side::Human, human.stats().speed, rng.gen::<f64>()),
        (Side::Cpu, cpu.stats().speed, rng.gen::<f64>()),
    ];
    planned.sort_by(|lhs, rhs| rhs.1.cmp(&lhs.1).then_with(|| rhs.2.total_cmp(&lhs.2)));
    log::debug!(
        "turn order: {:?} (speed {}, tiebreak {:.3}) before {:?} (speed {}, tiebreak {:.3})",
        planned[0].0,
        planned[0].1,
        planned[0].2,
        planned[1].0,
        planned[1].1,
        planned[1].2
    );
    [planned[0].0, planned[1].0]
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TurnEvent {
    MoveUsed {
        side: Side,
        attacker: String,
        defender: String,
        move_name: String,
        stab: bool,
        damage: u32,
        multiplier: f64,
        effectiveness: Effectiveness,
        defender_hp: u32,
    },
    CouldNotAct {
        side: Side,
        name: String,
    },
    Fainted {
        side: Side,
        name: String,
    },
}

impl TurnEvent {
    pub fn side(&self) -> Side {
        match self {
            TurnEvent::MoveUsed { side, .. }
            | TurnEvent::CouldNotAct { side, .. }
            | TurnEvent::Fainted { side, .. } => *side,
        }
    }
}

impl fmt::Display for TurnEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnEvent::MoveUsed {
                attacker,
                move_name,
                stab,
                damage,
                effectiveness,
                ..
            } => write!(
                f,
                "{attacker} used {move_name}{}! Dealt {damage} damage ({})",
                if *stab { " with STAB" } else { "" },
                effectiveness.describe()
            ),
            TurnEvent::CouldNotAct { name, .. } => {
                write!(f, "{name} has no PP left and cannot act.")
            }
            TurnEvent::Fainted { name, .. } => write!(f, "{name} fainted!"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Winner {
    pub side: Side,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnResult {
    /// Turn counter after resolution. Unchanged when the turn ended the battle.
    pub turn: u32,
    pub events: Vec<TurnEvent>,
    pub winner: Option<Winner>,
}

#[derive(Copy, Clone, Debug)]
enum HumanAction {
    Move(usize),
    Policy,
}

/// One two-party battle: the combatants, the turn counter and the random source that drives
/// variance, tiebreaks and the CPU's choices.
pub struct Battle<R = SmallRng> {
    rng: R,
    phase: Phase,
    turn: u32,
    sides: Option<[Combatant; 2]>,
}

impl Battle<SmallRng> {
    pub fn seeded(seed: u64) -> Self {
        Battle::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Battle<R> {
    pub fn new(rng: R) -> Self {
        Battle {
            rng,
            phase: Phase::NotStarted,
            turn: 1,
            sides: None,
        }
    }

    /// Starts a fresh battle between two catalog templates, discarding any previous one.
    pub fn start(&mut self, catalog: &Catalog, human: &str, cpu: &str) -> BattleResult<()> {
        let human = catalog.instantiate(human)?;
        let cpu = catalog.instantiate(cpu)?;
        self.start_with(human, cpu);
        Ok(())
    }

    pub fn start_with(&mut self, human: Combatant, cpu: Combatant) {
        log::info!("battle started: {} vs {}", human.name(), cpu.name());
        self.sides = Some([human, cpu]);
        self.turn = 1;
        self.phase = Phase::InProgress;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::InProgress
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            Phase::Concluded { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn combatant(&self, side: Side) -> Option<&Combatant> {
        self.sides.as_ref().map(|sides| &sides[side.index()])
    }

    pub fn human(&self) -> Option<&Combatant> {
        self.combatant(Side::Human)
    }

    pub fn cpu(&self) -> Option<&Combatant> {
        self.combatant(Side::Cpu)
    }

    /// Resolves one turn with the human's move at `move_index`.
    ///
    /// The move is validated first; an invalid submission leaves the battle untouched.
    pub fn resolve_turn(&mut self, move_index: usize) -> BattleResult<TurnResult> {
        let human = match (self.phase, self.human()) {
            (Phase::InProgress, Some(human)) => human,
            _ => return Err(InvalidMove::NoBattleInProgress.into()),
        };
        human.check_move(move_index)?;
        self.run_turn(HumanAction::Move(move_index))
    }

    /// Resolves one turn with the human side also following the CPU policy.
    pub fn resolve_turn_with_policy(&mut self) -> BattleResult<TurnResult> {
        self.run_turn(HumanAction::Policy)
    }

    fn run_turn(&mut self, human_action: HumanAction) -> BattleResult<TurnResult> {
        let (Phase::InProgress, Some(sides)) = (self.phase, self.sides.as_mut()) else {
            return Err(InvalidMove::NoBattleInProgress.into());
        };
        let order = turn_order(&sides[0], &sides[1], &mut self.rng);
        let mut events = Vec::new();
        for side in order {
            let (actor, target) = split_sides(sides, side);
            if actor.is_fainted() || target.is_fainted() {
                continue;
            }
            let choice = match (side, human_action) {
                (Side::Human, HumanAction::Move(idx)) => Some(idx),
                _ => choose_move(actor, &mut self.rng),
            };
            let Some(move_index) = choice else {
                log::warn!("{} has no usable moves and skips its action", actor.name());
                events.push(TurnEvent::CouldNotAct {
                    side,
                    name: actor.name().to_string(),
                });
                continue;
            };
            let outcome = actor.use_move(move_index, target, &mut self.rng)?;
            events.push(TurnEvent::MoveUsed {
                side,
                attacker: actor.name().to_string(),
                defender: target.name().to_string(),
                move_name: actor.moves()[move_index].name().to_string(),
                stab: outcome.stab,
                damage: outcome.damage,
                multiplier: outcome.multiplier,
                effectiveness: outcome.effectiveness(),
                defender_hp: target.hp(),
            });
            if target.is_fainted() {
                events.push(TurnEvent::Fainted {
                    side: side.opponent(),
                    name: target.name().to_string(),
                });
                log::info!("battle over on turn {}: {} won", self.turn, actor.name());
                let winner = Winner {
                    side,
                    name: actor.name().to_string(),
                };
                self.phase = Phase::Concluded { winner: side };
                return Ok(TurnResult {
                    turn: self.turn,
                    events,
                    winner: Some(winner),
                });
            }
        }
        self.turn += 1;
        Ok(TurnResult {
            turn: self.turn,
            events,
            winner: None,
        })
    }
}

fn split_sides(sides: &mut [Combatant; 2], side: Side) -> (&mut Combatant, &mut Combatant) {
    let [human, cpu] = sides;
    match side {
        Side::Human => (human, cpu),
        Side::Cpu => (cpu, human),
    }
}

/// Plays a full battle where both sides follow the CPU policy. `None` means a draw.
pub fn simulate_battle(human: &Combatant, cpu: &Combatant, seed: u64) -> BattleResult<Option<Side>> {
    let mut battle = Battle::seeded(seed);
    battle.start_with(human.clone(), cpu.clone());
    while battle.turn() <= MAX_TURNS {
        if let Some(winner) = battle.resolve_turn_with_policy()?.winner {
            return Ok(Some(winner.side));
        }
    }
    Ok(None)
}
