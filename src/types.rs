use crate::error::BattleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
}

impl PokemonType {
    pub const ALL: [PokemonType; 5] = [
        PokemonType::Normal,
        PokemonType::Fire,
        PokemonType::Water,
        PokemonType::Grass,
        PokemonType::Electric,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PokemonType::Normal => "Normal",
            PokemonType::Fire => "Fire",
            PokemonType::Water => "Water",
            PokemonType::Grass => "Grass",
            PokemonType::Electric => "Electric",
        }
    }
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PokemonType {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PokemonType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BattleError::InvalidType(s.to_string()))
    }
}

/// Damage multiplier for a move of type `attacking` hitting a `defending` combatant.
///
/// Only a handful of interactions are charted; every other pair is neutral.
pub fn type_effectiveness(attacking: PokemonType, defending: PokemonType) -> f64 {
    use PokemonType::*;
    match (attacking, defending) {
        (Fire, Grass) => 2.0,
        (Fire, Water) | (Fire, Fire) => 0.5,
        (Water, Fire) => 2.0,
        (Water, Grass) | (Water, Water) => 0.5,
        (Grass, Water) => 2.0,
        (Grass, Fire) | (Grass, Grass) => 0.5,
        (Electric, Water) => 2.0,
        (Electric, Grass) | (Electric, Electric) => 0.5,
        _ => 1.0,
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effectiveness {
    SuperEffective,
    Normal,
    NotVeryEffective,
}

impl Effectiveness {
    pub fn from_multiplier(multiplier: f64) -> Self {
        if multiplier > 1.0 {
            Effectiveness::SuperEffective
        } else if multiplier < 1.0 {
            Effectiveness::NotVeryEffective
        } else {
            Effectiveness::Normal
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Effectiveness::SuperEffective => "super effective!",
            Effectiveness::Normal => "normal effectiveness.",
            Effectiveness::NotVeryEffective => "not very effective...",
        }
    }
}
