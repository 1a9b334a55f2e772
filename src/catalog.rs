use crate::error::{BattleError, BattleResult};
use crate::model::{Combatant, Move, Stats};
use crate::types::PokemonType;
use anyhow::Context;
use phf::phf_map;
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTemplate {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
    pub power: u32,
    pub max_pp: u32,
}

/// A catalog entry: everything needed to build a fresh combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonTemplate {
    #[serde(rename = "type")]
    pub kind: String,
    pub max_health: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub moves: Vec<MoveTemplate>,
}

impl MoveTemplate {
    fn build(&self) -> BattleResult<Move> {
        let move_type: PokemonType = self.move_type.parse()?;
        if self.power == 0 || self.max_pp == 0 {
            return Err(BattleError::InvalidTemplate(format!(
                "move {} needs positive power and PP",
                self.name
            )));
        }
        Ok(Move::new(self.name.clone(), move_type, self.power, self.max_pp))
    }
}

impl PokemonTemplate {
    /// Builds a full-health combatant named `name`.
    pub fn instantiate(&self, name: &str) -> BattleResult<Combatant> {
        let kind: PokemonType = self.kind.parse()?;
        let moves = self
            .moves
            .iter()
            .map(MoveTemplate::build)
            .collect::<BattleResult<Vec<_>>>()?;
        let stats = Stats {
            max_hp: self.max_health,
            attack: self.attack,
            defense: self.defense,
            speed: self.speed,
        };
        Combatant::new(name, kind, stats, moves)
    }
}

struct BuiltinMove {
    name: &'static str,
    kind: &'static str,
    power: u32,
    max_pp: u32,
}

struct BuiltinTemplate {
    kind: &'static str,
    max_health: u32,
    attack: u32,
    defense: u32,
    speed: u32,
    moves: &'static [BuiltinMove],
}

impl BuiltinTemplate {
    fn to_template(&self) -> PokemonTemplate {
        PokemonTemplate {
            kind: self.kind.to_string(),
            max_health: self.max_health,
            attack: self.attack,
            defense: self.defense,
            speed: self.speed,
            moves: self
                .moves
                .iter()
                .map(|m| MoveTemplate {
                    name: m.name.to_string(),
                    move_type: m.kind.to_string(),
                    power: m.power,
                    max_pp: m.max_pp,
                })
                .collect(),
        }
    }
}

macro_rules! mv {
    ($name:expr, $kind:expr, $power:expr, $pp:expr) => {
        BuiltinMove {
            name: $name,
            kind: $kind,
            power: $power,
            max_pp: $pp,
        }
    };
}

static BUILTIN_TEMPLATES: phf::Map<&'static str, BuiltinTemplate> = phf_map! {
    "Charmander" => BuiltinTemplate {
        kind: "Fire", max_health: 120, attack: 60, defense: 50, speed: 65,
        moves: &[
            mv!("Scratch", "Normal", 40, 35),
            mv!("Ember", "Fire", 40, 25),
            mv!("Fire Fang", "Fire", 65, 15),
            mv!("Bite", "Normal", 60, 25),
        ],
    },
    "Squirtle" => BuiltinTemplate {
        kind: "Water", max_health: 130, attack: 50, defense: 65, speed: 43,
        moves: &[
            mv!("Tackle", "Normal", 40, 35),
            mv!("Water Gun", "Water", 40, 25),
            mv!("Bubble", "Water", 40, 30),
            mv!("Bite", "Normal", 60, 25),
        ],
    },
    "Bulbasaur" => BuiltinTemplate {
        kind: "Grass", max_health: 125, attack: 55, defense: 60, speed: 45,
        moves: &[
            mv!("Tackle", "Normal", 40, 35),
            mv!("Vine Whip", "Grass", 45, 25),
            mv!("Razor Leaf", "Grass", 55, 25),
            mv!("Headbutt", "Normal", 70, 15),
        ],
    },
    "Pikachu" => BuiltinTemplate {
        kind: "Electric", max_health: 110, attack: 55, defense: 40, speed: 90,
        moves: &[
            mv!("Quick Attack", "Normal", 40, 30),
            mv!("Thunder Shock", "Electric", 40, 30),
            mv!("Spark", "Electric", 65, 20),
            mv!("Slam", "Normal", 80, 10),
        ],
    },
    "Eevee" => BuiltinTemplate {
        kind: "Normal", max_health: 118, attack: 60, defense: 55, speed: 55,
        moves: &[
            mv!("Quick Attack", "Normal", 40, 30),
            mv!("Swift", "Normal", 60, 20),
            mv!("Bite", "Normal", 60, 25),
            mv!("Double-Edge", "Normal", 90, 10),
        ],
    },
};

/// Named combatant templates. Every entry is validated on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    templates: BTreeMap<String, PokemonTemplate>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let templates = BUILTIN_TEMPLATES
            .entries()
            .map(|(name, template)| (name.to_string(), template.to_template()))
            .collect();
        Catalog { templates }
    }

    pub fn from_templates(templates: BTreeMap<String, PokemonTemplate>) -> BattleResult<Self> {
        let catalog = Catalog { templates };
        if catalog.is_empty() {
            return Err(BattleError::InvalidTemplate(
                "catalog has no templates".to_string(),
            ));
        }
        for (name, template) in &catalog.templates {
            template.instantiate(name)?;
        }
        Ok(catalog)
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let templates: BTreeMap<String, PokemonTemplate> =
            serde_json::from_str(raw).context("Failed to parse catalog JSON")?;
        Ok(Catalog::from_templates(templates)?)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Looks a template up by name, falling back to a case-insensitive match.
    pub fn get(&self, name: &str) -> Option<(&str, &PokemonTemplate)> {
        self.templates
            .get_key_value(name)
            .or_else(|| {
                self.templates
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
            })
            .map(|(key, template)| (key.as_str(), template))
    }

    pub fn instantiate(&self, name: &str) -> BattleResult<Combatant> {
        let (key, template) = self
            .get(name)
            .ok_or_else(|| BattleError::UnknownTemplate(name.to_string()))?;
        template.instantiate(key)
    }

    pub fn random_name<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.names().choose(rng)
    }
}

pub fn load_catalog(path: &Path) -> anyhow::Result<Catalog> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file at {}", path.display()))?;
    Catalog::from_json_str(&raw)
        .with_context(|| format!("Invalid catalog in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn builtin_catalog_has_five_valid_templates() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), 5);
        for name in ["Charmander", "Squirtle", "Bulbasaur", "Pikachu", "Eevee"] {
            let combatant = catalog.instantiate(name).unwrap();
            assert_eq!(combatant.name(), name);
            assert_eq!(combatant.hp(), combatant.max_hp());
            assert_eq!(combatant.moves().len(), 4);
        }
    }

    #[test]
    fn pikachu_template_matches_reference_stats() {
        let pikachu = Catalog::builtin().instantiate("Pikachu").unwrap();
        assert_eq!(pikachu.kind(), PokemonType::Electric);
        assert_eq!(
            *pikachu.stats(),
            Stats {
                max_hp: 110,
                attack: 55,
                defense: 40,
                speed: 90
            }
        );
        assert_eq!(pikachu.moves()[3].name(), "Slam");
        assert_eq!(pikachu.moves()[3].max_pp(), 10);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.instantiate("squirtle").unwrap().name(), "Squirtle");
        assert_eq!(
            catalog.instantiate("Mewtwo").unwrap_err(),
            BattleError::UnknownTemplate("Mewtwo".to_string())
        );
    }

    #[test]
    fn parses_json_catalog() {
        let raw = r#"{
            "Vulpix": {
                "type": "Fire", "maxHealth": 100, "attack": 50, "defense": 45, "speed": 65,
                "moves": [{ "name": "Ember", "type": "Fire", "power": 40, "maxPp": 25 }]
            }
        }"#;
        let catalog = Catalog::from_json_str(raw).unwrap();
        let vulpix = catalog.instantiate("Vulpix").unwrap();
        assert_eq!(vulpix.kind(), PokemonType::Fire);
        assert_eq!(vulpix.moves()[0].pp(), 25);
    }

    #[test]
    fn rejects_unknown_types() {
        let raw = r#"{
            "Dratini": {
                "type": "Dragon", "maxHealth": 100, "attack": 50, "defense": 45, "speed": 50,
                "moves": [{ "name": "Twister", "type": "Dragon", "power": 40, "maxPp": 20 }]
            }
        }"#;
        let err = Catalog::from_json_str(raw).unwrap_err();
        assert_eq!(
            err.downcast_ref::<BattleError>(),
            Some(&BattleError::InvalidType("Dragon".to_string()))
        );
    }

    #[test]
    fn rejects_zero_power_moves() {
        let mut templates = BTreeMap::new();
        templates.insert(
            "Magikarp".to_string(),
            PokemonTemplate {
                kind: "Water".to_string(),
                max_health: 50,
                attack: 10,
                defense: 50,
                speed: 80,
                moves: vec![MoveTemplate {
                    name: "Splash".to_string(),
                    move_type: "Normal".to_string(),
                    power: 0,
                    max_pp: 40,
                }],
            },
        );
        assert!(matches!(
            Catalog::from_templates(templates),
            Err(BattleError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn rejects_empty_catalogs() {
        assert!(matches!(
            Catalog::from_templates(BTreeMap::new()),
            Err(BattleError::InvalidTemplate(_))
        ));
        assert!(Catalog::from_json_str("{}").is_err());
        assert!(!Catalog::builtin().is_empty());
    }

    #[test]
    fn random_name_comes_from_the_catalog() {
        let catalog = Catalog::builtin();
        let mut rng = SmallRng::seed_from_u64(4);
        for _ in 0..20 {
            let name = catalog.random_name(&mut rng).unwrap();
            assert!(catalog.get(name).is_some());
        }
    }
}
