//! Two-party turn-based battle core: type effectiveness, damage, turn ordering, PP tracking and
//! win detection, driven by an injectable random source.

pub mod ai;
pub mod battle;
pub mod catalog;
pub mod error;
pub mod matrix;
pub mod model;
pub mod types;

pub use crate::battle::{Battle, Phase, Side, TurnEvent, TurnResult, Winner};
pub use crate::catalog::{load_catalog, Catalog, MoveTemplate, PokemonTemplate};
pub use crate::error::{BattleError, BattleResult, InvalidMove};
pub use crate::model::{Combatant, CombatantView, Move, MoveView, Stats};
pub use crate::types::{type_effectiveness, Effectiveness, PokemonType};

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rival {
    Named(String),
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Play,
    Matrix {
        sims_per_cell: usize,
        output_path: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub catalog_path: Option<PathBuf>,
    pub player: Option<String>,
    pub rival: Rival,
    pub seed: Option<u64>,
    pub json: bool,
    pub log_level: log::LevelFilter,
    pub mode: Mode,
}

impl Default for CliOptions {
    fn default() -> Self {
        CliOptions {
            catalog_path: None,
            player: None,
            rival: Rival::Random,
            seed: None,
            json: false,
            log_level: log::LevelFilter::Warn,
            mode: Mode::Play,
        }
    }
}

impl CliOptions {
    pub fn catalog(&self) -> anyhow::Result<Catalog> {
        match &self.catalog_path {
            Some(path) => load_catalog(path),
            None => Ok(Catalog::builtin()),
        }
    }
}

pub fn run_matrix(opts: &CliOptions, sims_per_cell: usize, output_path: &Path) -> anyhow::Result<()> {
    if sims_per_cell == 0 {
        anyhow::bail!("--sims-per-cell must be > 0");
    }
    let catalog = opts.catalog()?;
    let matrix = matrix::compute_matrix(&catalog, sims_per_cell, opts.seed.unwrap_or(0))?;
    let names: Vec<&str> = catalog.names().collect();
    matrix::write_csv(&names, &matrix, output_path)?;
    println!(
        "Wrote {}x{} matrix to {}",
        matrix.len(),
        matrix.first().map(|r| r.len()).unwrap_or(0),
        output_path.display()
    );
    Ok(())
}
