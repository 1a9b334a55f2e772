use crate::battle::{simulate_battle, Side};
use crate::catalog::Catalog;
use crate::error::BattleResult;
use crate::model::Combatant;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Win rate of every catalog template (rows) against every other (columns) when both sides play
/// the random CPU policy. Draws count as half a win.
pub fn compute_matrix(
    catalog: &Catalog,
    sims_per_cell: usize,
    seed: u64,
) -> BattleResult<Vec<Vec<f64>>> {
    let combatants: Vec<Combatant> = catalog
        .names()
        .map(|name| catalog.instantiate(name))
        .collect::<BattleResult<_>>()?;
    let tasks: Vec<(usize, usize)> = (0..combatants.len())
        .flat_map(|a| (0..combatants.len()).map(move |b| (a, b)))
        .collect();
    let cell_results: Vec<CellResult> = tasks
        .par_iter()
        .map(|(a_idx, b_idx)| -> BattleResult<CellResult> {
            let mut cell_rng =
                SmallRng::seed_from_u64(seed ^ ((*a_idx as u64) << 32) ^ (*b_idx as u64));
            let mut wins = 0u64;
            let mut draws = 0u64;
            for _ in 0..sims_per_cell {
                let battle_seed = cell_rng.gen();
                match simulate_battle(&combatants[*a_idx], &combatants[*b_idx], battle_seed)? {
                    Some(Side::Human) => wins += 1,
                    Some(Side::Cpu) => {}
                    None => draws += 1,
                }
            }
            let win_rate = if sims_per_cell == 0 {
                0.0
            } else {
                (wins as f64 + 0.5 * draws as f64) / sims_per_cell as f64
            };
            Ok(CellResult {
                a_idx: *a_idx,
                b_idx: *b_idx,
                win_rate,
            })
        })
        .collect::<BattleResult<_>>()?;

    let mut matrix = vec![vec![0.0; combatants.len()]; combatants.len()];
    for cell in cell_results {
        matrix[cell.a_idx][cell.b_idx] = cell.win_rate;
    }
    log::info!(
        "computed {}x{} matrix with {} battles per cell",
        matrix.len(),
        matrix.len(),
        sims_per_cell
    );
    Ok(matrix)
}

pub fn write_csv(names: &[&str], matrix: &[Vec<f64>], path: &std::path::Path) -> anyhow::Result<()> {
    std::fs::write(path, to_csv(names, matrix))?;
    Ok(())
}

/// Header row of column names, then one row per template prefixed with its name.
pub fn to_csv(names: &[&str], matrix: &[Vec<f64>]) -> String {
    let mut out = String::new();
    for name in names {
        out.push(',');
        out.push_str(name);
    }
    for (row_idx, row) in matrix.iter().enumerate() {
        out.push('\n');
        out.push_str(names.get(row_idx).copied().unwrap_or_default());
        for value in row {
            out.push_str(&format!(",{value:.4}"));
        }
    }
    out
}

struct CellResult {
    a_idx: usize,
    b_idx: usize,
    win_rate: f64,
}
