mod ui;

use pokemon_duel::{run_matrix, CliOptions, Mode, Rival};
use std::env;
use std::path::PathBuf;

fn usage() -> ! {
    eprintln!(
        "Usage: pokemon-duel [--catalog catalog.json] [--player NAME] [--rival NAME|random] [--seed SEED] \
[--json] [--log-level off|error|warn|info|debug|trace] [--matrix [--sims-per-cell N] [--output matrix.csv]]"
    );
    std::process::exit(1);
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut opts = CliOptions::default();
    let mut matrix = false;
    let mut sims_per_cell = 100usize;
    let mut output_path = PathBuf::from("matrix.csv");

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--catalog" => {
                opts.catalog_path = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--catalog requires a path (e.g. --catalog catalog.json)")
                })?);
            }
            "--player" => {
                opts.player = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("--player requires a template name"))?,
                );
            }
            "--rival" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--rival requires a template name or random"))?;
                opts.rival = if val.eq_ignore_ascii_case("random") {
                    Rival::Random
                } else {
                    Rival::Named(val)
                };
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                opts.seed = Some(val.parse()?);
            }
            "--json" => opts.json = true,
            "--log-level" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--log-level requires a level"))?;
                opts.log_level = val
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Unknown log level {val}"))?;
            }
            "--matrix" => matrix = true,
            "--sims-per-cell" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--sims-per-cell requires a number"))?;
                sims_per_cell = val.parse()?;
            }
            "--output" => {
                output_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--output requires a path (e.g. --output matrix.csv)")
                })?;
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    if matrix {
        opts.mode = Mode::Matrix {
            sims_per_cell,
            output_path,
        };
    }
    Ok(opts)
}

fn main() -> anyhow::Result<()> {
    let opts = parse_args()?;
    simple_logger::SimpleLogger::new()
        .with_level(opts.log_level)
        .init()?;
    match &opts.mode {
        Mode::Play => ui::play(&opts),
        Mode::Matrix {
            sims_per_cell,
            output_path,
        } => run_matrix(&opts, *sims_per_cell, output_path),
    }
}
