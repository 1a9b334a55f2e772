//! Terminal front end: renders the battle and feeds the human's choices to the core.

use anyhow::Context;
use pokemon_duel::{Battle, Catalog, CliOptions, Rival, TurnResult};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::io::{self, BufRead, Write};

const HELP: &str = "Commands: 1-4 use a move | new (restart) | reroll (new rival) | help | quit";

struct Session {
    catalog: Catalog,
    rng: SmallRng,
    player: String,
    rival: String,
    json: bool,
    battle: Battle,
}

pub fn play(opts: &CliOptions) -> anyhow::Result<()> {
    let catalog = opts.catalog()?;
    let mut rng = match opts.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let player = match &opts.player {
        Some(name) => name.clone(),
        None => catalog
            .names()
            .next()
            .context("catalog has no templates")?
            .to_string(),
    };
    let rival = match &opts.rival {
        Rival::Named(name) => name.clone(),
        Rival::Random => random_rival(&catalog, &mut rng)?,
    };
    let battle = Battle::new(SmallRng::seed_from_u64(rng.gen()));
    let mut session = Session {
        catalog,
        rng,
        player,
        rival,
        json: opts.json,
        battle,
    };

    println!("Available: {}", session.catalog.names().collect::<Vec<_>>().join(", "));
    println!("{HELP}");
    session.start()?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match line.trim() {
            "" => continue,
            "q" | "quit" | "exit" => break,
            "help" | "?" => println!("{HELP}"),
            "new" => {
                if session.confirm_restart(&mut lines)? {
                    session.start()?;
                }
            }
            "reroll" => {
                session.rival = random_rival(&session.catalog, &mut session.rng)?;
                println!("Next rival: {}. Type `new` to battle it.", session.rival);
            }
            other => match other.parse::<usize>() {
                Ok(n) if n >= 1 => session.submit(n - 1)?,
                _ => println!("Unknown command {other}. {HELP}"),
            },
        }
    }
    Ok(())
}

fn random_rival(catalog: &Catalog, rng: &mut SmallRng) -> anyhow::Result<String> {
    catalog
        .random_name(rng)
        .map(str::to_string)
        .context("catalog has no templates")
}

/// True when `index` names one of the human's moves but none has PP left, so the turn is
/// played by the policy instead.
fn passes_turn(battle: &Battle, index: usize) -> bool {
    battle.is_active()
        && battle
            .human()
            .is_some_and(|human| index < human.moves().len() && human.usable_moves().is_empty())
}

impl Session {
    fn start(&mut self) -> anyhow::Result<()> {
        self.battle
            .start(&self.catalog, &self.player, &self.rival)
            .with_context(|| format!("Cannot start {} vs {}", self.player, self.rival))?;
        println!("=== BATTLE STARTED ===");
        if let (Some(human), Some(cpu)) = (self.battle.human(), self.battle.cpu()) {
            println!("You chose {}. The rival chose {}.", human.name(), cpu.name());
        }
        self.render();
        Ok(())
    }

    fn confirm_restart<I>(&self, lines: &mut I) -> anyhow::Result<bool>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        if !self.battle.is_active() {
            return Ok(true);
        }
        print!("Restart the battle? Current progress will be lost. [y/N] ");
        io::stdout().flush()?;
        match lines.next() {
            Some(answer) => Ok(matches!(answer?.trim(), "y" | "Y" | "yes")),
            None => Ok(false),
        }
    }

    fn submit(&mut self, index: usize) -> anyhow::Result<()> {
        let result = if passes_turn(&self.battle, index) {
            self.battle.resolve_turn_with_policy()
        } else {
            self.battle.resolve_turn(index)
        };
        match result {
            Ok(turn) => self.report(&turn)?,
            Err(err) => {
                println!("Cannot do that: {err}");
                if !self.battle.is_active() {
                    println!("Type `new` to start another battle.");
                }
            }
        }
        Ok(())
    }

    fn report(&self, turn: &TurnResult) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(turn)?);
        } else {
            for event in &turn.events {
                println!("{event}");
            }
        }
        match &turn.winner {
            Some(winner) => println!("=== BATTLE OVER: {} won! ===", winner.name),
            None => self.render(),
        }
        Ok(())
    }

    fn render(&self) {
        let (Some(human), Some(cpu)) = (self.battle.human(), self.battle.cpu()) else {
            return;
        };
        if self.json {
            let views = [human.view(), cpu.view()];
            match serde_json::to_string(&views) {
                Ok(line) => println!("{line}"),
                Err(err) => log::error!("cannot serialize combatants: {err}"),
            }
            return;
        }
        println!();
        println!("Rival: {cpu}");
        println!("You:   {human}");
        println!("Turn: {}", self.battle.turn());
        for (idx, mv) in human.moves().iter().enumerate() {
            let marker = if mv.can_use() { "" } else { "  (no PP)" };
            println!("  {}. {mv}{marker}", idx + 1);
        }
        if human.usable_moves().is_empty() {
            println!("  No PP left: any listed move number passes the turn.");
        }
    }
}
