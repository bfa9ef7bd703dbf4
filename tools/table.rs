//! Table — interactive session shell over a RON roster.
//!
//! Usage: table --roster <path> [--rules <path>] [--seed <n>]
//!
//! Commands:
//!   as <label>        — act as a roster member
//!   roll <notation>   — roll dice
//!   init              — roll initiative and start round 1
//!   next              — advance the turn and run start-of-turn effects
//!   check <ability> [dc] — ability check for the current actor
//!   save              — death save for the current actor
//!   move <x> <y>      — move the current actor on the grid
//!   show              — list the roster
//!   help              — list commands
//!   quit              — exit
//! A line only counts as a command when its arguments fit; "move toward the
//! goblin" or "roll to dodge" is submitted as the current actor's action,
//! like anything else.

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session_engine::core::dice::{self, format_roll};
use session_engine::core::pipeline::SessionEngine;
use session_engine::core::turns::InitiativeTracker;
use session_engine::schema::combatant::{Ability, CombatantId, GridPos};
use session_engine::schema::roster::Roster;

/// A shell command. Anything that does not parse as one is player input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Help,
    Show,
    Act(&'a str),
    Roll(&'a str),
    Init,
    Next,
    Check(Ability, Option<i32>),
    Save,
    Move(i32, i32),
}

fn parse_command(line: &str) -> Option<Command<'_>> {
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c.to_lowercase(), r.trim()),
        None => (line.to_lowercase(), ""),
    };
    let bare = rest.is_empty();
    match cmd.as_str() {
        "quit" | "exit" | "q" if bare => Some(Command::Quit),
        "help" | "h" | "?" if bare => Some(Command::Help),
        "show" if bare => Some(Command::Show),
        "init" if bare => Some(Command::Init),
        "next" if bare => Some(Command::Next),
        "save" if bare => Some(Command::Save),
        "as" if !bare => Some(Command::Act(rest)),
        "roll" if bare => Some(Command::Roll("d20")),
        "roll" if dice::parse(rest).is_ok() => Some(Command::Roll(rest)),
        "check" => {
            let mut args = rest.split_whitespace();
            let ability = args.next().and_then(Ability::from_key)?;
            match (args.next().map(str::parse::<i32>), args.next()) {
                (None, None) => Some(Command::Check(ability, None)),
                (Some(Ok(dc)), None) => Some(Command::Check(ability, Some(dc))),
                _ => None,
            }
        }
        "move" => {
            let mut coords = rest.split_whitespace().map(str::parse::<i32>);
            match (coords.next(), coords.next(), coords.next()) {
                (Some(Ok(x)), Some(Ok(y)), None) => Some(Command::Move(x, y)),
                _ => None,
            }
        }
        _ => None,
    }
}

#[derive(Parser, Debug)]
#[command(name = "table", about = "Interactive tabletop session shell")]
struct Args {
    /// RON file holding a list of combatants
    #[arg(long)]
    roster: PathBuf,

    /// Optional RON rule book
    #[arg(long)]
    rules: Option<PathBuf>,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "session_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    let mut roster = match Roster::load_from_ron(&args.roster) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: Failed to load roster: {}", e);
            process::exit(1);
        }
    };

    let mut builder = SessionEngine::builder().seed(args.seed);
    if let Some(ref path) = args.rules {
        builder = builder.rules_path(path);
    }
    let mut engine = match builder.build() {
        Ok(e) => e,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    println!("Loaded {} combatants", roster.len());
    println!("Seed: {}", args.seed);
    println!("Type 'help' for commands.\n");

    let mut actor: Option<CombatantId> = roster.iter().find(|c| !c.is_npc).map(|c| c.id);
    let mut tracker: Option<InitiativeTracker> = None;

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let prompt = actor
            .and_then(|id| roster.get(id))
            .map(|c| c.display_name().to_string())
            .unwrap_or_else(|| "table".to_string());
        print!("{}> ", prompt);
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(command) = parse_command(line) else {
            submit(&mut engine, &mut roster, actor, line);
            continue;
        };

        match command {
            Command::Quit => {
                println!("Goodbye.");
                break;
            }
            Command::Help => print_help(),
            Command::Show => print_roster(&roster, tracker.as_ref()),
            Command::Act(label) => match roster.find_by_label(label) {
                Some(c) => {
                    actor = Some(c.id);
                    println!("Acting as {}", c.display_name());
                }
                None => println!("No combatant named '{}'", label),
            },
            Command::Roll(notation) => println!("{}", format_roll(&engine.roll(notation))),
            Command::Init => {
                let order = engine.roll_initiative(roster.as_slice());
                for entry in &order {
                    println!("  {} — {}", entry.label, format_roll(&entry.roll));
                }
                let t = InitiativeTracker::new(order);
                actor = t.current_id();
                tracker = Some(t);
                println!("Round 1 begins.");
            }
            Command::Next => {
                let Some(t) = tracker.as_mut() else {
                    println!("No initiative rolled. Use 'init' first.");
                    continue;
                };
                let round = t.round;
                let Some(id) = t.advance().map(|e| e.token_id) else {
                    println!("Initiative order is empty.");
                    continue;
                };
                if t.round != round {
                    println!("Round {} begins.", t.round);
                }
                actor = Some(id);
                start_turn(&mut engine, &mut roster, id);
            }
            Command::Check(ability, dc) => {
                let Some(token) = actor.and_then(|id| roster.get(id)) else {
                    println!("No current actor.");
                    continue;
                };
                println!("{}", engine.skill_check(token, ability, dc, None).narrative);
            }
            Command::Save => {
                let Some(token) = actor.and_then(|id| roster.get(id)).cloned() else {
                    println!("No current actor.");
                    continue;
                };
                if !token.is_down() {
                    println!("{} is still standing.", token.display_name());
                    continue;
                }
                let outcome = engine.death_save(&token);
                println!("{}", outcome.narrative);
                if let Err(e) = roster.apply_death_save(token.id, &outcome) {
                    println!("ERROR: {}", e);
                }
            }
            Command::Move(x, y) => {
                let Some(id) = actor else {
                    println!("No current actor.");
                    continue;
                };
                match roster.move_to(id, GridPos::new(x, y)) {
                    Ok(()) => println!("Moved to ({}, {}).", x, y),
                    Err(e) => println!("ERROR: {}", e),
                }
            }
        }
    }
}

fn submit(engine: &mut SessionEngine, roster: &mut Roster, actor: Option<CombatantId>, line: &str) {
    let Some(token) = actor.and_then(|id| roster.get(id)).cloned() else {
        println!("No current actor. Use 'as <label>' first.");
        return;
    };
    let Some(result) = engine.submit(line, &token, roster.as_slice()) else {
        return;
    };
    println!("{}", result.narrative);
    if result.requires_grid_move {
        println!("  (use 'move <x> <y>' to place the token)");
    }
    if let Err(e) = roster.apply(&result) {
        println!("ERROR: {}", e);
    }
}

fn start_turn(engine: &mut SessionEngine, roster: &mut Roster, id: CombatantId) {
    let Some(token) = roster.get(id).cloned() else {
        return;
    };
    println!("--- {}'s turn ---", token.display_name());
    let effects = engine.start_turn(&token);
    for effect in &effects {
        println!("{}", effect.narrative);
    }
    if let Err(e) = roster.apply_turn_effects(id, &effects) {
        println!("ERROR: {}", e);
    }
    if roster.get(id).is_some_and(|c| c.is_down()) {
        println!("{} is down. Use 'save' for a death save.", token.display_name());
    }
}

fn print_roster(roster: &Roster, tracker: Option<&InitiativeTracker>) {
    let current = tracker.and_then(|t| t.current_id());
    for c in roster.iter() {
        let marker = if Some(c.id) == current { "*" } else { " " };
        let conditions: Vec<&str> = c.conditions.iter().map(|k| k.label()).collect();
        println!(
            "{} {} {} HP {}/{} AC {} at ({}, {}) {}",
            marker,
            c.id,
            c.display_name(),
            c.hp,
            c.max_hp,
            c.armor_class,
            c.position.x,
            c.position.y,
            conditions.join(", ")
        );
    }
    if let Some(t) = tracker {
        println!("Round {}", t.round);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  as <label>        — act as a roster member");
    println!("  roll <notation>   — roll dice (default d20)");
    println!("  init              — roll initiative and start round 1");
    println!("  next              — advance the turn and run start-of-turn effects");
    println!("  check <ability> [dc] — ability check for the current actor");
    println!("  save              — death save for the current actor");
    println!("  move <x> <y>      — move the current actor on the grid");
    println!("  show              — list the roster");
    println!("  help              — list commands");
    println!("  quit              — exit");
    println!("Anything else is submitted as the current actor's action.");
}
