//! Rules Linter — validates a rule book and flags entries that can never fire.
//!
//! Usage: rules_linter <rules.ron>

use clap::Parser;
use std::path::PathBuf;
use std::process;

use session_engine::core::rules::RuleBook;

#[derive(Parser, Debug)]
#[command(name = "rules_linter", about = "Validate a RON rule book")]
struct Args {
    /// Rule book to check
    path: PathBuf,
}

/// Highest DC the linter considers sane.
const MAX_DC: i32 = 30;

fn main() {
    let args = Args::parse();

    let contents = match std::fs::read_to_string(&args.path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: Failed to read '{}': {}", args.path.display(), e);
            process::exit(1);
        }
    };

    // Parse without validation so every problem is reported, not just the first.
    let rules: RuleBook = match ron::from_str(&contents) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: Failed to parse rule book: {}", e);
            process::exit(1);
        }
    };

    println!(
        "Loaded rule book: {} skill keywords, {} levels",
        rules.skills.len(),
        rules.xp_thresholds.len()
    );

    let mut errors = Vec::new();
    if let Err(e) = rules.validate() {
        errors.push(e.to_string());
    }
    let warnings = lint_rules(&rules);

    println!("\n=== Rule Book Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_rules(rules: &RuleBook) -> Vec<String> {
    let mut warnings = Vec::new();

    for (name, dc) in [
        ("spell_focus_dc", rules.spell_focus_dc),
        ("skill_check_dc", rules.skill_check_dc),
        ("interact_dc", rules.interact_dc),
        ("default_armor_class", rules.default_armor_class),
    ] {
        if !(1..=MAX_DC).contains(&dc) {
            warnings.push(format!("{} is {} (expected 1..={})", name, dc, MAX_DC));
        }
    }

    // Lookup is first-match substring search, so an earlier keyword that is
    // contained in a later one hides it.
    for (j, later) in rules.skills.iter().enumerate() {
        let later_kw = later.keyword.to_lowercase();
        if let Some(earlier) = rules.skills[..j]
            .iter()
            .find(|e| later_kw.contains(&e.keyword.to_lowercase()))
        {
            warnings.push(format!(
                "Skill keyword '{}' ({}) is unreachable: '{}' ({}) matches first",
                later.keyword, later.skill, earlier.keyword, earlier.skill
            ));
        }
    }

    if rules.xp_thresholds.len() != 20 {
        warnings.push(format!(
            "XP table has {} levels (standard is 20)",
            rules.xp_thresholds.len()
        ));
    }

    warnings
}
