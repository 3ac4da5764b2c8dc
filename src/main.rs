//! Virtual Shaker CLI
//!
//! Hosts the scoring engine: manages the bar catalog, grades workspace
//! snapshots and replays scripted sessions.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rusqlite::Connection;

use virtual_shaker::catalog::Catalog;
use virtual_shaker::db;
use virtual_shaker::evaluator::{evaluate, expected_window_seconds};
use virtual_shaker::game::{GameState, ServeOutcome, TimedAction};
use virtual_shaker::import;
use virtual_shaker::workspace::WorkspaceState;

#[derive(Parser)]
#[command(name = "virtual-shaker")]
#[command(about = "Drink scoring engine for the Virtual Shaker bartending game")]
struct Cli {
    /// Path to the SQLite catalog database
    #[arg(short, long, env = "SHAKER_DB", default_value = "shaker.db")]
    database: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize empty database with schema
    Init,

    /// Replace the catalog with the built-in bar
    LoadSample,

    /// Import *.recipe.json files from a directory
    Import {
        /// Directory to scan for recipe files
        dir: PathBuf,

        /// Remove existing recipes before importing
        #[arg(long)]
        clear: bool,
    },

    /// List all recipes in the catalog
    ListRecipes,

    /// List all ingredients in the catalog
    ListIngredients,

    /// Show details for a specific recipe
    Recipe {
        /// Recipe ID
        id: String,
    },

    /// Grade a workspace snapshot against a recipe
    Evaluate {
        /// Path to a workspace snapshot (JSON)
        workspace: PathBuf,

        /// Recipe the drink was made for
        #[arg(short, long)]
        recipe: String,

        /// Seconds between the first action and the serve
        #[arg(short, long, default_value = "0")]
        elapsed: f64,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a scripted session (JSON list of timed actions) against one ticket
    Replay {
        /// Path to the action script
        script: PathBuf,

        /// Recipe of the ticket being worked
        #[arg(short, long)]
        recipe: String,

        /// Seed for ticket draws and creative names
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Print the final session as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;

    match cli.command {
        Commands::Init => {
            println!("Database initialized at: {}", cli.database.display());
            for (table, count) in db::catalog_counts(&conn)? {
                println!("  {:<12} {}", table, count);
            }
        }

        Commands::LoadSample => {
            let sample = Catalog::sample()?;
            db::clear_catalog(&conn)?;
            db::save_catalog(&conn, &sample)?;
            println!(
                "Loaded {} ingredients, {} tools, {} glasses and {} recipes",
                sample.ingredients().len(),
                sample.tools().len(),
                sample.glassware().len(),
                sample.recipes().len()
            );
        }

        Commands::Import { dir, clear } => {
            if clear {
                println!("Clearing existing recipes...");
                db::clear_recipes(&conn)?;
            }

            let stats = import::import_to_database(&conn, &dir)?;
            println!("\n{}", stats);

            // A bad import should fail here rather than at serve time
            db::load_catalog(&conn)?;
        }

        Commands::ListRecipes => {
            let catalog = db::load_catalog(&conn)?;
            if catalog.recipes().is_empty() {
                println!("No recipes in database. Run 'load-sample' or 'import' first.");
            } else {
                println!(
                    "{:<16} {:<20} {:<10} {:>4} {:<8}",
                    "ID", "Recipe", "Venue", "Diff", "Method"
                );
                println!("{}", "-".repeat(62));
                for r in catalog.recipes() {
                    println!(
                        "{:<16} {:<20} {:<10} {:>4} {:<8}",
                        r.id, r.name, r.venue, r.difficulty, r.method
                    );
                }
            }
        }

        Commands::ListIngredients => {
            let catalog = db::load_catalog(&conn)?;
            if catalog.ingredients().is_empty() {
                println!("No ingredients in database. Run 'load-sample' first.");
            } else {
                println!("{:<20} {:<20} {:<10}", "ID", "Ingredient", "Category");
                println!("{}", "-".repeat(52));
                for i in catalog.ingredients() {
                    println!("{:<20} {:<20} {:<10}", i.id, i.name, i.category);
                }
            }
        }

        Commands::Recipe { id } => {
            let catalog = db::load_catalog(&conn)?;
            if let Some(r) = catalog.recipe(&id) {
                let ingredient_name = |id: &str| {
                    catalog
                        .ingredient(id)
                        .map_or(id.to_string(), |i| i.name.clone())
                };
                let glass = catalog
                    .glass(&r.glass_id)
                    .map_or(r.glass_id.as_str(), |g| g.name.as_str());
                println!("Recipe: {}", r.name);
                println!("  ID: {}", r.id);
                println!("  Venue: {} (difficulty {})", r.venue, r.difficulty);
                println!("  Glass: {}", glass);
                println!(
                    "  Method: {}{}{}",
                    r.method,
                    if r.requires_ice { ", over ice" } else { "" },
                    if r.requires_jigger { ", jigger pours" } else { "" }
                );
                println!("  Target time: {:.0}s", expected_window_seconds(r.difficulty));

                println!("  Ingredients:");
                for req in &r.ingredient_requirements {
                    let name = ingredient_name(req.ingredient_id.as_str());
                    let measure = match (req.amount, req.unit) {
                        (Some(amount), Some(unit)) => format!("{} {} ", amount, unit),
                        (Some(amount), None) => format!("{} ", amount),
                        _ => String::new(),
                    };
                    let optional = if req.optional { " (optional)" } else { "" };
                    println!("    {}{}{}", measure, name, optional);
                }

                if !r.garnish_ids.is_empty() {
                    println!("  Garnish:");
                    for g in &r.garnish_ids {
                        println!("    {}", ingredient_name(g.as_str()));
                    }
                }

                for note in &r.notes {
                    println!("  * {}", note);
                }
            } else {
                println!("Recipe '{}' not found", id);
            }
        }

        Commands::Evaluate {
            workspace,
            recipe,
            elapsed,
            json,
        } => {
            let catalog = db::load_catalog(&conn)?;
            let recipe = find_recipe(&catalog, &recipe)?;
            let snapshot: WorkspaceState = read_json(&workspace)?;

            let evaluation = evaluate(&snapshot, recipe, elapsed, &catalog);
            if json {
                println!("{}", serde_json::to_string_pretty(&evaluation)?);
            } else {
                println!("{} ({:.1}s)\n", recipe.name, elapsed);
                println!("{}", evaluation);
            }
        }

        Commands::Replay {
            script,
            recipe,
            seed,
            json,
        } => {
            let catalog = db::load_catalog(&conn)?;
            let recipe = find_recipe(&catalog, &recipe)?;
            let actions: Vec<TimedAction> = read_json(&script)?;
            replay(&catalog, &recipe.id, &actions, seed, json)?;
        }
    }

    Ok(())
}

fn find_recipe<'a>(catalog: &'a Catalog, id: &str) -> Result<&'a virtual_shaker::Recipe> {
    catalog
        .recipe(id)
        .ok_or_else(|| anyhow!("Recipe '{}' not found. Run 'load-sample' or 'import' first.", id))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Run `actions` through a fresh session focused on a ticket for `recipe_id`
fn replay(
    catalog: &Catalog,
    recipe_id: &str,
    actions: &[TimedAction],
    seed: u64,
    json: bool,
) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = actions.first().map_or(0, |a| a.at_ms);

    let mut game = GameState::new(catalog, &mut rng, start);
    let ticket = game.enqueue(recipe_id, start);
    game.focus_ticket(&ticket);
    info!("replaying {} actions against {}", actions.len(), ticket);

    let mut served = false;
    for timed in actions {
        if let Some(outcome) = game.apply(&timed.action, catalog, &mut rng, timed.at_ms) {
            served = true;
            if !json {
                print_outcome(&outcome);
            }
        }
    }

    if !served {
        let end = actions.last().map_or(start, |a| a.at_ms);
        info!("script has no serve; serving at {}", end);
        let outcome = game.serve(catalog, &mut rng, end);
        if !json {
            print_outcome(&outcome);
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&game)?);
    } else {
        println!("Session score: {} (xp {})", game.score, game.xp);
    }
    Ok(())
}

fn print_outcome(outcome: &ServeOutcome) {
    match outcome {
        ServeOutcome::Scored { order, evaluation } => {
            println!("Served {} ({})", order.ticket.recipe_id, order.ticket.id);
            println!("{}", evaluation);
        }
        ServeOutcome::Created(creation) => {
            println!("Created \"{}\" [{}]", creation.name, creation.flavor_profile);
            println!("  {}\n", creation.ingredients.join(", "));
        }
        ServeOutcome::Nothing => {
            println!("Nothing to serve\n");
        }
    }
}
