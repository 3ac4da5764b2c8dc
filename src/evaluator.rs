//! Drink evaluation: grades a workspace against a recipe
//!
//! Three sub-scores start at 100 and only go down. Penalties stack
//! unclamped and each sub-score is clamped to 0..=100 once at the end,
//! then weighted 0.5 / 0.3 / 0.2 into the total.

use std::collections::HashSet;
use std::fmt;

use log::debug;
use serde::{Serialize, Serializer};

use crate::models::{Recipe, ScoreBreakdown, Technique};
use crate::workspace::{ICE_ID, WorkspaceState};

const GLASS_PENALTY: f64 = 30.0;
const MISSING_INGREDIENT_PENALTY: f64 = 15.0;
const EXTRA_INGREDIENT_PENALTY: f64 = 10.0;
const ICE_PENALTY: f64 = 20.0;
const GARNISH_PENALTY: f64 = 10.0;

const NOT_SHAKEN_PENALTY: f64 = 40.0;
const SHAKEN_BUT_STIRRED_PENALTY: f64 = 15.0;
const NOT_STIRRED_PENALTY: f64 = 35.0;
const STIRRED_BUT_SHAKEN_PENALTY: f64 = 25.0;
const NOT_MUDDLED_PENALTY: f64 = 25.0;
const JIGGER_PENALTY: f64 = 20.0;

const SPEED_BASE_WINDOW_S: f64 = 25.0;
const SPEED_WINDOW_PER_DIFFICULTY_S: f64 = 5.0;
const OVERTIME_PENALTY_PER_S: f64 = 3.0;
const MAX_OVERTIME_PENALTY: f64 = 80.0;

/// Resolves ingredient ids to display names for mistake text.
pub trait IngredientDirectory {
    fn display_name(&self, id: &str) -> Option<&str>;
}

/// No names known; every mistake shows the raw id.
impl IngredientDirectory for () {
    fn display_name(&self, _id: &str) -> Option<&str> {
        None
    }
}

/// One itemized deduction. The `Display` form is the text shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mistake {
    NoGlass,
    WrongGlass,
    MissingIngredient(String),
    ExtraIngredient(String),
    MissingIce,
    MissingGarnish(String),
    NotShaken,
    ShakenDrinkStirred,
    NotStirred,
    StirredDrinkShaken,
    NotMuddled,
    NoJigger,
    TooSlow,
}

impl fmt::Display for Mistake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mistake::NoGlass => f.write_str("No glass selected"),
            Mistake::WrongGlass => f.write_str("Incorrect glassware"),
            Mistake::MissingIngredient(name) => write!(f, "Missing {name}"),
            Mistake::ExtraIngredient(name) => write!(f, "Unnecessary ingredient: {name}"),
            Mistake::MissingIce => f.write_str("Drink should include ice"),
            Mistake::MissingGarnish(name) => write!(f, "Missing garnish: {name}"),
            Mistake::NotShaken => f.write_str("Recipe should be shaken"),
            Mistake::ShakenDrinkStirred => f.write_str("Shaken drink was stirred at some point"),
            Mistake::NotStirred => f.write_str("Recipe should be stirred"),
            Mistake::StirredDrinkShaken => f.write_str("Stirred drink was shaken"),
            Mistake::NotMuddled => f.write_str("Recipe requires muddling"),
            Mistake::NoJigger => f.write_str("Use the jigger for accurate pours"),
            Mistake::TooSlow => f.write_str("Try to serve faster during the rush"),
        }
    }
}

impl Serialize for Mistake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub breakdown: ScoreBreakdown,
    pub mistakes: Vec<Mistake>,
}

impl Evaluation {
    pub fn messages(&self) -> Vec<String> {
        self.mistakes.iter().map(ToString::to_string).collect()
    }
}

/// Seconds a recipe of this difficulty may take before speed is penalized
pub fn expected_window_seconds(difficulty: u8) -> f64 {
    SPEED_BASE_WINDOW_S + f64::from(difficulty) * SPEED_WINDOW_PER_DIFFICULTY_S
}

/// Grade `workspace` against `recipe`, served `elapsed_seconds` after the
/// first action.
///
/// Total for every input: an empty workspace, a recipe without
/// requirements or a negative elapsed time all produce a result.
pub fn evaluate<D>(
    workspace: &WorkspaceState,
    recipe: &Recipe,
    elapsed_seconds: f64,
    directory: &D,
) -> Evaluation
where
    D: IngredientDirectory + ?Sized,
{
    let mut mistakes = Vec::new();

    let accuracy = as_score(score_accuracy(workspace, recipe, directory, &mut mistakes));
    let technique = as_score(score_technique(workspace, recipe, &mut mistakes));
    let speed = as_score(score_speed(recipe.difficulty, elapsed_seconds, &mut mistakes));

    let breakdown = ScoreBreakdown {
        accuracy,
        technique,
        speed,
        total: weighted_total(accuracy, technique, speed),
    };

    debug!(
        "evaluated {}: {:?} with {} mistakes",
        recipe.id,
        breakdown,
        mistakes.len()
    );

    Evaluation {
        breakdown,
        mistakes,
    }
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

fn as_score(value: f64) -> u8 {
    clamp_score(value).round() as u8
}

/// `round(0.5a + 0.3t + 0.2s)` half-up, in tenths so 62.5 is exact
fn weighted_total(accuracy: u8, technique: u8, speed: u8) -> u8 {
    let tenths = 5 * u32::from(accuracy) + 3 * u32::from(technique) + 2 * u32::from(speed);
    ((tenths + 5) / 10) as u8
}

fn display_name<D>(directory: &D, id: &str) -> String
where
    D: IngredientDirectory + ?Sized,
{
    directory.display_name(id).unwrap_or(id).to_string()
}

fn score_accuracy<D>(
    workspace: &WorkspaceState,
    recipe: &Recipe,
    directory: &D,
    mistakes: &mut Vec<Mistake>,
) -> f64
where
    D: IngredientDirectory + ?Sized,
{
    let mut accuracy = 100.0;

    match workspace.glass_id.as_deref() {
        None => {
            accuracy -= GLASS_PENALTY;
            mistakes.push(Mistake::NoGlass);
        }
        Some(glass) if glass != recipe.glass_id => {
            accuracy -= GLASS_PENALTY;
            mistakes.push(Mistake::WrongGlass);
        }
        Some(_) => {}
    }

    let used: HashSet<&str> = workspace
        .ingredients
        .iter()
        .map(|e| e.ingredient_id.as_str())
        .collect();

    for req in &recipe.ingredient_requirements {
        if !req.optional && !used.contains(req.ingredient_id.as_str()) {
            accuracy -= MISSING_INGREDIENT_PENALTY;
            mistakes.push(Mistake::MissingIngredient(display_name(
                directory,
                &req.ingredient_id,
            )));
        }
    }

    // Ice poured into an iced drink answers the ice check below
    let mut seen: HashSet<&str> = HashSet::new();
    for entry in &workspace.ingredients {
        let id = entry.ingredient_id.as_str();
        if !seen.insert(id) {
            continue;
        }
        if id == ICE_ID && recipe.requires_ice {
            continue;
        }
        if !recipe.ingredient_requirements.iter().any(|r| r.ingredient_id == id) {
            accuracy -= EXTRA_INGREDIENT_PENALTY;
            mistakes.push(Mistake::ExtraIngredient(display_name(directory, id)));
        }
    }

    if recipe.requires_ice && !workspace.has_ice {
        accuracy -= ICE_PENALTY;
        mistakes.push(Mistake::MissingIce);
    }

    let missing_garnish: Vec<&String> = recipe
        .garnish_ids
        .iter()
        .filter(|id| !workspace.garnishes.contains(id))
        .collect();
    if !missing_garnish.is_empty() {
        accuracy -= GARNISH_PENALTY;
        for id in missing_garnish {
            mistakes.push(Mistake::MissingGarnish(display_name(directory, id)));
        }
    }

    accuracy
}

fn score_technique(
    workspace: &WorkspaceState,
    recipe: &Recipe,
    mistakes: &mut Vec<Mistake>,
) -> f64 {
    let mut technique = 100.0;
    let used = |t: Technique| workspace.techniques.contains(&t);

    match recipe.method {
        Technique::Shake => {
            if !used(Technique::Shake) {
                technique -= NOT_SHAKEN_PENALTY;
                mistakes.push(Mistake::NotShaken);
            }
            if used(Technique::Stir) {
                technique -= SHAKEN_BUT_STIRRED_PENALTY;
                mistakes.push(Mistake::ShakenDrinkStirred);
            }
        }
        Technique::Stir => {
            if !used(Technique::Stir) {
                technique -= NOT_STIRRED_PENALTY;
                mistakes.push(Mistake::NotStirred);
            }
            if used(Technique::Shake) {
                technique -= STIRRED_BUT_SHAKEN_PENALTY;
                mistakes.push(Mistake::StirredDrinkShaken);
            }
        }
        Technique::Muddle => {
            if !used(Technique::Muddle) {
                technique -= NOT_MUDDLED_PENALTY;
                mistakes.push(Mistake::NotMuddled);
            }
        }
        Technique::Build | Technique::Strain => {}
    }

    if recipe.requires_jigger && workspace.jigger_pours() == 0 {
        technique -= JIGGER_PENALTY;
        mistakes.push(Mistake::NoJigger);
    }

    technique
}

fn score_speed(difficulty: u8, elapsed_seconds: f64, mistakes: &mut Vec<Mistake>) -> f64 {
    let mut speed = 100.0;
    let window = expected_window_seconds(difficulty);

    // NaN and negative elapsed times never exceed the window
    if elapsed_seconds > window {
        let overtime = elapsed_seconds - window;
        speed -= (overtime * OVERTIME_PENALTY_PER_S).min(MAX_OVERTIME_PENALTY);
        mistakes.push(Mistake::TooSlow);
    }

    speed
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Score ===")?;
        writeln!(f, "  Accuracy:  {:>3}", self.breakdown.accuracy)?;
        writeln!(f, "  Technique: {:>3}", self.breakdown.technique)?;
        writeln!(f, "  Speed:     {:>3}", self.breakdown.speed)?;
        writeln!(f, "  Total:     {:>3}", self.breakdown.total)?;

        if self.mistakes.is_empty() {
            writeln!(f, "\nPerfect pour!")?;
        } else {
            writeln!(f, "\nMistakes:")?;
            for mistake in &self.mistakes {
                writeln!(f, "  - {}", mistake)?;
            }
        }

        Ok(())
    }
}
