//! Recipe import from definition files
//!
//! Walks a directory for `*.recipe.json` files, parses each into a
//! [`Recipe`], checks it against the stored catalog and upserts it.
//! Requirements are written with a free-form measure such as `"2 oz"`,
//! `"3/4 oz"` or `"2 dashes"`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{info, warn};
use regex::Regex;
use rusqlite::Connection;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::catalog::Catalog;
use crate::db;
use crate::error::ImportError;
use crate::models::{IngredientRequirement, Recipe, Rim, Unit};

const RECIPE_SUFFIX: &str = ".recipe.json";

#[derive(Debug, Deserialize)]
struct RecipeFile {
    id: String,
    name: String,
    venue: String,
    difficulty: u8,
    glass: String,
    method: String,
    #[serde(default)]
    requires_ice: bool,
    #[serde(default)]
    requires_jigger: bool,
    #[serde(default)]
    garnish: Vec<String>,
    #[serde(default)]
    rim: Vec<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    notes: Vec<String>,
    ingredients: Vec<RequirementLine>,
    /// Drafts are skipped without error
    #[serde(default)]
    draft: bool,
}

#[derive(Debug, Deserialize)]
struct RequirementLine {
    ingredient: String,
    #[serde(default)]
    measure: Option<String>,
    #[serde(default)]
    preparation: Option<String>,
    #[serde(default)]
    optional: bool,
}

/// Compiled patterns shared by every file of one import
pub struct RecipeParser {
    id_re: Regex,
    measure_re: Regex,
}

impl RecipeParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            id_re: Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$")?,
            // "2 oz", "0.75oz", "3/4 oz", "2 dashes", "1 cube"
            measure_re: Regex::new(
                r"(?i)^(?:(\d+(?:\.\d+)?|\.\d+)|(\d+)\s*/\s*(\d+))\s*(oz|dash|cube|piece)(?:es|s)?$",
            )?,
        })
    }

    fn check_id(&self, id: &str) -> Result<(), ImportError> {
        if self.id_re.is_match(id) {
            Ok(())
        } else {
            Err(ImportError::InvalidId(id.to_string()))
        }
    }

    /// Parse a measure into amount and unit. Blank means unmeasured.
    pub fn parse_measure(&self, measure: &str) -> Result<(Option<f64>, Option<Unit>), ImportError> {
        let trimmed = measure.trim();
        if trimmed.is_empty() {
            return Ok((None, None));
        }

        let invalid = || ImportError::InvalidMeasure(measure.to_string());
        let cap = self.measure_re.captures(trimmed).ok_or_else(invalid)?;

        let amount = if let Some(decimal) = cap.get(1) {
            decimal.as_str().parse::<f64>().map_err(|_| invalid())?
        } else {
            let numerator = cap[2].parse::<f64>().map_err(|_| invalid())?;
            let denominator = cap[3].parse::<f64>().map_err(|_| invalid())?;
            if denominator == 0.0 {
                return Err(invalid());
            }
            numerator / denominator
        };
        let unit = cap[4].to_lowercase().parse::<Unit>()?;

        Ok((Some(amount), Some(unit)))
    }

    /// Parse one recipe file. `Ok(None)` means the file is a draft.
    pub fn parse_file(&self, path: &Path) -> Result<Option<Recipe>, ImportError> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&content)
    }

    pub fn parse_str(&self, content: &str) -> Result<Option<Recipe>, ImportError> {
        let file: RecipeFile = serde_json::from_str(content)?;
        if file.draft {
            return Ok(None);
        }

        self.check_id(&file.id)?;
        self.check_id(&file.glass)?;

        let mut requirements = Vec::with_capacity(file.ingredients.len());
        for line in file.ingredients {
            self.check_id(&line.ingredient)?;
            let (amount, unit) = match line.measure.as_deref() {
                Some(measure) => self.parse_measure(measure)?,
                None => (None, None),
            };
            requirements.push(IngredientRequirement {
                ingredient_id: line.ingredient,
                amount,
                unit,
                preparation: line.preparation,
                optional: line.optional,
            });
        }

        for garnish in &file.garnish {
            self.check_id(garnish)?;
        }

        let rim_options = file
            .rim
            .iter()
            .map(|r| r.parse::<Rim>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Recipe {
            venue: file.venue.parse()?,
            method: file.method.parse()?,
            id: file.id,
            name: file.name,
            difficulty: file.difficulty,
            glass_id: file.glass,
            requires_ice: file.requires_ice,
            requires_jigger: file.requires_jigger,
            garnish_ids: file.garnish,
            rim_options,
            description: file.description,
            ingredient_requirements: requirements,
            notes: file.notes,
        }))
    }
}

/// Find all recipe definition files under `dir`
pub fn find_recipe_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map_or(false, |name| name.ends_with(RECIPE_SUFFIX))
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Import every recipe file under `dir` into the catalog store.
///
/// Recipes are checked against the catalog already in the store, so
/// ingredients and glassware must be loaded first.
pub fn import_to_database(conn: &Connection, dir: &Path) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let catalog = db::load_catalog(conn)?;
    let parser = RecipeParser::new()?;

    let files = find_recipe_files(dir);
    info!("found {} recipe files under {}", files.len(), dir.display());

    for path in &files {
        match parse_checked(&parser, &catalog, path) {
            Ok(Some(recipe)) => {
                db::upsert_recipe(conn, &recipe)?;
                stats.recipes += 1;
                stats.requirements += recipe.ingredient_requirements.len();
                info!(
                    "imported {} ({} requirements, {} garnishes)",
                    recipe.id,
                    recipe.ingredient_requirements.len(),
                    recipe.garnish_ids.len()
                );
            }
            Ok(None) => {
                stats.skipped += 1;
            }
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                stats.errors += 1;
            }
        }
    }

    Ok(stats)
}

fn parse_checked(
    parser: &RecipeParser,
    catalog: &Catalog,
    path: &Path,
) -> Result<Option<Recipe>, ImportError> {
    let Some(recipe) = parser.parse_file(path)? else {
        return Ok(None);
    };
    catalog.check_recipe(&recipe)?;
    Ok(Some(recipe))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub recipes: usize,
    pub requirements: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported {} recipes ({} requirements). Skipped: {}, Errors: {}",
            self.recipes, self.requirements, self.skipped, self.errors
        )
    }
}
