//! SQLite store for the static bar catalog
//!
//! Only catalog data lives here. Workspaces and game state are never
//! written to disk.

use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use crate::catalog::Catalog;
use crate::models::{Glassware, Ingredient, IngredientRequirement, Recipe, Rim, Tool};

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS ingredients (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            unit TEXT,
            default_amount REAL
        );

        CREATE TABLE IF NOT EXISTS glassware (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tools (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            technique TEXT
        );

        CREATE TABLE IF NOT EXISTS recipes (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            venue TEXT NOT NULL,
            difficulty INTEGER NOT NULL,
            glass_id TEXT NOT NULL,
            method TEXT NOT NULL,
            requires_ice INTEGER NOT NULL,
            requires_jigger INTEGER NOT NULL DEFAULT 0,
            description TEXT
        );

        -- position keeps recipe order, which drives mistake order
        CREATE TABLE IF NOT EXISTS recipe_requirements (
            recipe_id TEXT,
            position INTEGER,
            ingredient_id TEXT NOT NULL,
            amount REAL,
            unit TEXT,
            preparation TEXT,
            optional INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (recipe_id, position)
        );

        CREATE TABLE IF NOT EXISTS recipe_garnishes (
            recipe_id TEXT,
            position INTEGER,
            ingredient_id TEXT NOT NULL,
            PRIMARY KEY (recipe_id, position)
        );

        CREATE TABLE IF NOT EXISTS recipe_rims (
            recipe_id TEXT,
            rim TEXT,
            PRIMARY KEY (recipe_id, rim)
        );

        CREATE TABLE IF NOT EXISTS recipe_notes (
            recipe_id TEXT,
            position INTEGER,
            note TEXT NOT NULL,
            PRIMARY KEY (recipe_id, position)
        );

        CREATE INDEX IF NOT EXISTS idx_requirements_ingredient ON recipe_requirements(ingredient_id);
        "#,
    )?;
    Ok(())
}

/// Remove every catalog row
pub fn clear_catalog(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM recipe_notes;
        DELETE FROM recipe_rims;
        DELETE FROM recipe_garnishes;
        DELETE FROM recipe_requirements;
        DELETE FROM recipes;
        DELETE FROM tools;
        DELETE FROM glassware;
        DELETE FROM ingredients;
        "#,
    )?;
    Ok(())
}

/// Remove recipes and their child rows, keeping ingredients, glassware and tools
pub fn clear_recipes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM recipe_notes;
        DELETE FROM recipe_rims;
        DELETE FROM recipe_garnishes;
        DELETE FROM recipe_requirements;
        DELETE FROM recipes;
        "#,
    )?;
    Ok(())
}

pub fn upsert_ingredient(conn: &Connection, ingredient: &Ingredient) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO ingredients (id, name, category, unit, default_amount)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            ingredient.id,
            ingredient.name,
            ingredient.category.as_str(),
            ingredient.unit.map(|u| u.as_str()),
            ingredient.default_amount,
        ],
    )?;
    Ok(())
}

pub fn upsert_glassware(conn: &Connection, glass: &Glassware) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO glassware (id, name) VALUES (?1, ?2)",
        params![glass.id, glass.name],
    )?;
    Ok(())
}

pub fn upsert_tool(conn: &Connection, tool: &Tool) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO tools (id, name, kind, technique) VALUES (?1, ?2, ?3, ?4)",
        params![
            tool.id,
            tool.name,
            tool.kind.as_str(),
            tool.technique.map(|t| t.as_str()),
        ],
    )?;
    Ok(())
}

/// Insert or replace a recipe along with its requirement, garnish, rim and note rows
pub fn upsert_recipe(conn: &Connection, recipe: &Recipe) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    for table in ["recipe_requirements", "recipe_garnishes", "recipe_rims", "recipe_notes"] {
        tx.execute(
            &format!("DELETE FROM {table} WHERE recipe_id = ?1"),
            [&recipe.id],
        )?;
    }

    tx.execute(
        "INSERT OR REPLACE INTO recipes
            (id, name, venue, difficulty, glass_id, method, requires_ice, requires_jigger, description)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            recipe.id,
            recipe.name,
            recipe.venue.as_str(),
            recipe.difficulty,
            recipe.glass_id,
            recipe.method.as_str(),
            recipe.requires_ice,
            recipe.requires_jigger,
            recipe.description,
        ],
    )?;

    for (pos, req) in recipe.ingredient_requirements.iter().enumerate() {
        tx.execute(
            "INSERT INTO recipe_requirements
                (recipe_id, position, ingredient_id, amount, unit, preparation, optional)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                recipe.id,
                pos as i64,
                req.ingredient_id,
                req.amount,
                req.unit.map(|u| u.as_str()),
                req.preparation,
                req.optional,
            ],
        )?;
    }

    for (pos, garnish) in recipe.garnish_ids.iter().enumerate() {
        tx.execute(
            "INSERT INTO recipe_garnishes (recipe_id, position, ingredient_id) VALUES (?1, ?2, ?3)",
            params![recipe.id, pos as i64, garnish],
        )?;
    }

    for rim in &recipe.rim_options {
        tx.execute(
            "INSERT OR IGNORE INTO recipe_rims (recipe_id, rim) VALUES (?1, ?2)",
            params![recipe.id, rim.as_str()],
        )?;
    }

    for (pos, note) in recipe.notes.iter().enumerate() {
        tx.execute(
            "INSERT INTO recipe_notes (recipe_id, position, note) VALUES (?1, ?2, ?3)",
            params![recipe.id, pos as i64, note],
        )?;
    }

    tx.commit()?;
    Ok(())
}

/// Write every entry of `catalog`, replacing rows with the same id
pub fn save_catalog(conn: &Connection, catalog: &Catalog) -> Result<()> {
    for ingredient in catalog.ingredients() {
        upsert_ingredient(conn, ingredient)?;
    }
    for glass in catalog.glassware() {
        upsert_glassware(conn, glass)?;
    }
    for tool in catalog.tools() {
        upsert_tool(conn, tool)?;
    }
    for recipe in catalog.recipes() {
        upsert_recipe(conn, recipe)?;
    }
    Ok(())
}

fn load_ingredients(conn: &Connection) -> Result<Vec<Ingredient>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category, unit, default_amount FROM ingredients ORDER BY rowid",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<f64>>(4)?,
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (id, name, category, unit, default_amount) = row?;
        results.push(Ingredient {
            category: category.parse()?,
            unit: unit.map(|u| u.parse()).transpose()?,
            id,
            name,
            default_amount,
        });
    }
    Ok(results)
}

fn load_glassware(conn: &Connection) -> Result<Vec<Glassware>> {
    let mut stmt = conn.prepare("SELECT id, name FROM glassware ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok(Glassware {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn load_tools(conn: &Connection) -> Result<Vec<Tool>> {
    let mut stmt = conn.prepare("SELECT id, name, kind, technique FROM tools ORDER BY rowid")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (id, name, kind, technique) = row?;
        results.push(Tool {
            kind: kind.parse()?,
            technique: technique.map(|t| t.parse()).transpose()?,
            id,
            name,
        });
    }
    Ok(results)
}

fn load_requirements(conn: &Connection, recipe_id: &str) -> Result<Vec<IngredientRequirement>> {
    let mut stmt = conn.prepare(
        "SELECT ingredient_id, amount, unit, preparation, optional
         FROM recipe_requirements
         WHERE recipe_id = ?1
         ORDER BY position",
    )?;

    let rows = stmt.query_map([recipe_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<f64>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, bool>(4)?,
        ))
    })?;

    let mut results = Vec::new();
    for row in rows {
        let (ingredient_id, amount, unit, preparation, optional) = row?;
        results.push(IngredientRequirement {
            ingredient_id,
            amount,
            unit: unit.map(|u| u.parse()).transpose()?,
            preparation,
            optional,
        });
    }
    Ok(results)
}

fn load_strings(conn: &Connection, sql: &str, recipe_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([recipe_id], |row| row.get(0))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

fn load_recipes(conn: &Connection) -> Result<Vec<Recipe>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, venue, difficulty, glass_id, method, requires_ice, requires_jigger, description
         FROM recipes
         ORDER BY rowid",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, bool>(6)?,
            row.get::<_, bool>(7)?,
            row.get::<_, Option<String>>(8)?,
        ))
    })?;

    let mut headers = Vec::new();
    for row in rows {
        headers.push(row?);
    }

    let mut results = Vec::new();
    for (id, name, venue, difficulty, glass_id, method, requires_ice, requires_jigger, description) in
        headers
    {
        let ingredient_requirements = load_requirements(conn, &id)
            .with_context(|| format!("Failed to load requirements for recipe {id}"))?;
        let garnish_ids = load_strings(
            conn,
            "SELECT ingredient_id FROM recipe_garnishes WHERE recipe_id = ?1 ORDER BY position",
            &id,
        )?;
        let rim_options = load_strings(
            conn,
            "SELECT rim FROM recipe_rims WHERE recipe_id = ?1 ORDER BY rim",
            &id,
        )?
        .iter()
        .map(|r| r.parse::<Rim>())
        .collect::<Result<Vec<_>, _>>()?;
        let notes = load_strings(
            conn,
            "SELECT note FROM recipe_notes WHERE recipe_id = ?1 ORDER BY position",
            &id,
        )?;

        results.push(Recipe {
            venue: venue.parse()?,
            method: method.parse()?,
            id,
            name,
            difficulty,
            glass_id,
            requires_ice,
            requires_jigger,
            garnish_ids,
            rim_options,
            description,
            ingredient_requirements,
            notes,
        });
    }
    Ok(results)
}

/// Read the whole catalog back and validate it
pub fn load_catalog(conn: &Connection) -> Result<Catalog> {
    let catalog = Catalog::new(
        load_ingredients(conn)?,
        load_glassware(conn)?,
        load_tools(conn)?,
        load_recipes(conn)?,
    )
    .context("Catalog in database is inconsistent")?;
    Ok(catalog)
}

/// Count rows per catalog table, for status output
pub fn catalog_counts(conn: &Connection) -> Result<Vec<(&'static str, i64)>> {
    let mut counts = Vec::new();
    for table in ["ingredients", "glassware", "tools", "recipes"] {
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
            row.get(0)
        })?;
        counts.push((table, count));
    }
    Ok(counts)
}
