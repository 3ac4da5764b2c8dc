//! Static bar catalog: ingredients, glassware, tools and recipes

use std::collections::HashMap;

use crate::error::CatalogError;
use crate::evaluator::IngredientDirectory;
use crate::models::{
    Glassware, Ingredient, IngredientCategory, IngredientRequirement, Recipe, Rim, Technique, Tool,
    ToolKind, Unit, Venue,
};

/// Validated lookup tables. Every recipe reference resolves once built.
#[derive(Debug, Clone)]
pub struct Catalog {
    ingredients: Vec<Ingredient>,
    glassware: Vec<Glassware>,
    tools: Vec<Tool>,
    recipes: Vec<Recipe>,
    ingredient_index: HashMap<String, usize>,
    recipe_index: HashMap<String, usize>,
}

fn index_by_id<'a, I>(kind: &'static str, ids: I) -> Result<HashMap<String, usize>, CatalogError>
where
    I: Iterator<Item = &'a str>,
{
    let mut index = HashMap::new();
    for (pos, id) in ids.enumerate() {
        if index.insert(id.to_string(), pos).is_some() {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(index)
}

impl Catalog {
    pub fn new(
        ingredients: Vec<Ingredient>,
        glassware: Vec<Glassware>,
        tools: Vec<Tool>,
        recipes: Vec<Recipe>,
    ) -> Result<Self, CatalogError> {
        let ingredient_index =
            index_by_id("ingredient", ingredients.iter().map(|i| i.id.as_str()))?;
        let recipe_index = index_by_id("recipe", recipes.iter().map(|r| r.id.as_str()))?;
        index_by_id("glass", glassware.iter().map(|g| g.id.as_str()))?;
        index_by_id("tool", tools.iter().map(|t| t.id.as_str()))?;

        let catalog = Self {
            ingredients,
            glassware,
            tools,
            recipes,
            ingredient_index,
            recipe_index,
        };
        for recipe in &catalog.recipes {
            catalog.check_recipe(recipe)?;
        }
        Ok(catalog)
    }

    /// Check that `recipe` only references entries of this catalog
    pub fn check_recipe(&self, recipe: &Recipe) -> Result<(), CatalogError> {
        if !(1..=5).contains(&recipe.difficulty) {
            return Err(CatalogError::DifficultyOutOfRange {
                recipe: recipe.id.clone(),
                difficulty: recipe.difficulty,
            });
        }
        if self.glass(&recipe.glass_id).is_none() {
            return Err(CatalogError::UnknownGlass {
                recipe: recipe.id.clone(),
                glass: recipe.glass_id.clone(),
            });
        }
        if let Some(req) = recipe
            .ingredient_requirements
            .iter()
            .find(|r| self.ingredient(&r.ingredient_id).is_none())
        {
            return Err(CatalogError::UnknownIngredient {
                recipe: recipe.id.clone(),
                ingredient: req.ingredient_id.clone(),
            });
        }
        if let Some(garnish) = recipe
            .garnish_ids
            .iter()
            .find(|g| self.ingredient(g).is_none())
        {
            return Err(CatalogError::UnknownGarnish {
                recipe: recipe.id.clone(),
                garnish: garnish.clone(),
            });
        }
        Ok(())
    }

    pub fn ingredient(&self, id: &str) -> Option<&Ingredient> {
        self.ingredient_index.get(id).map(|&i| &self.ingredients[i])
    }

    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipe_index.get(id).map(|&i| &self.recipes[i])
    }

    pub fn glass(&self, id: &str) -> Option<&Glassware> {
        self.glassware.iter().find(|g| g.id == id)
    }

    pub fn tool(&self, id: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn glassware(&self) -> &[Glassware] {
        &self.glassware
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Recipe ids unlocked at any of `venues`, in catalog order
    pub fn recipes_for_venues(&self, venues: &[Venue]) -> Vec<&str> {
        self.recipes
            .iter()
            .filter(|r| venues.contains(&r.venue))
            .map(|r| r.id.as_str())
            .collect()
    }

    /// The built-in bar the game ships with
    pub fn sample() -> Result<Self, CatalogError> {
        Self::new(
            sample_ingredients(),
            sample_glassware(),
            sample_tools(),
            sample_recipes(),
        )
    }
}

impl IngredientDirectory for Catalog {
    fn display_name(&self, id: &str) -> Option<&str> {
        self.ingredient(id).map(|i| i.name.as_str())
    }
}

fn ingredient(
    id: &str,
    name: &str,
    category: IngredientCategory,
    default_amount: Option<f64>,
    unit: Unit,
) -> Ingredient {
    Ingredient {
        id: id.to_string(),
        name: name.to_string(),
        category,
        unit: Some(unit),
        default_amount,
    }
}

fn sample_ingredients() -> Vec<Ingredient> {
    use IngredientCategory::*;

    let spirits = [
        ("vodka", "Vodka"),
        ("gin", "Gin"),
        ("white-rum", "Rum (White)"),
        ("tequila", "Tequila"),
        ("whiskey", "Whiskey"),
        ("bourbon", "Bourbon"),
        ("rye-whiskey", "Rye Whiskey"),
        ("dark-rum", "Rum (Dark)"),
    ]
    .map(|(id, name)| ingredient(id, name, Spirit, Some(2.0), Unit::Oz));

    let modifiers = [
        ("triple-sec", "Triple Sec", 1.0),
        ("sweet-vermouth", "Sweet Vermouth", 1.0),
        ("dry-vermouth", "Dry Vermouth", 1.0),
        ("campari", "Campari", 1.0),
        ("orgeat", "Orgeat", 0.75),
        ("cointreau", "Cointreau", 1.0),
    ]
    .map(|(id, name, amt)| ingredient(id, name, Modifier, Some(amt), Unit::Oz));

    let bitters = [
        ingredient("angostura-bitters", "Angostura Bitters", Bitter, Some(2.0), Unit::Dash),
        ingredient("orange-bitters", "Orange Bitters", Bitter, Some(1.0), Unit::Dash),
    ];

    let mixers = [
        ("lime-juice", "Lime Juice", 1.0),
        ("lemon-juice", "Lemon Juice", 1.0),
        ("simple-syrup", "Simple Syrup", 0.5),
        ("agave-syrup", "Agave Syrup", 0.25),
        ("pineapple-juice", "Pineapple Juice", 2.0),
        ("coconut-cream", "Coconut Cream", 1.0),
        ("soda-water", "Soda Water", 2.0),
        ("cola", "Cola", 3.0),
    ]
    .map(|(id, name, amt)| ingredient(id, name, Mixer, Some(amt), Unit::Oz));

    let garnishes = [
        ("lime-wheel", "Lime Wheel"),
        ("lime-wedge", "Lime Wedge"),
        ("lemon-twist", "Lemon Twist"),
        ("orange-peel", "Orange Peel"),
        ("maraschino-cherry", "Cherry"),
        ("olive", "Olive"),
        ("mint-sprig", "Mint Sprig"),
    ]
    .map(|(id, name)| ingredient(id, name, Garnish, None, Unit::Piece));

    let utilities = [
        ingredient("ice-cubes", "Ice", Utility, None, Unit::Cube),
        ingredient("sugar-cube", "Sugar Cube", Utility, None, Unit::Cube),
    ];

    spirits
        .into_iter()
        .chain(modifiers)
        .chain(bitters)
        .chain(mixers)
        .chain(garnishes)
        .chain(utilities)
        .collect()
}

fn sample_glassware() -> Vec<Glassware> {
    [
        ("rocks-glass", "Rocks Glass"),
        ("highball-glass", "Highball Glass"),
        ("coupe-glass", "Coupe"),
        ("martini-glass", "Martini Glass"),
        ("tiki-mug", "Tiki Mug"),
    ]
    .into_iter()
    .map(|(id, name)| Glassware {
        id: id.to_string(),
        name: name.to_string(),
    })
    .collect()
}

fn sample_tools() -> Vec<Tool> {
    [
        ("jigger", "Jigger", ToolKind::Measure, None),
        ("shaker", "Shaker", ToolKind::Mix, Some(Technique::Shake)),
        ("mixing-glass", "Mixing Glass", ToolKind::Mix, Some(Technique::Stir)),
        ("bar-spoon", "Bar Spoon", ToolKind::Mix, Some(Technique::Stir)),
        ("muddler", "Muddler", ToolKind::Prep, Some(Technique::Muddle)),
        ("hawthorne-strainer", "Strainer", ToolKind::Serve, Some(Technique::Strain)),
    ]
    .into_iter()
    .map(|(id, name, kind, technique)| Tool {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        technique,
    })
    .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn sample_recipes() -> Vec<Recipe> {
    use IngredientRequirement as Req;

    vec![
        Recipe {
            id: "rum-and-coke".to_string(),
            name: "Rum & Coke".to_string(),
            venue: Venue::Dive,
            difficulty: 1,
            glass_id: "highball-glass".to_string(),
            method: Technique::Build,
            requires_ice: true,
            requires_jigger: false,
            garnish_ids: Vec::new(),
            rim_options: Vec::new(),
            description: None,
            ingredient_requirements: vec![
                Req::measured("white-rum", 2.0, Unit::Oz),
                Req::measured("cola", 4.0, Unit::Oz),
                Req::new("lime-wedge").optional(),
            ],
            notes: strings(&["Build over ice", "Top with cola and quick stir."]),
        },
        Recipe {
            id: "gin-and-tonic".to_string(),
            name: "Gin & Tonic".to_string(),
            venue: Venue::Dive,
            difficulty: 1,
            glass_id: "highball-glass".to_string(),
            method: Technique::Build,
            requires_ice: true,
            requires_jigger: false,
            garnish_ids: Vec::new(),
            rim_options: Vec::new(),
            description: None,
            ingredient_requirements: vec![
                Req::measured("gin", 2.0, Unit::Oz),
                Req::measured("soda-water", 4.0, Unit::Oz),
                Req::new("lime-wheel").optional(),
            ],
            notes: strings(&["Build over ice", "Garnish with lime."]),
        },
        Recipe {
            id: "old-fashioned".to_string(),
            name: "Old Fashioned".to_string(),
            venue: Venue::Lounge,
            difficulty: 2,
            glass_id: "rocks-glass".to_string(),
            method: Technique::Stir,
            requires_ice: true,
            requires_jigger: true,
            garnish_ids: strings(&["orange-peel"]),
            rim_options: Vec::new(),
            description: None,
            ingredient_requirements: vec![
                Req {
                    unit: Some(Unit::Cube),
                    ..Req::new("sugar-cube")
                },
                Req::measured("angostura-bitters", 2.0, Unit::Dash),
                Req::measured("bourbon", 2.0, Unit::Oz),
            ],
            notes: strings(&[
                "Muddle sugar with bitters",
                "Add ice, stir with bar spoon",
                "Express orange peel",
            ]),
        },
        Recipe {
            id: "margarita".to_string(),
            name: "Margarita".to_string(),
            venue: Venue::Tiki,
            difficulty: 3,
            glass_id: "coupe-glass".to_string(),
            method: Technique::Shake,
            requires_ice: true,
            requires_jigger: true,
            garnish_ids: strings(&["lime-wheel"]),
            rim_options: vec![Rim::Salt],
            description: None,
            ingredient_requirements: vec![
                Req::measured("tequila", 2.0, Unit::Oz),
                Req::measured("triple-sec", 1.0, Unit::Oz),
                Req::measured("lime-juice", 1.0, Unit::Oz),
                Req::measured("agave-syrup", 0.25, Unit::Oz).optional(),
            ],
            notes: strings(&[
                "Add ingredients to shaker with ice",
                "Shake hard, double strain into coupe",
            ]),
        },
        Recipe {
            id: "mai-tai".to_string(),
            name: "Mai Tai".to_string(),
            venue: Venue::Tiki,
            difficulty: 3,
            glass_id: "tiki-mug".to_string(),
            method: Technique::Shake,
            requires_ice: true,
            requires_jigger: false,
            garnish_ids: strings(&["mint-sprig", "lime-wheel"]),
            rim_options: Vec::new(),
            description: None,
            ingredient_requirements: vec![
                Req::measured("dark-rum", 1.5, Unit::Oz),
                Req::measured("white-rum", 1.0, Unit::Oz),
                Req::measured("lime-juice", 0.75, Unit::Oz),
                Req::measured("orgeat", 0.5, Unit::Oz),
                Req::measured("cointreau", 0.5, Unit::Oz),
            ],
            notes: strings(&[
                "Shake with crushed ice",
                "Garnish with spent lime shell and mint",
            ]),
        },
        Recipe {
            id: "manhattan".to_string(),
            name: "Manhattan".to_string(),
            venue: Venue::Speakeasy,
            difficulty: 4,
            glass_id: "coupe-glass".to_string(),
            method: Technique::Stir,
            requires_ice: false,
            requires_jigger: true,
            garnish_ids: strings(&["maraschino-cherry"]),
            rim_options: Vec::new(),
            description: None,
            ingredient_requirements: vec![
                Req::measured("rye-whiskey", 2.0, Unit::Oz),
                Req::measured("sweet-vermouth", 1.0, Unit::Oz),
                Req::measured("angostura-bitters", 2.0, Unit::Dash),
            ],
            notes: strings(&["Stir with ice in mixing glass", "Strain into chilled coupe"]),
        },
    ]
}
