//! Data models for bar ingredients, glassware, tools and recipes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Implements the lowercase text form used by the catalog store and
/// recipe files. Parsing is the single place free-form tags become enums.
macro_rules! text_tag {
    ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = CatalogError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(CatalogError::UnknownTag {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Spirit,
    Modifier,
    Bitter,
    Mixer,
    Garnish,
    Utility,
}

text_tag!(IngredientCategory, "category", {
    Spirit => "spirit",
    Modifier => "modifier",
    Bitter => "bitter",
    Mixer => "mixer",
    Garnish => "garnish",
    Utility => "utility",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Oz,
    Dash,
    Cube,
    Piece,
}

text_tag!(Unit, "unit", {
    Oz => "oz",
    Dash => "dash",
    Cube => "cube",
    Piece => "piece",
});

/// Preparation technique, both as a recipe's canonical method and as a
/// tag recorded in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technique {
    Shake,
    Stir,
    Muddle,
    Build,
    Strain,
}

text_tag!(Technique, "technique", {
    Shake => "shake",
    Stir => "stir",
    Muddle => "muddle",
    Build => "build",
    Strain => "strain",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rim {
    Salt,
    Sugar,
}

text_tag!(Rim, "rim", {
    Salt => "salt",
    Sugar => "sugar",
});

/// Bar a recipe is unlocked at in career mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    Dive,
    Tiki,
    Lounge,
    Speakeasy,
}

text_tag!(Venue, "venue", {
    Dive => "dive",
    Tiki => "tiki",
    Lounge => "lounge",
    Speakeasy => "speakeasy",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Measure,
    Mix,
    Prep,
    Serve,
}

text_tag!(ToolKind, "tool kind", {
    Measure => "measure",
    Mix => "mix",
    Prep => "prep",
    Serve => "serve",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub category: IngredientCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_amount: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glassware {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub kind: ToolKind,
    /// Technique recorded when the tool is used; measure tools have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technique: Option<Technique>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRequirement {
    pub ingredient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

impl IngredientRequirement {
    pub fn new(ingredient_id: &str) -> Self {
        Self {
            ingredient_id: ingredient_id.to_string(),
            amount: None,
            unit: None,
            preparation: None,
            optional: false,
        }
    }

    pub fn measured(ingredient_id: &str, amount: f64, unit: Unit) -> Self {
        Self {
            amount: Some(amount),
            unit: Some(unit),
            ..Self::new(ingredient_id)
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub venue: Venue,
    /// 1 (easy) to 5 (hard); widens the speed window
    pub difficulty: u8,
    pub glass_id: String,
    pub method: Technique,
    pub requires_ice: bool,
    #[serde(default)]
    pub requires_jigger: bool,
    #[serde(default)]
    pub garnish_ids: Vec<String>,
    #[serde(default)]
    pub rim_options: Vec<Rim>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub ingredient_requirements: Vec<IngredientRequirement>,
    #[serde(default)]
    pub notes: Vec<String>,
}

/// Graded result of one serve. Every field lies in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub accuracy: u8,
    pub technique: u8,
    pub speed: u8,
    pub total: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_parse_from_their_text_form() {
        for technique in Technique::ALL {
            assert_eq!(technique.as_str().parse::<Technique>(), Ok(*technique));
        }
        assert_eq!("tiki".parse::<Venue>(), Ok(Venue::Tiki));
        assert_eq!("measure".parse::<ToolKind>(), Ok(ToolKind::Measure));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "blend".parse::<Technique>().unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownTag {
                kind: "technique",
                value: "blend".to_string()
            }
        );
        assert_eq!(err.to_string(), "unknown technique tag 'blend'");
    }

    #[test]
    fn requirement_defaults_when_deserialized() {
        let req: IngredientRequirement =
            serde_json::from_str(r#"{"ingredient_id": "gin"}"#).unwrap();
        assert_eq!(req, IngredientRequirement::new("gin"));
    }
}
