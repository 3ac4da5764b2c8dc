//! Error types for the catalog edge and recipe import

use thiserror::Error;

/// Raised while building or loading a [`Catalog`](crate::catalog::Catalog).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown {kind} tag '{value}'")]
    UnknownTag { kind: &'static str, value: String },

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("recipe '{recipe}' requires unknown ingredient '{ingredient}'")]
    UnknownIngredient { recipe: String, ingredient: String },

    #[error("recipe '{recipe}' lists unknown garnish '{garnish}'")]
    UnknownGarnish { recipe: String, garnish: String },

    #[error("recipe '{recipe}' is served in unknown glass '{glass}'")]
    UnknownGlass { recipe: String, glass: String },

    #[error("recipe '{recipe}' has difficulty {difficulty}, expected 1-5")]
    DifficultyOutOfRange { recipe: String, difficulty: u8 },
}

/// Raised while parsing a single recipe definition file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read recipe file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed recipe file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("'{0}' is not a valid id (expected lowercase-kebab-case)")]
    InvalidId(String),

    #[error("cannot parse measure '{0}'")]
    InvalidMeasure(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
