//! Virtual Shaker
//!
//! Drink evaluation and scoring for a bartending game, plus the catalog,
//! workspace tracking and session state that feed it.

pub mod catalog;
pub mod db;
pub mod error;
pub mod evaluator;
pub mod game;
pub mod import;
pub mod models;
pub mod workspace;

pub use catalog::Catalog;
pub use evaluator::{Evaluation, IngredientDirectory, Mistake, evaluate};
pub use models::{Recipe, ScoreBreakdown};
pub use workspace::WorkspaceState;
