//! The player's in-progress drink and the actions that build it up

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{Rim, Technique};

/// Ingredient id whose pour means the drink has ice
pub const ICE_ID: &str = "ice-cubes";

/// Tool id counted by the jigger technique check
pub const JIGGER_ID: &str = "jigger";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceIngredient {
    pub id: String,
    pub ingredient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_id: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Snapshot of everything the player has done to the current drink.
///
/// Pour order is kept for audit and undo only; scoring treats pours,
/// garnishes and techniques as sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glass_id: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<WorkspaceIngredient>,
    #[serde(default)]
    pub garnishes: Vec<String>,
    #[serde(default)]
    pub techniques: Vec<Technique>,
    #[serde(default)]
    pub has_ice: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rim: Option<Rim>,
    /// Time of the first action, in milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(default, skip_serializing)]
    next_pour: u64,
}

impl WorkspaceState {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self, now_ms: i64) {
        self.started_at.get_or_insert(now_ms);
    }

    pub fn select_glass(&mut self, glass_id: &str, now_ms: i64) {
        self.glass_id = Some(glass_id.to_string());
        self.touch(now_ms);
    }

    pub fn pour(&mut self, ingredient_id: &str, tool_id: Option<&str>, now_ms: i64) {
        // snapshots loaded from JSON start the counter at zero
        self.next_pour = self.next_pour.max(self.ingredients.len() as u64) + 1;
        let id = format!("pour-{}", self.next_pour);
        debug!("pour {} ({}) with {:?}", ingredient_id, id, tool_id);

        self.ingredients.push(WorkspaceIngredient {
            id,
            ingredient_id: ingredient_id.to_string(),
            tool_id: tool_id.map(str::to_string),
            timestamp: now_ms,
        });
        if ingredient_id == ICE_ID {
            self.has_ice = true;
        }
        self.touch(now_ms);
    }

    pub fn add_garnish(&mut self, garnish_id: &str, now_ms: i64) {
        if !self.garnishes.iter().any(|g| g == garnish_id) {
            self.garnishes.push(garnish_id.to_string());
        }
        self.touch(now_ms);
    }

    pub fn set_rim(&mut self, rim: Option<Rim>, now_ms: i64) {
        self.rim = rim;
        self.touch(now_ms);
    }

    pub fn record_technique(&mut self, technique: Technique, now_ms: i64) {
        if !self.techniques.contains(&technique) {
            self.techniques.push(technique);
        }
        self.touch(now_ms);
    }

    /// Remove the latest garnish, or the latest pour if there are no
    /// garnishes. Glass, rim and techniques are never undone.
    pub fn undo_last_action(&mut self) {
        if self.garnishes.pop().is_some() {
            return;
        }

        if let Some(removed) = self.ingredients.pop() {
            if removed.ingredient_id == ICE_ID {
                self.has_ice = self.ingredients.iter().any(|e| e.ingredient_id == ICE_ID);
            }
        }
    }

    /// Seconds between the first action and `serve_ms`, never negative.
    /// A workspace nobody touched scores as served instantly.
    pub fn elapsed_seconds(&self, serve_ms: i64) -> f64 {
        match self.started_at {
            Some(started) => ((serve_ms - started) as f64 / 1000.0).max(0.0),
            None => 0.0,
        }
    }

    /// Count of pours measured with the jigger
    pub fn jigger_pours(&self) -> usize {
        self.ingredients
            .iter()
            .filter(|e| e.tool_id.as_deref() == Some(JIGGER_ID))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.glass_id.is_none()
            && self.ingredients.is_empty()
            && self.garnishes.is_empty()
            && self.techniques.is_empty()
    }
}
