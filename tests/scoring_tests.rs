use virtual_shaker::models::{IngredientRequirement, Recipe, Technique, Unit, Venue};
use virtual_shaker::workspace::{ICE_ID, JIGGER_ID};
use virtual_shaker::{Catalog, Mistake, ScoreBreakdown, WorkspaceState, evaluate};

/// A shaken, jiggered, garnished recipe with difficulty 2 (35 s window)
fn gimlet() -> Recipe {
    Recipe {
        id: "gimlet".to_string(),
        name: "Gimlet".to_string(),
        venue: Venue::Lounge,
        difficulty: 2,
        glass_id: "coupe-glass".to_string(),
        method: Technique::Shake,
        requires_ice: true,
        requires_jigger: true,
        garnish_ids: vec!["lime-wheel".to_string()],
        rim_options: Vec::new(),
        description: None,
        ingredient_requirements: vec![
            IngredientRequirement::measured("gin", 2.0, Unit::Oz),
            IngredientRequirement::measured("lime-juice", 0.75, Unit::Oz),
            IngredientRequirement::measured("simple-syrup", 0.5, Unit::Oz).optional(),
        ],
        notes: Vec::new(),
    }
}

fn correct_workspace() -> WorkspaceState {
    let mut ws = WorkspaceState::new();
    ws.select_glass("coupe-glass", 0);
    ws.pour(ICE_ID, None, 100);
    ws.pour("gin", Some(JIGGER_ID), 200);
    ws.pour("lime-juice", Some(JIGGER_ID), 300);
    ws.add_garnish("lime-wheel", 400);
    ws.record_technique(Technique::Shake, 500);
    ws
}

fn full_marks() -> ScoreBreakdown {
    ScoreBreakdown {
        accuracy: 100,
        technique: 100,
        speed: 100,
        total: 100,
    }
}

#[test]
fn exact_match_within_window_is_perfect() {
    let result = evaluate(&correct_workspace(), &gimlet(), 12.0, &());
    assert_eq!(result.breakdown, full_marks());
    assert!(result.mistakes.is_empty());
}

#[test]
fn duplicate_required_pours_earn_nothing_extra() {
    let mut ws = correct_workspace();
    ws.pour("gin", Some(JIGGER_ID), 600);

    let result = evaluate(&ws, &gimlet(), 12.0, &());
    assert_eq!(result.breakdown, full_marks());
}

#[test]
fn missing_glass_costs_thirty() {
    let mut ws = correct_workspace();
    ws.glass_id = None;

    let result = evaluate(&ws, &gimlet(), 12.0, &());
    assert_eq!(result.breakdown.accuracy, 70);
    assert_eq!(result.mistakes, [Mistake::NoGlass]);

    ws.glass_id = Some("rocks-glass".to_string());
    let result = evaluate(&ws, &gimlet(), 12.0, &());
    assert_eq!(result.breakdown.accuracy, 70);
    assert_eq!(result.messages(), ["Incorrect glassware"]);
}

#[test]
fn one_extra_costs_ten_even_when_poured_twice() {
    let mut ws = correct_workspace();
    ws.pour("campari", None, 600);

    let once = evaluate(&ws, &gimlet(), 12.0, &());
    assert_eq!(once.breakdown.accuracy, 90);
    assert_eq!(once.messages(), ["Unnecessary ingredient: campari"]);

    ws.pour("campari", None, 700);
    let twice = evaluate(&ws, &gimlet(), 12.0, &());
    assert_eq!(twice, once);
}

#[test]
fn shaken_recipe_stirred_instead() {
    let mut ws = correct_workspace();
    ws.techniques = vec![Technique::Stir];

    let result = evaluate(&ws, &gimlet(), 12.0, &());
    assert_eq!(result.breakdown.technique, 45);
    assert_eq!(
        result.messages(),
        ["Recipe should be shaken", "Shaken drink was stirred at some point"]
    );
}

#[test]
fn shaken_and_stirred_costs_only_the_conflict() {
    let mut ws = correct_workspace();
    ws.record_technique(Technique::Stir, 600);

    let result = evaluate(&ws, &gimlet(), 12.0, &());
    assert_eq!(result.breakdown.technique, 85);
}

#[test]
fn pours_without_jigger_cost_twenty() {
    let mut ws = correct_workspace();
    for entry in &mut ws.ingredients {
        entry.tool_id = None;
    }

    let result = evaluate(&ws, &gimlet(), 12.0, &());
    assert_eq!(result.breakdown.technique, 80);
    assert_eq!(result.mistakes, [Mistake::NoJigger]);
}

#[test]
fn speed_window_for_difficulty_two() {
    let ws = correct_workspace();
    let recipe = gimlet();

    let on_time = evaluate(&ws, &recipe, 35.0, &());
    assert_eq!(on_time.breakdown.speed, 100);
    assert!(on_time.mistakes.is_empty());

    let late = evaluate(&ws, &recipe, 45.0, &());
    assert_eq!(late.breakdown.speed, 70);
    assert_eq!(late.mistakes, [Mistake::TooSlow]);

    let very_late = evaluate(&ws, &recipe, 100.0, &());
    assert_eq!(very_late.breakdown.speed, 20);
    assert_eq!(very_late.mistakes.len(), 1);
}

#[test]
fn negative_elapsed_is_not_penalized() {
    let result = evaluate(&correct_workspace(), &gimlet(), -30.0, &());
    assert_eq!(result.breakdown.speed, 100);
    assert!(result.mistakes.is_empty());
}

#[test]
fn total_rounds_half_up() {
    // accuracy 70 (no glass), technique 45 (stirred, not shaken), speed 70 (10 s late)
    let mut ws = correct_workspace();
    ws.glass_id = None;
    ws.techniques = vec![Technique::Stir];

    let result = evaluate(&ws, &gimlet(), 45.0, &());
    assert_eq!(
        result.breakdown,
        ScoreBreakdown {
            accuracy: 70,
            technique: 45,
            speed: 70,
            total: 63
        }
    );
}

#[test]
fn total_matches_reported_fields_at_fractional_times() {
    let mut ws = correct_workspace();
    ws.glass_id = None;
    ws.techniques = vec![Technique::Stir];

    for elapsed in [35.05, 35.5, 36.17, 41.333, 52.9] {
        let b = evaluate(&ws, &gimlet(), elapsed, &()).breakdown;
        let weighted = 0.5 * f64::from(b.accuracy)
            + 0.3 * f64::from(b.technique)
            + 0.2 * f64::from(b.speed);
        // nudge so the float form of x.5 still rounds half-up
        assert_eq!(
            f64::from(b.total),
            (weighted + 1e-9).round(),
            "elapsed {elapsed}: {b:?}"
        );
    }

    let b = evaluate(&ws, &gimlet(), 35.05, &()).breakdown;
    assert_eq!((b.speed, b.total), (100, 69));
}

#[test]
fn mistakes_follow_the_fixed_order() {
    let mut ws = WorkspaceState::new();
    ws.select_glass("tiki-mug", 0);
    ws.pour("cola", None, 0);
    ws.pour("vodka", None, 0);
    ws.record_technique(Technique::Stir, 0);

    let catalog = Catalog::sample().unwrap();
    let result = evaluate(&ws, &gimlet(), 90.0, &catalog);
    assert_eq!(
        result.messages(),
        [
            "Incorrect glassware",
            "Missing Gin",
            "Missing Lime Juice",
            "Unnecessary ingredient: Cola",
            "Unnecessary ingredient: Vodka",
            "Drink should include ice",
            "Missing garnish: Lime Wheel",
            "Recipe should be shaken",
            "Shaken drink was stirred at some point",
            "Use the jigger for accurate pours",
            "Try to serve faster during the rush",
        ]
    );
}

#[test]
fn unknown_ids_fall_back_to_raw_text() {
    let mut ws = correct_workspace();
    ws.pour("moonshine", None, 0);

    let catalog = Catalog::sample().unwrap();
    let result = evaluate(&ws, &gimlet(), 0.0, &catalog);
    assert_eq!(result.messages(), ["Unnecessary ingredient: moonshine"]);
}

#[test]
fn scores_stay_in_range_for_degenerate_inputs() {
    let catalog = Catalog::sample().unwrap();
    let mut chaos = WorkspaceState::new();
    for id in ["cola", "olive", "vodka", "orgeat", "campari", "soda-water", "cola"] {
        chaos.pour(id, None, 0);
    }
    chaos.record_technique(Technique::Shake, 0);
    chaos.record_technique(Technique::Stir, 0);

    for recipe in catalog.recipes() {
        for elapsed in [0.0, 30.0, 1e9, f64::INFINITY] {
            for ws in [&WorkspaceState::new(), &chaos] {
                let b = evaluate(ws, recipe, elapsed, &catalog).breakdown;
                for score in [b.accuracy, b.technique, b.speed, b.total] {
                    assert!(score <= 100, "{} scored {:?}", recipe.id, b);
                }
            }
        }
    }
}

#[test]
fn recipe_without_requirements_is_graded() {
    let mut recipe = gimlet();
    recipe.ingredient_requirements.clear();
    recipe.garnish_ids.clear();
    recipe.requires_ice = false;
    recipe.requires_jigger = false;
    recipe.method = Technique::Build;

    let mut ws = WorkspaceState::new();
    ws.select_glass("coupe-glass", 0);
    let result = evaluate(&ws, &recipe, 0.0, &());
    assert_eq!(result.breakdown, full_marks());
}

#[test]
fn evaluation_is_idempotent_and_leaves_input_untouched() {
    let ws = correct_workspace();
    let before = ws.clone();
    let catalog = Catalog::sample().unwrap();

    let first = evaluate(&ws, &gimlet(), 41.3, &catalog);
    let second = evaluate(&ws, &gimlet(), 41.3, &catalog);
    assert_eq!(first, second);
    assert_eq!(ws, before);
}

#[test]
fn evaluation_json_carries_mistake_text() {
    let mut ws = correct_workspace();
    ws.has_ice = false;

    let result = evaluate(&ws, &gimlet(), 0.0, &());
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["breakdown"]["accuracy"], 80);
    assert_eq!(json["mistakes"][0], "Drink should include ice");
}
