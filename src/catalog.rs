//! Built-in recipes and first-run data.

use chrono::{DateTime, Duration, Utc};
use std::sync::LazyLock;
use tracing::error;

use crate::model::{Category, CookedLog, Ingredient, NutritionInfo, Recipe};

static STATIC_RECIPES: LazyLock<Vec<Recipe>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("../data/static_recipes.json")).unwrap_or_else(|e| {
        error!(error = %e, "Built-in recipe data is malformed");
        Vec::new()
    })
});

/// Recipes answered locally, without calling the generator.
pub fn static_recipes() -> &'static [Recipe] {
    &STATIC_RECIPES
}

/// Exact title match after trimming.
pub fn find_static_recipe(title: &str) -> Option<&'static Recipe> {
    let title = title.trim();
    STATIC_RECIPES.iter().find(|r| r.title == title)
}

/// Titles offered as quick searches.
pub fn popular_titles() -> Vec<&'static str> {
    STATIC_RECIPES.iter().map(|r| r.title.as_str()).collect()
}

pub fn default_fridge() -> Vec<Ingredient> {
    vec![
        Ingredient::new("鸡蛋", "6个").with_category(Category::Meat),
        Ingredient::new("西红柿", "3个").with_category(Category::Vegetable),
        Ingredient::new("青椒", "2个").with_category(Category::Vegetable),
        Ingredient::new("葱", "1根").with_category(Category::Seasoning),
    ]
}

pub fn default_favorites() -> Vec<Recipe> {
    find_static_recipe("宫保鸡丁").cloned().into_iter().collect()
}

pub fn default_cooked_log(now: DateTime<Utc>) -> Vec<CookedLog> {
    let mut logs = Vec::new();
    if let Some(eggs) = find_static_recipe("西红柿炒鸡蛋") {
        logs.push(CookedLog {
            id: "init_log_1".to_string(),
            recipe_title: eggs.title.clone(),
            date: now.to_rfc3339(),
            nutrition: eggs.nutrition.clone(),
            consumed_servings: 1.5,
            image_url: eggs.image_url.clone(),
        });
    }
    logs.push(CookedLog {
        id: "init_log_2".to_string(),
        recipe_title: "米饭".to_string(),
        date: (now - Duration::hours(1)).to_rfc3339(),
        nutrition: NutritionInfo {
            calories: "350 kcal".into(),
            protein: "7g".into(),
            carbs: "80g".into(),
            fat: "1g".into(),
            micronutrients: None,
        },
        consumed_servings: 2.0,
        image_url: None,
    });
    logs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_recipes_load() {
        assert_eq!(
            popular_titles(),
            vec!["西红柿炒鸡蛋", "红烧肉", "清蒸鲈鱼", "宫保鸡丁", "麻婆豆腐"]
        );
        for recipe in static_recipes() {
            assert!(!recipe.id.is_empty());
            assert!(!recipe.ingredients.is_empty());
            assert!(!recipe.steps.is_empty());
            assert!(!recipe.nutrition.calories.is_empty());
        }
    }

    #[test]
    fn test_lookup_is_exact_after_trim() {
        assert_eq!(find_static_recipe(" 红烧肉 ").map(|r| r.servings.as_str()), Some("4人份"));
        assert!(find_static_recipe("红烧").is_none());
    }

    #[test]
    fn test_seed_data() {
        assert_eq!(default_fridge().len(), 4);
        assert_eq!(default_favorites()[0].title, "宫保鸡丁");
        let logs = default_cooked_log(Utc::now());
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].nutrition.calories, "320 kcal");
        assert_eq!(logs[1].consumed_servings, 2.0);
    }
}
