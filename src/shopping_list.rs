use std::collections::{HashMap, HashSet};

use crate::model::{Category, Ingredient, Recipe};
use crate::quantity::{format_number, parse_amount, round1};

/// Merged ingredients for a set of recipes, bucketed by category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingList {
    buckets: [Vec<Ingredient>; 5],
}

impl ShoppingList {
    pub fn bucket(&self, category: Category) -> &[Ingredient] {
        &self.buckets[category.index()]
    }

    /// Buckets with at least one item, in display order.
    pub fn non_empty_buckets(&self) -> Vec<(Category, &[Ingredient])> {
        Category::ALL
            .into_iter()
            .map(|category| (category, self.bucket(category)))
            .filter(|(_, items)| !items.is_empty())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct IngredientGroup {
    category_label: String,
    amounts: Vec<String>,
}

/// Merges the ingredients of `recipes` by trimmed name.
///
/// Amounts are summed only when every occurrence parses as `<number><unit>`
/// with the same unit; otherwise the distinct literal amounts are joined with
/// `" + "` in first-seen order. Each merged item keeps the first category
/// label seen for its name.
pub fn aggregate_ingredients(recipes: &[Recipe]) -> ShoppingList {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, IngredientGroup> = HashMap::new();

    for ingredient in recipes.iter().flat_map(|r| r.ingredients.iter()) {
        let key = ingredient.name.trim().to_string();
        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            IngredientGroup {
                category_label: ingredient
                    .category
                    .clone()
                    .unwrap_or_else(|| Category::Other.label().to_string()),
                amounts: Vec::new(),
            }
        });
        group.amounts.push(ingredient.amount.clone());
    }

    let mut list = ShoppingList::default();
    for name in order {
        let Some(group) = groups.remove(&name) else {
            continue;
        };
        let amount = merge_amounts(&group.amounts);
        let category = Category::from_label(Some(&group.category_label));
        list.buckets[category.index()].push(Ingredient {
            name,
            amount,
            category: Some(group.category_label),
            ..Default::default()
        });
    }
    list
}

fn merge_amounts(amounts: &[String]) -> String {
    if let Some(total) = sum_compatible(amounts) {
        return total;
    }
    let mut seen = HashSet::new();
    amounts
        .iter()
        .filter(|a| seen.insert(a.as_str()))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" + ")
}

fn sum_compatible(amounts: &[String]) -> Option<String> {
    let mut unit: Option<String> = None;
    let mut total = 0.0;
    for amount in amounts {
        let parsed = parse_amount(amount)?;
        match &unit {
            None => unit = Some(parsed.unit),
            Some(u) if *u != parsed.unit => return None,
            Some(_) => {}
        }
        total += parsed.value;
    }
    let unit = unit?;
    Some(format!("{}{}", format_number(round1(total)), unit))
}

/// Returns the fridge item matching `name`, where either name contains the other.
pub fn find_in_fridge<'a>(fridge: &'a [Ingredient], name: &str) -> Option<&'a Ingredient> {
    fridge
        .iter()
        .find(|item| item.name.contains(name) || name.contains(item.name.as_str()))
}

/// Purchased state for shopping list items, keyed by ingredient name.
#[derive(Debug, Clone, Default)]
pub struct Checklist {
    purchased: HashSet<String>,
}

impl Checklist {
    /// Flips the purchased flag and returns the new state.
    pub fn toggle(&mut self, name: &str) -> bool {
        if self.purchased.remove(name) {
            false
        } else {
            self.purchased.insert(name.to_string());
            true
        }
    }

    pub fn is_purchased(&self, name: &str) -> bool {
        self.purchased.contains(name)
    }

    pub fn clear(&mut self) {
        self.purchased.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(title: &str, ingredients: Vec<Ingredient>) -> Recipe {
        Recipe {
            id: title.to_string(),
            title: title.to_string(),
            ingredients,
            ..Default::default()
        }
    }

    #[test]
    fn test_sums_matching_units() {
        let a = recipe("A", vec![Ingredient::new("鸡蛋", "3个").with_category(Category::Meat)]);
        let b = recipe("B", vec![Ingredient::new("鸡蛋", "2个").with_category(Category::Meat)]);
        let list = aggregate_ingredients(&[a, b]);
        assert_eq!(list.len(), 1);
        let eggs = &list.bucket(Category::Meat)[0];
        assert_eq!(eggs.name, "鸡蛋");
        assert_eq!(eggs.amount, "5个");
    }

    #[test]
    fn test_rounds_decimal_sums() {
        let a = recipe("A", vec![Ingredient::new("盐", "0.1g"), Ingredient::new("盐", "0.2g")]);
        let list = aggregate_ingredients(&[a]);
        assert_eq!(list.bucket(Category::Other)[0].amount, "0.3g");
    }

    #[test]
    fn test_mixed_units_join_distinct_literals() {
        let a = recipe("A", vec![Ingredient::new("鸡蛋", "2个")]);
        let b = recipe("B", vec![Ingredient::new("鸡蛋", "300g")]);
        let c = recipe("C", vec![Ingredient::new("鸡蛋", "2个")]);
        let list = aggregate_ingredients(&[a, b, c]);
        assert_eq!(list.bucket(Category::Other)[0].amount, "2个 + 300g");
    }

    #[test]
    fn test_unparsable_amount_falls_back_to_join() {
        let a = recipe("A", vec![Ingredient::new("花椒粉", "适量").with_category(Category::Spice)]);
        let b = recipe("B", vec![Ingredient::new("花椒粉", "1勺").with_category(Category::Spice)]);
        let list = aggregate_ingredients(&[a, b]);
        assert_eq!(list.bucket(Category::Spice)[0].amount, "适量 + 1勺");
    }

    #[test]
    fn test_first_seen_category_wins_and_unknown_goes_to_other() {
        let mut butter = Ingredient::new("黄油", "10g");
        butter.category = Some("乳制品".into());
        let a = recipe(
            "A",
            vec![Ingredient::new(" 葱 ", "1根").with_category(Category::Seasoning), butter],
        );
        let b = recipe("B", vec![Ingredient::new("葱", "2根").with_category(Category::Vegetable)]);
        let list = aggregate_ingredients(&[a, b]);

        let scallion = &list.bucket(Category::Seasoning)[0];
        assert_eq!(scallion.name, "葱");
        assert_eq!(scallion.amount, "3根");
        assert!(list.bucket(Category::Vegetable).is_empty());

        let other = list.bucket(Category::Other);
        assert_eq!(other[0].name, "黄油");
        assert_eq!(other[0].category.as_deref(), Some("乳制品"));
    }

    #[test]
    fn test_empty_input_gives_empty_buckets() {
        let list = aggregate_ingredients(&[]);
        assert!(list.is_empty());
        assert!(list.non_empty_buckets().is_empty());
    }

    #[test]
    fn test_bucket_order_follows_first_seen_names() {
        let a = recipe(
            "A",
            vec![
                Ingredient::new("西红柿", "2个").with_category(Category::Vegetable),
                Ingredient::new("青椒", "1个").with_category(Category::Vegetable),
            ],
        );
        let b = recipe("B", vec![Ingredient::new("西红柿", "1个").with_category(Category::Vegetable)]);
        let list = aggregate_ingredients(&[a, b]);
        let names: Vec<_> = list.bucket(Category::Vegetable).iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["西红柿", "青椒"]);
        assert_eq!(list.bucket(Category::Vegetable)[0].amount, "3个");
    }

    #[test]
    fn test_find_in_fridge_matches_either_direction() {
        let fridge = vec![Ingredient::new("鸡蛋", "6个"), Ingredient::new("葱", "1根")];
        assert_eq!(find_in_fridge(&fridge, "土鸡蛋").map(|i| i.name.as_str()), Some("鸡蛋"));
        assert_eq!(find_in_fridge(&fridge, "大葱").map(|i| i.name.as_str()), Some("葱"));
        assert!(find_in_fridge(&fridge, "牛肉").is_none());
    }

    #[test]
    fn test_checklist_toggle() {
        let mut checklist = Checklist::default();
        assert!(checklist.toggle("鸡蛋"));
        assert!(checklist.is_purchased("鸡蛋"));
        assert!(!checklist.toggle("鸡蛋"));
        assert!(!checklist.is_purchased("鸡蛋"));
    }
}
