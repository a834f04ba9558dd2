use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Free label from the generator; see [`Category::from_label`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Set when the ingredient violates the user's dietary restrictions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflict: Option<bool>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: amount.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category.label().to_string());
        self
    }
}

/// Shopping list buckets, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Meat,
    Vegetable,
    Seasoning,
    Spice,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Meat,
        Category::Vegetable,
        Category::Seasoning,
        Category::Spice,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Meat => "肉类",
            Category::Vegetable => "蔬菜",
            Category::Seasoning => "佐料",
            Category::Spice => "香料",
            Category::Other => "其他",
        }
    }

    /// Unknown or missing labels land in `Other`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("肉类") => Category::Meat,
            Some("蔬菜") => Category::Vegetable,
            Some("佐料") => Category::Seasoning,
            Some("香料") => Category::Spice,
            _ => Category::Other,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Category::Meat => 0,
            Category::Vegetable => 1,
            Category::Seasoning => 2,
            Category::Spice => 3,
            Category::Other => 4,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub title: String,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Micronutrients {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iron: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_c: Option<String>,
}

impl Micronutrients {
    /// Present values as `(key, value)` pairs, keyed the way they are serialized.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("sodium", &self.sodium),
            ("sugar", &self.sugar),
            ("fiber", &self.fiber),
            ("calcium", &self.calcium),
            ("iron", &self.iron),
            ("vitaminC", &self.vitamin_c),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }

    pub fn label(key: &str) -> &'static str {
        match key {
            "sodium" => "钠",
            "sugar" => "糖",
            "fiber" => "膳食纤维",
            "calcium" => "钙",
            "iron" => "铁",
            "vitaminC" => "维生素C",
            _ => "",
        }
    }

    /// Applies `f` to every present value, leaving absent keys absent.
    pub fn map_values(&self, f: impl Fn(&str) -> String) -> Self {
        let apply = |value: &Option<String>| value.as_deref().map(&f);
        Self {
            sodium: apply(&self.sodium),
            sugar: apply(&self.sugar),
            fiber: apply(&self.fiber),
            calcium: apply(&self.calcium),
            iron: apply(&self.iron),
            vitamin_c: apply(&self.vitamin_c),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NutritionInfo {
    #[serde(default)]
    pub calories: String,
    #[serde(default)]
    pub protein: String,
    #[serde(default)]
    pub carbs: String,
    #[serde(default)]
    pub fat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micronutrients: Option<Micronutrients>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cuisine_type: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub cook_time: String,
    /// Free text such as "2人份".
    #[serde(default)]
    pub servings: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub nutrition: NutritionInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A meal that was actually eaten, with nutrition already scaled to the
/// consumed amount.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CookedLog {
    pub id: String,
    pub recipe_title: String,
    /// RFC 3339 timestamp.
    pub date: String,
    pub nutrition: NutritionInfo,
    pub consumed_servings: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProposalOption {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_safe: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Generation instructions for this variant.
    #[serde(default)]
    pub modifications: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalData {
    pub original_query: String,
    pub safe_option: ProposalOption,
    pub original_option: ProposalOption,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSuggestion {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub match_reason: String,
    #[serde(default)]
    pub missing_ingredients: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Dish,
    Ingredient,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub query: String,
    pub mode: SearchMode,
}

/// Units offered when stocking the fridge. `ToTaste` carries no number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FridgeUnit {
    Piece,
    Gram,
    Kilogram,
    Millilitre,
    Litre,
    Stalk,
    Pack,
    Spoon,
    ToTaste,
}

impl FridgeUnit {
    pub const ALL: [FridgeUnit; 9] = [
        FridgeUnit::Piece,
        FridgeUnit::Gram,
        FridgeUnit::Kilogram,
        FridgeUnit::Millilitre,
        FridgeUnit::Litre,
        FridgeUnit::Stalk,
        FridgeUnit::Pack,
        FridgeUnit::Spoon,
        FridgeUnit::ToTaste,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            FridgeUnit::Piece => "个",
            FridgeUnit::Gram => "g",
            FridgeUnit::Kilogram => "kg",
            FridgeUnit::Millilitre => "ml",
            FridgeUnit::Litre => "L",
            FridgeUnit::Stalk => "根",
            FridgeUnit::Pack => "包",
            FridgeUnit::Spoon => "勺",
            FridgeUnit::ToTaste => "适量",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.symbol() == symbol)
    }

    /// Builds the amount string stored on a fridge ingredient.
    pub fn amount(&self, quantity: &str) -> String {
        match self {
            FridgeUnit::ToTaste => self.symbol().to_string(),
            _ => format!("{}{}", quantity.trim(), self.symbol()),
        }
    }
}
