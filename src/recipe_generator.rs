use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::api_connection::endpoints::{
    Content, GenerateContentRequest, GenerationConfig, JsonSchema, Part,
};
use crate::api_connection::{ApiConnectionError, Provider};
use crate::model::{ProposalData, ProposalOption, Recipe, RecipeSuggestion};

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Instruction used when no proposal variant was chosen.
pub const STANDARD_INSTRUCTIONS: &str = "Standard recipe";

const CHEF_PERSONA: &str = "You are a professional chef. You are precise. You are honest about ingredients that might violate dietary needs.";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Api(#[from] ApiConnectionError),
    #[error("Generator returned malformed JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("Invalid image data URL: {0}")]
    InvalidDataUrl(String),
}

/// The four requests the assistant makes of a text/image model.
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    /// A full recipe for `dish`, scaled for `servings`, following `instructions`.
    /// Ingredients violating `restrictions` come back flagged as conflicts.
    async fn generate_recipe(
        &self,
        dish: &str,
        servings: u32,
        instructions: &str,
        restrictions: &str,
    ) -> Result<Recipe, GenerationError>;

    async fn generate_proposals(
        &self,
        dish: &str,
        restrictions: &str,
    ) -> Result<ProposalData, GenerationError>;

    async fn suggest_dishes(&self, ingredients: &str)
        -> Result<Vec<RecipeSuggestion>, GenerationError>;

    /// A `data:` URL for a photo of the dish. Failures yield `None`.
    async fn generate_dish_image(&self, prompt: &str) -> Option<String>;
}

pub struct GeminiRecipeGenerator {
    provider: Provider,
    text_model: String,
    image_model: String,
}

impl GeminiRecipeGenerator {
    pub fn new(provider: Provider, text_model: impl Into<String>, image_model: impl Into<String>) -> Self {
        Self {
            provider,
            text_model: text_model.into(),
            image_model: image_model.into(),
        }
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        prompt: String,
        schema: JsonSchema,
        system: Option<&str>,
    ) -> Result<T, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: system.map(|s| Content {
                role: None,
                parts: vec![Part::text(s)],
            }),
            generation_config: Some(GenerationConfig::json(schema)),
        };
        let response = self.provider.generate_content(&self.text_model, &request).await?;
        let text = response.text().ok_or(ApiConnectionError::EmptyResponse)?;
        debug!(raw = %text, "Generator payload");
        parse_payload(&text)
    }
}

#[async_trait]
impl RecipeGenerator for GeminiRecipeGenerator {
    async fn generate_recipe(
        &self,
        dish: &str,
        servings: u32,
        instructions: &str,
        restrictions: &str,
    ) -> Result<Recipe, GenerationError> {
        info!(dish, servings, "Generating recipe");
        let prompt = recipe_prompt(dish, servings, instructions, restrictions);
        let mut recipe: Recipe = self
            .request_json(prompt, recipe_schema(), Some(CHEF_PERSONA))
            .await
            .inspect_err(|e| error!(dish, error = %e, "Recipe generation failed"))?;
        recipe.id = Uuid::new_v4().to_string();
        Ok(recipe)
    }

    async fn generate_proposals(
        &self,
        dish: &str,
        restrictions: &str,
    ) -> Result<ProposalData, GenerationError> {
        info!(dish, restrictions, "Generating proposals");
        let raw: RawProposals = self
            .request_json(proposal_prompt(dish, restrictions), proposal_schema(), None)
            .await
            .inspect_err(|e| error!(dish, error = %e, "Proposal generation failed"))?;
        Ok(raw.into_proposal(dish))
    }

    async fn suggest_dishes(
        &self,
        ingredients: &str,
    ) -> Result<Vec<RecipeSuggestion>, GenerationError> {
        info!(ingredients, "Requesting dish suggestions");
        let raw: RawSuggestions = self
            .request_json(suggestion_prompt(ingredients), suggestion_schema(), None)
            .await
            .inspect_err(|e| error!(ingredients, error = %e, "Suggestion request failed"))?;
        Ok(raw.suggestions)
    }

    async fn generate_dish_image(&self, prompt: &str) -> Option<String> {
        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: None,
        };
        match self.provider.generate_content(&self.image_model, &request).await {
            Ok(response) => {
                let data_url = response
                    .first_inline_data()
                    .filter(|inline| !inline.data.is_empty())
                    .map(|inline| format!("data:{};base64,{}", inline.mime_type, inline.data));
                if data_url.is_none() {
                    warn!("Image model returned no inline image");
                }
                data_url
            }
            Err(e) => {
                error!(error = %e, "Image generation failed");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProposals {
    #[serde(default)]
    safe_option: ProposalOption,
    #[serde(default)]
    original_option: ProposalOption,
}

impl RawProposals {
    fn into_proposal(self, dish: &str) -> ProposalData {
        ProposalData {
            original_query: dish.to_string(),
            safe_option: ProposalOption {
                is_safe: true,
                ..self.safe_option
            },
            original_option: ProposalOption {
                is_safe: false,
                ..self.original_option
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSuggestions {
    #[serde(default)]
    suggestions: Vec<RecipeSuggestion>,
}

/// Removes a surrounding markdown code fence (optionally tagged `json`).
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

pub fn parse_payload<T: DeserializeOwned>(text: &str) -> Result<T, GenerationError> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        return Err(ApiConnectionError::EmptyResponse.into());
    }
    Ok(serde_json::from_str(body)?)
}

/// Splits a `data:<mime>;base64,<payload>` URL into its MIME type and bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), GenerationError> {
    let invalid = || GenerationError::InvalidDataUrl(url.chars().take(40).collect());
    let rest = url.strip_prefix("data:").ok_or_else(invalid)?;
    let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
    let mime = header.strip_suffix(";base64").ok_or_else(invalid)?;
    if mime.is_empty() {
        return Err(invalid());
    }
    let bytes = STANDARD.decode(payload.trim()).map_err(|_| invalid())?;
    Ok((mime.to_string(), bytes))
}

fn recipe_prompt(dish: &str, servings: u32, instructions: &str, restrictions: &str) -> String {
    format!(
        r#"Create a professional cooking guide for: "{dish}".

Configuration:
1. Servings: Scale all ingredient amounts exactly for {servings} people.
2. Specific Instruction: {instructions}

Requirements:
- Strictly categorize ingredients into: 肉类 (Meat/Seafood), 蔬菜 (Vegetables/Plant-based), 佐料 (Seasonings/Sauces), 香料 (Spices/Aromatics).
- Ensure the language is Simplified Chinese.
- Each step MUST have a short 2-4 character 'title' (e.g. '备菜', '焯水', '炒制').
- For step 'duration', ONLY include it for steps that require timing (cooking/marinating). DO NOT include duration for chopping, washing, or serving.
- Estimate Nutrition Info: Calories, Protein, Carbs, Fat.
- Estimate Micronutrients (if applicable): Sodium, Sugar, Fiber, Vitamin C, Calcium, Iron.

IMPORTANT - Conflict Detection:
- The user has these dietary restrictions: "{restrictions}".
- Check EVERY ingredient. If an ingredient violates these restrictions (even if instructed to include it), you MUST set the 'conflict' field to true.
"#
    )
}

fn proposal_prompt(dish: &str, restrictions: &str) -> String {
    format!(
        r#"User wants to cook "{dish}" but has these restrictions: "{restrictions}".

Please analyze this request and provide TWO options:
1. safeOption: A version that STRICTLY ADHERES to the restrictions (e.g., substituting meat, removing spice).
2. originalOption: The authentic, original version of the dish (ignoring the restrictions).

For the originalOption, list specifically what makes it conflict with the restrictions in the 'warnings' array (e.g. "Contains Pork", "High Oil").
"#
    )
}

fn suggestion_prompt(ingredients: &str) -> String {
    format!(
        r#"User has these ingredients: "{ingredients}".
Suggest 3-4 distinct Chinese dishes that can be made primarily with these ingredients.
For each suggestion, also list 1-2 key ingredients they might be missing but are standard in a kitchen.
Ensure the dishes are appetizing and varied.
"#
    )
}

fn ingredient_schema() -> JsonSchema {
    JsonSchema::object([
        ("name", JsonSchema::string().describe("Name of the ingredient (e.g., Tomato)")),
        ("amount", JsonSchema::string().describe("Quantity (e.g., 2 large, 500g)")),
        ("notes", JsonSchema::string().describe("Preparation notes (e.g., diced, peeled)")),
        (
            "category",
            JsonSchema::string_enum(&["肉类", "蔬菜", "佐料", "香料", "其他"]).describe(
                "Classify into: Meat/Seafood(肉类), Veg/Tofu(蔬菜), Sauces/Oil/Salt(佐料), Spices/Garlic/Ginger(香料), Others(其他)",
            ),
        ),
        (
            "conflict",
            JsonSchema::boolean().describe(
                "Set to TRUE if this ingredient violates the user's dietary restrictions (e.g., meat for vegetarians, chili for no-spicy).",
            ),
        ),
    ])
    .require(&["name", "amount", "category"])
}

fn step_schema() -> JsonSchema {
    JsonSchema::object([
        (
            "title",
            JsonSchema::string().describe("A very short, 2-4 character title for the step. Examples: '备菜', '腌制', '爆炒', '炖煮', '摆盘'."),
        ),
        ("instruction", JsonSchema::string().describe("Detailed instruction for this step")),
        (
            "duration",
            JsonSchema::string().describe("Time duration string (e.g., '10分钟', '30秒'). ONLY provide this for steps that involve active cooking (heating) or strict waiting times (marinating). DO NOT provide duration for chopping, washing, or serving."),
        ),
        ("tip", JsonSchema::string().describe("A chef's secret tip for this specific step")),
    ])
    .require(&["title", "instruction"])
}

fn nutrition_schema() -> JsonSchema {
    let micronutrients = JsonSchema::object([
        ("sodium", JsonSchema::string().describe("Sodium (mg)")),
        ("sugar", JsonSchema::string().describe("Sugar (g)")),
        ("fiber", JsonSchema::string().describe("Dietary Fiber (g)")),
        ("calcium", JsonSchema::string().describe("Calcium (% DV or mg)")),
        ("iron", JsonSchema::string().describe("Iron (% DV or mg)")),
        ("vitaminC", JsonSchema::string().describe("Vitamin C (% DV or mg)")),
    ]);
    JsonSchema::object([
        ("calories", JsonSchema::string().describe("Estimated calories per serving (e.g. '350 kcal')")),
        ("protein", JsonSchema::string().describe("Protein content (e.g. '20g')")),
        ("carbs", JsonSchema::string().describe("Carbohydrate content (e.g. '40g')")),
        ("fat", JsonSchema::string().describe("Fat content (e.g. '15g')")),
        ("micronutrients", micronutrients),
    ])
}

pub fn recipe_schema() -> JsonSchema {
    JsonSchema::object([
        ("title", JsonSchema::string().describe("The name of the dish in Chinese")),
        ("description", JsonSchema::string().describe("A sophisticated, appetizing short description")),
        ("cuisineType", JsonSchema::string().describe("e.g., Sichuan, Cantonese, Home-style")),
        ("difficulty", JsonSchema::string_enum(&["Easy", "Medium", "Hard"])),
        ("prepTime", JsonSchema::string()),
        ("cookTime", JsonSchema::string()),
        ("servings", JsonSchema::string().describe("The number of people this recipe serves (e.g., '2人份')")),
        ("ingredients", JsonSchema::array(ingredient_schema())),
        ("steps", JsonSchema::array(step_schema())),
        ("tips", JsonSchema::array(JsonSchema::string()).describe("General pro tips for success")),
        ("nutrition", nutrition_schema()),
        (
            "imagePrompt",
            JsonSchema::string().describe("A highly aesthetic, professional food photography prompt for this dish, studio lighting, 4k."),
        ),
    ])
    .require(&[
        "title",
        "description",
        "ingredients",
        "steps",
        "difficulty",
        "prepTime",
        "cookTime",
        "imagePrompt",
        "servings",
        "nutrition",
    ])
}

fn proposal_option_schema(description: &str, warnings: Option<&str>, modifications: &str) -> JsonSchema {
    let mut warnings_schema = JsonSchema::array(JsonSchema::string());
    if let Some(w) = warnings {
        warnings_schema = warnings_schema.describe(w);
    }
    JsonSchema::object([
        ("title", JsonSchema::string()),
        ("description", JsonSchema::string().describe(description)),
        ("isSafe", JsonSchema::boolean()),
        ("warnings", warnings_schema),
        ("modifications", JsonSchema::string().describe(modifications)),
    ])
}

pub fn proposal_schema() -> JsonSchema {
    JsonSchema::object([
        (
            "safeOption",
            proposal_option_schema(
                "Why is this safe? e.g. 'Uses Tofu instead of Chicken'",
                None,
                "Instructions to generate this safe version",
            ),
        ),
        (
            "originalOption",
            proposal_option_schema(
                "Description of the authentic original dish",
                Some("List specific ingredients that violate restrictions e.g. 'Contains Chicken', 'Very Spicy'"),
                "Instructions to generate the original version (ignoring restrictions)",
            ),
        ),
    ])
}

pub fn suggestion_schema() -> JsonSchema {
    let suggestion = JsonSchema::object([
        ("title", JsonSchema::string().describe("Name of the suggested dish")),
        ("description", JsonSchema::string().describe("Short appetizing description")),
        (
            "matchReason",
            JsonSchema::string().describe("Why this fits the user's ingredients (e.g., 'Perfect use of your leftover rice')"),
        ),
        (
            "missingIngredients",
            JsonSchema::array(JsonSchema::string()).describe("Key ingredients the user needs to buy"),
        ),
    ]);
    JsonSchema::object([("suggestions", JsonSchema::array(suggestion))])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fences("```"), "```");
    }

    #[test]
    fn test_parse_payload_reports_malformed_and_empty() {
        let ok: RawSuggestions =
            parse_payload("```json\n{\"suggestions\":[{\"title\":\"番茄蛋汤\"}]}\n```").unwrap();
        assert_eq!(ok.suggestions[0].title, "番茄蛋汤");

        let bad = parse_payload::<RawSuggestions>("not json");
        assert!(matches!(bad, Err(GenerationError::InvalidPayload(_))));

        let empty = parse_payload::<RawSuggestions>("```json\n```");
        assert!(matches!(
            empty,
            Err(GenerationError::Api(ApiConnectionError::EmptyResponse))
        ));
    }

    #[test]
    fn test_proposal_safety_flags_are_forced() {
        let raw: RawProposals = parse_payload(
            r#"{"safeOption":{"title":"素宫保豆腐","isSafe":false,"modifications":"用豆腐代替鸡肉"},
                "originalOption":{"title":"宫保鸡丁","isSafe":true,"warnings":["含鸡肉","很辣"]}}"#,
        )
        .unwrap();
        let proposal = raw.into_proposal("宫保鸡丁");
        assert_eq!(proposal.original_query, "宫保鸡丁");
        assert!(proposal.safe_option.is_safe);
        assert!(!proposal.original_option.is_safe);
        assert_eq!(proposal.original_option.warnings.len(), 2);
        assert_eq!(proposal.safe_option.modifications, "用豆腐代替鸡肉");
    }

    #[test]
    fn test_decode_data_url() {
        let (mime, bytes) = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"hello");

        for bad in ["image/png;base64,aGVsbG8=", "data:image/png,aGVsbG8=", "data:;base64,aGVsbG8=", "data:image/png;base64,@@"] {
            assert!(matches!(decode_data_url(bad), Err(GenerationError::InvalidDataUrl(_))), "{bad}");
        }
    }

    #[test]
    fn test_recipe_schema_requires_core_fields() {
        let schema = serde_json::to_value(recipe_schema()).unwrap();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["ingredients"]["items"]["required"][2], "category");
        assert!(schema["required"].as_array().unwrap().iter().any(|f| f == "imagePrompt"));
    }

    #[test]
    fn test_recipe_prompt_carries_configuration() {
        let prompt = recipe_prompt("麻婆豆腐", 3, STANDARD_INSTRUCTIONS, "不吃辣");
        assert!(prompt.contains("\"麻婆豆腐\""));
        assert!(prompt.contains("exactly for 3 people"));
        assert!(prompt.contains("restrictions: \"不吃辣\""));
    }
}
