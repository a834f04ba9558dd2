use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Clone, Debug, Serialize)]
pub enum Provider {
    Gemini {
        /// Name of the environment variable holding the key, not the key itself.
        api_key_env_var: String,
        base_url: String,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

/// Schema types as the Gemini API spells them.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
    Boolean,
}

/// Response schema handed to the model alongside the prompt.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JsonSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub properties: BTreeMap<String, JsonSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,
}

impl JsonSchema {
    fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            enum_values: None,
            properties: BTreeMap::new(),
            required: Vec::new(),
            items: None,
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaType::Boolean)
    }

    pub fn string_enum(values: &[&str]) -> Self {
        Self {
            enum_values: Some(values.iter().map(|v| v.to_string()).collect()),
            ..Self::string()
        }
    }

    pub fn array(items: JsonSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    /// An object whose properties are all optional until [`JsonSchema::require`].
    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, JsonSchema)>,
        K: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Self::of(SchemaType::Object)
        }
    }

    pub fn require(mut self, fields: &[&str]) -> Self {
        self.required = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<JsonSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl GenerationConfig {
    pub fn json(schema: JsonSchema) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            temperature: None,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
    #[serde(default)]
    pub total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &Part> {
        self.candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| c.parts.iter())
    }

    /// Concatenated text of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }

    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.parts().find_map(|p| p.inline_data.as_ref())
    }
}
