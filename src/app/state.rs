use crate::model::{ProposalData, Recipe, RecipeSuggestion};

pub const MIN_SERVINGS: u32 = 1;
pub const MAX_SERVINGS: u32 = 20;
pub const DEFAULT_SERVINGS: u32 = 2;

/// Quick-toggle dietary restriction tags.
pub const COMMON_RESTRICTIONS: [&str; 5] = ["不吃辣", "不吃香菜", "不吃葱姜蒜", "少油", "素食"];

/// Fixed messages shown when a generator call fails.
pub mod messages {
    pub const INGREDIENT_SEARCH_FAILED: &str = "抱歉，我无法根据这些食材想出食谱。请尝试更具体的食材名！";
    pub const DISH_SEARCH_FAILED: &str = "抱歉，我无法生成这个食谱。请尝试换一个菜名！";
    pub const SUGGESTION_FAILED: &str = "生成详细食谱失败，请重试。";
    pub const PROPOSAL_FAILED: &str = "生成最终食谱时出错，请重试。";
}

/// What the assistant is currently showing. Exactly one at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Home,
    Loading,
    Proposal(ProposalData),
    Recipe(Recipe),
    Cart,
    Favorites,
    Fridge,
    SuggestionSelect {
        ingredients: String,
        suggestions: Vec<RecipeSuggestion>,
    },
    Dashboard,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    servings: u32,
    restrictions: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            servings: DEFAULT_SERVINGS,
            restrictions: String::new(),
        }
    }
}

impl Preferences {
    pub fn servings(&self) -> u32 {
        self.servings
    }

    /// Clamped to `MIN_SERVINGS..=MAX_SERVINGS`.
    pub fn set_servings(&mut self, servings: u32) {
        self.servings = servings.clamp(MIN_SERVINGS, MAX_SERVINGS);
    }

    pub fn restrictions(&self) -> &str {
        &self.restrictions
    }

    pub fn set_restrictions(&mut self, restrictions: impl Into<String>) {
        self.restrictions = restrictions.into();
    }

    pub fn has_restrictions(&self) -> bool {
        !self.restrictions.trim().is_empty()
    }

    /// Adds `tag` to the comma-separated restriction list, or removes it if
    /// already present. The list is rewritten as `a, b, c`.
    pub fn toggle_restriction(&mut self, tag: &str) {
        let tag = tag.trim();
        if tag.is_empty() {
            return;
        }
        let mut tokens: Vec<&str> = self
            .restrictions
            .split([',', '，'])
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect();
        match tokens.iter().position(|t| *t == tag) {
            Some(i) => {
                tokens.remove(i);
            }
            None => tokens.push(tag),
        }
        self.restrictions = tokens.join(", ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_servings_are_clamped() {
        let mut prefs = Preferences::default();
        assert_eq!(prefs.servings(), 2);
        prefs.set_servings(0);
        assert_eq!(prefs.servings(), 1);
        prefs.set_servings(99);
        assert_eq!(prefs.servings(), 20);
    }

    #[test]
    fn test_toggle_restriction() {
        let mut prefs = Preferences::default();
        prefs.toggle_restriction("不吃辣");
        assert_eq!(prefs.restrictions(), "不吃辣");
        prefs.toggle_restriction("少油");
        prefs.toggle_restriction("素食");
        assert_eq!(prefs.restrictions(), "不吃辣, 少油, 素食");
        prefs.toggle_restriction("少油");
        assert_eq!(prefs.restrictions(), "不吃辣, 素食");
        prefs.toggle_restriction("不吃辣");
        prefs.toggle_restriction("素食");
        assert_eq!(prefs.restrictions(), "");
        assert!(!prefs.has_restrictions());
    }

    #[test]
    fn test_toggle_keeps_free_text_tokens() {
        let mut prefs = Preferences::default();
        prefs.set_restrictions("海鲜过敏，不吃辣");
        prefs.toggle_restriction("不吃辣");
        assert_eq!(prefs.restrictions(), "海鲜过敏");
        assert!(COMMON_RESTRICTIONS.contains(&"不吃香菜"));
    }
}
