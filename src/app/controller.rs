use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::state::{messages, Preferences, ViewState};
use crate::catalog;
use crate::model::{
    CookedLog, Ingredient, ProposalData, ProposalOption, Recipe, RecipeSuggestion, SearchMode,
};
use crate::nutrition::{
    daily_report, scale_nutrition, servings_ratio, validate_consumed, DailyReport, DashboardSummary,
    InvalidConsumedAmount,
};
use crate::recipe_generator::{GenerationError, RecipeGenerator, STANDARD_INSTRUCTIONS};
use crate::shopping_list::{aggregate_ingredients, ShoppingList};
use crate::store::{keys, load_json, save_json, KeyValueStore, RecipeCache, SearchHistory};

/// Owns every collection and the current view, and persists each mutation
/// through `S` as it happens.
pub struct AppController<G, S> {
    generator: G,
    store: S,
    view: ViewState,
    preferences: Preferences,
    search_mode: SearchMode,
    last_query: String,
    current_proposal: Option<ProposalData>,
    cart: Vec<Recipe>,
    favorites: Vec<Recipe>,
    fridge: Vec<Ingredient>,
    cooked_log: Vec<CookedLog>,
    history: SearchHistory,
    cache: RecipeCache,
}

impl<G: RecipeGenerator, S: KeyValueStore> AppController<G, S> {
    pub fn load(generator: G, store: S) -> Self {
        Self::load_at(generator, store, Utc::now())
    }

    /// Restores every collection from `store`. Favorites, fridge and cooked
    /// log are seeded with the built-in defaults only when their key is absent.
    pub fn load_at(generator: G, store: S, now: DateTime<Utc>) -> Self {
        let favorites = load_or_seed(&store, keys::FAVORITES, catalog::default_favorites);
        let fridge = load_or_seed(&store, keys::FRIDGE, catalog::default_fridge);
        let cooked_log = load_or_seed(&store, keys::COOKED_LOG, || catalog::default_cooked_log(now));
        let history = load_json(&store, keys::HISTORY).unwrap_or_default();
        let cache = load_json(&store, keys::RECIPE_CACHE).unwrap_or_default();

        Self {
            generator,
            store,
            view: ViewState::Home,
            preferences: Preferences::default(),
            search_mode: SearchMode::Dish,
            last_query: String::new(),
            current_proposal: None,
            cart: Vec::new(),
            favorites,
            fridge,
            cooked_log,
            history,
            cache,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn navigate(&mut self, view: ViewState) {
        self.view = view;
    }

    pub fn go_home(&mut self) {
        self.view = ViewState::Home;
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    pub fn search_mode(&self) -> SearchMode {
        self.search_mode
    }

    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    pub fn current_proposal(&self) -> Option<&ProposalData> {
        self.current_proposal.as_ref()
    }

    pub fn cart(&self) -> &[Recipe] {
        &self.cart
    }

    pub fn favorites(&self) -> &[Recipe] {
        &self.favorites
    }

    pub fn fridge(&self) -> &[Ingredient] {
        &self.fridge
    }

    pub fn cooked_log(&self) -> &[CookedLog] {
        &self.cooked_log
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn cache(&self) -> &RecipeCache {
        &self.cache
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// A recipe this session already knows by title: built-in, cached or favorited.
    pub fn find_known_recipe(&self, title: &str) -> Option<Recipe> {
        let title = title.trim();
        catalog::find_static_recipe(title)
            .or_else(|| self.cache.get(title))
            .or_else(|| self.favorites.iter().find(|r| r.title == title))
            .cloned()
    }

    pub async fn search(&mut self, query: &str, mode: SearchMode, force_refresh: bool) -> &ViewState {
        let query = query.trim();
        if query.is_empty() {
            return &self.view;
        }
        info!(query, ?mode, force_refresh, "Search");
        self.last_query = query.to_string();
        self.search_mode = mode;
        if self.history.record(query, mode) {
            self.persist(keys::HISTORY, &self.history);
        }

        if mode == SearchMode::Ingredient {
            self.view = ViewState::Loading;
            self.view = match self.generator.suggest_dishes(query).await {
                Ok(suggestions) => ViewState::SuggestionSelect {
                    ingredients: query.to_string(),
                    suggestions,
                },
                Err(e) => failure(messages::INGREDIENT_SEARCH_FAILED, &e),
            };
            return &self.view;
        }

        if let Some(recipe) = catalog::find_static_recipe(query) {
            self.view = ViewState::Recipe(recipe.clone());
            return &self.view;
        }
        if !force_refresh {
            if let Some(recipe) = self.cache.get(query) {
                self.view = ViewState::Recipe(recipe.clone());
                return &self.view;
            }
        }

        self.view = ViewState::Loading;
        self.view = match self.request_recipe(query).await {
            Ok(view) => view,
            Err(e) => failure(messages::DISH_SEARCH_FAILED, &e),
        };
        &self.view
    }

    pub async fn select_suggestion(&mut self, suggestion: &RecipeSuggestion) -> &ViewState {
        self.search_mode = SearchMode::Dish;
        let title = suggestion.title.trim();

        if let Some(recipe) = catalog::find_static_recipe(title) {
            self.view = ViewState::Recipe(recipe.clone());
            return &self.view;
        }
        if let Some(recipe) = self.cache.get(title) {
            self.view = ViewState::Recipe(recipe.clone());
            return &self.view;
        }

        self.view = ViewState::Loading;
        self.view = match self.request_recipe(title).await {
            Ok(view) => view,
            Err(e) => failure(messages::SUGGESTION_FAILED, &e),
        };
        &self.view
    }

    /// Generates the chosen proposal variant and caches it under the query
    /// that produced the proposal.
    pub async fn select_proposal(&mut self, option: &ProposalOption) -> &ViewState {
        self.view = ViewState::Loading;
        let result = self
            .generator
            .generate_recipe(
                &option.title,
                self.preferences.servings(),
                &option.modifications,
                self.preferences.restrictions(),
            )
            .await;
        self.view = match result {
            Ok(recipe) => {
                if let Some(query) = self.current_proposal.as_ref().map(|p| p.original_query.clone()) {
                    self.save_to_cache(&query, recipe.clone());
                }
                ViewState::Recipe(recipe)
            }
            Err(e) => failure(messages::PROPOSAL_FAILED, &e),
        };
        &self.view
    }

    async fn request_recipe(&mut self, dish: &str) -> Result<ViewState, GenerationError> {
        if self.preferences.has_restrictions() {
            let proposal = self
                .generator
                .generate_proposals(dish, self.preferences.restrictions())
                .await?;
            self.current_proposal = Some(proposal.clone());
            return Ok(ViewState::Proposal(proposal));
        }
        let recipe = self
            .generator
            .generate_recipe(dish, self.preferences.servings(), STANDARD_INSTRUCTIONS, "")
            .await?;
        self.save_to_cache(dish, recipe.clone());
        Ok(ViewState::Recipe(recipe))
    }

    fn save_to_cache(&mut self, query: &str, recipe: Recipe) {
        if let Some(evicted) = self.cache.insert(query, recipe) {
            info!(%evicted, "Recipe cache full, dropped oldest entry");
        }
        if let Err(e) = save_json(&self.store, keys::RECIPE_CACHE, &self.cache) {
            warn!(error = %e, "Failed to persist recipe cache, discarding stored copy");
            if let Err(e) = self.store.remove(keys::RECIPE_CACHE) {
                warn!(error = %e, "Failed to remove stored recipe cache");
            }
        }
    }

    /// Returns `false` when a recipe with the same title is already in the cart.
    pub fn add_to_cart(&mut self, recipe: Recipe) -> bool {
        if self.cart.iter().any(|r| r.title == recipe.title) {
            return false;
        }
        self.cart.push(recipe);
        true
    }

    pub fn remove_from_cart(&mut self, id: &str) {
        self.cart.retain(|r| r.id != id);
    }

    pub fn shopping_list(&self) -> ShoppingList {
        aggregate_ingredients(&self.cart)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.iter().any(|r| r.id == id)
    }

    /// Returns whether the recipe is a favorite afterwards.
    pub fn toggle_favorite(&mut self, recipe: &Recipe) -> bool {
        let now_favorite = if self.is_favorite(&recipe.id) {
            self.favorites.retain(|r| r.id != recipe.id);
            false
        } else {
            self.favorites.push(recipe.clone());
            true
        };
        self.persist(keys::FAVORITES, &self.favorites);
        now_favorite
    }

    pub fn remove_favorite(&mut self, id: &str) {
        self.favorites.retain(|r| r.id != id);
        self.persist(keys::FAVORITES, &self.favorites);
    }

    /// Adds `name`, or replaces the amount of an existing entry with that name.
    pub fn add_to_fridge(&mut self, name: &str, amount: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let item = Ingredient::new(name, amount.trim());
        match self.fridge.iter_mut().find(|i| i.name == name) {
            Some(existing) => *existing = item,
            None => self.fridge.push(item),
        }
        self.persist(keys::FRIDGE, &self.fridge);
    }

    pub fn remove_from_fridge(&mut self, name: &str) {
        self.fridge.retain(|i| i.name != name);
        self.persist(keys::FRIDGE, &self.fridge);
    }

    pub async fn cook_with_fridge_ingredients(&mut self, names: &[String]) -> &ViewState {
        let query = names.join("，");
        self.search(&query, SearchMode::Ingredient, false).await
    }

    /// Logs `consumed` servings of `recipe`, scaling its per-recipe nutrition
    /// by `consumed / recipe servings`, and returns to the home view.
    ///
    /// Amounts outside 0.5..=10 are rejected and nothing is logged.
    pub fn complete_cooking(
        &mut self,
        recipe: &Recipe,
        consumed: f64,
    ) -> Result<CookedLog, InvalidConsumedAmount> {
        let consumed = validate_consumed(consumed)?;
        let ratio = servings_ratio(&recipe.servings, consumed);
        let log = CookedLog {
            id: Uuid::new_v4().to_string(),
            recipe_title: recipe.title.clone(),
            date: Utc::now().to_rfc3339(),
            nutrition: scale_nutrition(&recipe.nutrition, ratio),
            consumed_servings: consumed,
            image_url: recipe.image_url.clone(),
        };
        info!(title = %log.recipe_title, consumed, "Cooking completed");
        self.log_meal(log.clone());
        self.view = ViewState::Home;
        Ok(log)
    }

    pub fn log_meal(&mut self, log: CookedLog) {
        self.cooked_log.insert(0, log);
        self.persist(keys::COOKED_LOG, &self.cooked_log);
    }

    /// Empties the search history and the recipe cache, in memory and on disk.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.cache.clear();
        for key in [keys::HISTORY, keys::RECIPE_CACHE] {
            if let Err(e) = self.store.remove(key) {
                warn!(key, error = %e, "Failed to remove stored value");
            }
        }
    }

    pub fn today_report(&self, day: NaiveDate) -> DailyReport {
        daily_report(&self.cooked_log, day)
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::new(&self.cooked_log)
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = save_json(&self.store, key, value) {
            warn!(key, error = %e, "Failed to persist");
        }
    }
}

fn load_or_seed<T, F>(store: &dyn KeyValueStore, key: &str, seed: F) -> T
where
    T: DeserializeOwned + Serialize + Default,
    F: FnOnce() -> T,
{
    match store.get(key) {
        // a corrupt value starts empty rather than reseeding
        Ok(Some(_)) => load_json(store, key).unwrap_or_default(),
        Ok(None) => {
            let value = seed();
            if let Err(e) = save_json(store, key, &value) {
                warn!(key, error = %e, "Failed to persist initial data");
            }
            value
        }
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored value, using initial data");
            seed()
        }
    }
}

fn failure(message: &str, err: &GenerationError) -> ViewState {
    error!(error = %err, "Generator request failed");
    ViewState::Error(message.to_string())
}
