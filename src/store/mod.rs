pub mod history;
pub mod kv;
pub mod recipe_cache;

pub use history::{SearchHistory, MAX_HISTORY_ITEMS};
pub use kv::{keys, load_json, save_json, JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use recipe_cache::{RecipeCache, MAX_CACHE_SIZE};
