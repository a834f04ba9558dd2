pub mod controller;
pub mod state;

pub use controller::AppController;
pub use state::{messages, Preferences, ViewState, COMMON_RESTRICTIONS, MAX_SERVINGS, MIN_SERVINGS};
