pub mod api_connection;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod logging;
pub mod model;
pub mod nutrition;
pub mod quantity;
pub mod recipe_generator;
pub mod report;
pub mod shopping_list;
pub mod store;
pub mod timer;
