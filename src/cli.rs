use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::nutrition::validate_consumed;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recipe generation and meal tracking assistant", long_about = None)]
pub struct Cli {
    /// Directory holding favorites, fridge, cooked log, history and cache
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up a dish, or get dish ideas from ingredients
    Search {
        query: String,
        /// Treat the query as a list of ingredients
        #[arg(long)]
        ingredients: bool,
        /// Ignore the cached recipe for this dish
        #[arg(long)]
        refresh: bool,
        #[arg(long)]
        servings: Option<u32>,
        /// Free-text dietary restrictions
        #[arg(long)]
        restrictions: Option<String>,
        /// Toggle a restriction tag such as 不吃辣 (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Which proposal to cook when restrictions apply
        #[arg(long, value_enum, default_value_t = ProposalPick::Safe)]
        pick: ProposalPick,
        /// Open suggestion N (1-based) after an ingredient search
        #[arg(long)]
        select: Option<usize>,
    },
    /// List favorites, or toggle one by title
    Favorites {
        #[arg(long)]
        toggle: Option<String>,
        #[arg(long)]
        remove: Option<String>,
    },
    /// Manage fridge stock
    Fridge {
        #[command(subcommand)]
        action: FridgeAction,
    },
    /// Combined shopping list for known recipes
    Cart {
        titles: Vec<String>,
        /// Mark an item as already bought (repeatable)
        #[arg(long = "bought")]
        bought: Vec<String>,
    },
    /// Record that a known recipe was eaten
    Cook {
        title: String,
        /// Servings actually eaten (0.5 to 10); defaults to the recipe's serving count
        #[arg(long, value_parser = parse_consumed)]
        servings: Option<f64>,
    },
    /// Log a staple food such as 米饭
    LogStaple {
        name: String,
        /// Units eaten (0.5 to 10)
        #[arg(long, default_value_t = 1.0, value_parser = parse_consumed)]
        amount: f64,
    },
    /// Today's nutrition report and cooking history
    Dashboard,
    /// Recent searches
    History {
        /// Also clears the recipe cache
        #[arg(long)]
        clear: bool,
    },
    /// Count down a step duration such as "5分钟"
    Timer { duration: String },
    /// Generate a dish photo and write it to a file
    Image {
        prompt: String,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum FridgeAction {
    List,
    Add {
        name: String,
        quantity: String,
        /// One of 个 g kg ml L 根 包 勺 适量
        #[arg(long, default_value = "个")]
        unit: String,
    },
    Remove {
        name: String,
    },
    /// Ask for dishes using the named items, or everything when none are given
    Cook {
        names: Vec<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalPick {
    Safe,
    Original,
}

fn parse_consumed(value: &str) -> Result<f64, String> {
    let amount: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("'{value}' is not a number: {e}"))?;
    validate_consumed(amount).map_err(|e| e.to_string())
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
