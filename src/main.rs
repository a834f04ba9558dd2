use anyhow::{anyhow, bail, Context, Result};
use chef_genius::api_connection::Provider;
use chef_genius::app::{AppController, ViewState};
use chef_genius::cli::{parse_args, Command, FridgeAction, ProposalPick};
use chef_genius::config::AppConfig;
use chef_genius::logging::LoggingConfig;
use chef_genius::model::{FridgeUnit, SearchMode};
use chef_genius::nutrition::{default_consumed_servings, StapleFood};
use chef_genius::recipe_generator::{decode_data_url, GeminiRecipeGenerator, RecipeGenerator};
use chef_genius::report;
use chef_genius::shopping_list::Checklist;
use chef_genius::store::JsonFileStore;
use chef_genius::timer::{parse_duration_to_seconds, run_countdown, StepTimer};
use chrono::{Local, Utc};
use tokio::fs;
use tracing::debug;

type Controller = AppController<GeminiRecipeGenerator, JsonFileStore>;

/// Prints the view a command ended on. Errors become a failing exit.
fn print_view(view: &ViewState) -> Result<()> {
    match view {
        ViewState::Recipe(recipe) => print!("{}", report::render_recipe(recipe)),
        ViewState::SuggestionSelect { ingredients, suggestions } => {
            print!("{}", report::render_suggestions(ingredients, suggestions))
        }
        ViewState::Proposal(proposal) => print!("{}", report::render_proposal(proposal)),
        ViewState::Error(message) => bail!("{message}"),
        _ => {}
    }
    Ok(())
}

async fn search(
    app: &mut Controller,
    query: &str,
    mode: SearchMode,
    refresh: bool,
    pick: ProposalPick,
    select: Option<usize>,
) -> Result<()> {
    let mut view = app.search(query, mode, refresh).await.clone();
    print_view(&view)?;

    if let ViewState::SuggestionSelect { suggestions, .. } = &view {
        let Some(n) = select else {
            return Ok(());
        };
        let suggestion = n
            .checked_sub(1)
            .and_then(|i| suggestions.get(i))
            .cloned()
            .ok_or_else(|| anyhow!("No suggestion number {n}"))?;
        println!();
        view = app.select_suggestion(&suggestion).await.clone();
        print_view(&view)?;
    }

    if let ViewState::Proposal(proposal) = &view {
        let option = match pick {
            ProposalPick::Safe => &proposal.safe_option,
            ProposalPick::Original => &proposal.original_option,
        };
        println!("\n→ {}\n", option.title);
        let final_view = app.select_proposal(option).await.clone();
        print_view(&final_view)?;
    }
    Ok(())
}

async fn run_timer(duration: &str) -> Result<()> {
    let seconds = parse_duration_to_seconds(duration);
    if seconds == 0 {
        bail!("Could not read a duration from '{duration}'");
    }
    let mut timer = StepTimer::new(seconds);
    run_countdown(&mut timer, |t| {
        if let Err(e) = report::write_timer_tick(&mut std::io::stdout(), t) {
            debug!(error = %e, "Failed to write timer output");
        }
    })
    .await;
    println!("\n⏰ 时间到！");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = parse_args();

    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("chef_genius=debug");
    }
    logging.init()?;

    let config = AppConfig::from_env().with_data_dir(cli.data_dir.clone());
    let generator = GeminiRecipeGenerator::new(
        Provider::gemini(&config.api_key_env_var),
        config.text_model.clone(),
        config.image_model.clone(),
    );
    let store = JsonFileStore::new(&config.data_dir);
    let mut app = AppController::load(generator, store);

    match cli.command {
        Command::Search {
            query,
            ingredients,
            refresh,
            servings,
            restrictions,
            tags,
            pick,
            select,
        } => {
            let prefs = app.preferences_mut();
            if let Some(servings) = servings {
                prefs.set_servings(servings);
            }
            if let Some(restrictions) = restrictions {
                prefs.set_restrictions(restrictions);
            }
            for tag in &tags {
                prefs.toggle_restriction(tag);
            }
            let mode = if ingredients { SearchMode::Ingredient } else { SearchMode::Dish };
            search(&mut app, &query, mode, refresh, pick, select).await?;
        }
        Command::Favorites { toggle, remove } => {
            if let Some(title) = toggle {
                let recipe = app
                    .find_known_recipe(&title)
                    .ok_or_else(|| anyhow!("Unknown recipe '{title}', search for it first"))?;
                let added = app.toggle_favorite(&recipe);
                println!("{} {}", if added { "★ 已收藏" } else { "☆ 已取消收藏" }, recipe.title);
            }
            if let Some(title) = remove {
                let ids: Vec<String> = app
                    .favorites()
                    .iter()
                    .filter(|r| r.title == title)
                    .map(|r| r.id.clone())
                    .collect();
                for id in ids {
                    app.remove_favorite(&id);
                }
            }
            for recipe in app.favorites() {
                println!("  ★ {} ({})", recipe.title, recipe.cuisine_type);
            }
        }
        Command::Fridge { action } => match action {
            FridgeAction::List => print!("{}", report::render_fridge(app.fridge())),
            FridgeAction::Add { name, quantity, unit } => {
                let unit = FridgeUnit::from_symbol(&unit)
                    .ok_or_else(|| anyhow!("Unknown unit '{unit}'"))?;
                app.add_to_fridge(&name, &unit.amount(&quantity));
                print!("{}", report::render_fridge(app.fridge()));
            }
            FridgeAction::Remove { name } => {
                app.remove_from_fridge(&name);
                print!("{}", report::render_fridge(app.fridge()));
            }
            FridgeAction::Cook { names } => {
                let names = if names.is_empty() {
                    app.fridge().iter().map(|i| i.name.clone()).collect()
                } else {
                    names
                };
                if names.is_empty() {
                    bail!("The fridge is empty");
                }
                let view = app.cook_with_fridge_ingredients(&names).await.clone();
                print_view(&view)?;
            }
        },
        Command::Cart { titles, bought } => {
            for title in &titles {
                let recipe = app
                    .find_known_recipe(title)
                    .ok_or_else(|| anyhow!("Unknown recipe '{title}', search for it first"))?;
                app.add_to_cart(recipe);
            }
            let mut checklist = Checklist::default();
            for name in &bought {
                checklist.toggle(name);
            }
            print!(
                "{}",
                report::render_shopping_list(&app.shopping_list(), app.fridge(), &checklist)
            );
        }
        Command::Cook { title, servings } => {
            let recipe = app
                .find_known_recipe(&title)
                .ok_or_else(|| anyhow!("Unknown recipe '{title}', search for it first"))?;
            let servings = servings.unwrap_or_else(|| default_consumed_servings(&recipe.servings));
            let log = app.complete_cooking(&recipe, servings)?;
            println!(
                "🎉 太棒了！您完成了 \"{}\" (摄入约 {} 人份)，已记录到您的烹饪看板。",
                log.recipe_title, log.consumed_servings
            );
            println!("  热量 {} | 蛋白质 {}", log.nutrition.calories, log.nutrition.protein);
        }
        Command::LogStaple { name, amount } => {
            let staple = StapleFood::find(&name).ok_or_else(|| {
                let known: Vec<&str> = chef_genius::nutrition::STAPLE_FOODS.iter().map(|s| s.name).collect();
                anyhow!("Unknown staple '{name}', expected one of {}", known.join("、"))
            })?;
            let log = staple.log_entry(amount, Utc::now())?;
            println!("🎉 已记录 \"{}\" 到您的看板。({})", log.recipe_title, log.nutrition.calories);
            app.log_meal(log);
        }
        Command::Dashboard => {
            print!("{}", report::render_daily_report(&app.today_report(Local::now().date_naive())));
            println!();
            print!("{}", report::render_dashboard(&app.dashboard()));
        }
        Command::History { clear } => {
            if clear {
                app.clear_history();
                println!("已清除搜索记录和食谱缓存");
            } else {
                print!("{}", report::render_history(app.history()));
            }
        }
        Command::Timer { duration } => run_timer(&duration).await?,
        Command::Image { prompt, out } => {
            let url = app
                .generator()
                .generate_dish_image(&prompt)
                .await
                .ok_or_else(|| anyhow!("Image generation returned nothing"))?;
            let (mime, bytes) = decode_data_url(&url)?;
            fs::write(&out, &bytes)
                .await
                .with_context(|| format!("Failed to write image to '{}'", out.display()))?;
            println!("Saved {} ({}, {} bytes)", out.display(), mime, bytes.len());
        }
    }

    Ok(())
}
