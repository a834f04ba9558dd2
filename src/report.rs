//! Plain-text rendering for the command line.

use std::fmt;
use std::io;

use crate::model::{Ingredient, Micronutrients, ProposalData, Recipe, RecipeSuggestion};
use crate::nutrition::{DailyReport, DashboardSummary};
use crate::shopping_list::{find_in_fridge, Checklist, ShoppingList};
use crate::store::SearchHistory;
use crate::timer::StepTimer;

struct Render<F>(F);

impl<F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result> fmt::Display for Render<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.0)(f)
    }
}

fn render(write: impl Fn(&mut fmt::Formatter<'_>) -> fmt::Result) -> String {
    Render(write).to_string()
}

pub fn render_recipe(recipe: &Recipe) -> String {
    render(|f| {
        writeln!(f, "{}  [{:?}]", recipe.title, recipe.difficulty)?;
        if !recipe.description.is_empty() {
            writeln!(f, "{}", recipe.description)?;
        }
        writeln!(
            f,
            "{} | 准备 {} | 烹饪 {} | {}",
            recipe.cuisine_type, recipe.prep_time, recipe.cook_time, recipe.servings
        )?;

        writeln!(f, "\n食材:")?;
        for ingredient in &recipe.ingredients {
            let flag = if ingredient.conflict == Some(true) { " ⚠️" } else { "" };
            let notes = ingredient
                .notes
                .as_deref()
                .map(|n| format!(" ({n})"))
                .unwrap_or_default();
            writeln!(f, "  - {} {}{}{}", ingredient.name, ingredient.amount, notes, flag)?;
        }

        writeln!(f, "\n步骤:")?;
        for (i, step) in recipe.steps.iter().enumerate() {
            let timer = StepTimer::for_step(step)
                .map(|t| format!(" ⏱ {}", t.display()))
                .unwrap_or_default();
            writeln!(f, "  {}. [{}] {}{}", i + 1, step.title, step.instruction, timer)?;
            if let Some(tip) = &step.tip {
                writeln!(f, "     💡 {tip}")?;
            }
        }

        if !recipe.tips.is_empty() {
            writeln!(f, "\n小贴士:")?;
            for tip in &recipe.tips {
                writeln!(f, "  - {tip}")?;
            }
        }

        let n = &recipe.nutrition;
        writeln!(
            f,
            "\n营养: 热量 {} | 蛋白质 {} | 碳水 {} | 脂肪 {}",
            n.calories, n.protein, n.carbs, n.fat
        )?;
        if let Some(micros) = &n.micronutrients {
            let line: Vec<String> = micros
                .entries()
                .into_iter()
                .map(|(key, value)| format!("{} {}", Micronutrients::label(key), value))
                .collect();
            if !line.is_empty() {
                writeln!(f, "      {}", line.join(" | "))?;
            }
        }
        Ok(())
    })
}

pub fn render_suggestions(ingredients: &str, suggestions: &[RecipeSuggestion]) -> String {
    render(|f| {
        writeln!(f, "用 {ingredients} 可以做:")?;
        for (i, s) in suggestions.iter().enumerate() {
            writeln!(f, "  {}. {} - {}", i + 1, s.title, s.description)?;
            if !s.match_reason.is_empty() {
                writeln!(f, "     {}", s.match_reason)?;
            }
            if !s.missing_ingredients.is_empty() {
                writeln!(f, "     还需: {}", s.missing_ingredients.join("、"))?;
            }
        }
        Ok(())
    })
}

pub fn render_proposal(proposal: &ProposalData) -> String {
    render(|f| {
        writeln!(f, "「{}」与您的饮食限制冲突，可选:", proposal.original_query)?;
        for (label, option) in [("safe", &proposal.safe_option), ("original", &proposal.original_option)] {
            writeln!(f, "  [{label}] {} - {}", option.title, option.description)?;
            for warning in &option.warnings {
                writeln!(f, "      ⚠️ {warning}")?;
            }
        }
        Ok(())
    })
}

/// Items already in the fridge are marked instead of listed as missing.
pub fn render_shopping_list(list: &ShoppingList, fridge: &[Ingredient], checklist: &Checklist) -> String {
    if list.is_empty() {
        return "购物清单为空\n".to_string();
    }
    render(|f| {
        for (category, items) in list.non_empty_buckets() {
            writeln!(f, "{}:", category.label())?;
            for item in items {
                let mark = if checklist.is_purchased(&item.name) { "[x]" } else { "[ ]" };
                let stock = find_in_fridge(fridge, &item.name)
                    .map(|i| format!("  (冰箱有 {})", i.amount))
                    .unwrap_or_default();
                writeln!(f, "  {mark} {} {}{}", item.name, item.amount, stock)?;
            }
        }
        Ok(())
    })
}

pub fn render_fridge(fridge: &[Ingredient]) -> String {
    if fridge.is_empty() {
        return "冰箱空空如也\n".to_string();
    }
    fridge
        .iter()
        .map(|i| format!("  - {} {}\n", i.name, i.amount))
        .collect()
}

pub fn render_daily_report(report: &DailyReport) -> String {
    render(|f| {
        let t = &report.totals;
        writeln!(
            f,
            "今日 {} 餐: 热量 {} kcal | 蛋白质 {:.1}g | 碳水 {:.1}g | 脂肪 {:.1}g | 钠 {}mg",
            report.count,
            t.calories.round(),
            t.protein,
            t.carbs,
            t.fat,
            t.sodium.round()
        )?;
        for advice in &report.advice {
            writeln!(f, "  {}", advice.message())?;
        }
        Ok(())
    })
}

pub fn render_dashboard(summary: &DashboardSummary) -> String {
    render(|f| {
        writeln!(f, "累计 {} 道菜，共 {} kcal", summary.total_dishes, summary.total_calories)?;
        for log in &summary.logs {
            writeln!(
                f,
                "  {}  {} x{}  {}",
                log.date, log.recipe_title, log.consumed_servings, log.nutrition.calories
            )?;
        }
        Ok(())
    })
}

pub fn render_history(history: &SearchHistory) -> String {
    if history.is_empty() {
        return "暂无搜索记录\n".to_string();
    }
    history
        .items()
        .iter()
        .map(|item| format!("  {} ({:?})\n", item.query, item.mode))
        .collect()
}

/// Redraws the countdown in place on `out`.
pub fn write_timer_tick(out: &mut impl io::Write, timer: &StepTimer) -> io::Result<()> {
    write!(out, "\r{}", timer.display())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::find_static_recipe;
    use crate::model::{Category, SearchMode, Step};
    use crate::shopping_list::aggregate_ingredients;

    struct BrokenPipe;

    impl io::Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn test_render_recipe_shows_timers_and_conflicts() {
        let mut recipe = find_static_recipe("西红柿炒鸡蛋").unwrap().clone();
        recipe.ingredients[0].conflict = Some(true);
        recipe.steps = vec![Step {
            title: "炒蛋".into(),
            instruction: "大火炒".into(),
            duration: Some("2分钟".into()),
            tip: None,
        }];
        let text = render_recipe(&recipe);
        assert!(text.starts_with("西红柿炒鸡蛋"));
        assert!(text.contains("⏱ 02:00"));
        assert!(text.contains(" ⚠️"));
        assert!(text.contains("热量 320 kcal"));
    }

    #[test]
    fn test_render_shopping_list_marks_fridge_stock() {
        let recipe = find_static_recipe("西红柿炒鸡蛋").unwrap().clone();
        let list = aggregate_ingredients(&[recipe]);
        let fridge = vec![Ingredient::new("鸡蛋", "6个").with_category(Category::Meat)];
        let mut checklist = Checklist::default();
        checklist.toggle("鸡蛋");
        let text = render_shopping_list(&list, &fridge, &checklist);
        assert!(text.contains("[x] 鸡蛋"));
        assert!(text.contains("(冰箱有 6个)"));
    }

    #[test]
    fn test_render_suggestions_and_history() {
        let suggestions = vec![RecipeSuggestion {
            title: "番茄蛋汤".into(),
            description: "清淡".into(),
            missing_ingredients: vec!["葱".into(), "香油".into()],
            ..Default::default()
        }];
        let text = render_suggestions("鸡蛋，西红柿", &suggestions);
        assert_eq!(text, "用 鸡蛋，西红柿 可以做:\n  1. 番茄蛋汤 - 清淡\n     还需: 葱、香油\n");

        let mut history = SearchHistory::new();
        assert_eq!(render_history(&history), "暂无搜索记录\n");
        history.record("鸡蛋", SearchMode::Ingredient);
        assert_eq!(render_history(&history), "  鸡蛋 (Ingredient)\n");
    }

    #[test]
    fn test_timer_tick_redraws_line() {
        let mut out = Vec::new();
        write_timer_tick(&mut out, &StepTimer::new(90)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\r01:30");
    }

    #[test]
    fn test_timer_tick_reports_write_failures() {
        let err = write_timer_tick(&mut BrokenPipe, &StepTimer::new(5)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
