use chrono::{DateTime, Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::model::{CookedLog, Micronutrients, NutritionInfo};
use super::scaler::{validate_consumed, InvalidConsumedAmount};
use crate::quantity::{leading_number, round1};

pub const LOW_CALORIE_THRESHOLD: f64 = 1200.0;
pub const HIGH_CALORIE_THRESHOLD: f64 = 2500.0;
pub const LOW_PROTEIN_THRESHOLD_G: f64 = 50.0;
pub const HIGH_SODIUM_THRESHOLD_MG: f64 = 2300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    LowCalories,
    HighCalories,
    CaloriesOnTrack,
    LowProtein,
    HighSodium,
}

impl Advice {
    pub fn message(&self) -> &'static str {
        match self {
            Advice::LowCalories => "⚡️ 今日热量摄入偏低，建议晚餐吃得丰富一些。",
            Advice::HighCalories => "⚠️ 今日热量摄入稍高，可以适当运动哦。",
            Advice::CaloriesOnTrack => "🌟 今日热量摄入达标，保持得很好！",
            Advice::LowProtein => "🥩 蛋白质摄入不足，建议补充鸡蛋、牛奶或瘦肉。",
            Advice::HighSodium => "🧂 钠摄入量较高，注意清淡饮食，多喝水。",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub sodium: f64,
    pub sugar: f64,
    pub fiber: f64,
    pub calcium: f64,
    pub iron: f64,
    pub vitamin_c: f64,
}

impl DailyTotals {
    pub fn add(&mut self, nutrition: &NutritionInfo) {
        self.calories += leading_number(&nutrition.calories);
        self.protein += leading_number(&nutrition.protein);
        self.carbs += leading_number(&nutrition.carbs);
        self.fat += leading_number(&nutrition.fat);

        if let Some(m) = &nutrition.micronutrients {
            let num = |v: &Option<String>| v.as_deref().map(leading_number).unwrap_or(0.0);
            self.sodium += num(&m.sodium);
            self.sugar += num(&m.sugar);
            self.fiber += num(&m.fiber);
            self.calcium += num(&m.calcium);
            self.iron += num(&m.iron);
            self.vitamin_c += num(&m.vitamin_c);
        }
    }

    pub fn advice(&self) -> Vec<Advice> {
        let mut advice = Vec::new();
        if self.calories < LOW_CALORIE_THRESHOLD {
            advice.push(Advice::LowCalories);
        } else if self.calories > HIGH_CALORIE_THRESHOLD {
            advice.push(Advice::HighCalories);
        } else {
            advice.push(Advice::CaloriesOnTrack);
        }
        if self.protein < LOW_PROTEIN_THRESHOLD_G {
            advice.push(Advice::LowProtein);
        }
        if self.sodium > HIGH_SODIUM_THRESHOLD_MG {
            advice.push(Advice::HighSodium);
        }
        advice
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyReport {
    pub count: usize,
    pub totals: DailyTotals,
    pub advice: Vec<Advice>,
}

/// Local calendar day of a log timestamp; `None` when the timestamp is malformed.
pub fn log_day(log: &CookedLog) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(&log.date)
        .ok()
        .map(|dt| dt.with_timezone(&Local).date_naive())
}

/// Sums the logs eaten on `day` and derives the advisory messages.
pub fn daily_report(logs: &[CookedLog], day: NaiveDate) -> DailyReport {
    let mut totals = DailyTotals::default();
    let mut count = 0;
    for log in logs.iter().filter(|log| log_day(log) == Some(day)) {
        totals.add(&log.nutrition);
        count += 1;
    }
    let advice = totals.advice();
    DailyReport { count, totals, advice }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// Newest first.
    pub logs: Vec<CookedLog>,
    pub total_dishes: usize,
    pub total_calories: f64,
}

impl DashboardSummary {
    pub fn new(logs: &[CookedLog]) -> Self {
        let mut sorted = logs.to_vec();
        sorted.sort_by_key(|log| {
            std::cmp::Reverse(DateTime::parse_from_rfc3339(&log.date).ok().map(|dt| dt.timestamp_millis()))
        });
        let total_calories = sorted
            .iter()
            .map(|log| leading_number(&log.nutrition.calories).trunc())
            .sum();
        Self {
            total_dishes: sorted.len(),
            total_calories,
            logs: sorted,
        }
    }
}

/// A staple food that can be logged by hand, with per-unit macros.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StapleFood {
    pub name: &'static str,
    pub unit: &'static str,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

pub const STAPLE_FOODS: [StapleFood; 6] = [
    StapleFood { name: "米饭", unit: "碗 (约150g)", calories: 174.0, protein: 3.5, carbs: 40.0, fat: 0.5 },
    StapleFood { name: "馒头", unit: "个 (约100g)", calories: 220.0, protein: 7.0, carbs: 47.0, fat: 1.0 },
    StapleFood { name: "面条", unit: "碗 (约200g)", calories: 220.0, protein: 8.0, carbs: 48.0, fat: 1.0 },
    StapleFood { name: "粥", unit: "碗 (约250g)", calories: 120.0, protein: 2.0, carbs: 25.0, fat: 0.5 },
    StapleFood { name: "水煮蛋", unit: "个", calories: 70.0, protein: 6.0, carbs: 0.5, fat: 5.0 },
    StapleFood { name: "全麦面包", unit: "片", calories: 80.0, protein: 3.0, carbs: 14.0, fat: 1.0 },
];

impl StapleFood {
    pub fn find(name: &str) -> Option<&'static StapleFood> {
        STAPLE_FOODS.iter().find(|s| s.name == name.trim())
    }

    pub fn nutrition(&self, amount: f64) -> NutritionInfo {
        NutritionInfo {
            calories: format!("{} kcal", (self.calories * amount).round()),
            protein: format!("{:.1}g", round1(self.protein * amount)),
            carbs: format!("{:.1}g", round1(self.carbs * amount)),
            fat: format!("{:.1}g", round1(self.fat * amount)),
            micronutrients: Some(Micronutrients {
                sodium: Some("0mg".into()),
                sugar: Some("0g".into()),
                fiber: Some("0g".into()),
                calcium: Some("0mg".into()),
                iron: Some("0mg".into()),
                vitamin_c: Some("0mg".into()),
            }),
        }
    }

    /// A manual cooked-log entry for `amount` units eaten at `now`.
    pub fn log_entry(&self, amount: f64, now: DateTime<Utc>) -> Result<CookedLog, InvalidConsumedAmount> {
        let amount = validate_consumed(amount)?;
        Ok(CookedLog {
            id: Uuid::new_v4().to_string(),
            recipe_title: self.name.to_string(),
            date: now.to_rfc3339(),
            nutrition: self.nutrition(amount),
            consumed_servings: amount,
            image_url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn log_at(date: DateTime<Local>, calories: &str, protein: &str, sodium: Option<&str>) -> CookedLog {
        CookedLog {
            id: Uuid::new_v4().to_string(),
            recipe_title: "测试".into(),
            date: date.to_rfc3339(),
            nutrition: NutritionInfo {
                calories: calories.into(),
                protein: protein.into(),
                carbs: "10g".into(),
                fat: "5g".into(),
                micronutrients: sodium.map(|s| Micronutrients { sodium: Some(s.into()), ..Default::default() }),
            },
            consumed_servings: 1.0,
            image_url: None,
        }
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_low_calorie_day() {
        let logs = vec![log_at(noon(), "900 kcal", "60g", None)];
        let report = daily_report(&logs, noon().date_naive());
        assert_eq!(report.count, 1);
        assert_eq!(report.advice, vec![Advice::LowCalories]);
        assert!(report.advice[0].message().contains("今日热量摄入偏低"));
    }

    #[test]
    fn test_high_calorie_day_with_low_protein_and_high_sodium() {
        let logs = vec![
            log_at(noon(), "1400 kcal", "20g", Some("1500mg")),
            log_at(noon() - Duration::hours(2), "1400 kcal", "20g", Some("1000mg")),
        ];
        let report = daily_report(&logs, noon().date_naive());
        assert_eq!(report.totals.calories, 2800.0);
        assert_eq!(report.totals.sodium, 2500.0);
        assert_eq!(
            report.advice,
            vec![Advice::HighCalories, Advice::LowProtein, Advice::HighSodium]
        );
    }

    #[test]
    fn test_on_track_day_ignores_other_days() {
        let logs = vec![
            log_at(noon(), "1800 kcal", "80g", None),
            log_at(noon() - Duration::days(1), "5000 kcal", "0g", Some("9000mg")),
        ];
        let report = daily_report(&logs, noon().date_naive());
        assert_eq!(report.count, 1);
        assert_eq!(report.advice, vec![Advice::CaloriesOnTrack]);
    }

    #[test]
    fn test_empty_day_is_low_everything() {
        let report = daily_report(&[], noon().date_naive());
        assert_eq!(report.count, 0);
        assert_eq!(report.advice, vec![Advice::LowCalories, Advice::LowProtein]);
    }

    #[test]
    fn test_dashboard_sorts_newest_first() {
        let older = log_at(noon() - Duration::hours(3), "350 kcal", "7g", None);
        let newer = log_at(noon(), "480.7 kcal", "21g", None);
        let summary = DashboardSummary::new(&[older.clone(), newer.clone()]);
        assert_eq!(summary.logs, vec![newer, older]);
        assert_eq!(summary.total_dishes, 2);
        assert_eq!(summary.total_calories, 830.0);
    }

    #[test]
    fn test_staple_log_entry() {
        let rice = StapleFood::find("米饭").unwrap();
        let log = rice.log_entry(1.5, Utc::now()).unwrap();
        assert_eq!(log.recipe_title, "米饭");
        assert_eq!(log.consumed_servings, 1.5);
        assert_eq!(log.nutrition.calories, "261 kcal");
        assert_eq!(log.nutrition.protein, "5.3g");
        assert_eq!(log.nutrition.carbs, "60.0g");
        assert_eq!(log.nutrition.fat, "0.8g");
        assert_eq!(log.nutrition.micronutrients.unwrap().sodium.as_deref(), Some("0mg"));
    }

    #[test]
    fn test_staple_log_entry_rejects_out_of_range_amounts() {
        let rice = StapleFood::find("米饭").unwrap();
        for amount in [0.0, -1.0, 0.4, 10.5, f64::NAN] {
            assert!(rice.log_entry(amount, Utc::now()).is_err(), "accepted {amount}");
        }
        assert_eq!(rice.log_entry(10.0, Utc::now()).unwrap().nutrition.calories, "1740 kcal");
    }
}
