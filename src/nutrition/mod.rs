pub mod advisor;
pub mod scaler;

pub use advisor::{daily_report, Advice, DailyReport, DailyTotals, DashboardSummary, StapleFood, STAPLE_FOODS};
pub use scaler::{
    default_consumed_servings, scale_nutrition, scale_value, servings_ratio, validate_consumed,
    InvalidConsumedAmount, MAX_CONSUMED_SERVINGS, MIN_CONSUMED_SERVINGS,
};
