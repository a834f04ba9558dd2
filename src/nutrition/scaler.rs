use thiserror::Error;

use crate::model::NutritionInfo;
use crate::quantity::{format_number, parse_value, round1};

pub const MIN_CONSUMED_SERVINGS: f64 = 0.5;
pub const MAX_CONSUMED_SERVINGS: f64 = 10.0;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("Consumed amount must be between 0.5 and 10, got {0}")]
pub struct InvalidConsumedAmount(pub f64);

/// Scales one nutrition string such as `"320 kcal"` by `ratio`.
///
/// The number is rounded to one decimal and the original unit text is kept.
/// Strings without a usable number never fail: they come back unchanged, and
/// missing values become `"0"`.
pub fn scale_value(value: Option<&str>, ratio: f64) -> String {
    let parts = parse_value(value);
    if parts.value == 0.0 {
        return value
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| "0".to_string());
    }
    let scaled = format_number(round1(parts.value * ratio));
    if parts.unit.is_empty() {
        scaled
    } else {
        format!("{}{}{}", scaled, parts.separator, parts.unit)
    }
}

/// Returns a copy of `info` with every macro and present micronutrient scaled.
pub fn scale_nutrition(info: &NutritionInfo, ratio: f64) -> NutritionInfo {
    NutritionInfo {
        calories: scale_value(Some(&info.calories), ratio),
        protein: scale_value(Some(&info.protein), ratio),
        carbs: scale_value(Some(&info.carbs), ratio),
        fat: scale_value(Some(&info.fat), ratio),
        micronutrients: info
            .micronutrients
            .as_ref()
            .map(|m| m.map_values(|v| scale_value(Some(v), ratio))),
    }
}

/// `consumed / n`, where `n` is the first number in the recipe's servings text
/// (`"2人份"` gives 2). Falls back to `n = 1`.
pub fn servings_ratio(recipe_servings: &str, consumed: f64) -> f64 {
    let original = parse_value(Some(recipe_servings)).value;
    let original = if original > 0.0 { original } else { 1.0 };
    consumed / original
}

/// Accepts a finite amount within `MIN_CONSUMED_SERVINGS..=MAX_CONSUMED_SERVINGS`.
pub fn validate_consumed(amount: f64) -> Result<f64, InvalidConsumedAmount> {
    if amount.is_finite() && (MIN_CONSUMED_SERVINGS..=MAX_CONSUMED_SERVINGS).contains(&amount) {
        Ok(amount)
    } else {
        Err(InvalidConsumedAmount(amount))
    }
}

/// The amount a cooking session starts at: the recipe's own serving count,
/// kept within the accepted range, or 1 when the text has no number.
pub fn default_consumed_servings(recipe_servings: &str) -> f64 {
    let servings = parse_value(Some(recipe_servings)).value;
    if servings > 0.0 {
        servings.clamp(MIN_CONSUMED_SERVINGS, MAX_CONSUMED_SERVINGS)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Micronutrients;
    use crate::quantity::parse_value;
    use rand::Rng;

    fn sample() -> NutritionInfo {
        NutritionInfo {
            calories: "320 kcal".into(),
            protein: "14g".into(),
            carbs: "12g".into(),
            fat: "24g".into(),
            micronutrients: Some(Micronutrients {
                sodium: Some("600mg".into()),
                iron: Some("1.2mg".into()),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_scale_calories_by_one_and_a_half() {
        let scaled = scale_nutrition(&sample(), 1.5);
        assert_eq!(scaled.calories, "480 kcal");
        assert_eq!(scaled.protein, "21g");
        assert_eq!(scaled.carbs, "18g");
        assert_eq!(scaled.fat, "36g");
    }

    #[test]
    fn test_absent_micronutrients_stay_absent() {
        let scaled = scale_nutrition(&sample(), 0.5);
        let micros = scaled.micronutrients.unwrap();
        assert_eq!(micros.sodium.as_deref(), Some("300mg"));
        assert_eq!(micros.iron.as_deref(), Some("0.6mg"));
        assert_eq!(micros.sugar, None);
        assert_eq!(micros.vitamin_c, None);

        let bare = NutritionInfo { micronutrients: None, ..sample() };
        assert!(scale_nutrition(&bare, 2.0).micronutrients.is_none());
    }

    #[test]
    fn test_unparsable_and_zero_values_degrade() {
        assert_eq!(scale_value(Some("少许"), 2.0), "少许");
        assert_eq!(scale_value(Some("0mg"), 2.0), "0mg");
        assert_eq!(scale_value(Some(""), 2.0), "0");
        assert_eq!(scale_value(None, 2.0), "0");
        assert_eq!(scale_value(Some("15"), 2.0), "30");
    }

    #[test]
    fn test_servings_ratio() {
        assert_eq!(servings_ratio("2人份", 3.0), 1.5);
        assert_eq!(servings_ratio("约4人", 1.0), 0.25);
        assert_eq!(servings_ratio("适量", 2.0), 2.0);
    }

    #[test]
    fn test_validate_consumed_bounds() {
        assert_eq!(validate_consumed(0.5), Ok(0.5));
        assert_eq!(validate_consumed(10.0), Ok(10.0));
        assert_eq!(validate_consumed(2.5), Ok(2.5));
        assert_eq!(validate_consumed(0.0), Err(InvalidConsumedAmount(0.0)));
        assert_eq!(validate_consumed(-2.0), Err(InvalidConsumedAmount(-2.0)));
        assert_eq!(validate_consumed(10.5), Err(InvalidConsumedAmount(10.5)));
        assert!(validate_consumed(f64::NAN).is_err());
        assert!(validate_consumed(f64::INFINITY).is_err());
    }

    #[test]
    fn test_default_consumed_follows_recipe_servings() {
        assert_eq!(default_consumed_servings("2人份"), 2.0);
        assert_eq!(default_consumed_servings("1.5人份"), 1.5);
        assert_eq!(default_consumed_servings("30人份"), 10.0);
        assert_eq!(default_consumed_servings("适量"), 1.0);
    }

    #[test]
    fn test_scale_then_unscale_stays_within_rounding() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let original = rng.gen_range(1..5000) as f64 / 10.0;
            let ratio = rng.gen_range(5..40) as f64 / 10.0;
            let scaled = scale_value(Some(&format!("{} kcal", original)), ratio);
            let back = scale_value(Some(&scaled), 1.0 / ratio);
            let back_value = parse_value(Some(&back)).value;
            // one rounding step on each pass, the first amplified by 1/ratio
            let tolerance = 0.05 / ratio + 0.05 + 1e-9;
            assert!(
                (back_value - original).abs() <= tolerance,
                "{} -> {} -> {} (ratio {})",
                original,
                scaled,
                back,
                ratio
            );
            assert!(back.ends_with(" kcal"));
        }
    }
}
