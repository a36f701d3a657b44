use serde::Serialize;

use crate::food_logs::FoodLog;

/// What the user has eaten so far today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionSummary {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

pub fn summarize(logs: &[FoodLog]) -> NutritionSummary {
    logs.iter().fold(NutritionSummary::default(), |acc, log| NutritionSummary {
        calories: acc.calories + log.calories,
        protein: acc.protein + log.protein_g,
        carbs: acc.carbs + log.carbs_g,
        fat: acc.fat + log.fat_g,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::food_log;

    #[test]
    fn sums_all_macros() {
        let logs = [food_log("Oats", 450.0, 30.0), food_log("Chicken & Rice", 700.0, 60.0)];
        let summary = summarize(&logs);
        assert_eq!(summary.calories, 1150.0);
        assert_eq!(summary.protein, 90.0);
        assert_eq!(summarize(&[]), NutritionSummary::default());
    }
}
