use time::{Date, Duration};

use super::repo_types::NewProgress;
use crate::food_logs::NewFoodLog;

struct MealTemplate {
    name: &'static str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    grams: f64,
    unit: &'static str,
    hour: i64,
}

#[allow(clippy::too_many_arguments)]
const fn meal(
    name: &'static str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    grams: f64,
    unit: &'static str,
    hour: i64,
) -> MealTemplate {
    MealTemplate {
        name,
        calories,
        protein,
        carbs,
        fat,
        grams,
        unit,
        hour,
    }
}

const DAY_PLANS: [[MealTemplate; 3]; 3] = [
    [
        meal("Oatmeal & Whey", 450.0, 30.0, 50.0, 10.0, 300.0, "bowl", 8),
        meal("Chicken & Rice", 700.0, 60.0, 80.0, 15.0, 500.0, "plate", 13),
        meal("Salmon & Asparagus", 600.0, 40.0, 20.0, 30.0, 400.0, "plate", 19),
    ],
    [
        meal("Eggs & Toast", 550.0, 25.0, 40.0, 30.0, 250.0, "2 slices", 8),
        meal("Pasta with Meat Sauce", 800.0, 35.0, 100.0, 20.0, 450.0, "bowl", 13),
        meal("Greek Yogurt Bowl", 300.0, 20.0, 30.0, 5.0, 200.0, "bowl", 19),
    ],
    [
        meal("Protein Pancakes", 500.0, 30.0, 60.0, 12.0, 300.0, "stack", 9),
        meal("Turkey Sandwich", 450.0, 30.0, 45.0, 10.0, 250.0, "sandwich", 13),
        meal("Steak & Potatoes", 900.0, 60.0, 50.0, 45.0, 500.0, "plate", 19),
    ],
];

const DINNER_AFTER_HOUR: i64 = 18;

#[derive(Debug, Default)]
pub struct DemoData {
    pub logs: Vec<NewFoodLog>,
    pub progress: Vec<NewProgress>,
}

/// Seven days of demo history ending at `today`. The plan for each day is
/// picked by day of month, today's dinner is left out, and the weight trends
/// down 0.15 kg per day to reach 85.1 kg today.
pub fn demo_data(today: Date) -> DemoData {
    let mut data = DemoData::default();

    for days_ago in (0..=6i64).rev() {
        let day = today - Duration::days(days_ago);
        let plan = &DAY_PLANS[usize::from(day.day()) % 3];

        let mut totals = NewProgress {
            date: day,
            weight: ((86.0 - (6 - days_ago) as f64 * 0.15) * 10.0).round() / 10.0,
            calories: 0.0,
            protein: 0.0,
            carbs: 0.0,
            fats: 0.0,
        };

        for m in plan {
            if days_ago == 0 && m.hour > DINNER_AFTER_HOUR {
                continue;
            }
            data.logs.push(NewFoodLog {
                name: m.name.to_string(),
                calories: m.calories,
                protein_g: m.protein,
                carbs_g: m.carbs,
                fat_g: m.fat,
                serving_size_g: m.grams,
                serving_unit: Some(m.unit.to_string()),
                date: day,
                created_at: Some(day.midnight().assume_utc() + Duration::hours(m.hour)),
            });
            totals.calories += m.calories;
            totals.protein += m.protein;
            totals.carbs += m.carbs;
            totals.fats += m.fat;
        }
        data.progress.push(totals);
    }
    data
}
