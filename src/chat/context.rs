//! Plain-text snapshot of the user's data handed to the chat assistant.

use std::fmt::Display;

use time::{macros::format_description, Date};

use crate::food_logs::FoodLog;
use crate::profile::Profile;
use crate::progress::UserProgress;

pub const WEIGHT_HISTORY_DAYS: i64 = 14;
pub const MEAL_HISTORY_DAYS: i64 = 7;

const SYSTEM_PROMPT: &str = r#"You are NutriAI, a friendly, casual, and highly personalized nutrition assistant.
You have access to the user's real-time data below. Use it to give specific, customized advice.

**GUIDELINES:**
1. **Structure**: Use Headers (###) for sections.
2. **Lists**: ALL lists must use bullet points (- ).
3. **Dates**: Use friendly names like "Yesterday" or "Mon, Dec 8th" instead of ISO dates (2025-12-08).
4. **Directness**: NO filler phrases.
   - BANNED: "Let's take a look", "Based on your logs", "Here is", "I can see that".
   - Start directly with the data or answer.
5. **Key Data**: Bold calories and macros (e.g., **1650 kcal**).
6. **Tables**: Use Markdown Tables for data comparisons (e.g., Intake vs Goal).
   | Metric | Intake | Goal | Status |
   | :--- | :--- | :--- | :--- |
   | Protein | 150g | 196g | Under |
7. **Math Logic**: CAREFULLY compare Intake vs Goal.
   - If Intake (e.g., 1850) < Goal (e.g., 2600), Status is "Under goal".
   - If Intake > Goal, Status is "Over goal".
   - 1850 is LESS THAN 2609. Do not say it is above.

--- USER DATA CONTEXT ---
"#;

fn or_unknown<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |v| v.to_string())
}

fn write_profile(out: &mut String, profile: Option<&Profile>) {
    out.push_str("Current User Profile:\n");
    let Some(p) = profile else {
        out.push_str("No profile data available.\n");
        return;
    };
    let goal = match p.goal_weight {
        Some(w) if w > 0.0 => format!("Reach {w}kg"),
        _ => "Maintain".to_string(),
    };
    out.push_str(&format!("- Age: {}\n", or_unknown(p.age)));
    out.push_str(&format!("- Gender: {}\n", or_unknown(p.gender.as_deref())));
    out.push_str(&format!("- Height: {}cm\n", or_unknown(p.height)));
    out.push_str(&format!("- Weight: {}kg\n", or_unknown(p.weight)));
    out.push_str(&format!("- Goal: {goal}\n"));
    out.push_str(&format!("- Calorie Goal: {} kcal\n", or_unknown(p.daily_calorie_goal)));
}

fn write_weights(out: &mut String, progress: &[UserProgress]) {
    out.push_str(&format!("\nRecent Weight History (Last {WEIGHT_HISTORY_DAYS} Days):\n"));
    let weighed: Vec<_> = progress
        .iter()
        .filter_map(|p| p.weight.map(|w| (p.date, w)))
        .collect();
    if weighed.is_empty() {
        out.push_str("No recent weight logs.\n");
        return;
    }
    for (date, weight) in weighed {
        out.push_str(&format!("- {date}: {weight}kg\n"));
    }
}

/// One line per date; a repeated name+calories pair on the same date is
/// counted once.
fn write_meals(out: &mut String, logs: &[FoodLog]) {
    out.push_str(&format!("\nRecent Meals (Last {MEAL_HISTORY_DAYS} Days):\n"));
    if logs.is_empty() {
        out.push_str("No recent meals logged.\n");
        return;
    }

    let mut days: Vec<(Date, Vec<&FoodLog>)> = Vec::new();
    for log in logs {
        let idx = match days.iter().position(|(d, _)| *d == log.date) {
            Some(i) => i,
            None => {
                days.push((log.date, Vec::new()));
                days.len() - 1
            }
        };
        let meals = &mut days[idx].1;
        if !meals
            .iter()
            .any(|m| m.name == log.name && m.calories == log.calories)
        {
            meals.push(log);
        }
    }
    days.sort_by_key(|(d, _)| *d);

    for (date, meals) in days {
        let total: f64 = meals.iter().map(|m| m.calories).sum();
        let names = meals
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("- {date}: {} kcal ({names})\n", total.round()));
    }
}

pub fn build_context(
    today: Date,
    profile: Option<&Profile>,
    progress: &[UserProgress],
    logs: &[FoodLog],
) -> String {
    let heading = format_description!("[weekday], [month repr:long] [day padding:none], [year]");
    let today_str = today.format(&heading).unwrap_or_else(|_| today.to_string());

    let mut out = format!("Current Date: {today_str}\n\n");
    write_profile(&mut out, profile);
    write_weights(&mut out, progress);
    write_meals(&mut out, logs);
    out
}

pub fn system_prompt(context: &str) -> String {
    format!("{SYSTEM_PROMPT}{context}-------------------------")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::food_log;
    use time::macros::date;
    use uuid::Uuid;

    const TODAY: Date = date!(2025 - 12 - 08);

    fn logged(name: &str, calories: f64, date: Date) -> FoodLog {
        FoodLog {
            date,
            ..food_log(name, calories, 10.0)
        }
    }

    fn weigh_in(date: Date, weight: Option<f64>) -> UserProgress {
        UserProgress {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            date,
            weight,
            calories: None,
            protein: None,
            carbs: None,
            fats: None,
        }
    }

    #[test]
    fn empty_context_uses_placeholders() {
        let ctx = build_context(TODAY, None, &[], &[]);
        assert!(ctx.starts_with("Current Date: Monday, December 8, 2025\n"));
        assert!(ctx.contains("No profile data available."));
        assert!(ctx.contains("No recent weight logs."));
        assert!(ctx.contains("No recent meals logged."));
    }

    #[test]
    fn profile_lines() {
        let mut profile = Profile::empty(Uuid::nil());
        profile.age = Some(30);
        profile.gender = Some("male".into());
        profile.height = Some(180.0);
        profile.weight = Some(86.5);
        profile.goal_weight = Some(80.0);
        profile.daily_calorie_goal = Some(2609);

        let ctx = build_context(TODAY, Some(&profile), &[], &[]);
        assert!(ctx.contains("- Age: 30\n- Gender: male\n- Height: 180cm\n- Weight: 86.5kg\n"));
        assert!(ctx.contains("- Goal: Reach 80kg\n- Calorie Goal: 2609 kcal\n"));

        profile.goal_weight = None;
        let ctx = build_context(TODAY, Some(&profile), &[], &[]);
        assert!(ctx.contains("- Goal: Maintain\n"));
    }

    #[test]
    fn weight_history_skips_days_without_weight() {
        let progress = [
            weigh_in(date!(2025 - 12 - 06), Some(85.1)),
            weigh_in(date!(2025 - 12 - 07), None),
        ];
        let ctx = build_context(TODAY, None, &progress, &[]);
        assert!(ctx.contains("- 2025-12-06: 85.1kg\n"));
        assert!(!ctx.contains("2025-12-07"));
    }

    #[test]
    fn meals_grouped_by_date_without_duplicates() {
        let logs = [
            logged("Oatmeal", 300.0, date!(2025 - 12 - 07)),
            logged("Oatmeal", 300.0, date!(2025 - 12 - 07)),
            logged("Oatmeal", 350.0, date!(2025 - 12 - 07)),
            logged("Salmon", 500.0, date!(2025 - 12 - 08)),
            logged("Apple", 95.0, date!(2025 - 12 - 07)),
        ];
        let ctx = build_context(TODAY, None, &[], &logs);
        assert!(ctx.contains("- 2025-12-07: 745 kcal (Oatmeal, Oatmeal, Apple)\n"));
        assert!(ctx.contains("- 2025-12-08: 500 kcal (Salmon)\n"));
        assert!(ctx.find("2025-12-07").unwrap() < ctx.find("2025-12-08").unwrap());
    }

    #[test]
    fn prompt_embeds_context() {
        let prompt = system_prompt("Current Date: today\n");
        assert!(prompt.contains("1850 is LESS THAN 2609"));
        assert!(prompt.contains("--- USER DATA CONTEXT ---\nCurrent Date: today\n-----"));
    }
}
