use super::dto::{CalculateGoalsRequest, DailyGoals, UpdateProfileRequest};
use super::repo_types::Profile;
use crate::error::AppError;

const ACTIVITY_LEVELS: [(&str, f64); 5] = [
    ("sedentary", 1.2),
    ("light", 1.375),
    ("moderate", 1.55),
    ("active", 1.725),
    ("very_active", 1.9),
];

/// Goals of the seeded demo account.
pub const DEMO_GOALS: DailyGoals = DailyGoals {
    daily_calorie_goal: 2609,
    daily_protein_goal: 196,
    daily_carbs_goal: 261,
    daily_fats_goal: 87,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BodyStats {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: i32,
    pub female: bool,
    pub activity_level: Option<String>,
    pub goal_weight_kg: Option<f64>,
}

impl BodyStats {
    /// Request values win over the stored profile; weight, height and age
    /// must end up positive.
    pub fn resolve(req: &CalculateGoalsRequest, profile: Option<&Profile>) -> Result<Self, AppError> {
        let weight_kg = req.weight.or(profile.and_then(|p| p.weight));
        let height_cm = req.height.or(profile.and_then(|p| p.height));
        let age = req.age.or(profile.and_then(|p| p.age));

        let (Some(weight_kg), Some(height_cm), Some(age)) = (weight_kg, height_cm, age) else {
            return Err(AppError::BadRequest(
                "Please enter weight, height, and age first.".into(),
            ));
        };
        if weight_kg <= 0.0 || height_cm <= 0.0 || age <= 0 {
            return Err(AppError::BadRequest(
                "Please enter weight, height, and age first.".into(),
            ));
        }

        let gender = req
            .gender
            .clone()
            .or_else(|| profile.and_then(|p| p.gender.clone()));
        Ok(Self {
            weight_kg,
            height_cm,
            age,
            female: gender.as_deref() == Some("female"),
            activity_level: req
                .activity_level
                .clone()
                .or_else(|| profile.and_then(|p| p.activity_level.clone())),
            goal_weight_kg: req.goal_weight.or(profile.and_then(|p| p.goal_weight)),
        })
    }
}

fn activity_multiplier(level: Option<&str>) -> f64 {
    level
        .and_then(|level| ACTIVITY_LEVELS.iter().find(|(name, _)| *name == level))
        .map_or(1.2, |(_, m)| *m)
}

/// Mifflin-St Jeor BMR scaled by activity, shifted 500 kcal towards the goal
/// weight, split 30/40/30 between protein, carbs and fat.
pub fn calculate_goals(stats: &BodyStats) -> DailyGoals {
    let sex_offset = if stats.female { -161.0 } else { 5.0 };
    let bmr = 10.0 * stats.weight_kg + 6.25 * stats.height_cm - 5.0 * f64::from(stats.age) + sex_offset;
    let tdee = (bmr * activity_multiplier(stats.activity_level.as_deref())).round();

    let target = match stats.goal_weight_kg {
        Some(goal) if goal > 0.0 && goal < stats.weight_kg => tdee - 500.0,
        Some(goal) if goal > stats.weight_kg => tdee + 500.0,
        _ => tdee,
    };

    DailyGoals {
        daily_calorie_goal: target as i32,
        daily_protein_goal: (target * 0.3 / 4.0).round() as i32,
        daily_carbs_goal: (target * 0.4 / 4.0).round() as i32,
        daily_fats_goal: (target * 0.3 / 9.0).round() as i32,
    }
}

/// Trims and lowercases restriction tags, dropping blanks and duplicates.
pub fn normalize_restrictions(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

pub fn validate_update(req: &mut UpdateProfileRequest) -> Result<(), AppError> {
    let positive = [
        ("height", req.height),
        ("weight", req.weight),
        ("goal_weight", req.goal_weight),
    ];
    for (field, value) in positive {
        if value.is_some_and(|v| v <= 0.0) {
            return Err(AppError::BadRequest(format!("{field} must be positive")));
        }
    }
    let goals = [
        ("age", req.age),
        ("daily_calorie_goal", req.daily_calorie_goal),
        ("daily_protein_goal", req.daily_protein_goal),
        ("daily_carbs_goal", req.daily_carbs_goal),
        ("daily_fats_goal", req.daily_fats_goal),
    ];
    for (field, value) in goals {
        if value.is_some_and(|v| v < 0) {
            return Err(AppError::BadRequest(format!("{field} must not be negative")));
        }
    }

    if let Some(level) = req.activity_level.as_deref() {
        if !ACTIVITY_LEVELS.iter().any(|(name, _)| *name == level) {
            return Err(AppError::BadRequest(format!("Unknown activity level: {level}")));
        }
    }
    if req
        .preferred_height_unit
        .as_deref()
        .is_some_and(|u| u != "cm" && u != "ft")
    {
        return Err(AppError::BadRequest("Height unit must be cm or ft".into()));
    }
    if req
        .preferred_weight_unit
        .as_deref()
        .is_some_and(|u| u != "kg" && u != "lbs")
    {
        return Err(AppError::BadRequest("Weight unit must be kg or lbs".into()));
    }

    if let Some(tags) = req.dietary_restrictions.as_mut() {
        *tags = normalize_restrictions(tags);
    }
    Ok(())
}
