use serde::Serialize;

use super::analyst::NutritionSummary;
use crate::config::GoalThresholds;
use crate::profile::Profile;

const DEFAULT_CALORIES: f64 = 2000.0;
const DEFAULT_PROTEIN: f64 = 150.0;
const DEFAULT_CARBS: f64 = 200.0;
const DEFAULT_FAT: f64 = 70.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Goals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub diet: Vec<String>,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            calories: DEFAULT_CALORIES,
            protein: DEFAULT_PROTEIN,
            carbs: DEFAULT_CARBS,
            fat: DEFAULT_FAT,
            diet: Vec::new(),
        }
    }
}

fn goal_or(value: Option<i32>, default: f64) -> f64 {
    value.filter(|v| *v > 0).map_or(default, f64::from)
}

impl Goals {
    /// Unset or non-positive goals fall back to the defaults.
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        let Some(p) = profile else {
            return Self::default();
        };
        Self {
            calories: goal_or(p.daily_calorie_goal, DEFAULT_CALORIES),
            protein: goal_or(p.daily_protein_goal, DEFAULT_PROTEIN),
            carbs: goal_or(p.daily_carbs_goal, DEFAULT_CARBS),
            fat: goal_or(p.daily_fats_goal, DEFAULT_FAT),
            diet: p.dietary_restrictions.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    Under,
    Near,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Remaining {
    pub calories: f64,
    pub protein: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalEvaluation {
    pub goals: Goals,
    pub remaining: Remaining,
    pub status: GoalStatus,
    pub guidance: &'static str,
}

pub fn evaluate(goals: Goals, current: &NutritionSummary, thresholds: &GoalThresholds) -> GoalEvaluation {
    let remaining = Remaining {
        calories: goals.calories - current.calories,
        protein: goals.protein - current.protein,
    };

    let left = remaining.calories;
    let (status, guidance) = if left > thresholds.under_kcal {
        (
            GoalStatus::Under,
            "User has plenty of calories left. Suggest hearty, filling meals.",
        )
    } else if left > 0.0 && left < thresholds.near_kcal {
        (
            GoalStatus::Near,
            "User is almost at calorie limit. Suggest light, high-volume, low-calorie options.",
        )
    } else if left <= 0.0 {
        (
            GoalStatus::Over,
            "User has exceeded calorie limit. Suggest extremely light snacks or planning for tomorrow.",
        )
    } else {
        (
            GoalStatus::Near,
            "User has moderate calories left. Suggest balanced meals.",
        )
    };

    GoalEvaluation {
        goals,
        remaining,
        status,
        guidance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consumed(calories: f64) -> NutritionSummary {
        NutritionSummary {
            calories,
            ..NutritionSummary::default()
        }
    }

    fn status_for(calories: f64) -> (f64, GoalStatus) {
        let e = evaluate(Goals::default(), &consumed(calories), &GoalThresholds::default());
        (e.remaining.calories, e.status)
    }

    #[test]
    fn bands_for_default_goal() {
        assert_eq!(status_for(1400.0), (600.0, GoalStatus::Under));
        assert_eq!(status_for(1850.0), (150.0, GoalStatus::Near));
        assert_eq!(status_for(2100.0), (-100.0, GoalStatus::Over));
        assert_eq!(status_for(2000.0), (0.0, GoalStatus::Over));
    }

    #[test]
    fn moderate_band_between_thresholds() {
        let e = evaluate(Goals::default(), &consumed(1650.0), &GoalThresholds::default());
        assert_eq!(e.status, GoalStatus::Near);
        assert!(e.guidance.contains("moderate"));

        let exactly_under = evaluate(Goals::default(), &consumed(1500.0), &GoalThresholds::default());
        assert_eq!(exactly_under.status, GoalStatus::Near);
    }

    #[test]
    fn thresholds_are_configurable() {
        let strict = GoalThresholds {
            under_kcal: 700.0,
            near_kcal: 300.0,
        };
        let e = evaluate(Goals::default(), &consumed(1400.0), &strict);
        assert_eq!(e.status, GoalStatus::Near);
        let e = evaluate(Goals::default(), &consumed(1750.0), &strict);
        assert!(e.guidance.contains("almost"));
    }

    #[test]
    fn goals_from_profile_ignore_unset_values() {
        let mut profile = Profile::empty(uuid::Uuid::new_v4());
        profile.daily_calorie_goal = Some(2609);
        profile.daily_protein_goal = Some(0);
        profile.dietary_restrictions = vec!["vegan".into()];

        let goals = Goals::from_profile(Some(&profile));
        assert_eq!(goals.calories, 2609.0);
        assert_eq!(goals.protein, DEFAULT_PROTEIN);
        assert_eq!(goals.diet, vec!["vegan"]);
        assert_eq!(Goals::from_profile(None), Goals::default());
    }
}
