use std::sync::Arc;

use serde::Serialize;
use time::Date;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::analyst::{summarize, NutritionSummary};
use super::evaluator::{evaluate, GoalEvaluation, Goals};
use super::recommender::{find_recipes, RecipeRecommendation};
use super::store::PlannerStore;
use super::strategist::generate_strategy;
use super::PipelineError;
use crate::config::GoalThresholds;
use crate::llm::LlmHelper;
use crate::recipes::RecipeService;

#[derive(Debug, Clone, Serialize)]
pub struct MealPlanResult {
    pub analysis: String,
    pub suggestions: Vec<RecipeRecommendation>,
    pub summary: NutritionSummary,
    pub evaluation: GoalEvaluation,
    /// `None` when saving the plan failed.
    pub plan_id: Option<Uuid>,
}

/// Analyst → goal evaluator → meal planner → recipe recommender, then a
/// best-effort save.
pub struct MealPlanPipeline {
    store: Arc<dyn PlannerStore>,
    llm: Arc<LlmHelper>,
    recipes: Arc<RecipeService>,
    thresholds: GoalThresholds,
}

impl MealPlanPipeline {
    pub fn new(
        store: Arc<dyn PlannerStore>,
        llm: Arc<LlmHelper>,
        recipes: Arc<RecipeService>,
        thresholds: GoalThresholds,
    ) -> Self {
        Self {
            store,
            llm,
            recipes,
            thresholds,
        }
    }

    pub fn store(&self) -> &dyn PlannerStore {
        self.store.as_ref()
    }

    #[instrument(skip(self))]
    pub async fn run(&self, user_id: Uuid, today: Date) -> Result<MealPlanResult, PipelineError> {
        let logs = self.store.logs_on(user_id, today).await?;
        let summary = summarize(&logs);

        let profile = self.store.profile(user_id).await?;
        let evaluation = evaluate(Goals::from_profile(profile.as_ref()), &summary, &self.thresholds);
        info!(
            consumed = summary.calories,
            remaining = evaluation.remaining.calories,
            status = ?evaluation.status,
            "goals evaluated"
        );

        let strategy = generate_strategy(&self.llm, &summary, &evaluation).await?;
        let analysis = strategy.analysis.clone();
        let suggestions = find_recipes(&self.recipes, strategy).await;

        let plan_id = match self.store.save_plan(user_id, &analysis, &suggestions).await {
            Ok(plan) => Some(plan.id),
            Err(e) => {
                error!(error = %format!("{e:#}"), "failed to save meal plan");
                None
            }
        };

        Ok(MealPlanResult {
            analysis,
            suggestions,
            summary,
            evaluation,
            plan_id,
        })
    }
}
