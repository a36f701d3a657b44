//! In-memory fakes for the storage and upstream seams.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::bail;
use async_trait::async_trait;
use reqwest::StatusCode;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::cache::{FoodCacheStore, FoodSearchCacheEntry};
use crate::error::UpstreamError;
use crate::food_logs::FoodLog;
use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, TokenUsage};
use crate::nutrition::{NutritionData, NutritionProvider};
use crate::planner::recommender::RecipeRecommendation;
use crate::planner::{MealPlan, PlannerStore};
use crate::profile::Profile;
use crate::recipes::store::StoredRecipe;
use crate::recipes::{
    RecipeInformation, RecipeProvider, RecipeSearchResponse, RecipeSearchResult, RecipeStore,
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap()
}

pub fn nutrition(name: &str, calories: f64) -> NutritionData {
    NutritionData {
        name: name.into(),
        calories,
        serving_size_g: 100.0,
        serving_unit: None,
        protein_g: 10.0,
        carbohydrates_total_g: 20.0,
        fat_total_g: 5.0,
        sugar_g: None,
        fiber_g: None,
        sodium_mg: None,
        potassium_mg: None,
        cholesterol_mg: None,
        fat_saturated_g: None,
    }
}

pub fn food_log(name: &str, calories: f64, protein_g: f64) -> FoodLog {
    FoodLog {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        name: name.into(),
        calories,
        protein_g,
        carbs_g: 0.0,
        fat_g: 0.0,
        serving_size_g: 100.0,
        serving_unit: None,
        date: OffsetDateTime::now_utc().date(),
        created_at: OffsetDateTime::now_utc(),
    }
}

pub fn recipe(id: i64, title: &str) -> RecipeInformation {
    RecipeInformation {
        id,
        title: title.into(),
        image: None,
        summary: String::new(),
        ready_in_minutes: 30,
        servings: 2,
        extended_ingredients: Vec::new(),
        analyzed_instructions: Vec::new(),
    }
}

pub fn search_hit(id: i64, title: &str) -> RecipeSearchResult {
    RecipeSearchResult {
        id,
        title: title.into(),
        image: Some(format!("https://img.example/{id}.jpg")),
        image_type: Some("jpg".into()),
    }
}

fn not_found(service: &'static str) -> UpstreamError {
    UpstreamError::status(service, StatusCode::NOT_FOUND, "not found")
}

#[derive(Default)]
pub struct MemoryFoodCacheStore {
    entries: Mutex<HashMap<String, FoodSearchCacheEntry>>,
    fail_reads: Mutex<bool>,
    fail_writes: Mutex<bool>,
}

impl MemoryFoodCacheStore {
    pub fn put(&self, query: &str, results: Vec<NutritionData>, created_at: OffsetDateTime) {
        lock(&self.entries).insert(
            query.into(),
            FoodSearchCacheEntry {
                query: query.into(),
                results,
                created_at,
            },
        );
    }

    pub fn entry(&self, query: &str) -> Option<FoodSearchCacheEntry> {
        lock(&self.entries).get(query).cloned()
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }

    pub fn fail_reads(&self, fail: bool) {
        *lock(&self.fail_reads) = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        *lock(&self.fail_writes) = fail;
    }
}

#[async_trait]
impl FoodCacheStore for MemoryFoodCacheStore {
    async fn get(&self, query: &str) -> anyhow::Result<Option<FoodSearchCacheEntry>> {
        if *lock(&self.fail_reads) {
            bail!("food cache read failed");
        }
        Ok(self.entry(query))
    }

    async fn upsert(&self, entry: FoodSearchCacheEntry) -> anyhow::Result<()> {
        if *lock(&self.fail_writes) {
            bail!("food cache write failed");
        }
        lock(&self.entries).insert(entry.query.clone(), entry);
        Ok(())
    }
}

pub struct StubNutritionProvider {
    results: Option<Vec<NutritionData>>,
    calls: AtomicUsize,
}

impl StubNutritionProvider {
    pub fn returning(results: Vec<NutritionData>) -> Self {
        Self {
            results: Some(results),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NutritionProvider for StubNutritionProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn search(&self, _query: &str) -> Result<Vec<NutritionData>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .clone()
            .ok_or_else(|| UpstreamError::status("stub", StatusCode::SERVICE_UNAVAILABLE, "down"))
    }
}

#[derive(Default)]
pub struct MemoryRecipeStore {
    recipes: Mutex<HashMap<i64, StoredRecipe>>,
    fail_writes: Mutex<bool>,
}

impl MemoryRecipeStore {
    pub fn put(&self, recipe: RecipeInformation, updated_at: OffsetDateTime) {
        lock(&self.recipes).insert(
            recipe.id,
            StoredRecipe {
                data: recipe,
                updated_at,
            },
        );
    }

    pub fn stored(&self, id: i64) -> Option<StoredRecipe> {
        lock(&self.recipes).get(&id).cloned()
    }

    pub fn fail_writes(&self, fail: bool) {
        *lock(&self.fail_writes) = fail;
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn get(&self, id: i64) -> anyhow::Result<Option<StoredRecipe>> {
        Ok(self.stored(id))
    }

    async fn upsert(&self, recipe: &RecipeInformation, updated_at: OffsetDateTime) -> anyhow::Result<()> {
        if *lock(&self.fail_writes) {
            bail!("recipe write failed");
        }
        self.put(recipe.clone(), updated_at);
        Ok(())
    }

    async fn by_ids(&self, ids: &[i64]) -> anyhow::Result<Vec<RecipeInformation>> {
        let recipes = lock(&self.recipes);
        Ok(ids
            .iter()
            .filter_map(|id| recipes.get(id).map(|r| r.data.clone()))
            .collect())
    }
}

/// Search hits are keyed by lowercased query; unknown queries return an
/// empty page. Unknown ids fail with 404.
#[derive(Default)]
pub struct StubRecipeProvider {
    searches: HashMap<String, Vec<RecipeSearchResult>>,
    information: HashMap<i64, RecipeInformation>,
    fail_search: bool,
    search_calls: Mutex<Vec<String>>,
    information_calls: AtomicUsize,
}

impl StubRecipeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, results: Vec<RecipeSearchResult>) -> Self {
        self.searches.insert(query.to_lowercase(), results);
        self
    }

    pub fn with_information(mut self, recipe: RecipeInformation) -> Self {
        self.information.insert(recipe.id, recipe);
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn search_calls(&self) -> Vec<String> {
        lock(&self.search_calls).clone()
    }

    pub fn information_calls(&self) -> usize {
        self.information_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecipeProvider for StubRecipeProvider {
    async fn search(&self, query: &str, number: u32) -> Result<RecipeSearchResponse, UpstreamError> {
        lock(&self.search_calls).push(query.to_string());
        if self.fail_search {
            return Err(UpstreamError::status(
                "stub recipes",
                StatusCode::PAYMENT_REQUIRED,
                "quota exceeded",
            ));
        }
        let results: Vec<_> = self
            .searches
            .get(&query.to_lowercase())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(number as usize)
            .collect();
        Ok(RecipeSearchResponse {
            total_results: results.len() as u32,
            offset: 0,
            number,
            results,
        })
    }

    async fn information(&self, id: i64) -> Result<RecipeInformation, UpstreamError> {
        self.information_calls.fetch_add(1, Ordering::SeqCst);
        self.information
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found("stub recipes"))
    }
}

/// Replies with the scripted texts in order and records every request.
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn replying<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        lock(&self.requests).push(request.clone());
        let text = lock(&self.replies)
            .pop_front()
            .ok_or_else(|| not_found("scripted llm"))?;
        Ok(CompletionResponse {
            text,
            usage: TokenUsage::default(),
        })
    }
}

#[derive(Default)]
pub struct MemoryPlannerStore {
    profiles: Mutex<HashMap<Uuid, Profile>>,
    logs: Mutex<Vec<(Uuid, Date, FoodLog)>>,
    plans: Mutex<Vec<MealPlan>>,
    fail_saves: Mutex<bool>,
    fail_reads: Mutex<bool>,
}

impl MemoryPlannerStore {
    pub fn set_profile(&self, profile: Profile) {
        lock(&self.profiles).insert(profile.id, profile);
    }

    pub fn add_log(&self, user_id: Uuid, date: Date, log: FoodLog) {
        let log = FoodLog { user_id, date, ..log };
        lock(&self.logs).push((user_id, date, log));
    }

    pub fn plans(&self, user_id: Uuid) -> Vec<MealPlan> {
        lock(&self.plans)
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn fail_saves(&self, fail: bool) {
        *lock(&self.fail_saves) = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        *lock(&self.fail_reads) = fail;
    }

    fn check_reads(&self) -> anyhow::Result<()> {
        if *lock(&self.fail_reads) {
            bail!("planner store read failed");
        }
        Ok(())
    }
}

#[async_trait]
impl PlannerStore for MemoryPlannerStore {
    async fn logs_on(&self, user_id: Uuid, date: Date) -> anyhow::Result<Vec<FoodLog>> {
        self.check_reads()?;
        Ok(lock(&self.logs)
            .iter()
            .filter(|(u, d, _)| *u == user_id && *d == date)
            .map(|(_, _, log)| log.clone())
            .collect())
    }

    async fn profile(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        self.check_reads()?;
        Ok(lock(&self.profiles).get(&user_id).cloned())
    }

    async fn save_plan(
        &self,
        user_id: Uuid,
        analysis: &str,
        suggestions: &[RecipeRecommendation],
    ) -> anyhow::Result<MealPlan> {
        if *lock(&self.fail_saves) {
            bail!("meal plan insert failed");
        }
        let plan = MealPlan {
            id: Uuid::new_v4(),
            user_id,
            analysis: analysis.into(),
            suggestions: suggestions.to_vec(),
            created_at: OffsetDateTime::now_utc(),
        };
        lock(&self.plans).push(plan.clone());
        Ok(plan)
    }

    async fn list_plans(&self, user_id: Uuid) -> anyhow::Result<Vec<MealPlan>> {
        self.check_reads()?;
        let mut plans = self.plans(user_id);
        plans.reverse();
        Ok(plans)
    }

    async fn delete_plan(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let mut plans = lock(&self.plans);
        let before = plans.len();
        plans.retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(plans.len() < before)
    }
}
