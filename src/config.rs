use std::str::FromStr;

use serde::Deserialize;

use crate::cache::StaleFallback;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NutritionProviderKind {
    FatSecret,
    CalorieNinjas,
}

impl FromStr for NutritionProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fatsecret" => Ok(Self::FatSecret),
            "calorieninjas" | "calorie_ninjas" | "api-ninjas" => Ok(Self::CalorieNinjas),
            other => anyhow::bail!("unknown nutrition provider {other:?}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NutritionConfig {
    pub provider: NutritionProviderKind,
    pub fatsecret_client_id: Option<String>,
    pub fatsecret_client_secret: Option<String>,
    pub fatsecret_token_url: String,
    pub fatsecret_api_url: String,
    pub calorie_ninjas_api_key: Option<String>,
    pub calorie_ninjas_base_url: String,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            provider: NutritionProviderKind::FatSecret,
            fatsecret_client_id: None,
            fatsecret_client_secret: None,
            fatsecret_token_url: "https://oauth.fatsecret.com/connect/token".into(),
            fatsecret_api_url: "https://platform.fatsecret.com/rest/foods/search/v1".into(),
            calorie_ninjas_api_key: None,
            calorie_ninjas_base_url: "https://api.api-ninjas.com".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecipeConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.spoonacular.com".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".into(),
            model: "claude-3-haiku-20240307".into(),
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub food_ttl: time::Duration,
    pub recipe_ttl: time::Duration,
    pub recipe_search_ttl: std::time::Duration,
    pub memory_capacity: usize,
    pub food_stale_fallback: StaleFallback,
    pub recipe_stale_fallback: StaleFallback,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            food_ttl: time::Duration::days(30),
            recipe_ttl: time::Duration::days(7),
            recipe_search_ttl: std::time::Duration::from_secs(3600),
            memory_capacity: 1000,
            food_stale_fallback: StaleFallback::Empty,
            recipe_stale_fallback: StaleFallback::ServeStale,
        }
    }
}

/// Calorie bands used by the goal evaluator. Remaining calories above
/// `under_kcal` mean "under goal"; a positive remainder below `near_kcal`
/// means "almost there".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalThresholds {
    pub under_kcal: f64,
    pub near_kcal: f64,
}

impl Default for GoalThresholds {
    fn default() -> Self {
        Self {
            under_kcal: 500.0,
            near_kcal: 200.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub delay: std::time::Duration,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            delay: std::time::Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub nutrition: NutritionConfig,
    pub recipes: RecipeConfig,
    pub llm: LlmConfig,
    pub cache: CacheConfig,
    pub goals: GoalThresholds,
    pub seed: SeedConfig,
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

const MAX_TTL_DAYS: i64 = 3650;

/// Out-of-range values are clamped to `0..=MAX_TTL_DAYS` days.
fn ttl_days(days: i64) -> time::Duration {
    time::Duration::days(days.clamp(0, MAX_TTL_DAYS))
}

fn ttl_minutes(minutes: i64) -> i64 {
    minutes.clamp(0, MAX_TTL_DAYS * 24 * 60)
}

fn fallback_or(key: &str, default: StaleFallback) -> StaleFallback {
    match parsed_or::<bool>(key, default == StaleFallback::ServeStale) {
        true => StaleFallback::ServeStale,
        false => StaleFallback::Empty,
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutrimind".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutrimind-users".into()),
            ttl_minutes: ttl_minutes(parsed_or("JWT_TTL_MINUTES", 60)),
            refresh_ttl_minutes: ttl_minutes(parsed_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14)),
        };

        let nutrition_defaults = NutritionConfig::default();
        let nutrition = NutritionConfig {
            provider: match optional("NUTRITION_PROVIDER") {
                Some(v) => v.parse()?,
                None => nutrition_defaults.provider,
            },
            fatsecret_client_id: optional("FATSECRET_CLIENT_ID"),
            fatsecret_client_secret: optional("FATSECRET_CLIENT_SECRET"),
            fatsecret_token_url: optional("FATSECRET_TOKEN_URL")
                .unwrap_or(nutrition_defaults.fatsecret_token_url),
            fatsecret_api_url: optional("FATSECRET_API_URL")
                .unwrap_or(nutrition_defaults.fatsecret_api_url),
            calorie_ninjas_api_key: optional("CALORIE_NINJAS_API_KEY"),
            calorie_ninjas_base_url: optional("CALORIE_NINJAS_BASE_URL")
                .unwrap_or(nutrition_defaults.calorie_ninjas_base_url),
        };

        let recipes = RecipeConfig {
            api_key: optional("SPOONACULAR_API_KEY"),
            base_url: optional("SPOONACULAR_BASE_URL").unwrap_or(RecipeConfig::default().base_url),
        };

        let llm_defaults = LlmConfig::default();
        let llm = LlmConfig {
            api_key: optional("ANTHROPIC_API_KEY"),
            base_url: optional("ANTHROPIC_BASE_URL").unwrap_or(llm_defaults.base_url),
            model: optional("LLM_MODEL").unwrap_or(llm_defaults.model),
            max_tokens: parsed_or("LLM_MAX_TOKENS", llm_defaults.max_tokens),
            temperature: parsed_or("LLM_TEMPERATURE", llm_defaults.temperature),
        };

        let cache_defaults = CacheConfig::default();
        let cache = CacheConfig {
            food_ttl: ttl_days(parsed_or("FOOD_CACHE_TTL_DAYS", 30)),
            recipe_ttl: ttl_days(parsed_or("RECIPE_CACHE_TTL_DAYS", 7)),
            recipe_search_ttl: std::time::Duration::from_secs(parsed_or(
                "RECIPE_SEARCH_TTL_SECS",
                3600,
            )),
            memory_capacity: parsed_or("MEMORY_CACHE_CAPACITY", cache_defaults.memory_capacity),
            food_stale_fallback: fallback_or(
                "FOOD_CACHE_STALE_FALLBACK",
                cache_defaults.food_stale_fallback,
            ),
            recipe_stale_fallback: fallback_or(
                "RECIPE_CACHE_STALE_FALLBACK",
                cache_defaults.recipe_stale_fallback,
            ),
        };

        let goal_defaults = GoalThresholds::default();
        let goals = GoalThresholds {
            under_kcal: parsed_or("GOAL_UNDER_THRESHOLD_KCAL", goal_defaults.under_kcal),
            near_kcal: parsed_or("GOAL_NEAR_THRESHOLD_KCAL", goal_defaults.near_kcal),
        };

        let seed = SeedConfig {
            delay: std::time::Duration::from_millis(parsed_or("SEED_DELAY_MS", 1000)),
        };

        Ok(Self {
            database_url,
            jwt,
            nutrition,
            recipes,
            llm,
            cache,
            goals,
            seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_kind_parses_known_names() {
        assert_eq!(
            "FatSecret".parse::<NutritionProviderKind>().unwrap(),
            NutritionProviderKind::FatSecret
        );
        assert_eq!(
            " calorieninjas ".parse::<NutritionProviderKind>().unwrap(),
            NutritionProviderKind::CalorieNinjas
        );
        assert!("usda".parse::<NutritionProviderKind>().is_err());
    }

    #[test]
    fn cache_defaults_keep_observed_fallbacks() {
        let cache = CacheConfig::default();
        assert_eq!(cache.food_ttl, time::Duration::days(30));
        assert_eq!(cache.recipe_ttl, time::Duration::days(7));
        assert_eq!(cache.food_stale_fallback, StaleFallback::Empty);
        assert_eq!(cache.recipe_stale_fallback, StaleFallback::ServeStale);
    }

    #[test]
    fn ttls_are_clamped() {
        assert_eq!(ttl_days(7), time::Duration::days(7));
        assert_eq!(ttl_days(i64::MAX), time::Duration::days(MAX_TTL_DAYS));
        assert_eq!(ttl_days(-3), time::Duration::ZERO);
        assert_eq!(ttl_minutes(i64::MAX), MAX_TTL_DAYS * 24 * 60);
        assert_eq!(ttl_minutes(-1), 0);
    }
}
