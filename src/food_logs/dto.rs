use serde::Deserialize;
use time::{macros::date, Date};

use crate::nutrition::NutritionData;

const EARLIEST: Date = date!(1970 - 01 - 01);

#[derive(Debug, Deserialize)]
pub struct FoodSearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct LogFoodRequest {
    pub item: NutritionData,
    /// Defaults to today (UTC).
    pub date: Option<Date>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FoodLogQuery {
    pub date: Option<Date>,
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl FoodLogQuery {
    /// Inclusive range to list; a single `date` (default `today`) when no
    /// range bound is given.
    pub fn range(&self, today: Date) -> (Date, Date) {
        match (self.start, self.end) {
            (None, None) => {
                let day = self.date.unwrap_or(today);
                (day, day)
            }
            (start, end) => (start.unwrap_or(EARLIEST), end.unwrap_or(today)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ParseTextRequest {
    #[serde(default)]
    pub text: String,
}
