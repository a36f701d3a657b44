use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::dto::{DailyGoals, UpdateProfileRequest};
use super::repo_types::Profile;

const PROFILE_COLUMNS: &str = r#"
    id, age, gender, height, weight, goal_weight, activity_level,
    daily_calorie_goal, daily_protein_goal, daily_carbs_goal, daily_fats_goal,
    preferred_height_unit, preferred_weight_unit, dietary_restrictions, updated_at
"#;

impl Profile {
    pub async fn find(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Inserts the empty row that registration promises every user.
    pub async fn create_empty(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
    ) -> anyhow::Result<()> {
        sqlx::query(r#"INSERT INTO profiles (id) VALUES ($1) ON CONFLICT (id) DO NOTHING"#)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        req: &UpdateProfileRequest,
    ) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles SET
                age = COALESCE($2, age),
                gender = COALESCE($3, gender),
                height = COALESCE($4, height),
                weight = COALESCE($5, weight),
                goal_weight = COALESCE($6, goal_weight),
                activity_level = COALESCE($7, activity_level),
                daily_calorie_goal = COALESCE($8, daily_calorie_goal),
                daily_protein_goal = COALESCE($9, daily_protein_goal),
                daily_carbs_goal = COALESCE($10, daily_carbs_goal),
                daily_fats_goal = COALESCE($11, daily_fats_goal),
                preferred_height_unit = COALESCE($12, preferred_height_unit),
                preferred_weight_unit = COALESCE($13, preferred_weight_unit),
                dietary_restrictions = COALESCE($14, dietary_restrictions),
                updated_at = now()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(req.age)
        .bind(req.gender.as_deref())
        .bind(req.height)
        .bind(req.weight)
        .bind(req.goal_weight)
        .bind(req.activity_level.as_deref())
        .bind(req.daily_calorie_goal)
        .bind(req.daily_protein_goal)
        .bind(req.daily_carbs_goal)
        .bind(req.daily_fats_goal)
        .bind(req.preferred_height_unit.as_deref())
        .bind(req.preferred_weight_unit.as_deref())
        .bind(req.dietary_restrictions.clone())
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn set_goals(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        goals: &DailyGoals,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, daily_calorie_goal, daily_protein_goal, daily_carbs_goal, daily_fats_goal)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                daily_calorie_goal = EXCLUDED.daily_calorie_goal,
                daily_protein_goal = EXCLUDED.daily_protein_goal,
                daily_carbs_goal = EXCLUDED.daily_carbs_goal,
                daily_fats_goal = EXCLUDED.daily_fats_goal,
                updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(goals.daily_calorie_goal)
        .bind(goals.daily_protein_goal)
        .bind(goals.daily_carbs_goal)
        .bind(goals.daily_fats_goal)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}
