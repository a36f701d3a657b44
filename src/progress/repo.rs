use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use time::Date;
use uuid::Uuid;

use super::repo_types::{NewProgress, UserProgress};

impl UserProgress {
    /// Ascending by date; open bounds when `None`.
    pub async fn list(
        db: &PgPool,
        user_id: Uuid,
        start: Option<Date>,
        end: Option<Date>,
    ) -> anyhow::Result<Vec<UserProgress>> {
        let rows = sqlx::query_as::<_, UserProgress>(
            r#"
            SELECT id, user_id, date, weight, calories, protein, carbs, fats
            FROM user_progress
            WHERE user_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            ORDER BY date ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn upsert_weight(
        db: &PgPool,
        user_id: Uuid,
        date: Date,
        weight: f64,
    ) -> anyhow::Result<UserProgress> {
        let row = sqlx::query_as::<_, UserProgress>(
            r#"
            INSERT INTO user_progress (user_id, date, weight)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, date) DO UPDATE SET weight = EXCLUDED.weight
            RETURNING id, user_id, date, weight, calories, protein, carbs, fats
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(weight)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn delete_all(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM user_progress WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn insert_many(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        entries: &[NewProgress],
    ) -> anyhow::Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO user_progress (user_id, date, weight, calories, protein, carbs, fats) ",
        );
        qb.push_values(entries, |mut b, e| {
            b.push_bind(user_id)
                .push_bind(e.date)
                .push_bind(e.weight)
                .push_bind(e.calories)
                .push_bind(e.protein)
                .push_bind(e.carbs)
                .push_bind(e.fats);
        });
        qb.build().execute(&mut **tx).await?;
        Ok(())
    }
}

/// `preferred_weight_unit` from the profile, `kg` when unset.
pub async fn preferred_weight_unit(db: &PgPool, user_id: Uuid) -> anyhow::Result<String> {
    let unit: Option<(Option<String>,)> =
        sqlx::query_as(r#"SELECT preferred_weight_unit FROM profiles WHERE id = $1"#)
            .bind(user_id)
            .fetch_optional(db)
            .await?;
    Ok(unit.and_then(|(u,)| u).unwrap_or_else(|| "kg".to_string()))
}
