use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use time::Date;
use uuid::Uuid;

use super::repo_types::{FoodLog, NewFoodLog};

impl FoodLog {
    pub async fn insert(db: &PgPool, user_id: Uuid, log: &NewFoodLog) -> anyhow::Result<FoodLog> {
        let row = sqlx::query_as::<_, FoodLog>(
            r#"
            INSERT INTO food_logs
                (user_id, name, calories, protein_g, carbs_g, fat_g, serving_size_g, serving_unit, date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, COALESCE($10, now()))
            RETURNING id, user_id, name, calories, protein_g, carbs_g, fat_g,
                      serving_size_g, serving_unit, date, created_at
            "#,
        )
        .bind(user_id)
        .bind(&log.name)
        .bind(log.calories)
        .bind(log.protein_g)
        .bind(log.carbs_g)
        .bind(log.fat_g)
        .bind(log.serving_size_g)
        .bind(log.serving_unit.as_deref())
        .bind(log.date)
        .bind(log.created_at)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Logs with `start <= date <= end`, oldest first.
    pub async fn list_between(
        db: &PgPool,
        user_id: Uuid,
        start: Date,
        end: Date,
    ) -> anyhow::Result<Vec<FoodLog>> {
        let rows = sqlx::query_as::<_, FoodLog>(
            r#"
            SELECT id, user_id, name, calories, protein_g, carbs_g, fat_g,
                   serving_size_g, serving_unit, date, created_at
            FROM food_logs
            WHERE user_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date ASC, created_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_on(db: &PgPool, user_id: Uuid, date: Date) -> anyhow::Result<Vec<FoodLog>> {
        Self::list_between(db, user_id, date, date).await
    }

    /// `false` when no row of this user had that id.
    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query(r#"DELETE FROM food_logs WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete_all(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(r#"DELETE FROM food_logs WHERE user_id = $1"#)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    pub async fn insert_many(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        logs: &[NewFoodLog],
    ) -> anyhow::Result<()> {
        if logs.is_empty() {
            return Ok(());
        }
        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO food_logs \
             (user_id, name, calories, protein_g, carbs_g, fat_g, serving_size_g, serving_unit, date, created_at) ",
        );
        qb.push_values(logs, |mut b, log| {
            b.push_bind(user_id)
                .push_bind(log.name.clone())
                .push_bind(log.calories)
                .push_bind(log.protein_g)
                .push_bind(log.carbs_g)
                .push_bind(log.fat_g)
                .push_bind(log.serving_size_g)
                .push_bind(log.serving_unit.clone())
                .push_bind(log.date)
                .push_bind(log.created_at.unwrap_or_else(time::OffsetDateTime::now_utc));
        });
        qb.build().execute(&mut **tx).await?;
        Ok(())
    }
}
