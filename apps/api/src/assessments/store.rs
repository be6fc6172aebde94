//! Assessment persistence.
//!
//! `AppState` holds an `Arc<dyn AssessmentStore>`; production uses
//! `PgAssessmentStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::errors::AppError;
use crate::models::assessment::{Assessment, AssessmentPatch, NewAssessment};

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn create(&self, new: NewAssessment) -> Result<Assessment, AppError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<Assessment>, AppError>;

    async fn get(&self, id: i32) -> Result<Option<Assessment>, AppError>;

    /// Partial merge; `None` when no record has this id.
    async fn update(&self, id: i32, patch: AssessmentPatch)
        -> Result<Option<Assessment>, AppError>;

    /// `false` when no record has this id.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[derive(Debug, FromRow)]
struct AssessmentRow {
    id: i32,
    product: String,
    filename: String,
    summary: String,
    controls: Json<Vec<String>>,
    risks: Json<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl From<AssessmentRow> for Assessment {
    fn from(row: AssessmentRow) -> Self {
        Self {
            id: row.id,
            product: row.product,
            filename: row.filename,
            summary: row.summary,
            controls: row.controls.0,
            risks: row.risks.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Clone)]
pub struct PgAssessmentStore {
    pool: PgPool,
}

impl PgAssessmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssessmentStore for PgAssessmentStore {
    async fn create(&self, new: NewAssessment) -> Result<Assessment, AppError> {
        let row = sqlx::query_as::<_, AssessmentRow>(
            r#"
            INSERT INTO assessments (product, filename, summary, controls, risks)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&new.product)
        .bind(&new.filename)
        .bind(&new.summary)
        .bind(Json(&new.controls))
        .bind(Json(&new.risks))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn list(&self) -> Result<Vec<Assessment>, AppError> {
        let rows = sqlx::query_as::<_, AssessmentRow>(
            "SELECT * FROM assessments ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Assessment::from).collect())
    }

    async fn get(&self, id: i32) -> Result<Option<Assessment>, AppError> {
        let row = sqlx::query_as::<_, AssessmentRow>("SELECT * FROM assessments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Assessment::from))
    }

    async fn update(
        &self,
        id: i32,
        patch: AssessmentPatch,
    ) -> Result<Option<Assessment>, AppError> {
        // COALESCE keeps the stored value for every field the patch leaves out.
        let row = sqlx::query_as::<_, AssessmentRow>(
            r#"
            UPDATE assessments
            SET product  = COALESCE($2, product),
                summary  = COALESCE($3, summary),
                controls = COALESCE($4, controls),
                risks    = COALESCE($5, risks)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.product)
        .bind(patch.summary)
        .bind(patch.controls.map(Json))
        .bind(patch.risks.map(Json))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Assessment::from))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM assessments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
