use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::account::{Account, NewAccount};

pub const DUPLICATE_EMAIL: &str = "Email already registered";

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    /// Fails with `DUPLICATE_EMAIL` when the email is already taken.
    async fn insert(&self, new: NewAccount) -> Result<Account, AppError>;
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e: String| AppError::Internal(anyhow!("account {}: {e}", row.id)))?;
        Ok(Account {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            role,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(Account::try_from)
            .transpose()
    }

    async fn insert(&self, new: NewAccount) -> Result<Account, AppError> {
        let result = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, password_hash, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => row.try_into(),
            // Two registrations racing past the pre-check land here.
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::BadRequest(DUPLICATE_EMAIL.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
