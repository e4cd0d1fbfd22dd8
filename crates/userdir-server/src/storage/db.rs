//! PostgreSQL record store

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use userdir_core::ports::UserStore;
use userdir_core::{NewUser, User, UserDirError};

pub struct Database {
    pool: Arc<PgPool>,
}

impl Database {
    /// `timeout` bounds pool acquisition and, as the session
    /// `statement_timeout`, every statement. The server aborts a statement
    /// that runs too long, so a timed-out insert never commits.
    pub async fn new(dsn: &str, max_connections: u32, timeout: Duration) -> Result<Self> {
        tracing::info!("Connecting to PostgreSQL...");

        let options = connect_options(dsn, timeout)?;

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect_with(options)
            .await
            .context("Failed to connect to PostgreSQL")?;

        tracing::info!("PostgreSQL connection established, running migrations...");

        Self::run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        tracing::info!("Database initialization complete");

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    async fn run_migrations(pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(pool)
        .await?;

        // Rows written with explicit ids never advance the sequence; move it
        // past the current maximum so generated ids keep increasing.
        sqlx::query(
            r#"
            SELECT setval(
                pg_get_serial_sequence('users', 'id'),
                COALESCE((SELECT MAX(id) FROM users), 0) + 1,
                false
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn connect_options(dsn: &str, timeout: Duration) -> Result<PgConnectOptions> {
    let options: PgConnectOptions = dsn.parse().context("Invalid POSTGRES_DSN")?;
    Ok(options.options([(
        "statement_timeout",
        timeout.as_millis().to_string(),
    )]))
}

#[async_trait]
impl UserStore for Database {
    async fn list_users(&self) -> userdir_core::Result<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT id, name, email FROM users ORDER BY id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create_user(&self, user: &NewUser) -> userdir_core::Result<User> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&*self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }
}

fn db_error(e: sqlx::Error) -> UserDirError {
    UserDirError::Database(e.to_string())
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            name: r.name,
            email: r.email,
        }
    }
}
