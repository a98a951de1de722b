use crate::models::{Credential, NewUser, Publication, UpdatePublicationRequest, UpdateUserRequest, User};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations. Handlers
/// interact with the data layer through this trait without knowing the
/// concrete implementation (Postgres in production, mocks in tests).
///
/// Every method returns a `Result` so storage failures propagate to the
/// request boundary as typed outcomes instead of being swallowed. `Option`
/// return values encode "not found", which the handler layer maps to a
/// first-class 404.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error>;
    // Case-insensitive search over name and nick.
    async fn search_users(&self, term: &str) -> Result<Vec<User>, sqlx::Error>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error>;
    // Returns the number of rows touched so callers can distinguish a miss.
    async fn update_user(&self, id: i64, user: UpdateUserRequest) -> Result<u64, sqlx::Error>;
    async fn delete_user(&self, id: i64) -> Result<u64, sqlx::Error>;

    // --- Credentials ---
    // Login lookup: identity plus stored hash, by email.
    async fn credential_by_email(&self, email: &str) -> Result<Option<Credential>, sqlx::Error>;
    // Current stored hash for the password-change re-verification guard.
    async fn password_hash(&self, user_id: i64) -> Result<Option<String>, sqlx::Error>;
    async fn update_password(&self, user_id: i64, hash: &str) -> Result<u64, sqlx::Error>;

    // --- Follow graph ---
    // Idempotent: following an already-followed user is not an error.
    async fn follow(&self, user_id: i64, follower_id: i64) -> Result<(), sqlx::Error>;
    async fn unfollow(&self, user_id: i64, follower_id: i64) -> Result<(), sqlx::Error>;
    async fn followers(&self, user_id: i64) -> Result<Vec<User>, sqlx::Error>;
    async fn following(&self, user_id: i64) -> Result<Vec<User>, sqlx::Error>;

    // --- Publications ---
    async fn create_publication(
        &self,
        author_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Publication, sqlx::Error>;
    // Feed: the requester's own publications plus those of followed authors.
    async fn feed(&self, user_id: i64) -> Result<Vec<Publication>, sqlx::Error>;
    async fn get_publication(&self, id: i64) -> Result<Option<Publication>, sqlx::Error>;
    async fn update_publication(
        &self,
        id: i64,
        publication: UpdatePublicationRequest,
    ) -> Result<u64, sqlx::Error>;
    async fn delete_publication(&self, id: i64) -> Result<u64, sqlx::Error>;
    async fn publications_by_user(&self, user_id: i64) -> Result<Vec<Publication>, sqlx::Error>;
    // Like counter maintenance; unlike never drops the counter below zero.
    async fn like_publication(&self, id: i64) -> Result<u64, sqlx::Error>;
    async fn unlike_publication(&self, id: i64) -> Result<u64, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, name, nick, email, created_at";

#[async_trait]
impl Repository for PostgresRepository {
    /// create_user
    ///
    /// Inserts a prepared user record (identity fields already normalized,
    /// password already hashed) and returns the stored public shape. The
    /// unique constraints on email and nick surface as database errors the
    /// error layer maps to 409.
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, nick, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, nick, email, created_at
            "#,
        )
        .bind(user.name)
        .bind(user.nick)
        .bind(user.email)
        .bind(user.password_hash)
        .fetch_one(&self.pool)
        .await
    }

    /// search_users
    ///
    /// Case-insensitive substring match over name and nick. The pattern is
    /// bound as a parameter, never interpolated.
    async fn search_users(&self, term: &str) -> Result<Vec<User>, sqlx::Error> {
        let pattern = format!("%{}%", term);
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE name ILIKE $1 OR nick ILIKE $1 ORDER BY created_at DESC"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update_user(&self, id: i64, user: UpdateUserRequest) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET name = $1, nick = $2, email = $3 WHERE id = $4")
            .bind(user.name)
            .bind(user.nick)
            .bind(user.email)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_user(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// credential_by_email
    ///
    /// The login projection: only the id and stored hash ever leave the
    /// repository here, not the full user record.
    async fn credential_by_email(&self, email: &str) -> Result<Option<Credential>, sqlx::Error> {
        sqlx::query_as::<_, Credential>("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
    }

    async fn password_hash(&self, user_id: i64) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update_password(&self, user_id: i64, hash: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// follow
    ///
    /// Inserts a follow edge. `ON CONFLICT DO NOTHING` makes the operation
    /// idempotent against double submission.
    async fn follow(&self, user_id: i64, follower_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO followers (user_id, follower_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(follower_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unfollow(&self, user_id: i64, follower_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM followers WHERE user_id = $1 AND follower_id = $2")
            .bind(user_id)
            .bind(follower_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// followers
    ///
    /// Everyone following `user_id`: join the edge table on the follower side.
    async fn followers(&self, user_id: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.nick, u.email, u.created_at
            FROM users u
            JOIN followers f ON u.id = f.follower_id
            WHERE f.user_id = $1
            ORDER BY u.nick ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// following
    ///
    /// Everyone `user_id` follows: join the edge table on the followed side.
    async fn following(&self, user_id: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.nick, u.email, u.created_at
            FROM users u
            JOIN followers f ON u.id = f.user_id
            WHERE f.follower_id = $1
            ORDER BY u.nick ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// create_publication
    ///
    /// Uses a CTE to perform the insert and the author-nick join in a single
    /// round trip, returning the enriched row the API exposes.
    async fn create_publication(
        &self,
        author_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Publication, sqlx::Error> {
        sqlx::query_as::<_, Publication>(
            r#"
            WITH inserted AS (
                INSERT INTO publications (title, content, author_id)
                VALUES ($1, $2, $3)
                RETURNING id, title, content, author_id, likes, created_at
            )
            SELECT i.id, i.title, i.content, i.author_id, u.nick AS author_nick,
                   i.likes, i.created_at
            FROM inserted i JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
    }

    /// feed
    ///
    /// The requester's own publications plus those authored by anyone they
    /// follow, newest first.
    async fn feed(&self, user_id: i64) -> Result<Vec<Publication>, sqlx::Error> {
        sqlx::query_as::<_, Publication>(
            r#"
            SELECT DISTINCT p.id, p.title, p.content, p.author_id,
                   u.nick AS author_nick, p.likes, p.created_at
            FROM publications p
            JOIN users u ON u.id = p.author_id
            LEFT JOIN followers f ON p.author_id = f.user_id
            WHERE p.author_id = $1 OR f.follower_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_publication(&self, id: i64) -> Result<Option<Publication>, sqlx::Error> {
        sqlx::query_as::<_, Publication>(
            r#"
            SELECT p.id, p.title, p.content, p.author_id, u.nick AS author_nick,
                   p.likes, p.created_at
            FROM publications p
            JOIN users u ON u.id = p.author_id
            WHERE p.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_publication(
        &self,
        id: i64,
        publication: UpdatePublicationRequest,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE publications SET title = $1, content = $2 WHERE id = $3")
            .bind(publication.title)
            .bind(publication.content)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_publication(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM publications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn publications_by_user(&self, user_id: i64) -> Result<Vec<Publication>, sqlx::Error> {
        sqlx::query_as::<_, Publication>(
            r#"
            SELECT p.id, p.title, p.content, p.author_id, u.nick AS author_nick,
                   p.likes, p.created_at
            FROM publications p
            JOIN users u ON u.id = p.author_id
            WHERE p.author_id = $1
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn like_publication(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE publications SET likes = likes + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// unlike_publication
    ///
    /// The counter is clamped at zero in SQL so concurrent unlikes can never
    /// drive it negative.
    async fn unlike_publication(&self, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE publications SET likes = CASE WHEN likes > 0 THEN likes - 1 ELSE 0 END WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
