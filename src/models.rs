use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The public shape of a user record from the `users` table. The credential
/// hash is deliberately absent: it never leaves the repository layer except
/// through the dedicated credential lookups.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct User {
    // Storage-assigned primary key; immutable once created.
    pub id: i64,
    pub name: String,
    // Short public handle, unique alongside email.
    pub nick: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Credential
///
/// Internal login-time projection of a user record: just the identity and the
/// stored password hash. Only the login handler and the password-change flow
/// ever see this shape.
#[derive(Debug, Clone, FromRow)]
pub struct Credential {
    pub id: i64,
    // Self-describing PHC hash string (algorithm, cost, salt, digest).
    pub password_hash: String,
}

/// Publication
///
/// A post authored by a user, from the `publications` table enriched with the
/// author's nick (a join operation).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow, Default)]
pub struct Publication {
    pub id: i64,
    pub title: String,
    pub content: String,
    // FK to users.id (owner). Every mutation is gated on this value.
    pub author_id: i64,
    // Loaded via a JOIN in the repository query.
    #[sqlx(default)]
    pub author_nick: String,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterUserRequest
///
/// Input payload for the public registration endpoint (POST /users). The
/// plaintext password exists only for the duration of the request and is
/// hashed before anything is persisted; it is never logged.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, message = "the name is required and cannot be blank"))]
    pub name: String,
    #[validate(length(min = 1, message = "the nick is required and cannot be blank"))]
    pub nick: String,
    #[validate(email(message = "the email provided is not a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "the password is required and cannot be blank"))]
    pub password: String,
}

impl RegisterUserRequest {
    /// Trims surrounding whitespace from the identity fields. The password is
    /// left untouched: whitespace may be part of the credential.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.nick = self.nick.trim().to_string();
        self.email = self.email.trim().to_string();
    }
}

/// NewUser
///
/// The fully prepared record handed to the repository for insertion:
/// normalized identity fields plus the already-hashed credential.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub nick: String,
    pub email: String,
    pub password_hash: String,
}

/// UpdateUserRequest
///
/// Payload for modifying a user's identity fields (PUT /users/{id}).
/// Password changes go through their own endpoint with a stronger guard.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "the name is required and cannot be blank"))]
    pub name: String,
    #[validate(length(min = 1, message = "the nick is required and cannot be blank"))]
    pub nick: String,
    #[validate(email(message = "the email provided is not a valid address"))]
    pub email: String,
}

impl UpdateUserRequest {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.nick = self.nick.trim().to_string();
        self.email = self.email.trim().to_string();
    }
}

/// LoginRequest
///
/// Credentials presented to POST /login. Transient; neither field is ever
/// persisted or logged.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "the email provided is not a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "the password is required and cannot be blank"))]
    pub password: String,
}

/// TokenResponse
///
/// Output of a successful login: the signed bearer token the client must
/// present on every protected route.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// ChangePasswordRequest
///
/// Payload for POST /users/{id}/password. The current password is required as
/// a second, independent authorization factor on top of identity ownership.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "the current password is required"))]
    pub current: String,
    #[validate(length(min = 1, message = "the new password is required"))]
    pub new: String,
}

/// CreatePublicationRequest
///
/// Input payload for submitting a new publication (POST /publications).
/// The author is always the authenticated principal, never client-supplied.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreatePublicationRequest {
    #[validate(length(min = 1, message = "the title is required and cannot be blank"))]
    pub title: String,
    #[validate(length(min = 1, message = "the content is required and cannot be blank"))]
    pub content: String,
}

impl CreatePublicationRequest {
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.content = self.content.trim().to_string();
    }
}

/// UpdatePublicationRequest
///
/// Payload for rewriting a publication's text (PUT /publications/{id}).
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct UpdatePublicationRequest {
    #[validate(length(min = 1, message = "the title is required and cannot be blank"))]
    pub title: String,
    #[validate(length(min = 1, message = "the content is required and cannot be blank"))]
    pub content: String,
}

impl UpdatePublicationRequest {
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.content = self.content.trim().to_string();
    }
}
