use crate::{
    AppState,
    auth::AuthUser,
    authz::{ensure_not_self, ensure_owner},
    errors::ApiError,
    models::{
        ChangePasswordRequest, CreatePublicationRequest, LoginRequest, NewUser, Publication,
        RegisterUserRequest, TokenResponse, UpdatePublicationRequest, UpdateUserRequest, User,
    },
    security,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

// --- Filter Structs ---

/// UserFilter
///
/// Accepted query parameters for the user search endpoint (GET /users).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct UserFilter {
    /// Substring matched against both name and nick, case-insensitively.
    pub user: Option<String>,
}

// --- Session ---

/// login
///
/// [Public Route] Exchanges an email/password pair for a signed bearer token.
///
/// *Security*: an unknown email and a wrong password produce the identical
/// 401 outcome, so the endpoint cannot be used to probe which accounts exist.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.validate()?;

    let credential = state
        .repo
        .credential_by_email(&payload.email)
        .await?
        .ok_or(ApiError::Password(security::PasswordError::Mismatch))?;

    security::verify_password(&credential.password_hash, &payload.password)?;

    let token = state.tokens.issue(credential.id)?;

    Ok(Json(TokenResponse { token }))
}

// --- Users ---

/// register_user
///
/// [Public Route] Creates a new account. The password is hashed before the
/// repository ever sees the record; the response carries the public user
/// shape only.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 409, description = "Email or nick already taken")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    payload.normalize();
    payload.validate()?;

    let password_hash = security::hash_password(&payload.password)?;

    let user = state
        .repo
        .create_user(NewUser {
            name: payload.name,
            nick: payload.nick,
            email: payload.email,
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// search_users
///
/// [Authenticated Route] Lists users whose name or nick matches the filter.
#[utoipa::path(
    get,
    path = "/users",
    params(UserFilter),
    responses((status = 200, description = "Matching users", body = [User]))
)]
pub async fn search_users(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<User>>, ApiError> {
    let term = filter.user.unwrap_or_default().to_lowercase();
    let users = state.repo.search_users(&term).await?;
    Ok(Json(users))
}

/// get_user
///
/// [Authenticated Route] Retrieves a single user by ID. A miss is a
/// first-class 404, never an empty record with a success status.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    match state.repo.get_user(user_id).await? {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound("user not found")),
    }
}

/// update_user
///
/// [Authenticated Route] Rewrites a user's identity fields.
///
/// *Authorization*: the path ID must equal the authenticated principal's ID;
/// the check runs before any write.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 403, description = "Not your account"),
        (status = 404, description = "No such user")
    )
)]
pub async fn update_user(
    AuthUser { id: requester_id }: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(mut payload): Json<UpdateUserRequest>,
) -> Result<StatusCode, ApiError> {
    ensure_owner(requester_id, user_id, "you cannot change another user's account")?;

    payload.normalize();
    payload.validate()?;

    if state.repo.update_user(user_id, payload).await? == 0 {
        return Err(ApiError::NotFound("user not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// delete_user
///
/// [Authenticated Route] Removes the principal's own account.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not your account")
    )
)]
pub async fn delete_user(
    AuthUser { id: requester_id }: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ensure_owner(requester_id, user_id, "you cannot delete another user's account")?;

    if state.repo.delete_user(user_id).await? == 0 {
        return Err(ApiError::NotFound("user not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// follow_user
///
/// [Authenticated Route] Adds the principal as a follower of the target.
///
/// *Authorization*: self-reference guard; a user cannot follow themself. The
/// check runs before any storage write.
#[utoipa::path(
    post,
    path = "/users/{id}/follow",
    params(("id" = i64, Path, description = "User to follow")),
    responses(
        (status = 204, description = "Following"),
        (status = 403, description = "Cannot follow yourself")
    )
)]
pub async fn follow_user(
    AuthUser { id: follower_id }: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ensure_not_self(follower_id, user_id, "you cannot follow yourself")?;

    if state.repo.get_user(user_id).await?.is_none() {
        return Err(ApiError::NotFound("user not found"));
    }
    state.repo.follow(user_id, follower_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// unfollow_user
///
/// [Authenticated Route] Removes the principal from the target's followers.
/// Same self-reference guard and placement as `follow_user`.
#[utoipa::path(
    post,
    path = "/users/{id}/unfollow",
    params(("id" = i64, Path, description = "User to unfollow")),
    responses(
        (status = 204, description = "No longer following"),
        (status = 403, description = "Cannot unfollow yourself")
    )
)]
pub async fn unfollow_user(
    AuthUser { id: follower_id }: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ensure_not_self(follower_id, user_id, "you cannot unfollow yourself")?;

    state.repo.unfollow(user_id, follower_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// get_followers
///
/// [Authenticated Route] Lists the users following the given user.
#[utoipa::path(
    get,
    path = "/users/{id}/followers",
    params(("id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "Followers", body = [User]))
)]
pub async fn get_followers(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.repo.followers(user_id).await?))
}

/// get_following
///
/// [Authenticated Route] Lists the users the given user follows.
#[utoipa::path(
    get,
    path = "/users/{id}/following",
    params(("id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "Following", body = [User]))
)]
pub async fn get_following(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.repo.following(user_id).await?))
}

/// change_password
///
/// [Authenticated Route] Rotates the principal's credential.
///
/// *Authorization*: two independent factors. The path ID must match the
/// principal (ownership), and the submitted current password must verify
/// against the stored hash before the new hash is written. A wrong current
/// password leaves the stored hash untouched.
#[utoipa::path(
    post,
    path = "/users/{id}/password",
    params(("id" = i64, Path, description = "User ID")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Current password is wrong"),
        (status = 403, description = "Not your account")
    )
)]
pub async fn change_password(
    AuthUser { id: requester_id }: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    ensure_owner(
        requester_id,
        user_id,
        "you cannot change another user's password",
    )?;

    payload.validate()?;

    let stored_hash = state
        .repo
        .password_hash(user_id)
        .await?
        .ok_or(ApiError::NotFound("user not found"))?;

    // Second authorization factor: the caller must prove knowledge of the
    // current credential before anything is written.
    security::verify_password(&stored_hash, &payload.current)?;

    let new_hash = security::hash_password(&payload.new)?;
    state.repo.update_password(user_id, &new_hash).await?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Publications ---

/// create_publication
///
/// [Authenticated Route] Submits a new publication. The author is always the
/// authenticated principal; a client-supplied author ID is not accepted.
#[utoipa::path(
    post,
    path = "/publications",
    request_body = CreatePublicationRequest,
    responses((status = 201, description = "Created", body = Publication))
)]
pub async fn create_publication(
    AuthUser { id: author_id }: AuthUser,
    State(state): State<AppState>,
    Json(mut payload): Json<CreatePublicationRequest>,
) -> Result<(StatusCode, Json<Publication>), ApiError> {
    payload.normalize();
    payload.validate()?;

    let publication = state
        .repo
        .create_publication(author_id, &payload.title, &payload.content)
        .await?;

    Ok((StatusCode::CREATED, Json(publication)))
}

/// get_feed
///
/// [Authenticated Route] The principal's feed: their own publications plus
/// those of everyone they follow, newest first.
#[utoipa::path(
    get,
    path = "/publications",
    responses((status = 200, description = "Feed", body = [Publication]))
)]
pub async fn get_feed(
    AuthUser { id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Publication>>, ApiError> {
    Ok(Json(state.repo.feed(id).await?))
}

/// get_publication
///
/// [Authenticated Route] Retrieves a single publication by ID.
#[utoipa::path(
    get,
    path = "/publications/{id}",
    params(("id" = i64, Path, description = "Publication ID")),
    responses(
        (status = 200, description = "Found", body = Publication),
        (status = 404, description = "No such publication")
    )
)]
pub async fn get_publication(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(publication_id): Path<i64>,
) -> Result<Json<Publication>, ApiError> {
    match state.repo.get_publication(publication_id).await? {
        Some(publication) => Ok(Json(publication)),
        None => Err(ApiError::NotFound("publication not found")),
    }
}

/// update_publication
///
/// [Authenticated Route] Rewrites a publication's title and content.
///
/// *Authorization*: the current owner is fetched from storage and compared to
/// the principal before the write; a mismatch is a 403 and nothing mutates.
#[utoipa::path(
    put,
    path = "/publications/{id}",
    params(("id" = i64, Path, description = "Publication ID")),
    request_body = UpdatePublicationRequest,
    responses(
        (status = 204, description = "Updated"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such publication")
    )
)]
pub async fn update_publication(
    AuthUser { id: requester_id }: AuthUser,
    State(state): State<AppState>,
    Path(publication_id): Path<i64>,
    Json(mut payload): Json<UpdatePublicationRequest>,
) -> Result<StatusCode, ApiError> {
    let publication = state
        .repo
        .get_publication(publication_id)
        .await?
        .ok_or(ApiError::NotFound("publication not found"))?;

    ensure_owner(
        requester_id,
        publication.author_id,
        "you cannot change a publication that is not yours",
    )?;

    payload.normalize();
    payload.validate()?;

    state.repo.update_publication(publication_id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// delete_publication
///
/// [Authenticated Route] Removes a publication. Same fetch-owner-then-compare
/// protocol as `update_publication`.
#[utoipa::path(
    delete,
    path = "/publications/{id}",
    params(("id" = i64, Path, description = "Publication ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "No such publication")
    )
)]
pub async fn delete_publication(
    AuthUser { id: requester_id }: AuthUser,
    State(state): State<AppState>,
    Path(publication_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let publication = state
        .repo
        .get_publication(publication_id)
        .await?
        .ok_or(ApiError::NotFound("publication not found"))?;

    ensure_owner(
        requester_id,
        publication.author_id,
        "you cannot delete a publication that is not yours",
    )?;

    state.repo.delete_publication(publication_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// get_user_publications
///
/// [Authenticated Route] Lists all publications authored by a given user.
#[utoipa::path(
    get,
    path = "/users/{id}/publications",
    params(("id" = i64, Path, description = "User ID")),
    responses((status = 200, description = "Publications", body = [Publication]))
)]
pub async fn get_user_publications(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<Publication>>, ApiError> {
    Ok(Json(state.repo.publications_by_user(user_id).await?))
}

/// like_publication
///
/// [Authenticated Route] Increments a publication's like counter.
#[utoipa::path(
    post,
    path = "/publications/{id}/like",
    params(("id" = i64, Path, description = "Publication ID")),
    responses(
        (status = 204, description = "Liked"),
        (status = 404, description = "No such publication")
    )
)]
pub async fn like_publication(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(publication_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.repo.like_publication(publication_id).await? == 0 {
        return Err(ApiError::NotFound("publication not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// unlike_publication
///
/// [Authenticated Route] Decrements a publication's like counter; the counter
/// never goes below zero.
#[utoipa::path(
    post,
    path = "/publications/{id}/unlike",
    params(("id" = i64, Path, description = "Publication ID")),
    responses(
        (status = 204, description = "Unliked"),
        (status = 404, description = "No such publication")
    )
)]
pub async fn unlike_publication(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(publication_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if state.repo.unlike_publication(publication_id).await? == 0 {
        return Err(ApiError::NotFound("publication not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
