mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{MockRepository, app_state};
use devlink::{config::Env, create_router, models::Credential, security};
use std::sync::{Arc, atomic::Ordering};
use tower::ServiceExt;

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn protected_route_without_token_short_circuits_before_the_handler() {
    let repo = Arc::new(MockRepository::default());
    let app = create_router(app_state(Env::Production, repo.clone()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/publications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    // The feed handler must never have run.
    assert_eq!(repo.feed_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn protected_route_with_valid_token_reaches_the_handler() {
    let repo = Arc::new(MockRepository::default());
    let state = app_state(Env::Production, repo.clone());
    let token = state.tokens.issue(7).unwrap();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/publications")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(repo.feed_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn expired_token_is_rejected_with_a_distinguishable_message() {
    let repo = Arc::new(MockRepository::default());
    let state = app_state(Env::Production, repo.clone());
    let expired = devlink::TokenService::new(common::TEST_JWT_SECRET, -100)
        .issue(7)
        .unwrap();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/publications")
                .header(header::AUTHORIZATION, format!("Bearer {}", expired))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(response).await.contains("expired"));
    assert_eq!(repo.feed_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn public_route_is_served_without_a_token() {
    let repo = Arc::new(MockRepository::default());
    let app = create_router(app_state(Env::Production, repo));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn every_response_carries_a_request_correlation_id() {
    // The logging/correlation layer wraps all routes, including rejected
    // ones, so even a 401 response is traceable.
    let repo = Arc::new(MockRepository::default());
    let app = create_router(app_state(Env::Production, repo));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/publications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn login_exchanges_valid_credentials_for_a_working_token() {
    let repo = Arc::new(MockRepository::default());
    *repo.credential.lock().unwrap() = Some(Credential {
        id: 7,
        password_hash: security::hash_password("s3cret-pass").unwrap(),
    });
    let state = app_state(Env::Production, repo.clone());
    let tokens = state.tokens.clone();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "email": "user@example.com",
                        "password": "s3cret-pass"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    let token = body["token"].as_str().unwrap();
    assert_eq!(tokens.extract_subject(token).unwrap(), 7);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized_without_detail() {
    let repo = Arc::new(MockRepository::default());
    *repo.credential.lock().unwrap() = Some(Credential {
        id: 7,
        password_hash: security::hash_password("s3cret-pass").unwrap(),
    });
    let app = create_router(app_state(Env::Production, repo));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "email": "user@example.com",
                        "password": "wrong-pass"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(response).await.contains("invalid credentials"));
}

#[tokio::test]
async fn login_with_unknown_email_looks_identical_to_wrong_password() {
    // No credential loaded: the account does not exist. The outcome must not
    // reveal that.
    let repo = Arc::new(MockRepository::default());
    let app = create_router(app_state(Env::Production, repo));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "email": "nobody@example.com",
                        "password": "whatever"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(response).await.contains("invalid credentials"));
}
