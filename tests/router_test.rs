/// Single-request checks that drive the router directly, without a socket.
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use pimang::backend::{Backend, MemoryBackend};
use pimang::config::Config;
use pimang::state::AppState;

fn app() -> axum::Router {
    pimang::app(AppState::new(Arc::new(MemoryBackend::new()), Config::default()))
}

#[tokio::test]
async fn commenting_requires_sign_in() {
    let response = app()
        .oneshot(
            Request::post("/posts/some-id/comments")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("content=hello"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn unknown_session_cookie_is_treated_as_signed_out() {
    let response = app()
        .oneshot(
            Request::get("/me")
                .header(header::COOKIE, "pimang_session=not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn login_with_blank_fields_is_rejected_locally() {
    let response = app()
        .oneshot(
            Request::post("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("email=&password="))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("이메일과 비밀번호를 입력해주세요."));
}

#[tokio::test]
async fn confirm_notice_is_shown_on_login_page() {
    let response = app()
        .oneshot(
            Request::get("/login?notice=confirm")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();
    assert!(body.contains("가입 확인 메일을 보냈습니다."));
}

#[tokio::test]
async fn expired_backend_token_is_refreshed_transparently() {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .add_user("p@example.com", "secret1", "플레이어", false)
        .await;
    let session = backend.sign_in("p@example.com", "secret1").await.unwrap();
    backend.expire_access_token(&session.access_token).await;

    let mut session = session;
    session.expires_at = chrono::Utc::now();
    let state = AppState::new(backend, Config::default());
    let token = state.sessions.lock().await.create(session);

    let response = pimang::app(state.clone())
        .oneshot(
            Request::get("/me")
                .header(header::COOKIE, format!("pimang_session={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.sessions.lock().await.len(), 1);
}

#[tokio::test]
async fn unknown_path_is_404() {
    let response = app()
        .oneshot(Request::get("/community").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
