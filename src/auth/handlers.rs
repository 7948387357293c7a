use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use crate::auth::session;
use crate::backend::{AuthSession, BackendError, SignUp};
use crate::board::forms::{login_error_message, LoginForm, SignupForm};
use crate::error::AppResult;
use crate::extractors::MaybeUser;
use crate::routes::home::Html;
use crate::routes::Nav;
use crate::state::AppState;

pub const SERVICE_UNAVAILABLE: &str = "요청을 처리하지 못했습니다. 잠시 후 다시 시도해주세요.";
pub const CONFIRM_NOTICE: &str = "가입 확인 메일을 보냈습니다. 메일 인증 후 로그인해주세요.";

// -- Templates --

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub email: String,
    pub error: String,
    pub notice: String,
}

#[derive(Template)]
#[template(path = "pages/signup.html")]
pub struct SignupTemplate {
    pub nav: Nav,
    pub nickname: String,
    pub email: String,
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    pub notice: Option<String>,
}

/// Store the backend session and hand the browser its cookie.
async fn sign_in_response(state: &AppState, session: AuthSession) -> Response {
    let user_id = session.user.id.clone();
    let token = state.sessions.lock().await.create(session);
    tracing::info!("User {} signed in", user_id);

    let auth = &state.config.auth;
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (
                header::SET_COOKIE,
                session::session_cookie(
                    &auth.cookie_name,
                    &token,
                    auth.session_hours,
                    auth.secure_cookie,
                ),
            ),
        ],
        "",
    )
        .into_response()
}

// -- Login --

/// GET /login
pub async fn login_page(
    maybe_user: MaybeUser,
    Query(params): Query<LoginParams>,
) -> AppResult<Response> {
    let notice = match params.notice.as_deref() {
        Some("confirm") => CONFIRM_NOTICE.to_string(),
        _ => String::new(),
    };
    Ok(Html(LoginTemplate {
        nav: Nav::new(maybe_user.0.as_ref()),
        email: String::new(),
        error: String::new(),
        notice,
    })
    .into_response())
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let failed = |error: String| {
        Html(LoginTemplate {
            nav: Nav::new(maybe_user.0.as_ref()),
            email: form.email.clone(),
            error,
            notice: String::new(),
        })
        .into_response()
    };

    if let Err(message) = form.validate() {
        return Ok(failed(message.to_string()));
    }

    match state.backend.sign_in(form.email.trim(), &form.password).await {
        Ok(session) => Ok(sign_in_response(&state, session).await),
        Err(BackendError::Auth(message)) => {
            tracing::warn!("Sign-in rejected for {}: {}", form.email.trim(), message);
            Ok(failed(login_error_message(&message)))
        }
        Err(e) => {
            tracing::error!("Sign-in failed: {}", e);
            Ok(failed(SERVICE_UNAVAILABLE.to_string()))
        }
    }
}

// -- Signup --

/// GET /signup
pub async fn signup_page(maybe_user: MaybeUser) -> AppResult<Response> {
    Ok(Html(SignupTemplate {
        nav: Nav::new(maybe_user.0.as_ref()),
        nickname: String::new(),
        email: String::new(),
        error: String::new(),
    })
    .into_response())
}

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    maybe_user: MaybeUser,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let failed = |error: String| {
        Html(SignupTemplate {
            nav: Nav::new(maybe_user.0.as_ref()),
            nickname: form.nickname.clone(),
            email: form.email.clone(),
            error,
        })
        .into_response()
    };

    if let Err(message) = form.validate() {
        return Ok(failed(message.to_string()));
    }

    let result = state
        .backend
        .sign_up(form.email.trim(), &form.password, form.nickname.trim())
        .await;

    match result {
        Ok(SignUp::SignedIn(session)) => Ok(sign_in_response(&state, session).await),
        Ok(SignUp::ConfirmationRequired(user)) => {
            tracing::info!("User {} signed up, awaiting email confirmation", user.id);
            Ok(Redirect::to("/login?notice=confirm").into_response())
        }
        Err(BackendError::Auth(message)) => Ok(failed(message)),
        Err(e) => {
            tracing::error!("Sign-up failed: {}", e);
            Ok(failed(SERVICE_UNAVAILABLE.to_string()))
        }
    }
}

// -- Logout --

/// POST /logout: end the local session and revoke it at the service.
pub async fn logout(State(state): State<AppState>, maybe_user: MaybeUser) -> AppResult<Response> {
    if let Some(user) = maybe_user.0 {
        state.sessions.lock().await.remove(&user.session_token);
        match state.backend.sign_out(&user.access_token).await {
            Ok(()) => tracing::info!("User {} signed out", user.id),
            Err(e) => tracing::warn!("Backend sign-out failed for {}: {}", user.id, e),
        }
    }

    Ok((
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (
                header::SET_COOKIE,
                session::clear_session_cookie(&state.config.auth.cookie_name),
            ),
        ],
        "",
    )
        .into_response())
}
