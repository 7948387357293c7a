use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Redirect;
use chrono::{Duration, Utc};

use crate::auth::session::get_cookie_value;
use crate::backend::AuthSession;
use crate::config::Config;
use crate::state::AppState;

/// Backend access tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Represents the currently signed-in member.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub is_admin: bool,
    /// Backend access token, used for writes under the member's identity.
    pub access_token: String,
    /// Cookie token identifying the local session.
    pub session_token: String,
}

impl CurrentUser {
    fn from_session(session_token: &str, session: AuthSession, config: &Config) -> Self {
        let is_admin = session.user.is_admin || config.is_admin_email(session.user.email.as_deref());
        Self {
            id: session.user.id,
            email: session.user.email,
            nickname: session.user.nickname,
            is_admin,
            access_token: session.access_token,
            session_token: session_token.to_string(),
        }
    }

    pub fn display_name(&self) -> String {
        self.nickname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or_default()
            .to_string()
    }
}

/// Look up the cookie's session, refreshing the backend tokens once when
/// they are about to lapse. A failed refresh ends the session.
async fn resolve_session(parts: &Parts, state: &AppState) -> Option<CurrentUser> {
    let token = get_cookie_value(parts, &state.config.auth.cookie_name)?;
    let session = state.sessions.lock().await.get(token)?;

    let session = if session.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) <= Utc::now() {
        match state.backend.refresh(&session.refresh_token).await {
            Ok(renewed) => {
                tracing::info!("Refreshed backend session for user {}", renewed.user.id);
                state.sessions.lock().await.replace(token, renewed.clone());
                renewed
            }
            Err(e) => {
                tracing::warn!("Session refresh failed, signing out: {}", e);
                state.sessions.lock().await.remove(token);
                return None;
            }
        }
    } else {
        session
    };

    Some(CurrentUser::from_session(token, session, &state.config))
}

/// Extractor that requires a signed-in member.
/// Visitors without a session are sent to the login page.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state)
            .await
            .ok_or_else(|| Redirect::to("/login"))
    }
}

/// Optional user extractor. Returns None instead of redirecting.
pub struct MaybeUser(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(resolve_session(parts, state).await))
    }
}

/// Signed-in member with the admin flag. Everyone else goes back home.
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_session(parts, state).await {
            Some(user) if user.is_admin => Ok(AdminUser(user)),
            _ => Err(Redirect::to("/")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::{header, Request};

    use crate::backend::{Backend, MemoryBackend};

    fn state_with(backend: Arc<MemoryBackend>, admin_emails: Vec<String>) -> AppState {
        let mut config = Config::default();
        config.auth.admin_emails = admin_emails;
        AppState::new(backend, config)
    }

    fn parts_with_cookie(cookie: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(header::COOKIE, cookie)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[tokio::test]
    async fn missing_cookie_resolves_to_nobody() {
        let state = state_with(Arc::new(MemoryBackend::new()), vec![]);
        let mut parts = parts_with_cookie("other=1");
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn admin_email_grants_admin_flag() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .add_user("boss@example.com", "secret1", "사장", false)
            .await;
        let session = backend.sign_in("boss@example.com", "secret1").await.unwrap();
        let state = state_with(backend, vec!["boss@example.com".into()]);
        let token = state.sessions.lock().await.create(session);

        let mut parts = parts_with_cookie(&format!("pimang_session={}", token));
        let AdminUser(user) = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(user.display_name(), "사장");
    }

    #[tokio::test]
    async fn expiring_tokens_are_refreshed() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .add_user("p@example.com", "secret1", "플레이어", false)
            .await;
        let mut session = backend.sign_in("p@example.com", "secret1").await.unwrap();
        let stale_access = session.access_token.clone();
        session.expires_at = Utc::now();
        let state = state_with(backend, vec![]);
        let token = state.sessions.lock().await.create(session);

        let mut parts = parts_with_cookie(&format!("pimang_session={}", token));
        let user = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_ne!(user.access_token, stale_access);

        let stored = state.sessions.lock().await.get(&token).unwrap();
        assert_eq!(stored.access_token, user.access_token);
    }

    #[tokio::test]
    async fn failed_refresh_drops_the_session() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .add_user("q@example.com", "secret1", "큐", false)
            .await;
        let mut session = backend.sign_in("q@example.com", "secret1").await.unwrap();
        session.expires_at = Utc::now();
        session.refresh_token = "revoked".to_string();
        let state = state_with(backend, vec![]);
        let token = state.sessions.lock().await.create(session);

        let mut parts = parts_with_cookie(&format!("pimang_session={}", token));
        assert!(CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .is_err());
        assert!(state.sessions.lock().await.is_empty());
    }
}
