//! Axum middleware for sessions and access control.
//!
//! [`session_middleware`] must wrap every route. It loads the session named
//! by the cookie, resolves the logged-in driver and inserts an
//! [`AuthContext`] into the request extensions. After the handler runs it
//! persists a modified session and sets the cookie.
//!
//! [`login_required`] and [`staff_required`] sit inside it and redirect
//! anonymous (or non-staff) requests to the login page with `?next=`.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{OriginalUri, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use http::header::{COOKIE, LOCATION, SET_COOKIE};
use http::{HeaderValue, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use taxi_core::Settings;
use taxi_db::{Driver, SqliteBackend};

use crate::session::{
    build_delete_cookie, build_set_cookie, generate_session_key, read_cookie, Session,
    SessionBackend, SessionData,
};
use crate::session_auth;

/// Characters left unescaped in the `next` parameter.
const NEXT_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Shared state for the auth middleware.
#[derive(Clone)]
pub struct AuthState {
    pub db: SqliteBackend,
    pub sessions: Arc<dyn SessionBackend>,
    pub settings: Arc<Settings>,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("db", &self.db)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// The request's session and logged-in driver.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub session: Session,
    pub user: Option<Driver>,
}

impl AuthContext {
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_staff(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_active && u.is_staff)
    }
}

/// Extractor for handlers that only run behind [`login_required`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Driver);

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CurrentUser {
    type Rejection = http::StatusCode;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(|ctx| ctx.user.clone())
            .map(Self)
            .ok_or(http::StatusCode::UNAUTHORIZED)
    }
}

impl<S: Send + Sync> axum::extract::FromRequestParts<S> for AuthContext {
    type Rejection = http::StatusCode;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Loads the session and the current driver; saves the session afterwards.
pub async fn session_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let cookie_name = state.settings.session_cookie_name.as_str();
    let cookie_age = i64::try_from(state.settings.session_cookie_age).unwrap_or(1_209_600);

    let incoming_key = req
        .headers()
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|header| read_cookie(header, cookie_name))
        .map(str::to_string);

    let loaded = match &incoming_key {
        Some(key) => state.sessions.load(key).await.ok(),
        None => None,
    };
    let mut data =
        loaded.unwrap_or_else(|| SessionData::with_lifetime(generate_session_key(), cookie_age));

    let user = match session_auth::get_user(&state.db, &mut data, &state.settings.secret_key).await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "failed to load session user");
            None
        }
    };

    let session = Session::new(data);
    req.extensions_mut().insert(AuthContext {
        session: session.clone(),
        user,
    });

    let mut response = next.run(req).await;

    let data = session.snapshot().await;
    if let Err(e) = persist(&state, incoming_key.as_deref(), &data, &mut response).await {
        tracing::error!(error = %e, "failed to save session");
    }
    response
}

async fn persist(
    state: &AuthState,
    incoming_key: Option<&str>,
    data: &SessionData,
    response: &mut Response,
) -> Result<(), taxi_core::TaxiError> {
    let cookie_name = state.settings.session_cookie_name.as_str();

    if let Some(old) = incoming_key.filter(|old| *old != data.session_key) {
        state.sessions.delete(old).await?;
    }

    if !data.modified {
        return Ok(());
    }

    let cookie = if data.is_empty() {
        state.sessions.delete(&data.session_key).await?;
        if incoming_key.is_none() {
            return Ok(());
        }
        build_delete_cookie(cookie_name)
    } else {
        let mut saved = data.clone();
        saved.modified = false;
        state.sessions.save(&saved).await?;
        build_set_cookie(cookie_name, &data.session_key, state.settings.session_cookie_age)
    };

    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(())
}

/// A `302 Found` redirect.
pub fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Builds `{login_url}?next={path}` for a request.
pub fn login_redirect_url(login_url: &str, req_path_and_query: &str) -> String {
    let next = utf8_percent_encode(req_path_and_query, NEXT_SAFE);
    format!("{login_url}?next={next}")
}

fn redirect_to_login(state: &AuthState, req: &Request<Body>) -> Response {
    // Nested routers see a stripped path; the original one goes in `next`.
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map_or_else(|| req.uri(), |original| &original.0);
    let target = uri.path_and_query().map_or_else(|| uri.path(), |pq| pq.as_str());
    found(&login_redirect_url(&state.settings.login_url, target))
}

/// Redirects anonymous requests to the login page.
pub async fn login_required(
    State(state): State<AuthState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let authenticated = req
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_authenticated);
    if !authenticated {
        tracing::debug!(path = %req.uri().path(), "anonymous request redirected to login");
        return redirect_to_login(&state, &req);
    }
    next.run(req).await
}

/// Redirects requests from anyone but active staff to the login page.
pub async fn staff_required(
    State(state): State<AuthState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let staff = req
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_staff);
    if !staff {
        tracing::debug!(path = %req.uri().path(), "non-staff request redirected to login");
        return redirect_to_login(&state, &req);
    }
    next.run(req).await
}
