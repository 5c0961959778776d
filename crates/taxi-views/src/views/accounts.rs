//! Login and logout.

use axum::extract::{RawQuery, State};
use serde_json::json;

use taxi_auth::middleware::found;
use taxi_auth::{session_auth, AuthContext};
use taxi_core::{QueryDict, TaxiError};
use taxi_db::drivers;
use taxi_forms::auth::AuthenticationForm;
use taxi_forms::Form;

use crate::error::ViewResult;
use crate::state::AppState;
use crate::templates::render;

/// Returns `next` when it is a local path, else the configured default.
///
/// Anything not starting with a single `/` (absolute URLs, `//host`) is
/// ignored, as is any path holding a backslash or a control character,
/// since browsers read `/\host` as `//host`.
pub fn safe_redirect_target<'a>(next: Option<&'a str>, default: &'a str) -> &'a str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => default,
    }
}

fn login_page(
    state: &AppState,
    ctx: &AuthContext,
    form: &AuthenticationForm,
    next: &str,
) -> ViewResult {
    render(
        state,
        "registration/login.html",
        ctx.user.as_ref(),
        json!({ "form": form.as_context(), "next": next }),
    )
}

/// `GET /accounts/login/?next=`
pub async fn login_form(
    State(state): State<AppState>,
    ctx: AuthContext,
    RawQuery(query): RawQuery,
) -> ViewResult {
    let query = QueryDict::parse(query.as_deref().unwrap_or_default());
    let form = AuthenticationForm::new(state.db.clone());
    login_page(&state, &ctx, &form, query.get("next").unwrap_or_default())
}

/// `POST /accounts/login/`
///
/// On success the session is bound to the driver and the browser goes to
/// `next`, or to the login redirect URL.
pub async fn login(
    State(state): State<AppState>,
    ctx: AuthContext,
    body: String,
) -> ViewResult {
    let data = QueryDict::parse(&body);
    let next = data.get("next").unwrap_or_default().to_string();

    let mut form = AuthenticationForm::new(state.db.clone());
    form.bind(&data);
    if !form.validate().await? {
        tracing::warn!(username = data.get("username").unwrap_or_default(), "failed login");
        return login_page(&state, &ctx, &form, &next);
    }
    let driver = form
        .into_user()
        .ok_or_else(|| TaxiError::InternalServerError("validated login has no user".into()))?;

    {
        let mut session = ctx.session.lock().await;
        session_auth::login(&mut session, &driver, &state.settings.secret_key)?;
    }
    drivers::touch_last_login(&state.db, driver.id).await?;

    let target = safe_redirect_target(
        Some(next.as_str()).filter(|n| !n.is_empty()),
        &state.settings.login_redirect_url,
    );
    Ok(found(target))
}

/// `POST /accounts/logout/`
pub async fn logout(State(state): State<AppState>, ctx: AuthContext) -> ViewResult {
    session_auth::logout(&mut *ctx.session.lock().await);
    Ok(found(&state.settings.login_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_redirect_target() {
        assert_eq!(safe_redirect_target(Some("/cars/"), "/"), "/cars/");
        assert_eq!(safe_redirect_target(Some("//evil.example"), "/"), "/");
        assert_eq!(safe_redirect_target(Some("https://evil.example/"), "/"), "/");
        assert_eq!(safe_redirect_target(None, "/"), "/");
    }

    #[test]
    fn test_safe_redirect_target_rejects_backslash_and_control() {
        assert_eq!(safe_redirect_target(Some("/\\evil.example"), "/"), "/");
        assert_eq!(safe_redirect_target(Some("/\\evil.example/"), "/"), "/");
        assert_eq!(safe_redirect_target(Some("/cars/\\x"), "/"), "/");
        assert_eq!(safe_redirect_target(Some("/\t/evil.example"), "/"), "/");
        assert_eq!(safe_redirect_target(Some("/cars/\r\nX: y"), "/"), "/");
        assert_eq!(safe_redirect_target(Some("/drivers/1/"), "/"), "/drivers/1/");
    }
}
