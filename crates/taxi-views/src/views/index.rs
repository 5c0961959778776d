//! The home page.

use axum::extract::State;
use serde_json::{json, Value};

use taxi_auth::{AuthContext, CurrentUser};
use taxi_db::{cars, drivers, manufacturers};

use crate::error::ViewResult;
use crate::state::AppState;
use crate::templates::render;

/// Session key of the per-session visit counter.
pub const NUM_VISITS_KEY: &str = "num_visits";

/// `GET /`
///
/// Shows record counts and bumps the session's visit counter.
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ctx: AuthContext,
) -> ViewResult {
    let num_drivers = drivers::count(&state.db).await?;
    let num_cars = cars::count(&state.db).await?;
    let num_manufacturers = manufacturers::count(&state.db).await?;

    let num_visits = {
        let mut session = ctx.session.lock().await;
        let visits = session
            .get(NUM_VISITS_KEY)
            .and_then(Value::as_i64)
            .unwrap_or(0)
            + 1;
        session.set(NUM_VISITS_KEY, json!(visits));
        visits
    };

    render(
        &state,
        "taxi/index.html",
        Some(&user),
        json!({
            "num_drivers": num_drivers,
            "num_cars": num_cars,
            "num_manufacturers": num_manufacturers,
            "num_visits": num_visits,
        }),
    )
}
