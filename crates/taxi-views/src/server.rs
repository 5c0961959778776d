//! Routing and the HTTP server.
//!
//! [`TaxiApp`] ties settings, the database, the taxi pages and the admin site
//! into one axum [`Router`] and can serve it.
//!
//! # Examples
//!
//! ```no_run
//! use taxi_core::Settings;
//! use taxi_db::{schema, SqliteBackend};
//! use taxi_views::server::TaxiApp;
//!
//! # async fn example() -> taxi_core::TaxiResult<()> {
//! let db = SqliteBackend::open("taxi.sqlite3")?;
//! schema::migrate(&db).await?;
//! TaxiApp::new(Settings::default(), db).run("127.0.0.1:8000").await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use taxi_admin::{register_taxi_models, AdminSite};
use taxi_auth::middleware::{login_required, session_middleware};
use taxi_auth::SessionBackend;
use taxi_core::{Settings, TaxiError, TaxiResult};
use taxi_db::SqliteBackend;

use crate::state::AppState;
use crate::views::{self, accounts, cars, drivers, index, manufacturers};

/// The admin site with the taxi models registered.
pub fn admin_site() -> AdminSite {
    let mut site = AdminSite::new("admin");
    register_taxi_models(&mut site);
    site
}

/// Builds the full router for `state`.
///
/// Taxi pages sit behind [`login_required`], the admin behind its own staff
/// gate; the session middleware and request tracing wrap everything.
pub fn build_router(state: AppState) -> TaxiResult<Router> {
    let auth = state.auth_state();

    let taxi = Router::new()
        .route("/", get(index::index))
        .route("/manufacturers/", get(manufacturers::list))
        .route(
            "/manufacturers/create/",
            get(manufacturers::create_form).post(manufacturers::create),
        )
        .route(
            "/manufacturers/{pk}/update/",
            get(manufacturers::update_form).post(manufacturers::update),
        )
        .route(
            "/manufacturers/{pk}/delete/",
            get(manufacturers::delete_confirm).post(manufacturers::delete),
        )
        .route("/cars/", get(cars::list))
        .route("/cars/create/", get(cars::create_form).post(cars::create))
        .route("/cars/{pk}/", get(cars::detail))
        .route(
            "/cars/{pk}/update/",
            get(cars::update_form).post(cars::update),
        )
        .route(
            "/cars/{pk}/delete/",
            get(cars::delete_confirm).post(cars::delete),
        )
        .route("/cars/{pk}/toggle-assign/", post(cars::toggle_assign))
        .route("/drivers/", get(drivers::list))
        .route(
            "/drivers/create/",
            get(drivers::create_form).post(drivers::create),
        )
        .route("/drivers/{pk}/", get(drivers::detail))
        .route(
            "/drivers/{pk}/update/",
            get(drivers::update_form).post(drivers::update),
        )
        .route(
            "/drivers/{pk}/delete/",
            get(drivers::delete_confirm).post(drivers::delete),
        )
        .route_layer(from_fn_with_state(auth.clone(), login_required));

    let accounts = Router::new()
        .route(
            "/accounts/login/",
            get(accounts::login_form).post(accounts::login),
        )
        .route("/accounts/logout/", post(accounts::logout));

    let admin = admin_site().into_router(state.db.clone(), auth.clone())?;

    Ok(taxi
        .merge(accounts)
        .fallback(views::not_found)
        .with_state(state)
        .merge(admin)
        .layer(from_fn_with_state(auth, session_middleware))
        .layer(TraceLayer::new_for_http()))
}

/// The taxi service application.
pub struct TaxiApp {
    settings: Settings,
    db: SqliteBackend,
    sessions: Option<Arc<dyn SessionBackend>>,
}

impl TaxiApp {
    /// Creates the app over an already migrated database.
    pub const fn new(settings: Settings, db: SqliteBackend) -> Self {
        Self {
            settings,
            db,
            sessions: None,
        }
    }

    /// Replaces the default in-memory session store.
    #[must_use]
    pub fn sessions(mut self, sessions: Arc<dyn SessionBackend>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds the application state.
    pub fn state(self) -> TaxiResult<AppState> {
        match self.sessions {
            Some(sessions) => AppState::with_sessions(self.settings, self.db, sessions),
            None => AppState::new(self.settings, self.db),
        }
    }

    /// Converts the application into an axum router.
    pub fn into_router(self) -> TaxiResult<Router> {
        build_router(self.state()?)
    }

    /// Serves the application on `addr` until the process is stopped.
    pub async fn run(self, addr: &str) -> TaxiResult<()> {
        let debug = self.settings.debug;
        let router = self.into_router()?;
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            TaxiError::ConfigurationError(format!("Failed to bind to {addr}: {e}"))
        })?;

        if debug {
            tracing::info!("Starting development server at http://{addr}/");
        }
        tracing::info!(%addr, "listening");

        axum::serve(listener, router)
            .await
            .map_err(|e| TaxiError::InternalServerError(format!("Server error: {e}")))?;
        Ok(())
    }
}

impl std::fmt::Debug for TaxiApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaxiApp")
            .field("settings", &self.settings)
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}
