//! An in-memory taxi service for tests.
//!
//! [`TestApp`] migrates a fresh in-memory database and builds the full
//! router. [`TestApp::force_login`] gives a client an authenticated session
//! without going through the login form.

use axum::Router;

use taxi_auth::session::{generate_session_key, SessionData};
use taxi_auth::session_auth;
use taxi_auth::users::{create_superuser, create_user};
use taxi_core::{Settings, TaxiResult};
use taxi_db::{schema, Driver, NewDriver, SqliteBackend};
use taxi_views::{build_router, AppState};

use crate::client::TestClient;

/// Password given to drivers made by [`TestApp::create_driver`].
pub const TEST_PASSWORD: &str = "test123user";

/// The full application over a fresh in-memory database.
#[derive(Debug, Clone)]
pub struct TestApp {
    state: AppState,
    router: Router,
}

impl TestApp {
    /// Creates the app with default settings and a test secret key.
    pub async fn new() -> TaxiResult<Self> {
        Self::with_settings(Settings {
            secret_key: "taxi-test-secret".to_string(),
            ..Settings::default()
        })
        .await
    }

    pub async fn with_settings(settings: Settings) -> TaxiResult<Self> {
        let db = SqliteBackend::memory()?;
        schema::migrate(&db).await?;
        let state = AppState::new(settings, db)?;
        let router = build_router(state.clone())?;
        Ok(Self { state, router })
    }

    pub const fn db(&self) -> &SqliteBackend {
        &self.state.db
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// A client with an empty cookie jar.
    pub fn client(&self) -> TestClient {
        TestClient::new(self.router())
    }

    /// Creates a plain driver with [`TEST_PASSWORD`].
    pub async fn create_driver(&self, username: &str, license_number: &str) -> TaxiResult<Driver> {
        create_user(
            self.db(),
            NewDriver {
                username: username.to_string(),
                license_number: Some(license_number.to_string()),
                ..NewDriver::default()
            },
            TEST_PASSWORD,
        )
        .await
    }

    /// Creates a superuser with [`TEST_PASSWORD`].
    pub async fn create_superuser(&self, username: &str) -> TaxiResult<Driver> {
        create_superuser(self.db(), username, "", TEST_PASSWORD).await
    }

    /// Logs `driver` into `client` by writing a session directly.
    pub async fn force_login(&self, client: &mut TestClient, driver: &Driver) -> TaxiResult<()> {
        let mut data = SessionData::new(generate_session_key());
        session_auth::login(&mut data, driver, &self.state.settings.secret_key)?;
        self.state.sessions.save(&data).await?;
        client.set_cookie(&self.state.settings.session_cookie_name, &data.session_key);
        Ok(())
    }

    /// A client already logged in as `driver`.
    pub async fn login_client(&self, driver: &Driver) -> TaxiResult<TestClient> {
        let mut client = self.client();
        self.force_login(&mut client, driver).await?;
        Ok(client)
    }
}
