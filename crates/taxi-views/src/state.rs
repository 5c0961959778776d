//! Application state shared by every handler.

use std::sync::Arc;

use tera::Tera;

use taxi_auth::{AuthState, InMemorySessionBackend, SessionBackend};
use taxi_core::{Settings, TaxiResult};
use taxi_db::SqliteBackend;

use crate::templates::site_templates;

/// Database, settings, session store and templates.
#[derive(Clone)]
pub struct AppState {
    pub db: SqliteBackend,
    pub settings: Arc<Settings>,
    pub sessions: Arc<dyn SessionBackend>,
    pub templates: Arc<Tera>,
}

impl AppState {
    /// Builds the state with an in-memory session store.
    pub fn new(settings: Settings, db: SqliteBackend) -> TaxiResult<Self> {
        Self::with_sessions(settings, db, Arc::new(InMemorySessionBackend::new()))
    }

    pub fn with_sessions(
        settings: Settings,
        db: SqliteBackend,
        sessions: Arc<dyn SessionBackend>,
    ) -> TaxiResult<Self> {
        Ok(Self {
            db,
            settings: Arc::new(settings),
            sessions,
            templates: Arc::new(site_templates()?),
        })
    }

    /// The state the auth middleware needs.
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            db: self.db.clone(),
            sessions: Arc::clone(&self.sessions),
            settings: Arc::clone(&self.settings),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
