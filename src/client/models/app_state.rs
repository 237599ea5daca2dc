use crate::client::utils::session_store::SessionStore;
use crate::common::models::{Role, Session, User};
use log::{info, warn};

/// Screen the client should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Route {
    #[default]
    Login,
    CandidateHome,
    RecruiterHome,
    /// Recruiter without a company record yet.
    CompanyRegistration,
    AdminDashboard,
}

impl Route {
    /// Landing screen for a role, before any recruiter company check.
    pub fn home_for(role: Role) -> Self {
        match role {
            Role::Candidate => Route::CandidateHome,
            Role::Recruiter => Route::RecruiterHome,
            Role::Admin => Route::AdminDashboard,
        }
    }
}

/// Application-wide session state, mirrored to persistent storage.
#[derive(Debug)]
pub struct AppState {
    session: Option<Session>,
    route: Route,
    store: SessionStore,
}

impl AppState {
    /// Restore the persisted session, if any. A restored session starts on its role's
    /// home; `auth_service::restore` re-runs the recruiter company check.
    pub fn init(store: SessionStore) -> Self {
        let session = store.load();
        let route = match &session {
            Some(s) => {
                info!("[SESSION_STORE] Restored session for {}", s.user.email);
                Route::home_for(s.user.role)
            }
            None => Route::Login,
        };
        Self { session, route, store }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn navigate(&mut self, route: Route) {
        self.route = route;
    }

    /// Record a successful authentication. A storage failure is logged, not fatal.
    pub fn sign_in(&mut self, session: Session, route: Route) {
        if let Err(e) = self.store.save(&session) {
            warn!("[SESSION_STORE] Failed to persist session: {}", e);
        }
        self.session = Some(session);
        self.route = route;
    }

    pub fn sign_out(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!("[SESSION_STORE] Failed to clear persisted session: {}", e);
        }
        self.session = None;
        self.route = Route::Login;
    }
}
