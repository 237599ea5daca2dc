use crate::client::models::app_state::{AppState, Route};
use crate::client::services::api::ApiService;
use crate::client::services::websocket_client::ConnectionManager;
use crate::client::utils::validation::{LoginForm, RegisterForm};
use crate::common::error::AuthFlowError;
use crate::common::models::{Role, Session};
use log::{info, warn};

/// Where a freshly authenticated user lands.
pub async fn route_after_auth(api: &dyn ApiService, session: &Session) -> Result<Route, AuthFlowError> {
    match session.user.role {
        Role::Recruiter => match api.company_for_recruiter(&session.user.id).await? {
            Some(company) => {
                info!("Recruiter {} belongs to {}", session.user.email, company.name);
                Ok(Route::RecruiterHome)
            }
            None => Ok(Route::CompanyRegistration),
        },
        role => Ok(Route::home_for(role)),
    }
}

/// Validate, register, sign in.
pub async fn register(api: &dyn ApiService, state: &mut AppState, form: &RegisterForm) -> Result<Route, AuthFlowError> {
    form.validate()?;
    let session = api.register(form).await?;
    api.set_token(Some(session.token.clone()));
    let route = route_after_auth(api, &session).await?;
    state.sign_in(session, route);
    Ok(route)
}

/// Validate, log in, route by role.
pub async fn login(api: &dyn ApiService, state: &mut AppState, form: &LoginForm) -> Result<Route, AuthFlowError> {
    form.validate()?;
    let session = api.login(form).await?;
    api.set_token(Some(session.token.clone()));
    let route = route_after_auth(api, &session).await?;
    state.sign_in(session, route);
    Ok(route)
}

/// Re-route a session restored from storage, so a recruiter whose company is
/// still missing lands on company registration again.
///
/// Returns `None` when nothing was restored. A failed lookup keeps the role's home.
pub async fn restore(api: &dyn ApiService, state: &mut AppState) -> Option<Route> {
    let session = state.session()?.clone();
    api.set_token(Some(session.token.clone()));
    match route_after_auth(api, &session).await {
        Ok(route) => state.navigate(route),
        Err(e) => warn!("[AUTH] Could not re-check landing screen for {}: {}", session.user.email, e),
    }
    Some(state.route())
}

/// Close the real-time connection and forget the session.
pub fn logout(api: &dyn ApiService, state: &mut AppState, connection: &mut ConnectionManager) {
    connection.teardown();
    api.set_token(None);
    state.sign_out();
}
