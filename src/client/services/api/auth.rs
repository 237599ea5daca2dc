//! # Authentication Endpoints
//!
//! Registration and login against the backend.

use super::client::ApiClient;
use crate::client::utils::validation::{LoginForm, RegisterForm};
use crate::common::error::ApiError;
use crate::common::models::{Role, Session, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    user: User,
    token: String,
}

impl From<AuthResponse> for Session {
    fn from(r: AuthResponse) -> Self {
        Session { user: r.user, token: r.token }
    }
}

/// Register a new account. The backend signs the user in on success.
pub async fn register(client: &ApiClient, form: &RegisterForm) -> Result<Session, ApiError> {
    log::info!("[API] Registering {} as {}", form.email, form.role);
    let req = client.post("api/auth/register")?.json(&RegisterRequest {
        name: form.name.trim(),
        email: form.email.trim(),
        password: &form.password,
        role: form.role,
    });
    client.send_json::<AuthResponse>(req, "register").await.map(Session::from)
}

/// Login with email, password and the role the user picked on the form.
pub async fn login(client: &ApiClient, form: &LoginForm) -> Result<Session, ApiError> {
    log::info!("[API] Attempting login for {}", form.email);
    let start = std::time::Instant::now();
    let req = client.post("api/auth/login")?.json(&LoginRequest {
        email: form.email.trim(),
        password: &form.password,
        role: form.role,
    });
    let session = client.send_json::<AuthResponse>(req, "login").await.map(Session::from)?;
    log::info!("[API] Login successful in {} ms", start.elapsed().as_millis());
    Ok(session)
}
