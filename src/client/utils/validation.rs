//! Form validation run before any request leaves the client.

use crate::common::error::ValidationError;
use crate::common::models::Role;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex compiles"));

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobForm {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub salary: Option<f64>,
    pub job_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyForm {
    pub name: String,
    pub description: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::new("email", "Email is required"));
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::new("email", "Invalid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, format!("{} is required", field)));
    }
    Ok(())
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        // admins are provisioned by the backend
        if self.role == Role::Admin {
            return Err(ValidationError::new("role", "Role must be candidate or recruiter"));
        }
        Ok(())
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        required("password", &self.password)
    }
}

impl JobForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title)?;
        required("description", &self.description)?;
        if let Some(salary) = self.salary {
            if !salary.is_finite() || salary < 0.0 {
                return Err(ValidationError::new("salary", "Salary must be a positive number"));
            }
        }
        Ok(())
    }
}

impl CompanyForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name)?;
        if let Some(site) = self.website.as_deref().filter(|s| !s.trim().is_empty()) {
            if url::Url::parse(site).is_err() {
                return Err(ValidationError::new("website", "Website must be a valid URL"));
            }
        }
        Ok(())
    }
}
