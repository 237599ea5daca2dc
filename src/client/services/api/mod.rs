//! # Backend API Client Module
//!
//! Thin wrappers over the marketplace REST backend.
//!
//! ```text
//! api/
//! ├── mod.rs            - ApiService trait and exports
//! ├── client.rs         - ApiClient, request helpers, 401 detection
//! ├── auth.rs           - register, login
//! ├── companies.rs      - company lookup and management
//! ├── jobs.rs           - job listings
//! ├── applications.rs   - job applications
//! ├── chat.rs           - conversations and persisted messages
//! └── notifications.rs  - notifications
//! ```
//!
//! Flows and views depend on [`ApiService`] rather than on [`ApiClient`] so
//! they can be driven by an in-memory double in tests.

pub mod applications;
pub mod auth;
pub mod chat;
pub mod client;
pub mod companies;
pub mod jobs;
pub mod notifications;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ApiClient;

use crate::client::utils::validation::{CompanyForm, JobForm, LoginForm, RegisterForm};
use crate::common::error::ApiError;
use crate::common::models::{
    Application, ApplicationStatus, ChatMessage, Company, Conversation, Job, Notification, Page, Session,
};
use async_trait::async_trait;

#[async_trait]
pub trait ApiService: Send + Sync {
    /// Attach (or drop) the bearer token used on subsequent requests.
    fn set_token(&self, token: Option<String>);

    async fn register(&self, form: &RegisterForm) -> Result<Session, ApiError>;
    async fn login(&self, form: &LoginForm) -> Result<Session, ApiError>;

    async fn company_for_recruiter(&self, recruiter_id: &str) -> Result<Option<Company>, ApiError>;
    async fn create_company(&self, form: &CompanyForm) -> Result<Company, ApiError>;
    async fn list_companies(&self) -> Result<Vec<Company>, ApiError>;
    async fn delete_company(&self, company_id: &str) -> Result<(), ApiError>;

    async fn list_jobs(&self, page: u32) -> Result<Page<Job>, ApiError>;
    async fn get_job(&self, job_id: &str) -> Result<Job, ApiError>;
    async fn create_job(&self, company_id: &str, form: &JobForm) -> Result<Job, ApiError>;
    async fn delete_job(&self, job_id: &str) -> Result<(), ApiError>;

    async fn apply_to_job(&self, job_id: &str, cover_letter: Option<&str>) -> Result<Application, ApiError>;
    async fn applications_for_job(&self, job_id: &str) -> Result<Vec<Application>, ApiError>;
    async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<Application, ApiError>;

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>, ApiError>;
    async fn create_conversation(&self, sender_id: &str, receiver_id: &str) -> Result<Conversation, ApiError>;
    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, ApiError>;
    async fn create_message(&self, conversation_id: &str, sender_id: &str, text: &str) -> Result<ChatMessage, ApiError>;
    async fn mark_message_read(&self, message_id: &str) -> Result<(), ApiError>;

    async fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>, ApiError>;
    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ApiService for ApiClient {
    fn set_token(&self, token: Option<String>) {
        ApiClient::set_token(self, token)
    }

    async fn register(&self, form: &RegisterForm) -> Result<Session, ApiError> {
        auth::register(self, form).await
    }

    async fn login(&self, form: &LoginForm) -> Result<Session, ApiError> {
        auth::login(self, form).await
    }

    async fn company_for_recruiter(&self, recruiter_id: &str) -> Result<Option<Company>, ApiError> {
        companies::company_for_recruiter(self, recruiter_id).await
    }

    async fn create_company(&self, form: &CompanyForm) -> Result<Company, ApiError> {
        companies::create_company(self, form).await
    }

    async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        companies::list_companies(self).await
    }

    async fn delete_company(&self, company_id: &str) -> Result<(), ApiError> {
        companies::delete_company(self, company_id).await
    }

    async fn list_jobs(&self, page: u32) -> Result<Page<Job>, ApiError> {
        jobs::list_jobs(self, page).await
    }

    async fn get_job(&self, job_id: &str) -> Result<Job, ApiError> {
        jobs::get_job(self, job_id).await
    }

    async fn create_job(&self, company_id: &str, form: &JobForm) -> Result<Job, ApiError> {
        jobs::create_job(self, company_id, form).await
    }

    async fn delete_job(&self, job_id: &str) -> Result<(), ApiError> {
        jobs::delete_job(self, job_id).await
    }

    async fn apply_to_job(&self, job_id: &str, cover_letter: Option<&str>) -> Result<Application, ApiError> {
        applications::apply_to_job(self, job_id, cover_letter).await
    }

    async fn applications_for_job(&self, job_id: &str) -> Result<Vec<Application>, ApiError> {
        applications::applications_for_job(self, job_id).await
    }

    async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<Application, ApiError> {
        applications::update_application_status(self, application_id, status).await
    }

    async fn list_conversations(&self, user_id: &str) -> Result<Vec<Conversation>, ApiError> {
        chat::list_conversations(self, user_id).await
    }

    async fn create_conversation(&self, sender_id: &str, receiver_id: &str) -> Result<Conversation, ApiError> {
        chat::create_conversation(self, sender_id, receiver_id).await
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
        chat::get_messages(self, conversation_id).await
    }

    async fn create_message(&self, conversation_id: &str, sender_id: &str, text: &str) -> Result<ChatMessage, ApiError> {
        chat::create_message(self, conversation_id, sender_id, text).await
    }

    async fn mark_message_read(&self, message_id: &str) -> Result<(), ApiError> {
        chat::mark_message_read(self, message_id).await
    }

    async fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>, ApiError> {
        notifications::list_notifications(self, user_id).await
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<(), ApiError> {
        notifications::mark_notification_read(self, notification_id).await
    }
}
