//! In-memory [`ApiService`] double used by the flow tests.

use super::ApiService;
use crate::client::utils::validation::{CompanyForm, JobForm, LoginForm, RegisterForm};
use crate::common::error::ApiError;
use crate::common::models::*;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MockApi {
    pub calls: Mutex<Vec<String>>,
    pub session: Mutex<Option<Session>>,
    pub companies: Mutex<HashMap<String, Company>>,
    pub jobs: Mutex<Vec<Job>>,
    pub messages: Mutex<HashMap<String, Vec<ChatMessage>>>,
    pub fail_messages: Mutex<bool>,
    pub fail_deletes: Mutex<bool>,
    pub token: Mutex<Option<String>>,
}

pub fn user(id: &str, role: Role) -> User {
    User {
        id: id.into(),
        name: format!("{}-name", id),
        email: format!("{}@example.com", id),
        role,
        profile_photo: None,
    }
}

pub fn message(id: &str, conversation_id: &str, sender_id: &str, text: &str, secs: i64) -> ChatMessage {
    ChatMessage {
        id: id.into(),
        conversation_id: conversation_id.into(),
        sender_id: sender_id.into(),
        text: text.into(),
        created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        read: false,
    }
}

pub fn company(id: &str, recruiter_id: &str) -> Company {
    Company {
        id: id.into(),
        name: format!("Company {}", id),
        description: None,
        website: None,
        location: None,
        recruiter_id: recruiter_id.into(),
    }
}

pub fn job(id: &str) -> Job {
    Job {
        id: id.into(),
        title: format!("Job {}", id),
        description: "desc".into(),
        location: None,
        salary: None,
        job_type: None,
        company_id: "co".into(),
        recruiter_id: "rec".into(),
        created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, session: Session) -> Self {
        *self.session.lock().unwrap() = Some(session);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == name).count()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn deletes_fail(&self) -> Result<(), ApiError> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(ApiError::Status { status: 500, message: "delete failed".into() });
        }
        Ok(())
    }
}

#[async_trait]
impl ApiService for MockApi {
    fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap() = token;
    }

    async fn register(&self, _form: &RegisterForm) -> Result<Session, ApiError> {
        self.record("register");
        self.session.lock().unwrap().clone().ok_or(ApiError::Status { status: 400, message: "exists".into() })
    }

    async fn login(&self, _form: &LoginForm) -> Result<Session, ApiError> {
        self.record("login");
        self.session.lock().unwrap().clone().ok_or(ApiError::Unauthorized("bad credentials".into()))
    }

    async fn company_for_recruiter(&self, recruiter_id: &str) -> Result<Option<Company>, ApiError> {
        self.record("company_for_recruiter");
        Ok(self.companies.lock().unwrap().values().find(|c| c.recruiter_id == recruiter_id).cloned())
    }

    async fn create_company(&self, form: &CompanyForm) -> Result<Company, ApiError> {
        self.record("create_company");
        let mut c = company("new", "u1");
        c.name = form.name.clone();
        Ok(c)
    }

    async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        self.record("list_companies");
        Ok(self.companies.lock().unwrap().values().cloned().collect())
    }

    async fn delete_company(&self, company_id: &str) -> Result<(), ApiError> {
        self.record("delete_company");
        self.deletes_fail()?;
        self.companies.lock().unwrap().remove(company_id);
        Ok(())
    }

    async fn list_jobs(&self, page: u32) -> Result<Page<Job>, ApiError> {
        self.record("list_jobs");
        let jobs = self.jobs.lock().unwrap();
        let per_page = 2usize;
        let total_pages = jobs.len().div_ceil(per_page).max(1) as u32;
        let start = (page.max(1) as usize - 1) * per_page;
        let items = jobs.iter().skip(start).take(per_page).cloned().collect();
        Ok(Page { items, page, total_pages })
    }

    async fn get_job(&self, job_id: &str) -> Result<Job, ApiError> {
        self.record("get_job");
        self.jobs
            .lock()
            .unwrap()
            .iter()
            .find(|j| j.id == job_id)
            .cloned()
            .ok_or(ApiError::Status { status: 404, message: "not found".into() })
    }

    async fn create_job(&self, company_id: &str, form: &JobForm) -> Result<Job, ApiError> {
        self.record("create_job");
        let mut j = job("new");
        j.title = form.title.clone();
        j.company_id = company_id.into();
        Ok(j)
    }

    async fn delete_job(&self, job_id: &str) -> Result<(), ApiError> {
        self.record("delete_job");
        self.deletes_fail()?;
        self.jobs.lock().unwrap().retain(|j| j.id != job_id);
        Ok(())
    }

    async fn apply_to_job(&self, job_id: &str, cover_letter: Option<&str>) -> Result<Application, ApiError> {
        self.record("apply_to_job");
        Ok(Application {
            id: "a1".into(),
            job_id: job_id.into(),
            candidate_id: "u1".into(),
            status: ApplicationStatus::Pending,
            cover_letter: cover_letter.map(str::to_string),
            applied_at: Utc::now(),
        })
    }

    async fn applications_for_job(&self, _job_id: &str) -> Result<Vec<Application>, ApiError> {
        self.record("applications_for_job");
        Ok(vec![])
    }

    async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<Application, ApiError> {
        self.record("update_application_status");
        Ok(Application {
            id: application_id.into(),
            job_id: "j1".into(),
            candidate_id: "u1".into(),
            status,
            cover_letter: None,
            applied_at: Utc::now(),
        })
    }

    async fn list_conversations(&self, _user_id: &str) -> Result<Vec<Conversation>, ApiError> {
        self.record("list_conversations");
        Ok(vec![])
    }

    async fn create_conversation(&self, sender_id: &str, receiver_id: &str) -> Result<Conversation, ApiError> {
        self.record("create_conversation");
        Ok(Conversation {
            id: format!("{}-{}", sender_id, receiver_id),
            members: [sender_id.into(), receiver_id.into()],
            created_at: Utc::now(),
        })
    }

    async fn get_messages(&self, conversation_id: &str) -> Result<Vec<ChatMessage>, ApiError> {
        self.record("get_messages");
        if *self.fail_messages.lock().unwrap() {
            return Err(ApiError::Network("connection refused".into()));
        }
        Ok(self.messages.lock().unwrap().get(conversation_id).cloned().unwrap_or_default())
    }

    async fn create_message(&self, conversation_id: &str, sender_id: &str, text: &str) -> Result<ChatMessage, ApiError> {
        self.record("create_message");
        Ok(message("persisted", conversation_id, sender_id, text, 0))
    }

    async fn mark_message_read(&self, _message_id: &str) -> Result<(), ApiError> {
        self.record("mark_message_read");
        Ok(())
    }

    async fn list_notifications(&self, _user_id: &str) -> Result<Vec<Notification>, ApiError> {
        self.record("list_notifications");
        Ok(vec![])
    }

    async fn mark_notification_read(&self, _notification_id: &str) -> Result<(), ApiError> {
        self.record("mark_notification_read");
        Ok(())
    }
}
